//! Embassy async tasks

pub mod encoder;

pub use encoder::encoder_task;

//! Hardware capability traits
//!
//! These traits define the interface between the console logic and the
//! board-specific implementations in the firmware crate.

pub mod clock;
pub mod display;
pub mod serial;

pub use clock::Clock;
pub use display::Renderer;
pub use serial::SerialLink;

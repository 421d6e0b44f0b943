//! OLED display
//!
//! The console hands over a finished character [`Screen`](vatcheck_core::Screen);
//! everything here only maps it to pixels.

pub mod renderer;
pub mod ssd1306;

pub use renderer::OledRenderer;
pub use ssd1306::Ssd1306;

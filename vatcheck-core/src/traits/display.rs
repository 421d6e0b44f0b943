//! Display renderer trait

use crate::screen::Screen;

/// Draws a character [`Screen`] on a physical panel
///
/// The console owns all layout decisions; a renderer only maps rows,
/// columns and highlight regions to pixels.
pub trait Renderer {
    /// Panel error type
    type Error;

    /// Draw the whole screen
    fn render(&mut self, screen: &Screen) -> Result<(), Self::Error>;
}

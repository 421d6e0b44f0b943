//! Character screen to OLED pixels
//!
//! 8 rows of 21 characters on a 128x64 panel: a 5x8 font on a 6 pixel
//! pitch, one 8 pixel page per row. Highlighted regions are inverted.

use embedded_graphics::mono_font::ascii::FONT_5X8;
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::{Drawable, Point};
use embedded_graphics::text::{Baseline, Text};
use embedded_hal::i2c::I2c;

use vatcheck_core::traits::Renderer;
use vatcheck_core::Screen;

use super::ssd1306::Ssd1306;

/// Pixels per character column
const COL_WIDTH: usize = 6;

/// Pixels per text row
const ROW_HEIGHT: usize = 8;

const FONT: MonoFont<'static> = MonoFont {
    character_spacing: 1,
    ..FONT_5X8
};

/// [`Renderer`] for an SSD1306 panel
pub struct OledRenderer<I2C> {
    display: Ssd1306<I2C>,
}

impl<I2C> OledRenderer<I2C>
where
    I2C: I2c,
{
    pub fn new(display: Ssd1306<I2C>) -> Self {
        Self { display }
    }
}

impl<I2C> Renderer for OledRenderer<I2C>
where
    I2C: I2c,
{
    type Error = I2C::Error;

    fn render(&mut self, screen: &Screen) -> Result<(), I2C::Error> {
        self.display.clear_buffer();
        let style = MonoTextStyle::new(&FONT, BinaryColor::On);

        for (row, line) in screen.lines().enumerate() {
            let origin = Point::new(0, (row * ROW_HEIGHT) as i32);
            // Frame buffer drawing cannot fail
            let _ = Text::with_baseline(line, origin, style, Baseline::Top).draw(&mut self.display);

            if let Some((start, end)) = screen.get_highlight(row) {
                let start_x = usize::from(start) * COL_WIDTH;
                let end_x = (usize::from(end) + 1) * COL_WIDTH;
                self.display.invert_region(row, start_x, end_x);
            }
        }

        self.display.flush()
    }
}

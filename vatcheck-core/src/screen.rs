//! Screen buffer
//!
//! Character-based screen for the 128x64 panel: 8 rows of 21 columns with a
//! 6x8 cell. Rows are plain ASCII; a row may carry one inverted highlight
//! region used for the menu cursor and for edit mode.

use core::fmt::{self, Write};

use heapless::String;

/// Number of character rows
pub const SCREEN_ROWS: usize = 8;

/// Number of character columns
pub const SCREEN_COLS: usize = 21;

/// Maximum characters per line
pub const LINE_LEN: usize = SCREEN_COLS;

/// Text line
pub type LineText = String<LINE_LEN>;

/// Screen buffer handed to a [`Renderer`](crate::traits::Renderer)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    /// Current display content
    lines: [LineText; SCREEN_ROWS],
    /// Highlight state per row (start_col, end_col), end inclusive
    highlights: [Option<(u8, u8)>; SCREEN_ROWS],
    /// Whether the screen needs to be redrawn
    dirty: bool,
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen {
    /// Create a new empty screen
    pub fn new() -> Self {
        Self {
            lines: core::array::from_fn(|_| String::new()),
            highlights: [None; SCREEN_ROWS],
            dirty: true,
        }
    }

    /// Clear text and highlights
    pub fn clear(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
        self.highlights = [None; SCREEN_ROWS];
        self.dirty = true;
    }

    /// Set the content of a row, truncating to the screen width
    pub fn set_line(&mut self, row: usize, text: &str) {
        if row < SCREEN_ROWS {
            let text = if text.len() > LINE_LEN {
                &text[..LINE_LEN]
            } else {
                text
            };
            self.lines[row].clear();
            let _ = self.lines[row].push_str(text);
            self.dirty = true;
        }
    }

    /// Format into a row; output past the screen width is dropped
    pub fn write_line(&mut self, row: usize, args: fmt::Arguments<'_>) {
        if row < SCREEN_ROWS {
            let mut line = Truncating(LineText::new());
            let _ = line.write_fmt(args);
            self.lines[row] = line.0;
            self.dirty = true;
        }
    }

    /// Label on the left, value right-aligned
    pub fn set_field(&mut self, row: usize, label: &str, value: fmt::Arguments<'_>) {
        if row >= SCREEN_ROWS {
            return;
        }
        let mut value_text = Truncating(LineText::new());
        let _ = value_text.write_fmt(value);
        let value_text = value_text.0;

        let label_len = label.len().min(LINE_LEN.saturating_sub(value_text.len() + 1));
        let mut line = LineText::new();
        let _ = line.push_str(&label[..label_len]);
        while line.len() + value_text.len() < LINE_LEN {
            let _ = line.push(' ');
        }
        let _ = line.push_str(&value_text);

        self.lines[row] = line;
        self.dirty = true;
    }

    /// Get the content of a row
    pub fn get_line(&self, row: usize) -> Option<&str> {
        self.lines.get(row).map(|s| s.as_str())
    }

    /// Set highlight (invert) region for a row
    pub fn set_highlight(&mut self, row: usize, start_col: u8, end_col: u8) {
        if row < SCREEN_ROWS {
            self.highlights[row] = Some((start_col, end_col));
            self.dirty = true;
        }
    }

    /// Highlight the whole row
    pub fn highlight_row(&mut self, row: usize) {
        self.set_highlight(row, 0, (SCREEN_COLS - 1) as u8);
    }

    /// Get highlight region for a row
    pub fn get_highlight(&self, row: usize) -> Option<(u8, u8)> {
        self.highlights.get(row).copied().flatten()
    }

    /// Check if screen needs redrawing
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark screen as clean (after rendering)
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// All rows, top to bottom
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|s| s.as_str())
    }

    /// Whether any row contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().any(|line| line.contains(needle))
    }
}

/// `fmt::Write` adapter that silently drops what does not fit
struct Truncating(LineText);

impl Write for Truncating {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

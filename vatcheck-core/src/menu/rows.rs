//! Row cursor shared by the root list and the detail screens

use core::fmt;

use heapless::String;

use crate::screen::{Screen, LINE_LEN};

/// Move `index` by `delta` positions within `len`, wrapping at both ends
pub fn wrap(index: usize, delta: i32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (index as i64 + i64::from(delta)).rem_euclid(len as i64) as usize
}

/// Cursor over a fixed list of rows with an optional edit mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RowCursor {
    index: usize,
    len: usize,
    editing: bool,
}

impl RowCursor {
    pub const fn new(len: usize) -> Self {
        Self {
            index: 0,
            len,
            editing: false,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Move between rows (navigate mode)
    pub fn rotate(&mut self, delta: i32) {
        self.index = wrap(self.index, delta, self.len);
    }

    /// Enter or leave edit mode; the cursor stays where it is
    pub fn toggle_edit(&mut self) {
        self.editing = !self.editing;
    }
}

/// Draw one selectable row: `> Label        value`
///
/// The selected row in edit mode is inverted.
pub fn draw_row(
    screen: &mut Screen,
    row: usize,
    cursor: &RowCursor,
    index: usize,
    label: &str,
    value: fmt::Arguments<'_>,
) {
    let selected = cursor.index() == index;
    let mut text: String<LINE_LEN> = String::new();
    let _ = text.push_str(if selected { "> " } else { "  " });
    for c in label.chars() {
        if text.push(c).is_err() {
            break;
        }
    }
    screen.set_field(row, &text, value);
    if selected && cursor.is_editing() {
        screen.highlight_row(row);
    }
}

/// Title row
pub fn draw_title(screen: &mut Screen, title: &str) {
    screen.write_line(0, format_args!("== {} ==", title));
}

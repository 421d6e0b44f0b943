//! Push button debouncing

/// Active-low button debouncer
///
/// A click is a released to pressed transition that happens at least
/// `lockout_ms` after the previous accepted click. Holding the button does
/// not repeat.
#[derive(Debug, Clone, Copy)]
pub struct ButtonDebouncer {
    lockout_ms: u32,
    was_pressed: bool,
    last_click_ms: Option<u32>,
}

impl ButtonDebouncer {
    /// Create a debouncer with the given lockout window
    pub const fn new(lockout_ms: u32) -> Self {
        Self {
            lockout_ms,
            was_pressed: false,
            last_click_ms: None,
        }
    }

    /// Sample the button; returns true when a click is accepted
    pub fn update(&mut self, pressed: bool, now_ms: u32) -> bool {
        let edge = pressed && !self.was_pressed;
        self.was_pressed = pressed;
        if !edge {
            return false;
        }

        let locked = self
            .last_click_ms
            .is_some_and(|last| now_ms.wrapping_sub(last) < self.lockout_ms);
        if locked {
            return false;
        }

        self.last_click_ms = Some(now_ms);
        true
    }
}

//! Operator input
//!
//! Converts the raw encoder position and button level into [`InputEvent`]s.

pub mod button;
pub mod encoder;

pub use button::ButtonDebouncer;
pub use encoder::{EncoderCounter, EncoderTracker, QuadratureDecoder};

use heapless::Vec;

/// Events the menu reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputEvent {
    /// Net encoder movement since the last poll (positive is clockwise)
    Rotate(i32),
    /// Accepted button click
    Click,
}

/// Events produced by one poll (rotation first, then click)
pub type InputEvents = Vec<InputEvent, 2>;

/// Encoder and button, sampled once per loop iteration
#[derive(Debug, Clone, Copy)]
pub struct InputSource {
    tracker: EncoderTracker,
    button: ButtonDebouncer,
}

impl InputSource {
    /// Create an input source
    ///
    /// `position` is the counter value at startup so that rotation before
    /// boot is not replayed.
    pub const fn new(position: i32, lockout_ms: u32) -> Self {
        Self {
            tracker: EncoderTracker::new(position),
            button: ButtonDebouncer::new(lockout_ms),
        }
    }

    /// Sample inputs
    pub fn poll(&mut self, position: i32, pressed: bool, now_ms: u32) -> InputEvents {
        let mut events = InputEvents::new();

        let delta = self.tracker.delta(position);
        if delta != 0 {
            log_trace!("encoder delta {}", delta);
            let _ = events.push(InputEvent::Rotate(delta));
        }
        if self.button.update(pressed, now_ms) {
            let _ = events.push(InputEvent::Click);
        }

        events
    }
}

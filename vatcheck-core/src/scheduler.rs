//! Poll and refresh scheduling
//!
//! Decides when the console queries telemetry, when it redraws without new
//! input and how long it yields between iterations. The gesture view runs
//! at a faster pace so swipes show up promptly.

use crate::config::TimingConfig;

/// Loop pace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pace {
    #[default]
    Normal,
    Fast,
}

/// Interval bookkeeping for the console loop
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    timing: TimingConfig,
    last_poll_ms: Option<u32>,
    last_refresh_ms: Option<u32>,
}

impl Scheduler {
    pub fn new(timing: TimingConfig) -> Self {
        Self {
            timing,
            last_poll_ms: None,
            last_refresh_ms: None,
        }
    }

    fn poll_interval(&self, pace: Pace) -> u32 {
        match pace {
            Pace::Normal => self.timing.poll_interval_ms,
            Pace::Fast => self.timing.fast_poll_interval_ms,
        }
    }

    fn refresh_interval(&self, pace: Pace) -> u32 {
        match pace {
            Pace::Normal => self.timing.refresh_interval_ms,
            Pace::Fast => self.timing.fast_refresh_interval_ms,
        }
    }

    /// Whether a telemetry query is due; claims the slot when it is
    pub fn poll_due(&mut self, now_ms: u32, pace: Pace) -> bool {
        let due = self
            .last_poll_ms
            .is_none_or(|last| now_ms.wrapping_sub(last) >= self.poll_interval(pace));
        if due {
            self.last_poll_ms = Some(now_ms);
        }
        due
    }

    /// Whether a periodic redraw is due
    pub fn refresh_due(&self, now_ms: u32, pace: Pace) -> bool {
        self.last_refresh_ms
            .is_none_or(|last| now_ms.wrapping_sub(last) >= self.refresh_interval(pace))
    }

    /// Record a redraw
    pub fn mark_refreshed(&mut self, now_ms: u32) {
        self.last_refresh_ms = Some(now_ms);
    }

    /// Yield before the next iteration (ms)
    pub fn yield_ms(&self, pace: Pace) -> u32 {
        match pace {
            Pace::Normal => self.timing.yield_ms,
            Pace::Fast => self.timing.fast_yield_ms,
        }
    }
}

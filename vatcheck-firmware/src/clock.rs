//! Millisecond clock on the embassy time driver

use embassy_time::{block_for, Duration, Instant};
use vatcheck_core::traits::Clock;

/// Uptime clock; delays busy-wait so higher priority tasks keep running
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u32 {
        Instant::now().as_millis() as u32
    }

    fn delay_ms(&mut self, ms: u32) {
        block_for(Duration::from_millis(u64::from(ms)));
    }
}

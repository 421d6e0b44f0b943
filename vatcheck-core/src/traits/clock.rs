//! Monotonic time source

/// Millisecond clock
pub trait Clock {
    /// Milliseconds since boot (wraps after ~49 days)
    fn now_ms(&self) -> u32;

    /// Block for the given number of milliseconds
    fn delay_ms(&mut self, ms: u32);

    /// Milliseconds elapsed since `since`, wrap-safe
    fn elapsed_ms(&self, since: u32) -> u32 {
        self.now_ms().wrapping_sub(since)
    }
}

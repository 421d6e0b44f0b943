//! Rotary encoder decoding
//!
//! The edge handler (firmware side) owns a [`QuadratureDecoder`] and records
//! steps into a shared [`EncoderCounter`]. The console loop never writes the
//! counter; it diffs positions with an [`EncoderTracker`].

use portable_atomic::{AtomicI32, Ordering};

/// Single-producer encoder position
///
/// Written only by the edge handler, read by the console loop.
pub struct EncoderCounter {
    position: AtomicI32,
}

impl Default for EncoderCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl EncoderCounter {
    /// Create a counter at position zero
    pub const fn new() -> Self {
        Self {
            position: AtomicI32::new(0),
        }
    }

    /// Record a decoded step (`+1`, `-1` or `0`)
    pub fn record(&self, step: i32) {
        if step != 0 {
            self.position.fetch_add(step, Ordering::Relaxed);
        }
    }

    /// Current position (wraps on overflow)
    pub fn position(&self) -> i32 {
        self.position.load(Ordering::Relaxed)
    }
}

/// Turns absolute positions into deltas
#[derive(Debug, Clone, Copy, Default)]
pub struct EncoderTracker {
    last: i32,
}

impl EncoderTracker {
    /// Start tracking from a known position
    pub const fn new(position: i32) -> Self {
        Self { last: position }
    }

    /// Delta since the previous call
    pub fn delta(&mut self, position: i32) -> i32 {
        let delta = position.wrapping_sub(self.last);
        self.last = position;
        delta
    }
}

/// CLK/DT quadrature decoder
///
/// Fed on every CLK edge. A step is counted when CLK differs from the last
/// accepted level: DT out of phase with CLK is clockwise (`+1`), in phase is
/// counter-clockwise (`-1`).
#[derive(Debug, Clone, Copy)]
pub struct QuadratureDecoder {
    last_clk: bool,
}

impl QuadratureDecoder {
    /// Create a decoder with the CLK level sampled at startup
    pub const fn new(clk: bool) -> Self {
        Self { last_clk: clk }
    }

    /// Decode one edge into a step
    pub fn on_edge(&mut self, clk: bool, dt: bool) -> i32 {
        if clk == self.last_clk {
            return 0;
        }
        self.last_clk = clk;
        if dt != clk {
            1
        } else {
            -1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clockwise_sequence() {
        let mut decoder = QuadratureDecoder::new(true);
        // CLK falls with DT still high, then rises with DT low
        assert_eq!(decoder.on_edge(false, true), 1);
        assert_eq!(decoder.on_edge(true, false), 1);
    }

    #[test]
    fn test_counter_clockwise_sequence() {
        let mut decoder = QuadratureDecoder::new(true);
        assert_eq!(decoder.on_edge(false, false), -1);
        assert_eq!(decoder.on_edge(true, true), -1);
    }

    #[test]
    fn test_bounce_without_clk_change() {
        let mut decoder = QuadratureDecoder::new(false);
        assert_eq!(decoder.on_edge(false, true), 0);
        assert_eq!(decoder.on_edge(false, false), 0);
    }

    #[test]
    fn test_counter_and_tracker() {
        let counter = EncoderCounter::new();
        let mut tracker = EncoderTracker::new(counter.position());

        for _ in 0..3 {
            counter.record(1);
        }
        assert_eq!(tracker.delta(counter.position()), 3);

        counter.record(-1);
        counter.record(0);
        assert_eq!(tracker.delta(counter.position()), -1);
        assert_eq!(tracker.delta(counter.position()), 0);
    }

    #[test]
    fn test_tracker_survives_wrap() {
        let mut tracker = EncoderTracker::new(i32::MAX);
        assert_eq!(tracker.delta(i32::MIN), 1);
        assert_eq!(tracker.delta(i32::MAX), -1);
    }
}

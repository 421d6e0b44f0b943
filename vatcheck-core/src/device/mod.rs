//! Device-side state
//!
//! What the console knows about the printer board (latest telemetry and
//! sensor health) and what it wants the board to do (setpoints).

pub mod setpoints;

pub use setpoints::{
    FanSetpoint, MotorSetpoint, ProjectionSetpoint, RgbSetpoint, Setpoints, ToggleSetpoint,
};

use vatcheck_protocol::{Coverage, ReplyError, SensorHealth, TelemetryFrame};

/// Latest telemetry snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceState {
    /// Decoded telemetry; fields persist across partial replies
    pub frame: TelemetryFrame,
    /// Result of the most recent health query, replaced on every test run
    pub health: Option<SensorHealth>,
    /// Time of the last accepted telemetry reply
    last_update_ms: Option<u32>,
    stale_after_ms: u32,
}

impl DeviceState {
    /// Create an empty state
    pub fn new(stale_after_ms: u32) -> Self {
        Self {
            frame: TelemetryFrame::default(),
            health: None,
            last_update_ms: None,
            stale_after_ms,
        }
    }

    /// Apply a telemetry reply line
    ///
    /// Malformed and truncated lines leave the state untouched.
    pub fn apply_line(&mut self, line: &[u8], now_ms: u32) -> Result<Coverage, ReplyError> {
        let coverage = self.frame.decode_line(line)?;
        self.last_update_ms = Some(now_ms);
        Ok(coverage)
    }

    /// Time of the last accepted telemetry reply
    pub fn last_update_ms(&self) -> Option<u32> {
        self.last_update_ms
    }

    /// No telemetry yet, or the last reply is older than the stale horizon
    pub fn is_stale(&self, now_ms: u32) -> bool {
        match self.last_update_ms {
            Some(at) => now_ms.wrapping_sub(at) > self.stale_after_ms,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vatcheck_protocol::{Deci, Gesture};

    #[test]
    fn test_apply_updates_timestamp() {
        let mut device = DeviceState::new(1000);
        assert!(device.is_stale(0));

        device.apply_line(b"$123,456,78,901", 500).unwrap();
        assert_eq!(device.last_update_ms(), Some(500));
        assert_eq!(device.frame.plate_temp, Deci::from_tenths(78));
        assert!(!device.is_stale(1500));
        assert!(device.is_stale(1501));
    }

    #[test]
    fn test_bad_line_never_mutates() {
        let mut device = DeviceState::new(1000);
        device.apply_line(b"$10,20,30,40,50,60,70,2", 100).unwrap();
        let before = device;

        assert_eq!(
            device.apply_line(b"10,20,30,40", 200),
            Err(ReplyError::MissingPrefix)
        );
        assert_eq!(device.apply_line(b"$1,2", 300), Err(ReplyError::Truncated));
        assert_eq!(device, before);
        assert_eq!(device.frame.gesture, Gesture::Down);
    }
}

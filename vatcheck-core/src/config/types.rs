//! Configuration type definitions

use vatcheck_protocol::Deci;

/// Upper bound on the NTC sample window
pub const MAX_NTC_SAMPLES: u8 = 64;

/// Errors found while validating a configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A poll, refresh or yield interval is zero
    ZeroInterval,
    /// Reply timeout is zero
    ZeroReplyTimeout,
    /// NTC lower bound is not below the upper bound
    InvalidTemperatureRange,
    /// NTC step or spread limit is negative
    NegativeLimit,
    /// NTC sample target is zero or above [`MAX_NTC_SAMPLES`]
    InvalidSampleCount,
    /// NTC test timeout is zero
    ZeroTestTimeout,
}

/// Loop timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingConfig {
    /// Telemetry poll interval (ms)
    pub poll_interval_ms: u32,
    /// Telemetry poll interval while the gesture view is shown (ms)
    pub fast_poll_interval_ms: u32,
    /// Periodic redraw interval (ms)
    pub refresh_interval_ms: u32,
    /// Periodic redraw interval while the gesture view is shown (ms)
    pub fast_refresh_interval_ms: u32,
    /// Yield between loop iterations (ms)
    pub yield_ms: u32,
    /// Yield while the gesture view is shown (ms)
    pub fast_yield_ms: u32,
    /// Wait after a request before polling for the reply (ms)
    pub reply_grace_ms: u32,
    /// Reply timeout, measured after the grace period (ms)
    pub reply_timeout_ms: u32,
    /// Delay before the first telemetry query at boot (ms)
    pub boot_delay_ms: u32,
    /// Telemetry older than this is shown as stale (ms)
    pub stale_after_ms: u32,
    /// Minimum time between two accepted button clicks (ms)
    pub button_lockout_ms: u32,
    /// Gap between the two intake fan channel commands (ms)
    pub fan_channel_gap_ms: u32,
    /// Settle time after enabling a motor before moving it (ms)
    pub motor_enable_settle_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 50,
            fast_poll_interval_ms: 20,
            refresh_interval_ms: 50,
            fast_refresh_interval_ms: 30,
            yield_ms: 5,
            fast_yield_ms: 2,
            reply_grace_ms: 10,
            reply_timeout_ms: 150,
            boot_delay_ms: 200,
            stale_after_ms: 1000,
            button_lockout_ms: 300,
            fan_channel_gap_ms: 25,
            motor_enable_settle_ms: 100,
        }
    }
}

/// Plate NTC stability test thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NtcTestConfig {
    /// Lowest acceptable plate temperature
    pub min_temp: Deci,
    /// Highest acceptable plate temperature
    pub max_temp: Deci,
    /// Largest allowed change between consecutive samples
    pub max_step: Deci,
    /// Largest allowed max - min over the whole window
    pub max_spread: Deci,
    /// Samples collected before a verdict
    pub target_samples: u8,
    /// Test is finalized this long after it started (ms)
    pub timeout_ms: u32,
}

impl Default for NtcTestConfig {
    fn default() -> Self {
        Self {
            min_temp: Deci::ZERO,
            max_temp: Deci::from_whole(100),
            max_step: Deci::from_tenths(7),
            max_spread: Deci::from_whole(3),
            target_samples: 20,
            timeout_ms: 5000,
        }
    }
}

/// Complete console configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConsoleConfig {
    pub timing: TimingConfig,
    pub ntc: NtcTestConfig,
}

impl ConsoleConfig {
    /// Check the configuration for values the console cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.timing;
        let intervals = [
            t.poll_interval_ms,
            t.fast_poll_interval_ms,
            t.refresh_interval_ms,
            t.fast_refresh_interval_ms,
            t.yield_ms,
            t.fast_yield_ms,
        ];
        if intervals.iter().any(|&ms| ms == 0) {
            return Err(ConfigError::ZeroInterval);
        }
        if t.reply_timeout_ms == 0 {
            return Err(ConfigError::ZeroReplyTimeout);
        }

        let n = &self.ntc;
        if n.min_temp >= n.max_temp {
            return Err(ConfigError::InvalidTemperatureRange);
        }
        if n.max_step < Deci::ZERO || n.max_spread < Deci::ZERO {
            return Err(ConfigError::NegativeLimit);
        }
        if n.target_samples == 0 || n.target_samples > MAX_NTC_SAMPLES {
            return Err(ConfigError::InvalidSampleCount);
        }
        if n.timeout_ms == 0 {
            return Err(ConfigError::ZeroTestTimeout);
        }

        Ok(())
    }
}

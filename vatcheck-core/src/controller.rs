//! Controller state aggregate
//!
//! Everything the menu handlers read and write lives here. The console
//! writes telemetry (query path); only menu handlers change setpoints (input
//! path).

use crate::acceptance::TestEngine;
use crate::config::{ConsoleConfig, TimingConfig};
use crate::device::{DeviceState, Setpoints};

/// State shared by the menu and the console loop
#[derive(Debug, Clone, Copy)]
pub struct ControllerState {
    /// Latest telemetry and sensor health
    pub device: DeviceState,
    /// Operator-chosen actuator targets
    pub setpoints: Setpoints,
    /// Acceptance tests
    pub tests: TestEngine,
    /// Settle delays used by handlers
    pub timing: TimingConfig,
}

impl ControllerState {
    pub fn new(config: &ConsoleConfig) -> Self {
        Self {
            device: DeviceState::new(config.timing.stale_after_ms),
            setpoints: Setpoints::default(),
            tests: TestEngine::new(config.ntc),
            timing: config.timing,
        }
    }
}

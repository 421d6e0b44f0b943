//! Actuator setpoints
//!
//! Operator-chosen targets for every controllable axis. Each setpoint has a
//! `sent` flag that is cleared whenever a value changes and set once the
//! console has written the matching command to the board.

use vatcheck_protocol::command::FAN_DUTY_MAX;
use vatcheck_protocol::{Command, Direction, FanChannel, MotorAction, MotorAxis};

/// Percentage change per encoder detent on fan, saturation and value rows
pub const PERCENT_STEP: i32 = 10;
/// Hue change per encoder detent
pub const HUE_STEP: i32 = 10;
/// Hue upper bound (degrees)
pub const HUE_MAX: i32 = 360;
/// Motor distance change per detent (steps)
pub const DISTANCE_STEP: i32 = 100;
/// Motor distance bounds (steps)
pub const DISTANCE_MIN: i32 = 100;
pub const DISTANCE_MAX: i32 = 100_000;
/// Motor speed change per detent (steps/s)
pub const SPEED_STEP: i32 = 100;
/// Motor speed bounds (steps/s)
pub const SPEED_MIN: i32 = 100;
pub const SPEED_MAX: i32 = 20_000;
/// Default motor distance and speed
pub const MOTOR_DEFAULT_DISTANCE: u32 = 1000;
pub const MOTOR_DEFAULT_SPEED: u32 = 1000;
/// Projection LED current change per detent
pub const CURRENT_STEP: i32 = 10;
/// Projection LED current bounds
pub const CURRENT_MIN: i32 = 91;
pub const CURRENT_MAX: i32 = 1023;

/// Move `value` by `delta` detents of `step`, clamped to `[min, max]`
///
/// Saturates instead of overflowing on large deltas.
pub fn step_value(value: i32, delta: i32, step: i32, min: i32, max: i32) -> i32 {
    value
        .saturating_add(delta.saturating_mul(step))
        .clamp(min, max)
}

/// Fan speed in percent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FanSetpoint {
    percent: u8,
    sent: bool,
}

impl FanSetpoint {
    /// Speed in percent
    pub fn percent(&self) -> u8 {
        self.percent
    }

    /// Board duty (0-1999)
    pub fn duty(&self) -> u16 {
        (u32::from(self.percent) * u32::from(FAN_DUTY_MAX) / 100) as u16
    }

    /// Adjust by encoder detents
    pub fn adjust(&mut self, delta: i32) {
        let percent = step_value(self.percent.into(), delta, PERCENT_STEP, 0, 100) as u8;
        if percent != self.percent {
            self.percent = percent;
            self.sent = false;
        }
    }

    /// Command for one fan channel
    pub fn command(&self, channel: FanChannel) -> Command {
        Command::Fan {
            channel,
            duty: self.duty(),
        }
    }

    pub fn sent(&self) -> bool {
        self.sent
    }
}

/// RGB indicator channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RgbChannel {
    Hue,
    Saturation,
    Value,
}

/// RGB indicator colour (HSV)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RgbSetpoint {
    hue: u16,
    saturation: u8,
    value: u8,
    sent: bool,
}

impl Default for RgbSetpoint {
    fn default() -> Self {
        Self {
            hue: 0,
            saturation: 100,
            value: 100,
            sent: false,
        }
    }
}

impl RgbSetpoint {
    pub fn hue(&self) -> u16 {
        self.hue
    }

    pub fn saturation(&self) -> u8 {
        self.saturation
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    /// Adjust one channel by encoder detents
    pub fn adjust(&mut self, channel: RgbChannel, delta: i32) {
        let before = *self;
        match channel {
            RgbChannel::Hue => {
                self.hue = step_value(self.hue.into(), delta, HUE_STEP, 0, HUE_MAX) as u16;
            }
            RgbChannel::Saturation => {
                self.saturation =
                    step_value(self.saturation.into(), delta, PERCENT_STEP, 0, 100) as u8;
            }
            RgbChannel::Value => {
                self.value = step_value(self.value.into(), delta, PERCENT_STEP, 0, 100) as u8;
            }
        }
        if *self != before {
            self.sent = false;
        }
    }

    pub fn command(&self) -> Command {
        Command::Rgb {
            hue: self.hue,
            saturation: self.saturation,
            value: self.value,
        }
    }

    pub fn sent(&self) -> bool {
        self.sent
    }
}

/// On/off actuator (brake)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ToggleSetpoint {
    on: bool,
    sent: bool,
}

impl ToggleSetpoint {
    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Flip the state and return the new one
    pub fn toggle(&mut self) -> bool {
        self.on = !self.on;
        self.sent = false;
        self.on
    }

    pub fn sent(&self) -> bool {
        self.sent
    }
}

/// Stepper axis setpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorSetpoint {
    axis: MotorAxis,
    enabled: bool,
    direction: Direction,
    distance: u32,
    speed: u32,
    sent: bool,
}

impl MotorSetpoint {
    /// Defaults for an axis: disabled, forward, 1000 steps at 1000 steps/s
    pub fn new(axis: MotorAxis) -> Self {
        Self {
            axis,
            enabled: false,
            direction: Direction::Forward,
            distance: MOTOR_DEFAULT_DISTANCE,
            speed: MOTOR_DEFAULT_SPEED,
            sent: false,
        }
    }

    pub fn axis(&self) -> MotorAxis {
        self.axis
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn distance(&self) -> u32 {
        self.distance
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            self.enabled = enabled;
            self.sent = false;
        }
    }

    /// Reverse the move direction (no command is sent for this)
    pub fn flip_direction(&mut self) {
        self.direction = self.direction.flipped();
        self.sent = false;
    }

    pub fn adjust_distance(&mut self, delta: i32) {
        let distance = step_value(
            self.distance as i32,
            delta,
            DISTANCE_STEP,
            DISTANCE_MIN,
            DISTANCE_MAX,
        ) as u32;
        if distance != self.distance {
            self.distance = distance;
            self.sent = false;
        }
    }

    pub fn adjust_speed(&mut self, delta: i32) {
        let speed = step_value(self.speed as i32, delta, SPEED_STEP, SPEED_MIN, SPEED_MAX) as u32;
        if speed != self.speed {
            self.speed = speed;
            self.sent = false;
        }
    }

    /// Driver state command
    pub fn action(&self, action: MotorAction) -> Command {
        Command::Motor {
            axis: self.axis,
            action,
        }
    }

    /// Relative move with the current direction, distance and speed
    pub fn move_command(&self) -> Command {
        Command::MotorMove {
            axis: self.axis,
            direction: self.direction,
            distance: self.distance,
            speed: self.speed,
        }
    }

    pub fn sent(&self) -> bool {
        self.sent
    }
}

/// Projection LED setpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProjectionSetpoint {
    on: bool,
    current: u16,
    sent: bool,
}

impl Default for ProjectionSetpoint {
    fn default() -> Self {
        Self {
            on: false,
            current: CURRENT_MIN as u16,
            sent: false,
        }
    }
}

impl ProjectionSetpoint {
    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn current(&self) -> u16 {
        self.current
    }

    /// Flip the LED and return the new state
    pub fn toggle(&mut self) -> bool {
        self.on = !self.on;
        self.sent = false;
        self.on
    }

    pub fn adjust_current(&mut self, delta: i32) {
        let current =
            step_value(self.current.into(), delta, CURRENT_STEP, CURRENT_MIN, CURRENT_MAX) as u16;
        if current != self.current {
            self.current = current;
            self.sent = false;
        }
    }

    pub fn sent(&self) -> bool {
        self.sent
    }
}

/// Every actuator setpoint the console controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Setpoints {
    pub intake: FanSetpoint,
    pub exhaust: FanSetpoint,
    pub rgb: RgbSetpoint,
    pub brake: ToggleSetpoint,
    pub projection: ProjectionSetpoint,
    motors: [MotorSetpoint; 4],
}

impl Default for Setpoints {
    fn default() -> Self {
        Self {
            intake: FanSetpoint::default(),
            exhaust: FanSetpoint::default(),
            rgb: RgbSetpoint::default(),
            brake: ToggleSetpoint::default(),
            projection: ProjectionSetpoint::default(),
            motors: MotorAxis::ALL.map(MotorSetpoint::new),
        }
    }
}

impl Setpoints {
    pub fn motor(&self, axis: MotorAxis) -> &MotorSetpoint {
        &self.motors[axis.index()]
    }

    pub fn motor_mut(&mut self, axis: MotorAxis) -> &mut MotorSetpoint {
        &mut self.motors[axis.index()]
    }

    /// Restore one motor to its defaults
    pub fn reset_motor(&mut self, axis: MotorAxis) {
        self.motors[axis.index()] = MotorSetpoint::new(axis);
    }

    /// Record that a command reached the board
    ///
    /// The intake fan counts as sent once its second channel is written.
    pub fn mark_sent(&mut self, command: &Command) {
        match *command {
            Command::QueryTelemetry | Command::QueryHealth => {}
            Command::Brake(_) => self.brake.sent = true,
            Command::Fan { channel, .. } => match channel {
                FanChannel::IntakeA => {}
                FanChannel::IntakeB => self.intake.sent = true,
                FanChannel::Exhaust => self.exhaust.sent = true,
            },
            Command::Rgb { .. } => self.rgb.sent = true,
            Command::Motor { axis, .. } | Command::MotorMove { axis, .. } => {
                self.motors[axis.index()].sent = true;
            }
            Command::Projection(_) | Command::ProjectionCurrent(_) => {
                self.projection.sent = true;
            }
        }
    }
}

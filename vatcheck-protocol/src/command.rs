//! Requests sent from the console to the board
//!
//! Command grammar (every line is `$` + body + CR LF):
//!
//! | Purpose                  | Body                                  |
//! |--------------------------|---------------------------------------|
//! | Telemetry query          | `A`                                   |
//! | Sensor-health query      | `X`                                   |
//! | Brake                    | `B0` / `B1`                           |
//! | Fan duty                 | `F<1|2|3><0-1999>`                    |
//! | RGB indicator            | `LA<hue>,<sat>,<val>`                 |
//! | Motor enable/disable/stop| `S<Z|Y|1|2><E|D|P>`                   |
//! | Motor move               | `S<Z|Y|1|2><dir>,<distance>,<speed>`  |
//! | Projection LED           | `P0` / `P1` / `PC<0-1023>`            |

use core::fmt::{self, Write};

use heapless::Vec;

use crate::{LINE_END, LINE_PREFIX};

/// Longest encoded command, terminator included
pub const MAX_COMMAND_LEN: usize = 32;

/// Highest fan duty value understood by the board
pub const FAN_DUTY_MAX: u16 = 1999;

/// Highest projection LED current value understood by the board
pub const PROJECTION_CURRENT_MAX: u16 = 1023;

/// An encoded request line
pub type CommandLine = Vec<u8, MAX_COMMAND_LEN>;

/// Errors that can occur while encoding a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// Output buffer cannot hold the whole line
    BufferTooSmall,
}

/// Fan PWM channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FanChannel {
    /// First intake fan
    IntakeA,
    /// Second intake fan
    IntakeB,
    /// Exhaust fan
    Exhaust,
}

impl FanChannel {
    fn wire(self) -> char {
        match self {
            FanChannel::IntakeA => '1',
            FanChannel::IntakeB => '2',
            FanChannel::Exhaust => '3',
        }
    }
}

/// Stepper axis addressed by a motor command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorAxis {
    /// Build plate lift
    Z,
    /// Y carriage
    Y,
    /// First cover motor
    Cvr1,
    /// Second cover motor
    Cvr2,
}

impl MotorAxis {
    /// All axes in board order
    pub const ALL: [MotorAxis; 4] = [MotorAxis::Z, MotorAxis::Y, MotorAxis::Cvr1, MotorAxis::Cvr2];

    /// Position in [`MotorAxis::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    fn wire(self) -> char {
        match self {
            MotorAxis::Z => 'Z',
            MotorAxis::Y => 'Y',
            MotorAxis::Cvr1 => '1',
            MotorAxis::Cvr2 => '2',
        }
    }

    /// Short display label
    pub fn label(self) -> &'static str {
        match self {
            MotorAxis::Z => "Z",
            MotorAxis::Y => "Y",
            MotorAxis::Cvr1 => "CVR1",
            MotorAxis::Cvr2 => "CVR2",
        }
    }
}

/// Driver state change for a stepper axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorAction {
    /// Energize the driver
    Enable,
    /// Release the driver
    Disable,
    /// Abort the current move
    Stop,
}

impl MotorAction {
    fn wire(self) -> char {
        match self {
            MotorAction::Enable => 'E',
            MotorAction::Disable => 'D',
            MotorAction::Stop => 'P',
        }
    }
}

/// Move direction, sent as `0` or `1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

impl Direction {
    /// The opposite direction
    pub fn flipped(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }

    /// Wire value
    pub fn bit(self) -> u8 {
        match self {
            Direction::Forward => 0,
            Direction::Reverse => 1,
        }
    }
}

/// Requests understood by the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Ask for a telemetry line
    QueryTelemetry,
    /// Ask for the NTC/IR sensor health flags
    QueryHealth,
    /// Engage or release the brake
    Brake(bool),
    /// Set a fan duty (0-1999)
    Fan { channel: FanChannel, duty: u16 },
    /// Set the RGB indicator colour
    Rgb { hue: u16, saturation: u8, value: u8 },
    /// Change a stepper driver state
    Motor { axis: MotorAxis, action: MotorAction },
    /// Start a relative move
    MotorMove {
        axis: MotorAxis,
        direction: Direction,
        distance: u32,
        speed: u32,
    },
    /// Switch the projection LED
    Projection(bool),
    /// Set the projection LED current (0-1023)
    ProjectionCurrent(u16),
}

impl Command {
    /// Encode this command into a byte buffer, terminator included
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, EncodeError> {
        let mut out = SliceWriter { buf: buffer, len: 0 };
        self.write_line(&mut out)
            .map_err(|_| EncodeError::BufferTooSmall)?;
        Ok(out.len)
    }

    /// Encode this command into a heapless Vec
    pub fn to_line(&self) -> Result<CommandLine, EncodeError> {
        let mut buffer = [0u8; MAX_COMMAND_LEN];
        let len = self.encode(&mut buffer)?;
        let mut line = Vec::new();
        line.extend_from_slice(&buffer[..len])
            .map_err(|_| EncodeError::BufferTooSmall)?;
        Ok(line)
    }

    fn write_line<W: Write>(&self, out: &mut W) -> fmt::Result {
        out.write_char(LINE_PREFIX as char)?;
        match *self {
            Command::QueryTelemetry => out.write_char('A')?,
            Command::QueryHealth => out.write_char('X')?,
            Command::Brake(on) => write!(out, "B{}", on as u8)?,
            Command::Fan { channel, duty } => write!(out, "F{}{}", channel.wire(), duty)?,
            Command::Rgb {
                hue,
                saturation,
                value,
            } => write!(out, "LA{},{},{}", hue, saturation, value)?,
            Command::Motor { axis, action } => {
                write!(out, "S{}{}", axis.wire(), action.wire())?
            }
            Command::MotorMove {
                axis,
                direction,
                distance,
                speed,
            } => write!(
                out,
                "S{}{},{},{}",
                axis.wire(),
                direction.bit(),
                distance,
                speed
            )?,
            Command::Projection(on) => write!(out, "P{}", on as u8)?,
            Command::ProjectionCurrent(current) => write!(out, "PC{}", current)?,
        }
        for &byte in LINE_END {
            out.write_char(byte as char)?;
        }
        Ok(())
    }
}

/// `fmt::Write` adapter over a fixed byte slice
struct SliceWriter<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        let end = self.len + bytes.len();
        if end > self.buf.len() {
            return Err(fmt::Error);
        }
        self.buf[self.len..end].copy_from_slice(bytes);
        self.len = end;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(cmd: Command) -> CommandLine {
        cmd.to_line().unwrap()
    }

    #[test]
    fn test_queries() {
        assert_eq!(&encoded(Command::QueryTelemetry)[..], b"$A\r\n");
        assert_eq!(&encoded(Command::QueryHealth)[..], b"$X\r\n");
    }

    #[test]
    fn test_brake() {
        assert_eq!(&encoded(Command::Brake(true))[..], b"$B1\r\n");
        assert_eq!(&encoded(Command::Brake(false))[..], b"$B0\r\n");
    }

    #[test]
    fn test_fan() {
        let cmd = Command::Fan {
            channel: FanChannel::IntakeB,
            duty: 1999,
        };
        assert_eq!(&encoded(cmd)[..], b"$F21999\r\n");

        let cmd = Command::Fan {
            channel: FanChannel::Exhaust,
            duty: 0,
        };
        assert_eq!(&encoded(cmd)[..], b"$F30\r\n");
    }

    #[test]
    fn test_rgb_has_no_leading_zeros() {
        let cmd = Command::Rgb {
            hue: 5,
            saturation: 100,
            value: 0,
        };
        assert_eq!(&encoded(cmd)[..], b"$LA5,100,0\r\n");
    }

    #[test]
    fn test_motor_actions() {
        let cmd = Command::Motor {
            axis: MotorAxis::Z,
            action: MotorAction::Enable,
        };
        assert_eq!(&encoded(cmd)[..], b"$SZE\r\n");

        let cmd = Command::Motor {
            axis: MotorAxis::Cvr2,
            action: MotorAction::Stop,
        };
        assert_eq!(&encoded(cmd)[..], b"$S2P\r\n");

        let cmd = Command::Motor {
            axis: MotorAxis::Cvr1,
            action: MotorAction::Disable,
        };
        assert_eq!(&encoded(cmd)[..], b"$S1D\r\n");
    }

    #[test]
    fn test_motor_move() {
        let cmd = Command::MotorMove {
            axis: MotorAxis::Y,
            direction: Direction::Reverse,
            distance: 100_000,
            speed: 20_000,
        };
        assert_eq!(&encoded(cmd)[..], b"$SY1,100000,20000\r\n");
    }

    #[test]
    fn test_projection() {
        assert_eq!(&encoded(Command::Projection(true))[..], b"$P1\r\n");
        assert_eq!(&encoded(Command::ProjectionCurrent(91))[..], b"$PC91\r\n");
    }

    #[test]
    fn test_buffer_too_small() {
        let mut buffer = [0u8; 4];
        let result = Command::Rgb {
            hue: 360,
            saturation: 100,
            value: 100,
        }
        .encode(&mut buffer);
        assert_eq!(result, Err(EncodeError::BufferTooSmall));
    }

    #[test]
    fn test_direction_flip() {
        assert_eq!(Direction::Forward.flipped(), Direction::Reverse);
        assert_eq!(Direction::Reverse.flipped().bit(), 0);
    }
}

//! Resin Printer Board Diagnostics Protocol
//!
//! This crate defines the line-based ASCII protocol spoken between the VatCheck
//! console and the resin printer main board over UART (115200 8N1).
//!
//! # Protocol Overview
//!
//! Every message is a single line:
//! ```text
//! ┌────────┬──────────────────────────────┬─────────┐
//! │ PREFIX │ BODY                         │ END     │
//! │ '$'    │ command letters / numbers    │ CR LF   │
//! └────────┴──────────────────────────────┴─────────┘
//! ```
//!
//! The console is always the initiator. Actuator commands are fire-and-forget
//! (the board never acknowledges them); only the telemetry query (`$A`) and
//! the sensor-health query (`$X`) produce a reply line made of comma
//! separated, non-negative decimal integers.
//!
//! Replies are decoded positionally. Older board firmware sends fewer fields,
//! so a short reply only updates the fields it covers.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod fixed;
pub mod health;
pub mod line;
pub mod reply;
pub mod telemetry;

pub use command::{Command, CommandLine, Direction, EncodeError, FanChannel, MotorAction, MotorAxis};
pub use fixed::Deci;
pub use health::SensorHealth;
pub use line::{Line, LineReader, MAX_LINE_LEN};
pub use reply::{tokenize, ReplyError, Tokens, MAX_TOKENS};
pub use telemetry::{Coverage, Endstop, Endstops, Gesture, TelemetryFrame};

/// First byte of every request and reply line
pub const LINE_PREFIX: u8 = b'$';

/// Line terminator appended to every request
pub const LINE_END: &[u8] = b"\r\n";

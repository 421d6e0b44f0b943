//! Board-agnostic console logic for the VatCheck board tester
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Capability traits (serial link, clock, renderer)
//! - Rotary encoder and button input decoding
//! - Device link (request/reply transport over the serial link)
//! - Latest telemetry snapshot and actuator setpoints
//! - NTC/IR acceptance tests
//! - Menu state machine and screen handlers
//! - Poll/refresh scheduling and the cooperative console loop
//! - Configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod log;

pub mod acceptance;
pub mod config;
pub mod console;
pub mod controller;
pub mod device;
pub mod input;
pub mod link;
pub mod menu;
pub mod scheduler;
pub mod screen;
pub mod traits;

#[cfg(test)]
mod testing;

pub use console::{Console, ConsoleError};
pub use controller::ControllerState;
pub use screen::Screen;

//! Configuration types
//!
//! Board-agnostic console configuration. The firmware builds a
//! [`ConsoleConfig`] at compile time from `console.toml`.

pub mod types;

pub use types::*;

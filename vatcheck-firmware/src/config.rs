//! Console configuration compiled from console.toml by build.rs

use vatcheck_core::config::{ConsoleConfig, NtcTestConfig, TimingConfig};
use vatcheck_protocol::Deci;

include!(concat!(env!("OUT_DIR"), "/console_config.rs"));

//! Sensor-health reply decoding
//!
//! Reply: `$<ntc_status>,<ir_status>` where `0` means healthy and any other
//! value means the sensor is faulted.

use crate::reply::{tokenize, ReplyError};

/// Tokens a health reply must carry
pub const HEALTH_TOKENS: usize = 2;

/// Health of the two temperature sensors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorHealth {
    /// Plate NTC thermistor is healthy
    pub ntc_ok: bool,
    /// Resin IR sensor is healthy
    pub ir_ok: bool,
}

impl SensorHealth {
    /// Decode from reply tokens; extra tokens are ignored
    pub fn from_tokens(tokens: &[u32]) -> Result<Self, ReplyError> {
        if tokens.len() < HEALTH_TOKENS {
            return Err(ReplyError::Truncated);
        }
        Ok(Self {
            ntc_ok: tokens[0] == 0,
            ir_ok: tokens[1] == 0,
        })
    }

    /// Tokenize and decode a reply line
    pub fn decode_line(line: &[u8]) -> Result<Self, ReplyError> {
        let tokens = tokenize(line)?;
        Self::from_tokens(&tokens)
    }
}

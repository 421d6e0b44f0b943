//! Reply tokenization
//!
//! A reply line is `$` followed by comma separated decimal integers. Parsing
//! follows the board's own tolerant rules: characters other than digits and
//! commas are skipped, empty fields do not produce a token, and anything past
//! [`MAX_TOKENS`] is ignored.

use heapless::Vec;

use crate::LINE_PREFIX;

/// Maximum number of tokens kept from one reply
pub const MAX_TOKENS: usize = 15;

/// Tokens decoded from one reply line
pub type Tokens = Vec<u32, MAX_TOKENS>;

/// Errors that can occur while decoding a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReplyError {
    /// Line does not start with `$`
    MissingPrefix,
    /// Fewer tokens than the reply type needs
    Truncated,
    /// Line outgrew the receive buffer before its terminator
    Overlong,
}

/// Split a reply line into numeric tokens
///
/// The whole line is rejected if its first byte is not `$`.
pub fn tokenize(line: &[u8]) -> Result<Tokens, ReplyError> {
    let payload = match line.split_first() {
        Some((&LINE_PREFIX, rest)) => rest,
        _ => return Err(ReplyError::MissingPrefix),
    };

    let mut tokens = Tokens::new();
    let mut value: u32 = 0;
    let mut in_number = false;

    for &byte in payload {
        match byte {
            b'0'..=b'9' => {
                value = value.wrapping_mul(10).wrapping_add(u32::from(byte - b'0'));
                in_number = true;
            }
            b',' => {
                if in_number {
                    let _ = tokens.push(value);
                }
                value = 0;
                in_number = false;
            }
            b'\r' | b'\n' => break,
            _ => {}
        }
    }

    if in_number {
        let _ = tokens.push(value);
    }

    Ok(tokens)
}

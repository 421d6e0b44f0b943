//! Reply line assembly
//!
//! Bytes arrive one at a time from the UART. The reader keeps printable
//! ASCII, drops everything else, and yields a line when it sees CR or LF.
//! A terminator with nothing buffered (the LF of a CR LF pair) is ignored.
//! A line longer than [`MAX_LINE_LEN`] is discarded whole at its terminator.

use heapless::Vec;

use crate::ReplyError;

/// Maximum number of characters kept from one line
pub const MAX_LINE_LEN: usize = 63;

/// A completed reply line, terminator stripped
pub type Line = Vec<u8, MAX_LINE_LEN>;

/// Incremental line assembler
#[derive(Debug, Clone, Default)]
pub struct LineReader {
    buffer: Line,
    overflow: bool,
}

impl LineReader {
    /// Create a new, empty line reader
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            overflow: false,
        }
    }

    /// Drop any partially received line
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.overflow = false;
    }

    /// True once the current line has outgrown the buffer
    pub fn is_overflowed(&self) -> bool {
        self.overflow
    }

    /// Number of characters buffered so far
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Feed a single byte to the reader
    ///
    /// Returns `Ok(Some(line))` when a terminator closes a non-empty line,
    /// or `Err(ReplyError::Overlong)` when it closes a line that overflowed.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Line>, ReplyError> {
        match byte {
            b'\r' | b'\n' => {
                if self.overflow {
                    self.reset();
                    Err(ReplyError::Overlong)
                } else if self.buffer.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(core::mem::take(&mut self.buffer)))
                }
            }
            0x20..=0x7E => {
                if self.buffer.push(byte).is_err() {
                    self.overflow = true;
                }
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    /// Feed multiple bytes to the reader
    ///
    /// Returns the first complete line found, if any.
    /// Remaining bytes after a complete line are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Line>, ReplyError> {
        for &byte in bytes {
            if let Some(line) = self.feed(byte)? {
                return Ok(Some(line));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_line() {
        let mut reader = LineReader::new();
        let line = reader.feed_bytes(b"$1,2,3,4\r\n").unwrap().unwrap();
        assert_eq!(&line[..], b"$1,2,3,4");
        assert_eq!(reader.pending(), 0);
    }

    #[test]
    fn test_blank_terminators_ignored() {
        let mut reader = LineReader::new();
        assert_eq!(reader.feed(b'\n'), Ok(None));
        assert_eq!(reader.feed(b'\r'), Ok(None));
        let line = reader.feed_bytes(b"$5\n").unwrap().unwrap();
        assert_eq!(&line[..], b"$5");
    }

    #[test]
    fn test_non_printable_dropped() {
        let mut reader = LineReader::new();
        let line = reader
            .feed_bytes(&[b'$', 0x00, b'1', 0xFF, b'2', b'\r'])
            .unwrap()
            .unwrap();
        assert_eq!(&line[..], b"$12");
    }

    #[test]
    fn test_overlong_line_rejected() {
        let mut reader = LineReader::new();
        for _ in 0..100 {
            assert_eq!(reader.feed(b'9'), Ok(None));
        }
        assert!(reader.is_overflowed());
        assert_eq!(reader.feed(b'\r'), Err(ReplyError::Overlong));
        assert!(!reader.is_overflowed());

        // The next line starts clean
        let line = reader.feed_bytes(b"\n$7\r").unwrap().unwrap();
        assert_eq!(&line[..], b"$7");
    }

    #[test]
    fn test_line_at_capacity_accepted() {
        let mut reader = LineReader::new();
        for _ in 0..MAX_LINE_LEN {
            assert_eq!(reader.feed(b'1'), Ok(None));
        }
        let line = reader.feed(b'\n').unwrap().unwrap();
        assert_eq!(line.len(), MAX_LINE_LEN);
    }

    #[test]
    fn test_reset_discards_partial() {
        let mut reader = LineReader::new();
        let _ = reader.feed_bytes(b"$12");
        reader.reset();
        let line = reader.feed_bytes(b"$3\r").unwrap().unwrap();
        assert_eq!(&line[..], b"$3");
    }

    #[test]
    fn test_stops_after_first_line() {
        let mut reader = LineReader::new();
        let line = reader.feed_bytes(b"$1\r\n$2\r\n").unwrap().unwrap();
        assert_eq!(&line[..], b"$1");
    }
}

//! Raw byte link to the printer board

/// Byte-level serial link
///
/// Implementations must never block in `read_byte`: an empty receive
/// buffer is reported as `Ok(None)`.
pub trait SerialLink {
    /// Transport error type
    type Error;

    /// Write all bytes, blocking until they are queued
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Take the next received byte, if one is available
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error>;
}

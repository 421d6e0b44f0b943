//! Serial link to the printer board over a buffered UART

use embedded_io::{Read, ReadReady, Write};
use vatcheck_core::traits::SerialLink;

/// [`SerialLink`] over any blocking `embedded-io` UART
pub struct UartLink<U> {
    uart: U,
}

impl<U> UartLink<U>
where
    U: Read + ReadReady + Write,
{
    pub fn new(uart: U) -> Self {
        Self { uart }
    }
}

impl<U> SerialLink for UartLink<U>
where
    U: Read + ReadReady + Write,
{
    type Error = U::Error;

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), U::Error> {
        Write::write_all(&mut self.uart, bytes)?;
        self.uart.flush()
    }

    fn read_byte(&mut self) -> Result<Option<u8>, U::Error> {
        if !self.uart.read_ready()? {
            return Ok(None);
        }
        let mut byte = [0u8; 1];
        match self.uart.read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }
}

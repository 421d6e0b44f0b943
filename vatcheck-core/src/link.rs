//! Request/reply transport to the printer board
//!
//! Actuator commands are written and forgotten. Queries discard whatever is
//! left in the receive buffer, write the request, wait a short grace period
//! and then poll for one reply line until the timeout expires. Nothing is
//! retried.

use vatcheck_protocol::command::MAX_COMMAND_LEN;
use vatcheck_protocol::{
    Command, Coverage, EncodeError, Line, LineReader, ReplyError, SensorHealth,
};

use crate::config::TimingConfig;
use crate::device::DeviceState;
use crate::traits::{Clock, SerialLink};

/// Upper bound on bytes discarded before a query
const MAX_DRAIN_BYTES: usize = 256;

/// Poll interval while waiting for reply bytes (ms)
const REPLY_POLL_MS: u32 = 1;

/// Errors from a link operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// No complete reply line before the timeout
    Timeout,
    /// Reply line was malformed or too short
    Reply(ReplyError),
    /// Command did not fit the encode buffer
    Encode(EncodeError),
    /// The serial link reported an I/O error
    Transport,
}

impl From<ReplyError> for LinkError {
    fn from(e: ReplyError) -> Self {
        LinkError::Reply(e)
    }
}

impl From<EncodeError> for LinkError {
    fn from(e: EncodeError) -> Self {
        LinkError::Encode(e)
    }
}

/// Serial link plus clock, speaking the board protocol
pub struct DeviceLink<L, C> {
    serial: L,
    clock: C,
    reader: LineReader,
    grace_ms: u32,
    timeout_ms: u32,
}

impl<L, C> DeviceLink<L, C>
where
    L: SerialLink,
    C: Clock,
{
    /// Create a link with the reply timing from `timing`
    pub fn new(serial: L, clock: C, timing: &TimingConfig) -> Self {
        Self {
            serial,
            clock,
            reader: LineReader::new(),
            grace_ms: timing.reply_grace_ms,
            timeout_ms: timing.reply_timeout_ms,
        }
    }

    pub fn serial(&self) -> &L {
        &self.serial
    }

    pub fn serial_mut(&mut self) -> &mut L {
        &mut self.serial
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Write one command
    pub fn send(&mut self, command: &Command) -> Result<(), LinkError> {
        let mut buffer = [0u8; MAX_COMMAND_LEN];
        let len = command.encode(&mut buffer)?;
        self.serial
            .write_all(&buffer[..len])
            .map_err(|_| LinkError::Transport)?;
        log_debug!("sent {}", command);
        Ok(())
    }

    /// Send a query and wait for its reply line
    ///
    /// The timeout bounds the whole wait, including time spent reading
    /// bytes that never form a line. A line that outgrows the reader is
    /// rejected as soon as it overflows.
    pub fn query(&mut self, command: &Command) -> Result<Line, LinkError> {
        self.drain()?;
        self.send(command)?;
        self.clock.delay_ms(self.grace_ms);

        let start = self.clock.now_ms();
        loop {
            if self.clock.elapsed_ms(start) >= self.timeout_ms {
                log_debug!("reply timeout, {} bytes pending", self.reader.pending());
                self.reader.reset();
                return Err(LinkError::Timeout);
            }

            match self.serial.read_byte().map_err(|_| LinkError::Transport)? {
                Some(byte) => {
                    if let Some(line) = self.reader.feed(byte)? {
                        return Ok(line);
                    }
                    if self.reader.is_overflowed() {
                        log_debug!("reply overlong, discarded");
                        self.reader.reset();
                        return Err(LinkError::Reply(ReplyError::Overlong));
                    }
                }
                None => self.clock.delay_ms(REPLY_POLL_MS),
            }
        }
    }

    /// Query telemetry and apply it to `device`
    pub fn query_telemetry(&mut self, device: &mut DeviceState) -> Result<Coverage, LinkError> {
        let line = self.query(&Command::QueryTelemetry)?;
        let now = self.clock.now_ms();
        let coverage = device.apply_line(&line, now)?;
        log_debug!("telemetry {}", device.frame);
        Ok(coverage)
    }

    /// Query sensor health
    pub fn query_health(&mut self) -> Result<SensorHealth, LinkError> {
        let line = self.query(&Command::QueryHealth)?;
        let health = SensorHealth::decode_line(&line)?;
        log_debug!("health {}", health);
        Ok(health)
    }

    /// Drop leftovers from earlier replies
    fn drain(&mut self) -> Result<(), LinkError> {
        self.reader.reset();
        for _ in 0..MAX_DRAIN_BYTES {
            match self.serial.read_byte().map_err(|_| LinkError::Transport)? {
                Some(_) => {}
                None => break,
            }
        }
        Ok(())
    }
}

//! Host-side test doubles for the capability traits

use std::collections::VecDeque;
use std::string::String;
use std::vec::Vec;

use crate::screen::Screen;
use crate::traits::{Clock, Renderer, SerialLink};

/// Scripted serial link
///
/// Writing `$A` or `$X` queues the next scripted telemetry or health reply
/// into the receive buffer. Unscripted queries get no reply.
#[derive(Debug, Default)]
pub struct MockLink {
    rx: VecDeque<u8>,
    written: Vec<u8>,
    telemetry: VecDeque<Vec<u8>>,
    health: VecDeque<Vec<u8>>,
    fail_writes: bool,
}

impl MockLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes already waiting before the next request
    pub fn preload(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    pub fn reply_telemetry(&mut self, reply: &[u8]) {
        self.telemetry.push_back(reply.to_vec());
    }

    pub fn reply_health(&mut self, reply: &[u8]) {
        self.health.push_back(reply.to_vec());
    }

    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Written requests without terminators
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.written)
            .split("\r\n")
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect()
    }

    /// Written requests other than telemetry polls
    pub fn commands(&self) -> Vec<String> {
        self.lines().into_iter().filter(|line| line != "$A").collect()
    }

    pub fn clear_written(&mut self) {
        self.written.clear();
    }
}

impl SerialLink for MockLink {
    type Error = ();

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), ()> {
        if self.fail_writes {
            return Err(());
        }
        self.written.extend_from_slice(bytes);

        let reply = match bytes {
            b"$A\r\n" => self.telemetry.pop_front(),
            b"$X\r\n" => self.health.pop_front(),
            _ => None,
        };
        if let Some(reply) = reply {
            self.rx.extend(reply);
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Result<Option<u8>, ()> {
        Ok(self.rx.pop_front())
    }
}

/// Clock that only moves when told to or when delayed
#[derive(Debug, Clone, Copy)]
pub struct MockClock {
    now: u32,
}

impl MockClock {
    pub fn new(now: u32) -> Self {
        Self { now }
    }

    pub fn advance(&mut self, ms: u32) {
        self.now = self.now.wrapping_add(ms);
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u32 {
        self.now
    }

    fn delay_ms(&mut self, ms: u32) {
        self.advance(ms);
    }
}

/// Renderer that keeps the last frame
#[derive(Debug, Default)]
pub struct MockRenderer {
    pub frames: usize,
    pub last: Option<Screen>,
    pub fail: bool,
}

impl Renderer for MockRenderer {
    type Error = ();

    fn render(&mut self, screen: &Screen) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.frames += 1;
        self.last = Some(screen.clone());
        Ok(())
    }
}

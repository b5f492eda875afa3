#![allow(dead_code)]

use std::collections::VecDeque;
use std::convert::Infallible;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;
use rn2483::transport::{Line, Transport};

pub const APP_EUI: &str = "70b3d57ed0000000";
pub const APP_KEY: &str = "00112233445566778899aabbccddeeff";
pub const DEV_EUI: &str = "0004a30b00112233";
pub const HW_EUI: &str = "0004A30B001A2B3C";
pub const BANNER: &str = "RN2483 1.0.5 Oct 31 2018 15:06:52";

/// Mock transport error
#[derive(Debug, Clone, PartialEq)]
pub struct MockError;

/// Scripted module: every written command must match the next expectation,
/// whose replies then become readable. Reading with nothing pending times out.
pub struct MockTransport {
    script: VecDeque<(String, Vec<String>)>,
    pending: VecDeque<String>,
    written: Vec<String>,
    read_timeouts: Vec<u32>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
            pending: VecDeque::new(),
            written: Vec::new(),
            read_timeouts: Vec::new(),
        }
    }

    /// Lines printed by the module after a reset
    pub fn with_banner(mut self, banner: &str) -> Self {
        self.pending.push_back(banner.to_string());
        self
    }

    /// Expect `command` and answer it with `replies`
    pub fn expect(mut self, command: &str, replies: &[&str]) -> Self {
        self.script.push_back((
            command.to_string(),
            replies.iter().map(|reply| reply.to_string()).collect(),
        ));
        self
    }

    /// Expect the full parameter sequence sent before a join
    pub fn expect_configuration(self, dev_eui: &str) -> Self {
        self.expect("mac reset 868", &["ok"])
            .expect(&format!("mac set appeui {}", APP_EUI), &["ok"])
            .expect(&format!("mac set appkey {}", APP_KEY), &["ok"])
            .expect(&format!("mac set deveui {}", dev_eui), &["ok"])
            .expect("mac set pwridx 1", &["ok"])
            .expect("mac set adr off", &["ok"])
            .expect("mac set rx2 3 869525000", &["ok"])
            .expect("mac set retx 5", &["ok"])
            .expect("mac set ar off", &["ok"])
            .expect("mac get ar", &["off"])
            .expect("mac save", &["ok"])
    }

    /// Every command written so far
    pub fn written(&self) -> &[String] {
        &self.written
    }

    /// How many times `command` was written
    pub fn count(&self, command: &str) -> usize {
        self.written.iter().filter(|line| *line == command).count()
    }

    /// Timeouts passed to each read
    pub fn read_timeouts(&self) -> &[u32] {
        &self.read_timeouts
    }

    /// Whether every expectation was consumed
    pub fn is_exhausted(&self) -> bool {
        self.script.is_empty()
    }
}

impl Transport for MockTransport {
    type Error = MockError;

    fn write_line(&mut self, line: &str) -> Result<(), Self::Error> {
        self.written.push(line.to_string());
        let (expected, replies) = self
            .script
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted command: {}", line));
        assert_eq!(line, expected, "unexpected command");
        self.pending.extend(replies);
        Ok(())
    }

    fn read_line(&mut self, timeout_ms: u32) -> Result<Option<Line>, Self::Error> {
        self.read_timeouts.push(timeout_ms);
        Ok(self.pending.pop_front().map(|reply| {
            let mut line = Line::new();
            line.push_str(&reply).unwrap();
            line
        }))
    }
}

/// Delay recording every wait
pub struct MockDelay {
    pub waits: Vec<u32>,
}

impl MockDelay {
    pub fn new() -> Self {
        Self { waits: Vec::new() }
    }
}

impl DelayMs<u32> for MockDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.waits.push(ms);
    }
}

/// Reset pin recording every level
pub struct MockPin {
    pub levels: Vec<bool>,
}

impl MockPin {
    pub fn new() -> Self {
        Self { levels: Vec::new() }
    }
}

impl OutputPin for MockPin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.levels.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.levels.push(true);
        Ok(())
    }
}

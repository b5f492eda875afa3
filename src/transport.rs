//! Line-oriented serial transport
//!
//! The module speaks CR/LF terminated ASCII lines at 57600 baud. [`Transport`]
//! is the seam the rest of the crate is written against; [`SerialLink`] is the
//! implementation on top of `embedded-hal` serial traits.

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::serial;
use heapless::String;

/// Longest line exchanged with the module
///
/// Fits `mac tx` with a 222 byte payload and `mac_rx` with a 230 byte payload.
pub const LINE_CAPACITY: usize = 512;

/// One protocol line, terminator stripped
pub type Line = String<LINE_CAPACITY>;

/// Baud rate of the module's UART
pub const BAUD_RATE: u32 = 57_600;

/// Interval between serial polls while waiting for a line
const POLL_TICK_US: u32 = 100;
const TICKS_PER_MS: u32 = 1_000 / POLL_TICK_US;

/// Line transport to the module
pub trait Transport {
    /// Transport error type
    type Error;

    /// Write `line` followed by CR/LF
    fn write_line(&mut self, line: &str) -> Result<(), Self::Error>;

    /// Read one complete line, waiting at most `timeout_ms`
    ///
    /// Returns `Ok(None)` on timeout. Partial lines are never returned.
    fn read_line(&mut self, timeout_ms: u32) -> Result<Option<Line>, Self::Error>;
}

/// [`SerialLink`] error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<R, W> {
    /// Serial read error
    Read(R),
    /// Serial write error
    Write(W),
    /// Incoming line longer than [`LINE_CAPACITY`]
    Overflow,
}

/// [`Transport`] over an `embedded-hal` serial port
///
/// Waits are counted in poll ticks of the supplied delay, so no clock is
/// needed. Bytes of an unfinished line survive a timeout and are completed by
/// the next read.
pub struct SerialLink<S, D> {
    serial: S,
    delay: D,
    pending: Line,
}

impl<S, D> SerialLink<S, D>
where
    S: serial::Read<u8> + serial::Write<u8>,
    D: DelayUs<u32>,
{
    /// Wrap a serial port configured for [`BAUD_RATE`]
    pub fn new(serial: S, delay: D) -> Self {
        Self {
            serial,
            delay,
            pending: String::new(),
        }
    }

    /// Give back the serial port and delay
    pub fn release(self) -> (S, D) {
        (self.serial, self.delay)
    }

    /// Access the serial port
    pub fn serial_mut(&mut self) -> &mut S {
        &mut self.serial
    }
}

impl<S, D> Transport for SerialLink<S, D>
where
    S: serial::Read<u8> + serial::Write<u8>,
    D: DelayUs<u32>,
{
    type Error = LinkError<<S as serial::Read<u8>>::Error, <S as serial::Write<u8>>::Error>;

    fn write_line(&mut self, line: &str) -> Result<(), Self::Error> {
        for byte in line.bytes().chain(*b"\r\n") {
            nb::block!(self.serial.write(byte)).map_err(LinkError::Write)?;
        }
        nb::block!(self.serial.flush()).map_err(LinkError::Write)
    }

    fn read_line(&mut self, timeout_ms: u32) -> Result<Option<Line>, Self::Error> {
        let budget = timeout_ms.saturating_mul(TICKS_PER_MS);
        let mut waited = 0;

        loop {
            match self.serial.read() {
                Ok(b'\n') if !self.pending.is_empty() => {
                    return Ok(Some(core::mem::take(&mut self.pending)));
                }
                // Blank lines and stray CRs
                Ok(b'\n') | Ok(b'\r') => {}
                Ok(byte) if byte.is_ascii() => {
                    if self.pending.push(char::from(byte)).is_err() {
                        self.pending.clear();
                        return Err(LinkError::Overflow);
                    }
                }
                // Line noise, e.g. around the reset pulse
                Ok(_) => {}
                Err(nb::Error::WouldBlock) => {
                    if waited >= budget {
                        return Ok(None);
                    }
                    self.delay.delay_us(POLL_TICK_US);
                    waited += 1;
                }
                Err(nb::Error::Other(e)) => return Err(LinkError::Read(e)),
            }
        }
    }
}

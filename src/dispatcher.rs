//! Single command/response exchange with the module
//!
//! The dispatcher owns the transport, so a command and its response can never
//! interleave with another caller's. Protocol outcomes, timeouts included, come
//! back as [`ResponseOutcome`] data; only transport faults are errors here.

use core::fmt::{self, Write};

use heapless::String;

use crate::error::Error;
use crate::response::{classify, ResponseOutcome};
use crate::transport::{Line, Transport};

/// Timeout for ordinary get/set acknowledgements
pub const DEFAULT_TIMEOUT_MS: u32 = 2_000;

/// Timeout for join and transmit completion events
pub const EXTENDED_TIMEOUT_MS: u32 = 30_000;

/// Command dispatcher
pub struct Dispatcher<T: Transport> {
    transport: T,
}

impl<T: Transport> Dispatcher<T> {
    /// Create a dispatcher owning `transport`
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Give back the transport
    pub fn release(self) -> T {
        self.transport
    }

    /// Access the transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Send a command and classify its response
    pub fn send(
        &mut self,
        command: fmt::Arguments<'_>,
        timeout_ms: u32,
    ) -> Result<ResponseOutcome, Error<T::Error>> {
        self.write(command)?;
        self.read(timeout_ms)
    }

    /// Send a command and drain its response line unread
    pub fn send_discarding(
        &mut self,
        command: fmt::Arguments<'_>,
        timeout_ms: u32,
    ) -> Result<(), Error<T::Error>> {
        self.write(command)?;
        self.transport
            .read_line(timeout_ms)
            .map_err(Error::Transport)?;
        Ok(())
    }

    /// Read and classify one more line
    pub fn read(&mut self, timeout_ms: u32) -> Result<ResponseOutcome, Error<T::Error>> {
        let outcome = match self
            .transport
            .read_line(timeout_ms)
            .map_err(Error::Transport)?
        {
            Some(line) => {
                trace!("< {}", line.as_str());
                classify(&line)
            }
            None => {
                trace!("< timeout after {} ms", timeout_ms);
                ResponseOutcome::Timeout
            }
        };
        Ok(outcome)
    }

    /// Send a set-style command that must be answered with `ok`
    pub fn expect_ok(&mut self, command: fmt::Arguments<'_>) -> Result<(), Error<T::Error>> {
        match self.send(command, DEFAULT_TIMEOUT_MS)? {
            ResponseOutcome::Acknowledged => Ok(()),
            ResponseOutcome::Timeout => Err(Error::CommunicationTimeout),
            other => Err(Error::ProtocolError(other.kind())),
        }
    }

    /// Send a get-style command and return its bare value
    pub fn query(&mut self, command: fmt::Arguments<'_>) -> Result<Line, Error<T::Error>> {
        match self.send(command, DEFAULT_TIMEOUT_MS)? {
            ResponseOutcome::RawLine(value) => Ok(value),
            ResponseOutcome::Timeout => Err(Error::CommunicationTimeout),
            other => Err(Error::ProtocolError(other.kind())),
        }
    }

    fn write(&mut self, command: fmt::Arguments<'_>) -> Result<(), Error<T::Error>> {
        let mut line: Line = String::new();
        line.write_fmt(command)
            .map_err(|_| Error::CommandOverflow)?;
        debug!("> {}", line.as_str());
        self.transport.write_line(&line).map_err(Error::Transport)
    }
}

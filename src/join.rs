//! OTAA join state machine
//!
//! `Reset -> Configuring -> Joining -> {Accepted | Denied | Exhausted}`
//!
//! Timeouts and unexpected replies during `Joining` are retried after a fixed
//! backoff, up to [`JOIN_ATTEMPTS`]. An explicit `denied` ends the procedure
//! immediately.

use embedded_hal::blocking::delay::DelayMs;

use crate::config::{BACKOFF_MS, JOIN_ATTEMPTS};
use crate::device::{ConnectionState, Rn2483};
use crate::dispatcher::{DEFAULT_TIMEOUT_MS, EXTENDED_TIMEOUT_MS};
use crate::error::Error;
use crate::response::ResponseOutcome;
use crate::transport::Transport;

/// Join procedure states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JoinState {
    /// `mac reset` for the configured band
    Reset,
    /// Writing parameters to the module
    Configuring,
    /// Sending `mac join otaa`, 1-based attempt number
    Joining(u8),
    /// Network accepted the join
    Accepted,
    /// Network rejected the join
    Denied,
    /// No attempt succeeded
    Exhausted,
}

/// Terminal result of a join procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JoinOutcome {
    /// `accepted`
    Accepted,
    /// `denied`
    Denied,
    /// Attempts ran out without a denial
    Exhausted,
}

impl JoinOutcome {
    /// Whether the module joined
    pub fn is_accepted(&self) -> bool {
        *self == JoinOutcome::Accepted
    }

    /// Turn a failed join into an error
    pub fn ensure_accepted<E>(self) -> Result<(), Error<E>> {
        match self {
            JoinOutcome::Accepted => Ok(()),
            JoinOutcome::Denied => Err(Error::JoinDenied),
            JoinOutcome::Exhausted => Err(Error::JoinExhausted),
        }
    }
}

impl<T, D> Rn2483<T, D>
where
    T: Transport,
    D: DelayMs<u32>,
{
    /// Join the network, returning whether it was accepted
    pub fn join(&mut self) -> Result<bool, Error<T::Error>> {
        Ok(self.join_outcome()?.is_accepted())
    }

    /// Run the join procedure to its terminal state
    ///
    /// The device EUI falls back to the hardware EUI when none was configured.
    /// Configuration failures abort the procedure.
    pub fn join_outcome(&mut self) -> Result<JoinOutcome, Error<T::Error>> {
        if !self.config.has_credentials() {
            return Err(Error::MissingCredentials);
        }
        if self.config.dev_eui().is_none() {
            let eui = self.hardware_eui()?;
            self.config.adopt_dev_eui(eui);
        }

        let mut state = JoinState::Reset;
        loop {
            state = match state {
                JoinState::Reset => {
                    let band = self.config.band();
                    self.dispatcher
                        .send_discarding(format_args!("mac reset {}", band), DEFAULT_TIMEOUT_MS)?;
                    JoinState::Configuring
                }
                JoinState::Configuring => {
                    self.config.apply(&mut self.dispatcher)?;
                    // The reset above dropped any previous network session
                    self.state = ConnectionState::Configured;
                    JoinState::Joining(1)
                }
                JoinState::Joining(attempt) => {
                    info!("join attempt {}", attempt);
                    match self.join_attempt()? {
                        ResponseOutcome::JoinAccepted => JoinState::Accepted,
                        ResponseOutcome::JoinDenied => JoinState::Denied,
                        other => {
                            warn!("join attempt {} failed: {}", attempt, other.kind());
                            if attempt >= JOIN_ATTEMPTS {
                                JoinState::Exhausted
                            } else {
                                self.delay.delay_ms(BACKOFF_MS);
                                JoinState::Joining(attempt + 1)
                            }
                        }
                    }
                }
                JoinState::Accepted => {
                    info!("joined");
                    self.state = ConnectionState::Joined;
                    return Ok(JoinOutcome::Accepted);
                }
                JoinState::Denied => {
                    warn!("join denied");
                    return Ok(JoinOutcome::Denied);
                }
                JoinState::Exhausted => {
                    warn!("join attempts exhausted");
                    return Ok(JoinOutcome::Exhausted);
                }
            };
        }
    }

    /// One `mac join otaa`: command acknowledgement, then the join result
    fn join_attempt(&mut self) -> Result<ResponseOutcome, Error<T::Error>> {
        match self
            .dispatcher
            .send(format_args!("mac join otaa"), DEFAULT_TIMEOUT_MS)?
        {
            ResponseOutcome::Acknowledged => self.dispatcher.read(EXTENDED_TIMEOUT_MS),
            other => Ok(other),
        }
    }
}

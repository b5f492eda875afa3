//! Uplink transmission
//!
//! A transmission is two-phase: `mac tx` is first acknowledged with `ok` (or
//! rejected, or answered with `busy`), then completes with `mac_tx_ok` or a
//! `mac_rx` downlink. Only `busy` is retried.

use core::fmt;

use embedded_hal::blocking::delay::DelayMs;
use heapless::Vec;

use crate::config::{BACKOFF_MS, MAX_DOWNLINK_PAYLOAD, MAX_UPLINK_PAYLOAD, TRANSMIT_ATTEMPTS, UPLINK_PORT};
use crate::device::Rn2483;
use crate::dispatcher::{DEFAULT_TIMEOUT_MS, EXTENDED_TIMEOUT_MS};
use crate::error::Error;
use crate::hex::{self, Hex, Payload};
use crate::response::ResponseOutcome;
use crate::transport::Transport;

/// Uplink acknowledgement mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Confirmation {
    /// `uncnf`
    Unconfirmed,
    /// `cnf`, acknowledged by the network
    Confirmed,
}

impl fmt::Display for Confirmation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confirmation::Unconfirmed => f.write_str("uncnf"),
            Confirmation::Confirmed => f.write_str("cnf"),
        }
    }
}

/// Downlink delivered in the receive windows after an uplink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Downlink {
    /// Downlink port
    pub port: u8,
    /// Decoded payload
    pub payload: Vec<u8, MAX_DOWNLINK_PAYLOAD>,
}

/// Successful uplink
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transmission {
    /// Sent, no downlink
    Sent,
    /// Sent, and the network answered with a downlink
    Received(Downlink),
}

impl Transmission {
    /// Downlink, if any
    pub fn downlink(&self) -> Option<&Downlink> {
        match self {
            Transmission::Sent => None,
            Transmission::Received(downlink) => Some(downlink),
        }
    }
}

impl<T, D> Rn2483<T, D>
where
    T: Transport,
    D: DelayMs<u32>,
{
    /// Send an unconfirmed uplink on port 1
    pub fn transmit_unconfirmed<'a>(
        &mut self,
        payload: impl Into<Payload<'a>>,
    ) -> Result<Transmission, Error<T::Error>> {
        self.transmit(Confirmation::Unconfirmed, payload.into())
    }

    /// Send a confirmed uplink on port 1
    pub fn transmit_confirmed<'a>(
        &mut self,
        payload: impl Into<Payload<'a>>,
    ) -> Result<Transmission, Error<T::Error>> {
        self.transmit(Confirmation::Confirmed, payload.into())
    }

    /// Send an uplink, retrying while the module is busy
    pub fn transmit(
        &mut self,
        confirmation: Confirmation,
        payload: Payload<'_>,
    ) -> Result<Transmission, Error<T::Error>> {
        let bytes = payload.as_bytes();
        if bytes.len() > MAX_UPLINK_PAYLOAD {
            return Err(Error::PayloadTooLarge(bytes.len()));
        }

        for attempt in 1..=TRANSMIT_ATTEMPTS {
            let outcome = self.dispatcher.send(
                format_args!("mac tx {} {} {}", confirmation, UPLINK_PORT, Hex(bytes)),
                DEFAULT_TIMEOUT_MS,
            )?;
            match outcome {
                ResponseOutcome::Acknowledged => return self.complete_transmission(),
                ResponseOutcome::Busy => {
                    debug!("module busy, attempt {}", attempt);
                    if attempt < TRANSMIT_ATTEMPTS {
                        self.delay.delay_ms(BACKOFF_MS);
                    }
                }
                other => return Err(Error::TransmitFailure(Some(other.kind()))),
            }
        }

        warn!("transmit attempts exhausted");
        Err(Error::TransmitFailure(None))
    }

    fn complete_transmission(&mut self) -> Result<Transmission, Error<T::Error>> {
        match self.dispatcher.read(EXTENDED_TIMEOUT_MS)? {
            ResponseOutcome::TransmitOk => {
                info!("uplink sent");
                Ok(Transmission::Sent)
            }
            ResponseOutcome::MacReceived { port, payload } => {
                let payload = hex::decode(&payload)?;
                info!("uplink sent, downlink on port {}", port);
                Ok(Transmission::Received(Downlink { port, payload }))
            }
            other => Err(Error::TransmitFailure(Some(other.kind()))),
        }
    }
}

//! Protocol engine for the Microchip RN2483 LoRaWAN module
//!
//! The RN2483 runs its own LoRaWAN stack and is driven over a UART with a
//! line-oriented text protocol. This crate turns that byte stream into a typed
//! command/response engine:
//! - Bounded-time command dispatch with classified responses
//! - OTAA join state machine with retry and backoff
//! - Confirmed and unconfirmed uplinks with busy-retry and downlink decoding
//! - Scoped `mac pause` bracket for direct radio queries (SNR, power)
//! - Hardware abstraction through `embedded-hal` serial, GPIO and delay traits
//!
//! # Example
//! ```no_run
//! use rn2483::{
//!     config::Identity,
//!     device::Rn2483,
//!     hex::Payload,
//!     transport::SerialLink,
//! };
//!
//! # fn run<S, DU, DM, RST>(serial: S, poll: DU, delay: DM, mut reset: RST)
//! # where
//! #     S: embedded_hal::serial::Read<u8> + embedded_hal::serial::Write<u8>,
//! #     DU: embedded_hal::blocking::delay::DelayUs<u32>,
//! #     DM: embedded_hal::blocking::delay::DelayMs<u32>,
//! #     RST: embedded_hal::digital::v2::OutputPin,
//! # {
//! let link = SerialLink::new(serial, poll);
//! let mut module = Rn2483::new(link, delay);
//!
//! let identity = Identity::new("70b3d57ed0000000", "00112233445566778899aabbccddeeff");
//! if let Ok(true) = module.init(&mut reset, Some(identity), true) {
//!     let _ = module.transmit_unconfirmed(Payload::Text("TTN"));
//! }
//! # }
//! ```

#![warn(missing_docs)]
#![no_std]

#[cfg(feature = "std")]
extern crate std;

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

/// Device identity, radio configuration and timing constants
pub mod config;

/// Single command/response exchange with the module
pub mod dispatcher;

/// Caller-owned module session
pub mod device;

/// Error types
pub mod error;

/// Hex payload codec
pub mod hex;

/// OTAA join state machine
pub mod join;

/// Scoped MAC pause bracket for radio queries
pub mod pause;

/// Response line classification
pub mod response;

/// Uplink transmission
pub mod transmit;

/// Line-oriented serial transport
pub mod transport;

pub use device::Rn2483;
pub use error::Error;

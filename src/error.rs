//! Error taxonomy for module operations
//!
//! Transient conditions (`Timeout`, `Busy`) never show up here unless a retry
//! budget ran out; they are handled as [`ResponseOutcome`] data by the join and
//! transmit state machines. Everything else surfaces as a distinct variant so
//! callers can decide whether to abort, log or retry.
//!
//! [`ResponseOutcome`]: crate::response::ResponseOutcome

use core::fmt;

use crate::hex::HexError;
use crate::response::ResponseKind;

/// Module operation error, generic over the transport error `E`
#[derive(Debug, Clone, PartialEq)]
pub enum Error<E> {
    /// Transport I/O failure
    Transport(E),
    /// Reset pin could not be driven
    Gpio,
    /// Command line does not fit the line buffer
    CommandOverflow,
    /// No response within the bounded read
    CommunicationTimeout,
    /// Unexpected token where a specific acknowledgement was required
    ProtocolError(ResponseKind),
    /// Read-back of a setting disagrees with the requested value
    ConfigurationMismatch,
    /// Network explicitly rejected the join request
    JoinDenied,
    /// All join attempts failed without an explicit denial
    JoinExhausted,
    /// `mac pause` granted a zero-length window
    RadioUnavailable,
    /// Transmit completion failed; `None` when the attempt budget ran out
    TransmitFailure(Option<ResponseKind>),
    /// Uplink payload longer than the module accepts
    PayloadTooLarge(usize),
    /// Hex decode failure, usually a desynchronised line
    MalformedEncoding(HexError),
    /// Join requested before app EUI and app key were configured
    MissingCredentials,
}

impl<E> From<HexError> for Error<E> {
    fn from(error: HexError) -> Self {
        Error::MalformedEncoding(error)
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(e) => write!(f, "transport error: {:?}", e),
            Error::Gpio => write!(f, "reset pin error"),
            Error::CommandOverflow => write!(f, "command exceeds line capacity"),
            Error::CommunicationTimeout => write!(f, "no response from module"),
            Error::ProtocolError(kind) => write!(f, "unexpected response: {:?}", kind),
            Error::ConfigurationMismatch => write!(f, "setting read-back mismatch"),
            Error::JoinDenied => write!(f, "join denied by network"),
            Error::JoinExhausted => write!(f, "join attempts exhausted"),
            Error::RadioUnavailable => write!(f, "mac pause window unavailable"),
            Error::TransmitFailure(Some(kind)) => write!(f, "transmit failed: {:?}", kind),
            Error::TransmitFailure(None) => write!(f, "transmit attempts exhausted"),
            Error::PayloadTooLarge(len) => write!(f, "payload of {} bytes too large", len),
            Error::MalformedEncoding(e) => write!(f, "malformed hex: {}", e),
            Error::MissingCredentials => write!(f, "app EUI and app key not configured"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for Error<E> {}

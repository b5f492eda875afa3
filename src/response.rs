//! Response line classification
//!
//! Every line read from the module goes through [`classify`] exactly once before
//! any decision is made on it.

use heapless::String;

use crate::transport::{Line, LINE_CAPACITY};

/// Firmware error replies
const ERROR_TOKENS: [&str; 11] = [
    "invalid_param",
    "not_joined",
    "no_free_ch",
    "silent",
    "frame_counter_err_rejoin_needed",
    "mac_paused",
    "invalid_data_len",
    "keys_not_init",
    "mac_err",
    "radio_err",
    "err",
];

/// Classified response to a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// `ok`
    Acknowledged,
    /// No line within the bounded read
    Timeout,
    /// `busy`
    Busy,
    /// `mac_tx_ok` or `radio_tx_ok`
    TransmitOk,
    /// Firmware error token or malformed event
    Error(Line),
    /// `accepted`
    JoinAccepted,
    /// `denied`
    JoinDenied,
    /// `mac_rx <port> <hex>`
    MacReceived {
        /// Downlink port
        port: u8,
        /// Hex-encoded downlink payload
        payload: Line,
    },
    /// Any other line, typically the value of a `get` command
    RawLine(Line),
}

/// Variant of a [`ResponseOutcome`] without its data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResponseKind {
    /// `ok`
    Acknowledged,
    /// No line
    Timeout,
    /// `busy`
    Busy,
    /// `mac_tx_ok` or `radio_tx_ok`
    TransmitOk,
    /// Firmware error token
    Error,
    /// `accepted`
    JoinAccepted,
    /// `denied`
    JoinDenied,
    /// `mac_rx`
    MacReceived,
    /// Bare value
    RawLine,
}

impl ResponseOutcome {
    /// Data-less variant, for error reporting
    pub fn kind(&self) -> ResponseKind {
        match self {
            ResponseOutcome::Acknowledged => ResponseKind::Acknowledged,
            ResponseOutcome::Timeout => ResponseKind::Timeout,
            ResponseOutcome::Busy => ResponseKind::Busy,
            ResponseOutcome::TransmitOk => ResponseKind::TransmitOk,
            ResponseOutcome::Error(_) => ResponseKind::Error,
            ResponseOutcome::JoinAccepted => ResponseKind::JoinAccepted,
            ResponseOutcome::JoinDenied => ResponseKind::JoinDenied,
            ResponseOutcome::MacReceived { .. } => ResponseKind::MacReceived,
            ResponseOutcome::RawLine(_) => ResponseKind::RawLine,
        }
    }
}

/// Classify one response line
///
/// Total: never fails. Lines longer than [`LINE_CAPACITY`] are truncated in
/// the returned value.
pub fn classify(line: &str) -> ResponseOutcome {
    match line {
        "ok" => return ResponseOutcome::Acknowledged,
        "busy" => return ResponseOutcome::Busy,
        "mac_tx_ok" | "radio_tx_ok" => return ResponseOutcome::TransmitOk,
        _ => {}
    }

    if line.starts_with("accepted") {
        ResponseOutcome::JoinAccepted
    } else if line.starts_with("denied") {
        ResponseOutcome::JoinDenied
    } else if let Some(event) = line.strip_prefix("mac_rx ") {
        mac_rx(event).unwrap_or_else(|| ResponseOutcome::Error(to_line(line)))
    } else if ERROR_TOKENS.contains(&line) {
        ResponseOutcome::Error(to_line(line))
    } else {
        ResponseOutcome::RawLine(to_line(line))
    }
}

fn mac_rx(event: &str) -> Option<ResponseOutcome> {
    let (port, payload) = match event.split_once(' ') {
        Some((port, payload)) => (port, payload),
        None => (event, ""),
    };
    Some(ResponseOutcome::MacReceived {
        port: port.parse().ok()?,
        payload: to_line(payload),
    })
}

fn to_line(text: &str) -> Line {
    let mut end = text.len().min(LINE_CAPACITY);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let mut line = String::new();
    // Cannot fail, `end` is within capacity
    let _ = line.push_str(&text[..end]);
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str) -> Line {
        to_line(text)
    }

    #[test]
    fn test_literal_tokens() {
        assert_eq!(classify("ok"), ResponseOutcome::Acknowledged);
        assert_eq!(classify("busy"), ResponseOutcome::Busy);
        assert_eq!(classify("mac_tx_ok"), ResponseOutcome::TransmitOk);
        assert_eq!(classify("radio_tx_ok"), ResponseOutcome::TransmitOk);
    }

    #[test]
    fn test_join_prefixes() {
        assert_eq!(classify("accepted"), ResponseOutcome::JoinAccepted);
        assert_eq!(classify("denied"), ResponseOutcome::JoinDenied);
    }

    #[test]
    fn test_mac_rx() {
        assert_eq!(
            classify("mac_rx 1 48656c6c6f"),
            ResponseOutcome::MacReceived {
                port: 1,
                payload: line("48656c6c6f"),
            }
        );
        assert_eq!(
            classify("mac_rx 223"),
            ResponseOutcome::MacReceived {
                port: 223,
                payload: line(""),
            }
        );
        assert_eq!(
            classify("mac_rx x 00"),
            ResponseOutcome::Error(line("mac_rx x 00"))
        );
    }

    #[test]
    fn test_error_tokens() {
        for token in ERROR_TOKENS {
            assert_eq!(classify(token), ResponseOutcome::Error(line(token)));
        }
    }

    #[test]
    fn test_raw_values() {
        assert_eq!(classify("off"), ResponseOutcome::RawLine(line("off")));
        assert_eq!(classify("-7"), ResponseOutcome::RawLine(line("-7")));
        assert_eq!(classify(""), ResponseOutcome::RawLine(line("")));
        // Tokens are case-sensitive
        assert_eq!(classify("OK"), ResponseOutcome::RawLine(line("OK")));
    }

    #[test]
    fn test_overlong_line_is_truncated() {
        let long = [b'a'; LINE_CAPACITY + 10];
        let text = core::str::from_utf8(&long).unwrap();
        match classify(text) {
            ResponseOutcome::RawLine(raw) => assert_eq!(raw.len(), LINE_CAPACITY),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_kind() {
        assert_eq!(classify("denied").kind(), ResponseKind::JoinDenied);
        assert_eq!(ResponseOutcome::Timeout.kind(), ResponseKind::Timeout);
    }
}

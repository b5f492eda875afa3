//! Hex payload codec
//!
//! Uplink payloads travel as two lowercase hex digits per byte; downlink
//! payloads come back in the same form after `mac_rx <port>`.

use core::fmt;

use heapless::{String, Vec};

/// Hex decoding failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HexError {
    /// Input has an odd number of digits
    OddLength,
    /// Non-hex character at the given offset
    InvalidDigit {
        /// Offset of the offending character
        index: usize,
    },
    /// Output does not fit the destination buffer
    Capacity,
    /// Input does not have the required number of digits
    InvalidLength,
}

impl fmt::Display for HexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HexError::OddLength => write!(f, "odd number of hex digits"),
            HexError::InvalidDigit { index } => write!(f, "invalid hex digit at {}", index),
            HexError::Capacity => write!(f, "buffer too small"),
            HexError::InvalidLength => write!(f, "wrong number of hex digits"),
        }
    }
}

impl From<::hex::FromHexError> for HexError {
    fn from(error: ::hex::FromHexError) -> Self {
        match error {
            ::hex::FromHexError::OddLength => HexError::OddLength,
            ::hex::FromHexError::InvalidHexCharacter { index, .. } => {
                HexError::InvalidDigit { index }
            }
            ::hex::FromHexError::InvalidStringLength => HexError::Capacity,
        }
    }
}

/// Uplink payload, either text or raw bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload<'a> {
    /// Text payload, sent as its UTF-8 bytes
    Text(&'a str),
    /// Raw byte payload
    Bytes(&'a [u8]),
}

impl<'a> Payload<'a> {
    /// Bytes that go on the wire
    pub fn as_bytes(&self) -> &'a [u8] {
        match *self {
            Payload::Text(text) => text.as_bytes(),
            Payload::Bytes(bytes) => bytes,
        }
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a> From<&'a str> for Payload<'a> {
    fn from(text: &'a str) -> Self {
        Payload::Text(text)
    }
}

impl<'a> From<&'a [u8]> for Payload<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Payload::Bytes(bytes)
    }
}

/// Formats a byte slice as lowercase hex pairs without allocating
///
/// Used to stream payloads straight into a command line.
#[derive(Debug, Clone, Copy)]
pub struct Hex<'a>(pub &'a [u8]);

impl fmt::Display for Hex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut scratch = [0u8; 64];
        for chunk in self.0.chunks(scratch.len() / 2) {
            let out = &mut scratch[..chunk.len() * 2];
            ::hex::encode_to_slice(chunk, out).map_err(|_| fmt::Error)?;
            f.write_str(core::str::from_utf8(out).map_err(|_| fmt::Error)?)?;
        }
        Ok(())
    }
}

/// Encode bytes as a lowercase hex string
pub fn encode<const N: usize>(bytes: &[u8]) -> Result<String<N>, HexError> {
    use core::fmt::Write;

    let mut encoded = String::new();
    write!(encoded, "{}", Hex(bytes)).map_err(|_| HexError::Capacity)?;
    Ok(encoded)
}

/// Decode a hex string into bytes
pub fn decode<const N: usize>(hex: &str) -> Result<Vec<u8, N>, HexError> {
    if hex.len() % 2 != 0 {
        return Err(HexError::OddLength);
    }

    let mut decoded = Vec::new();
    decoded
        .resize(hex.len() / 2, 0)
        .map_err(|_| HexError::Capacity)?;
    ::hex::decode_to_slice(hex, &mut decoded[..])?;
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_text() {
        let encoded: String<16> = encode(Payload::Text("TTN").as_bytes()).unwrap();
        assert_eq!(encoded.as_str(), "54544e");
    }

    #[test]
    fn test_encode_pads_low_bytes() {
        let encoded: String<16> = encode(&[0x00, 0x0a, 0xff]).unwrap();
        assert_eq!(encoded.as_str(), "000aff");
    }

    #[test]
    fn test_encode_spans_scratch_chunks() {
        let bytes = [0xabu8; 100];
        let encoded: String<256> = encode(&bytes).unwrap();
        assert_eq!(encoded.len(), 200);
        assert!(encoded.chars().all(|c| c == 'a' || c == 'b'));
    }

    #[test]
    fn test_encode_capacity() {
        let result: Result<String<4>, _> = encode(&[1, 2, 3]);
        assert_eq!(result, Err(HexError::Capacity));
    }

    #[test]
    fn test_decode() {
        let decoded: Vec<u8, 16> = decode("48656c6c6f").unwrap();
        assert_eq!(&decoded[..], b"Hello");
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(decode::<8>("abc"), Err(HexError::OddLength));
        assert_eq!(decode::<8>("0g"), Err(HexError::InvalidDigit { index: 1 }));
        assert_eq!(decode::<2>("010203"), Err(HexError::Capacity));
    }

    #[test]
    fn test_round_trip() {
        let samples: [&[u8]; 4] = [b"", b"\x00", b"Hello, LoRaWAN!", &[0xde, 0xad, 0xbe, 0xef]];
        for sample in samples {
            let encoded: String<64> = encode(sample).unwrap();
            assert_eq!(encoded.len(), sample.len() * 2);
            assert!(encoded
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
            let decoded: Vec<u8, 32> = decode(&encoded).unwrap();
            assert_eq!(&decoded[..], sample);
        }
    }
}

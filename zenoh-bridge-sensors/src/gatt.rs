//! Decoding of GATT characteristic reads.
//!
//! `gatttool --char-read` prints something like
//!
//! ```text
//! Characteristic value/descriptor: 00 40 ce 43
//! ```
//!
//! The four hex tokens after the first colon are the little-endian bytes of
//! an IEEE-754 single precision float.

use std::fmt;

/// Number of bytes in a frame.
pub const FRAME_LEN: usize = 4;

/// Why a characteristic read could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("No ':' separator in characteristic output")]
    MissingSeparator,

    #[error("Expected 4 hex tokens after ':', found {found}")]
    TooFewTokens { found: usize },

    #[error("Invalid hex token '{token}': {source}")]
    InvalidHex {
        token: String,
        #[source]
        source: hex::FromHexError,
    },

    #[error("Hex token {index} decoded to no bytes")]
    EmptyToken { index: usize },
}

/// Four raw bytes read from the characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame([u8; FRAME_LEN]);

impl Frame {
    /// Parse the textual output of a characteristic read.
    ///
    /// Tokens beyond the fourth are ignored. Each token contributes its first
    /// decoded byte.
    pub fn parse(raw: &[u8]) -> Result<Self, DecodeError> {
        let colon = raw
            .iter()
            .position(|&b| b == b':')
            .ok_or(DecodeError::MissingSeparator)?;

        let mut tokens = raw[colon + 1..]
            .split(|b| b.is_ascii_whitespace())
            .filter(|token| !token.is_empty());

        let mut bytes = [0u8; FRAME_LEN];
        for (index, slot) in bytes.iter_mut().enumerate() {
            let token = tokens
                .next()
                .ok_or(DecodeError::TooFewTokens { found: index })?;

            let decoded = hex::decode(token).map_err(|source| DecodeError::InvalidHex {
                token: String::from_utf8_lossy(token).into_owned(),
                source,
            })?;

            *slot = *decoded.first().ok_or(DecodeError::EmptyToken { index })?;
        }

        Ok(Self(bytes))
    }

    /// Frame holding the little-endian encoding of `value`.
    pub fn from_value(value: f32) -> Self {
        Self(value.to_bits().to_le_bytes())
    }

    pub fn bytes(&self) -> [u8; FRAME_LEN] {
        self.0
    }

    /// The float the bytes encode.
    pub fn value(&self) -> f32 {
        f32::from_bits(u32::from_le_bytes(self.0))
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "{:02x} {:02x} {:02x} {:02x}", a, b, c, d)
    }
}

/// Decode a characteristic read into its float value.
pub fn decode(raw: &[u8]) -> Result<f32, DecodeError> {
    Frame::parse(raw).map(|frame| frame.value())
}

/// Render `value` the way a characteristic read would print it.
pub fn encode_frame(value: f32) -> String {
    format!("x: {}", Frame::from_value(value))
}

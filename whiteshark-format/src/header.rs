//! Stream header structures

use serde::{Deserialize, Serialize};

use crate::constants::{
    FORMAT_MAGIC, FORMAT_VERSION, HEADER_LEN, IDENTIFIER_LEN, OPTION_OBJECTS_AS_GENERICS,
};
use crate::error::{Result, SharkError};

/// Four-byte stream identifier
///
/// Built from an arbitrary string: at most the first four characters are
/// considered, anything that is not an ASCII letter or digit is dropped and the
/// result is right-padded with spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identifier([u8; IDENTIFIER_LEN]);

impl Identifier {
    /// Sanitize `raw` into an identifier
    pub fn new(raw: &str) -> Self {
        let mut bytes = [b' '; IDENTIFIER_LEN];
        let kept = raw
            .chars()
            .take(IDENTIFIER_LEN)
            .filter(|c| c.is_ascii_alphanumeric());
        for (slot, c) in bytes.iter_mut().zip(kept) {
            *slot = c as u8;
        }
        Self(bytes)
    }

    /// Raw identifier bytes as written to the stream
    pub fn as_bytes(&self) -> &[u8; IDENTIFIER_LEN] {
        &self.0
    }

    /// Identifier as text (always ASCII)
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("")
    }
}

impl From<&str> for Identifier {
    fn from(raw: &str) -> Self {
        Identifier::new(raw)
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stream-wide options stored in the header bitfield
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamOptions {
    /// Serialize every object without a type reference
    pub objects_as_generics: bool,
}

impl StreamOptions {
    /// Encode as the header bitfield
    pub fn to_bits(self) -> u16 {
        let mut bits = 0;
        if self.objects_as_generics {
            bits |= OPTION_OBJECTS_AS_GENERICS;
        }
        bits
    }

    /// Decode from the header bitfield, ignoring reserved bits
    pub fn from_bits(bits: u16) -> Self {
        Self {
            objects_as_generics: bits & OPTION_OBJECTS_AS_GENERICS != 0,
        }
    }
}

/// Stream header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamHeader {
    /// Stream identifier
    pub identifier: Identifier,
    /// Format version
    pub version: u16,
    /// Stream options
    pub options: StreamOptions,
}

impl StreamHeader {
    /// Header for the current format version
    pub fn new(identifier: Identifier, options: StreamOptions) -> Self {
        Self {
            identifier,
            version: FORMAT_VERSION,
            options,
        }
    }

    /// Encode header to bytes
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..4].copy_from_slice(&FORMAT_MAGIC);
        out[4..8].copy_from_slice(self.identifier.as_bytes());
        out[8..10].copy_from_slice(&self.version.to_le_bytes());
        out[10..12].copy_from_slice(&self.options.to_bits().to_le_bytes());
        out
    }

    /// Decode and validate a header against the expected identifier
    ///
    /// Fails with [`SharkError::UnexpectedEof`] when fewer than
    /// [`HEADER_LEN`] bytes are given.
    pub fn decode(bytes: &[u8], expected: Identifier) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(SharkError::UnexpectedEof);
        }

        if bytes[0..4] != FORMAT_MAGIC {
            return Err(SharkError::MalformedHeader(format!(
                "invalid magic {:02x?}",
                &bytes[0..4]
            )));
        }

        if &bytes[4..8] != expected.as_bytes() {
            return Err(SharkError::MalformedHeader(format!(
                "identifier '{}' does not match expected '{}'",
                String::from_utf8_lossy(&bytes[4..8]),
                expected
            )));
        }

        let version = u16::from_le_bytes([bytes[8], bytes[9]]);
        if version != FORMAT_VERSION {
            return Err(SharkError::UnsupportedVersion(version));
        }

        let options = StreamOptions::from_bits(u16::from_le_bytes([bytes[10], bytes[11]]));

        Ok(Self {
            identifier: expected,
            version,
            options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_sanitizing() {
        assert_eq!(Identifier::new("TEST").as_bytes(), b"TEST");
        assert_eq!(Identifier::new("AB").as_bytes(), b"AB  ");
        assert_eq!(Identifier::new("LONGER").as_bytes(), b"LONG");
        assert_eq!(Identifier::new("A-B!").as_bytes(), b"AB  ");
        assert_eq!(Identifier::new("é1").as_bytes(), b"1   ");
        assert_eq!(Identifier::new("").as_bytes(), b"    ");
    }

    #[test]
    fn test_header_layout() {
        let header = StreamHeader::new(Identifier::new("TEST"), StreamOptions::default());
        let bytes = header.encode();
        assert_eq!(&bytes, b"WSFITEST\x01\x00\x00\x00");

        let generic = StreamHeader::new(
            Identifier::new("TEST"),
            StreamOptions {
                objects_as_generics: true,
            },
        );
        assert_eq!(&generic.encode()[10..12], &[0x01, 0x00]);
    }

    #[test]
    fn test_header_decode() {
        let header = StreamHeader::new(
            Identifier::new("ab12"),
            StreamOptions {
                objects_as_generics: true,
            },
        );
        let decoded = StreamHeader::decode(&header.encode(), Identifier::new("ab12")).unwrap();
        assert_eq!(decoded, header);
    }

    #[test]
    fn test_header_rejects_bad_magic() {
        let mut bytes = StreamHeader::new(Identifier::new("TEST"), StreamOptions::default()).encode();
        bytes[0] = b'X';
        match StreamHeader::decode(&bytes, Identifier::new("TEST")) {
            Err(SharkError::MalformedHeader(msg)) => assert!(msg.contains("magic")),
            other => panic!("expected MalformedHeader, got {other:?}"),
        }
    }

    #[test]
    fn test_header_rejects_identifier_mismatch() {
        let bytes = StreamHeader::new(Identifier::new("TEST"), StreamOptions::default()).encode();
        match StreamHeader::decode(&bytes, Identifier::new("XYZ")) {
            Err(SharkError::MalformedHeader(msg)) => assert!(msg.contains("identifier")),
            other => panic!("expected MalformedHeader, got {other:?}"),
        }
    }

    #[test]
    fn test_header_rejects_future_version() {
        let mut bytes = StreamHeader::new(Identifier::new("TEST"), StreamOptions::default()).encode();
        bytes[8] = 2;
        match StreamHeader::decode(&bytes, Identifier::new("TEST")) {
            Err(SharkError::UnsupportedVersion(2)) => {}
            other => panic!("expected UnsupportedVersion, got {other:?}"),
        }
    }

    #[test]
    fn test_header_short_input() {
        match StreamHeader::decode(b"WSFI", Identifier::new("TEST")) {
            Err(SharkError::UnexpectedEof) => {}
            other => panic!("expected UnexpectedEof, got {other:?}"),
        }
    }

    #[test]
    fn test_reserved_option_bits_ignored() {
        let options = StreamOptions::from_bits(0xFFFE);
        assert!(!options.objects_as_generics);
        assert_eq!(options.to_bits(), 0);
    }

    #[test]
    fn test_options_from_config() {
        let options: StreamOptions =
            serde_json::from_str(r#"{"objects_as_generics": true}"#).unwrap();
        assert!(options.objects_as_generics);
        let defaults: StreamOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(defaults, StreamOptions::default());
    }
}

//! Content digests for hash-based change detection.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use sha1::{Digest as _, Sha1};
use std::fmt;
use std::str::FromStr;

/// A 160-bit SHA-1 digest of a file's contents.
///
/// Two files with the same `Digest` are assumed to have identical content.
/// Displayed and serialized as 40 lowercase hex characters, which is also the
/// form callers use when they pre-populate a cache by hand.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; Digest::LEN]);

impl Digest {
    /// Length of a digest in bytes.
    pub const LEN: usize = 20;

    /// Computes the SHA-1 digest of a byte slice.
    pub fn of(data: &[u8]) -> Self {
        let out = Sha1::digest(data);
        let mut bytes = [0u8; Self::LEN];
        bytes.copy_from_slice(&out);
        Self(bytes)
    }

    /// Parses a digest from its hex representation.
    pub fn from_hex(s: &str) -> Result<Self, ParseDigestError> {
        let raw = hex::decode(s)?;
        let bytes: [u8; Self::LEN] = raw
            .as_slice()
            .try_into()
            .map_err(|_| ParseDigestError::InvalidLength(raw.len()))?;
        Ok(Self(bytes))
    }

    /// Returns the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    /// Returns the lowercase hex encoding of the digest.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// Error returned when a string is not a valid hex-encoded digest.
#[derive(Debug, thiserror::Error)]
pub enum ParseDigestError {
    /// The string contains non-hex characters or has an odd length.
    #[error("invalid digest hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// The string decoded to the wrong number of bytes.
    #[error("invalid digest length: expected {expected} bytes, got {0}", expected = Digest::LEN)]
    InvalidLength(usize),
}

impl FromStr for Digest {
    type Err = ParseDigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(de::Error::custom)
    }
}

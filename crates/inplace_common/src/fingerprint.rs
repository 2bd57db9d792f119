//! The value recorded per cache key.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::hash::Digest;
use crate::timestamp::Timestamp;

/// A file fingerprint: either a content digest or a modification time.
///
/// A single detector only ever produces one kind. A cached fingerprint of the
/// other kind never compares equal to a fresh one.
///
/// Serialized untagged, so a cache snapshot reads as a plain map of
/// `path -> "hex digest"` or `path -> epoch millis`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fingerprint {
    /// SHA-1 digest of the file contents.
    Digest(Digest),
    /// Modification time in epoch milliseconds.
    Timestamp(Timestamp),
}

/// The kind of a [`Fingerprint`], without its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerprintKind {
    /// A content digest.
    Digest,
    /// A modification timestamp.
    Timestamp,
}

impl Fingerprint {
    /// Returns which kind of fingerprint this is.
    pub fn kind(&self) -> FingerprintKind {
        match self {
            Fingerprint::Digest(_) => FingerprintKind::Digest,
            Fingerprint::Timestamp(_) => FingerprintKind::Timestamp,
        }
    }

    /// Returns the digest, if this is a digest fingerprint.
    pub fn as_digest(&self) -> Option<&Digest> {
        match self {
            Fingerprint::Digest(d) => Some(d),
            Fingerprint::Timestamp(_) => None,
        }
    }

    /// Returns the timestamp, if this is a time fingerprint.
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Fingerprint::Timestamp(t) => Some(*t),
            Fingerprint::Digest(_) => None,
        }
    }
}

impl From<Digest> for Fingerprint {
    fn from(d: Digest) -> Self {
        Fingerprint::Digest(d)
    }
}

impl From<Timestamp> for Fingerprint {
    fn from(t: Timestamp) -> Self {
        Fingerprint::Timestamp(t)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fingerprint::Digest(d) => write!(f, "{d}"),
            Fingerprint::Timestamp(t) => write!(f, "{t}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        let d: Fingerprint = Digest::of(b"x").into();
        let t: Fingerprint = Timestamp::from_millis(5).into();
        assert_eq!(d.kind(), FingerprintKind::Digest);
        assert_eq!(t.kind(), FingerprintKind::Timestamp);
        assert_eq!(t.as_timestamp(), Some(Timestamp::from_millis(5)));
        assert!(t.as_digest().is_none());
        assert_eq!(d.as_digest(), Some(&Digest::of(b"x")));
    }

    #[test]
    fn different_kinds_never_equal() {
        let d: Fingerprint = Digest::of(b"0").into();
        let t: Fingerprint = Timestamp::from_millis(0).into();
        assert_ne!(d, t);
    }

    #[test]
    fn untagged_serde_roundtrip() {
        let d: Fingerprint = Digest::of(b"y").into();
        let t: Fingerprint = Timestamp::from_millis(42).into();

        let dj = serde_json::to_string(&d).unwrap();
        let tj = serde_json::to_string(&t).unwrap();
        assert_eq!(dj, format!("\"{}\"", Digest::of(b"y")));
        assert_eq!(tj, "42");

        assert_eq!(serde_json::from_str::<Fingerprint>(&dj).unwrap(), d);
        assert_eq!(serde_json::from_str::<Fingerprint>(&tj).unwrap(), t);
    }
}

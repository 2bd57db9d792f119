//! Shared fingerprint types used across the in-place change detector.
//!
//! This crate provides the two kinds of file fingerprint the detector can
//! record: a SHA-1 content [`Digest`] and a modification [`Timestamp`], plus
//! the [`Fingerprint`] sum type stored in the cache.

#![warn(missing_docs)]

pub mod fingerprint;
pub mod hash;
pub mod timestamp;

pub use fingerprint::{Fingerprint, FingerprintKind};
pub use hash::{Digest, ParseDigestError};
pub use timestamp::Timestamp;

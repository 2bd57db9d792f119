//! In-place change detection for build pipelines.
//!
//! A [`ChangeDetector`] sits in a stream of [`FileDescriptor`]s and forwards
//! only the files whose fingerprint differs from the one recorded on a
//! previous run. Fingerprints are SHA-1 content digests or modification
//! times, kept in a caller-supplied [`FingerprintCache`].

#![warn(missing_docs)]

pub mod descriptor;
pub mod detector;
pub mod error;
pub mod filter;
pub mod key;
pub mod store;
pub mod summary;

pub use descriptor::{FileDescriptor, FileStat};
pub use detector::ChangeDetector;
pub use error::DetectError;
pub use filter::{Changed, ChangedStream};
pub use inplace_common::{Digest, Fingerprint, FingerprintKind, Timestamp};
pub use inplace_config::{DetectorOptions, Strategy};
pub use key::{derive_key, CacheKey};
pub use store::{FingerprintCache, FingerprintMap, SharedCache};
pub use summary::{Decision, RunSummary, Verdict};

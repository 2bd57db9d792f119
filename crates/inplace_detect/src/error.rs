//! Error types for change detection.

use std::path::PathBuf;

/// Errors raised while processing a single file descriptor.
///
/// Content-less files under the hash strategy are not an error; they are
/// forwarded or skipped by policy. Upstream failures never pass through this
/// type: the filters hand them on unchanged.
#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    /// The modification-time strategy was given a descriptor without stat info.
    #[error("missing file metadata for {path}: modification-time detection needs a stat")]
    MissingMetadata {
        /// Path of the offending descriptor.
        path: PathBuf,
    },
}

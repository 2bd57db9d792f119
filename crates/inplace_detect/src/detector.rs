//! The change detector.
//!
//! For every descriptor the detector computes a fingerprint, looks up the
//! previous one under the descriptor's key, overwrites it unconditionally,
//! and only then decides whether to forward. The write always lands before
//! the descriptor leaves the detector, so later stages renaming the file do
//! not affect the recorded key.

use std::path::PathBuf;

use inplace_common::{Digest, Fingerprint};
use inplace_config::{DetectorOptions, Strategy};

use crate::descriptor::FileDescriptor;
use crate::error::DetectError;
use crate::filter::{Changed, ChangedStream};
use crate::key::{derive_key, CacheKey};
use crate::store::{FingerprintCache, SharedCache};
use crate::summary::{Decision, RunSummary, Verdict};

/// A stateful filter forwarding only changed files.
///
/// The strategy, first-pass flag, and base path are fixed at construction.
/// The cache is whatever the caller supplies; by default detectors built with
/// [`ChangeDetector::with_global_cache`] share one process-wide mapping.
#[derive(Debug)]
pub struct ChangeDetector<C = SharedCache> {
    options: DetectorOptions,
    cache: C,
    summary: RunSummary,
    /// Stands in for a descriptor's `cwd` when the source left it empty.
    default_cwd: PathBuf,
}

impl ChangeDetector<SharedCache> {
    /// Creates a detector backed by the process-wide shared cache.
    pub fn with_global_cache(options: DetectorOptions) -> Self {
        Self::new(options, SharedCache::global())
    }
}

impl<C: FingerprintCache> ChangeDetector<C> {
    /// Creates a detector over the given cache.
    ///
    /// Descriptors without a `cwd` are resolved against the process working
    /// directory as it is at construction.
    pub fn new(options: DetectorOptions, cache: C) -> Self {
        let default_cwd = match std::env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                tracing::warn!(error = %e, "cannot read working directory, relative paths stay unresolved");
                PathBuf::new()
            }
        };
        Self {
            options: options.normalized(),
            cache,
            summary: RunSummary::default(),
            default_cwd,
        }
    }

    /// Returns the options this detector was built with.
    pub fn options(&self) -> &DetectorOptions {
        &self.options
    }

    /// Returns the underlying cache.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Consumes the detector, returning its cache.
    pub fn into_cache(self) -> C {
        self.cache
    }

    /// Returns the decisions tallied so far.
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Returns the cache key this detector uses for `file`.
    pub fn key_for(&self, file: &FileDescriptor) -> CacheKey {
        let cwd = if file.cwd.as_os_str().is_empty() {
            &self.default_cwd
        } else {
            &file.cwd
        };
        derive_key(&file.path, cwd, self.options.base_path.as_deref())
    }

    /// Classifies `file` and records its fingerprint.
    ///
    /// The cache entry for the file's key is overwritten before this returns,
    /// whatever the verdict. Content-less files under the hash strategy leave
    /// the cache untouched.
    pub fn evaluate(&mut self, file: &FileDescriptor) -> Result<Verdict, DetectError> {
        let fingerprint = match self.options.strategy {
            Strategy::Hash => match &file.contents {
                Some(bytes) => Fingerprint::Digest(Digest::of(bytes)),
                None => return Ok(self.without_contents(file)),
            },
            Strategy::ModificationTime => {
                let stat = file.stat.ok_or_else(|| DetectError::MissingMetadata {
                    path: file.path.clone(),
                })?;
                Fingerprint::Timestamp(stat.mtime)
            }
        };

        let key = self.key_for(file);
        let decision = match self.cache.get(&key) {
            None => Decision::New,
            Some(previous) if previous != fingerprint => Decision::Modified,
            Some(_) => Decision::Unchanged,
        };
        let forward = match decision {
            Decision::New => self.options.first_pass,
            Decision::Modified => true,
            _ => false,
        };

        if forward {
            tracing::debug!(key = %key, ?decision, %fingerprint, "forwarding changed file");
        } else {
            tracing::trace!(key = %key, ?decision, %fingerprint, "dropping file");
        }
        self.cache.insert(key, fingerprint);

        let verdict = Verdict { decision, forward };
        self.summary.record(verdict);
        Ok(verdict)
    }

    /// Processes one descriptor, returning it if it changed.
    ///
    /// This is the per-item step of the pipeline filter and can be driven
    /// directly by push-style sources.
    pub fn process(&mut self, file: FileDescriptor) -> Result<Option<FileDescriptor>, DetectError> {
        let verdict = self.evaluate(&file)?;
        Ok(verdict.forward.then_some(file))
    }

    /// Wraps an iterator of descriptors, yielding only changed ones.
    ///
    /// Upstream errors pass through unchanged; the iterator ends after the
    /// first error of either kind.
    pub fn filter<I, E>(&mut self, files: I) -> Changed<'_, I::IntoIter, C>
    where
        I: IntoIterator<Item = Result<FileDescriptor, E>>,
        E: From<DetectError>,
    {
        Changed::new(self, files.into_iter())
    }

    /// Wraps a stream of descriptors, yielding only changed ones.
    ///
    /// Same semantics as [`filter`](Self::filter). Each descriptor is
    /// processed synchronously inside `poll_next`.
    pub fn filter_stream<S, E>(&mut self, files: S) -> ChangedStream<'_, S, C>
    where
        S: futures::Stream<Item = Result<FileDescriptor, E>>,
        E: From<DetectError>,
    {
        ChangedStream::new(self, files)
    }

    fn without_contents(&mut self, file: &FileDescriptor) -> Verdict {
        let verdict = if file.is_file() {
            tracing::debug!(path = %file.path.display(), "file has no contents, forwarding unverified");
            Verdict {
                decision: Decision::Unverifiable,
                forward: true,
            }
        } else {
            tracing::trace!(path = %file.path.display(), "skipping non-file entry");
            Verdict {
                decision: Decision::Skipped,
                forward: false,
            }
        };
        self.summary.record(verdict);
        verdict
    }
}

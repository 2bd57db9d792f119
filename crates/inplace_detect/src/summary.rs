//! Per-file decisions and per-run tallies.

/// How the detector classified a single descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// No fingerprint was recorded for the key before.
    New,
    /// The recorded fingerprint differs from the current one.
    Modified,
    /// The recorded fingerprint matches the current one.
    Unchanged,
    /// A regular file without contents; it cannot be hashed, so it is
    /// assumed changed and nothing is recorded.
    Unverifiable,
    /// A content-less non-file entry (e.g. a directory), ignored entirely.
    Skipped,
}

/// The outcome of evaluating one descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// Classification of the descriptor.
    pub decision: Decision,
    /// Whether the descriptor is forwarded downstream.
    pub forward: bool,
}

/// Counts of decisions made by one detector.
///
/// Every processed descriptor lands in exactly one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Descriptors with no prior fingerprint.
    pub new: usize,
    /// Descriptors whose fingerprint changed.
    pub modified: usize,
    /// Descriptors whose fingerprint matched.
    pub unchanged: usize,
    /// Content-less regular files forwarded without a fingerprint.
    pub unverifiable: usize,
    /// Content-less non-file entries that were dropped.
    pub skipped: usize,
    /// Descriptors forwarded downstream.
    pub forwarded: usize,
}

impl RunSummary {
    /// Adds one verdict to the tallies.
    pub fn record(&mut self, verdict: Verdict) {
        match verdict.decision {
            Decision::New => self.new += 1,
            Decision::Modified => self.modified += 1,
            Decision::Unchanged => self.unchanged += 1,
            Decision::Unverifiable => self.unverifiable += 1,
            Decision::Skipped => self.skipped += 1,
        }
        if verdict.forward {
            self.forwarded += 1;
        }
    }

    /// Returns the total number of descriptors processed.
    pub fn total(&self) -> usize {
        self.new + self.modified + self.unchanged + self.unverifiable + self.skipped
    }

    /// Returns the number of descriptors forwarded downstream.
    pub fn forwarded_count(&self) -> usize {
        self.forwarded
    }

    /// Returns `true` if nothing was forwarded.
    pub fn is_empty(&self) -> bool {
        self.forwarded == 0
    }
}

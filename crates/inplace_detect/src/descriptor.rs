//! File descriptors flowing through the pipeline.
//!
//! Descriptors are produced by an upstream source that has already read the
//! file and its metadata. The detector only inspects them; it never touches
//! the filesystem itself.

use std::fs::Metadata;
use std::path::{Path, PathBuf};

use inplace_common::Timestamp;

/// File metadata supplied alongside a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// Whether the entry is a regular file (as opposed to a directory etc.).
    pub is_file: bool,
    /// Last modification time.
    pub mtime: Timestamp,
}

impl FileStat {
    /// Metadata for a regular file.
    pub fn file(mtime: Timestamp) -> Self {
        Self {
            is_file: true,
            mtime,
        }
    }

    /// Metadata for a non-file entry such as a directory.
    pub fn directory(mtime: Timestamp) -> Self {
        Self {
            is_file: false,
            mtime,
        }
    }

    /// Converts filesystem metadata obtained by the caller.
    ///
    /// Fails only if the platform cannot report a modification time.
    pub fn from_metadata(meta: &Metadata) -> std::io::Result<Self> {
        Ok(Self {
            is_file: meta.is_file(),
            mtime: meta.modified()?.into(),
        })
    }
}

/// A single file travelling through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    /// Absolute or pipeline-relative path of the file.
    pub path: PathBuf,

    /// Working directory that relative paths are resolved against.
    ///
    /// Empty when the source did not record one.
    pub cwd: PathBuf,

    /// Glob base of the file, used by downstream stages to compute output paths.
    pub base: Option<PathBuf>,

    /// File contents, or `None` when the source provides no content
    /// (directories, streamed or placeholder entries).
    pub contents: Option<Vec<u8>>,

    /// File metadata, if the source collected it.
    pub stat: Option<FileStat>,
}

impl FileDescriptor {
    /// Creates a descriptor with the given contents and no metadata.
    pub fn new(path: impl Into<PathBuf>, contents: Option<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            cwd: PathBuf::new(),
            base: None,
            contents,
            stat: None,
        }
    }

    /// Attaches file metadata.
    pub fn with_stat(mut self, stat: FileStat) -> Self {
        self.stat = Some(stat);
        self
    }

    /// Sets the working directory.
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    /// Sets the glob base.
    pub fn with_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Returns `true` if the descriptor carries content bytes.
    pub fn has_contents(&self) -> bool {
        self.contents.is_some()
    }

    /// Returns `true` if the metadata marks this as a regular file.
    ///
    /// A descriptor without metadata is not known to be a file.
    pub fn is_file(&self) -> bool {
        self.stat.is_some_and(|s| s.is_file)
    }

    /// Returns the path relative to `base`, or the full path if there is no
    /// base or the path lies outside it.
    pub fn relative(&self) -> &Path {
        self.base
            .as_deref()
            .and_then(|base| self.path.strip_prefix(base).ok())
            .unwrap_or(self.path.as_path())
    }
}

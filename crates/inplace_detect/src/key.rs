//! Cache key derivation.
//!
//! Keys are derived by one pure function used at both the cache read and the
//! cache write, so a file's key is stable across runs as long as its position
//! relative to the configured base path is.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A normalized path string identifying a file in the fingerprint cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Wraps an already-normalized key string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CacheKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CacheKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for CacheKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derives the cache key for `path`.
///
/// Without a base path the key is the path exactly as given. With one, both
/// `path` and `base_path` are resolved against `cwd` (if relative), cleaned of
/// `.`/`..` components, and the key becomes the `/`-separated path from the
/// base to the file. A file outside the base gets a key with leading `..`
/// segments; the base itself maps to the empty key.
///
/// Purely lexical: symlinks are not followed and the filesystem is never read.
pub fn derive_key(path: &Path, cwd: &Path, base_path: Option<&Path>) -> CacheKey {
    let Some(base) = base_path else {
        return CacheKey(path.to_string_lossy().into_owned());
    };

    let path = normalize(&cwd.join(path));
    let base = normalize(&cwd.join(base));

    match pathdiff::diff_paths(&path, &base) {
        Some(rel) => CacheKey(slash_join(&rel)),
        None => CacheKey(path.to_string_lossy().into_owned()),
    }
}

/// Resolves `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(Component::ParentDir),
            },
            other => out.push(other),
        }
    }
    out
}

fn slash_join(rel: &Path) -> String {
    if rel.is_absolute() {
        return rel.to_string_lossy().into_owned();
    }
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

//! Fingerprint cache storage.
//!
//! The detector reads and writes fingerprints through the [`FingerprintCache`]
//! trait. Callers choose the lifetime of the mapping: an owned
//! [`FingerprintMap`], a borrowed one, or a [`SharedCache`] handle that several
//! detectors can hold at once.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use inplace_common::Fingerprint;
use serde::{Deserialize, Serialize};

use crate::key::CacheKey;

/// A mutable mapping from cache key to the last recorded fingerprint.
///
/// Entries are only ever inserted or overwritten by the detector, never
/// removed.
pub trait FingerprintCache {
    /// Returns the fingerprint recorded for `key`, if any.
    fn get(&self, key: &CacheKey) -> Option<Fingerprint>;

    /// Records `fingerprint` for `key`, replacing any previous value.
    fn insert(&mut self, key: CacheKey, fingerprint: Fingerprint);

    /// Returns the number of recorded keys.
    fn len(&self) -> usize;

    /// Returns `true` if nothing has been recorded.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<C: FingerprintCache + ?Sized> FingerprintCache for &mut C {
    fn get(&self, key: &CacheKey) -> Option<Fingerprint> {
        (**self).get(key)
    }

    fn insert(&mut self, key: CacheKey, fingerprint: Fingerprint) {
        (**self).insert(key, fingerprint);
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}

/// An owned in-memory fingerprint cache.
///
/// Serializes as a flat JSON object, so callers that want the cache to
/// outlive the process can persist it themselves.
///
/// Values are typed: each must be a 40-character hex digest or an integer
/// timestamp. A snapshot holding any other value (a free-form placeholder
/// string, say) fails to deserialize as a whole rather than loading with that
/// entry treated as stale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FingerprintMap {
    entries: HashMap<CacheKey, Fingerprint>,
}

impl FingerprintMap {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the fingerprint recorded for a key given as a string.
    pub fn lookup(&self, key: &str) -> Option<&Fingerprint> {
        self.entries.get(key)
    }

    /// Iterates over all recorded entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&CacheKey, &Fingerprint)> {
        self.entries.iter()
    }
}

impl FingerprintCache for FingerprintMap {
    fn get(&self, key: &CacheKey) -> Option<Fingerprint> {
        self.entries.get(key).copied()
    }

    fn insert(&mut self, key: CacheKey, fingerprint: Fingerprint) {
        self.entries.insert(key, fingerprint);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<K: Into<CacheKey>, F: Into<Fingerprint>> FromIterator<(K, F)> for FingerprintMap {
    fn from_iter<T: IntoIterator<Item = (K, F)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, f)| (k.into(), f.into()))
                .collect(),
        }
    }
}

/// A cloneable handle to a fingerprint cache shared between detectors.
///
/// Every clone reads and writes the same mapping. The lock is held for a
/// single get or insert only; it does not serialize whole runs, so detectors
/// sharing a handle concurrently still race at the granularity of files.
#[derive(Debug, Clone, Default)]
pub struct SharedCache {
    inner: Arc<Mutex<FingerprintMap>>,
}

static GLOBAL_CACHE: OnceLock<SharedCache> = OnceLock::new();

impl SharedCache {
    /// Creates a new, empty shared cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing map so it can be shared.
    pub fn from_map(map: FingerprintMap) -> Self {
        Self {
            inner: Arc::new(Mutex::new(map)),
        }
    }

    /// Returns a handle to the process-wide default cache.
    ///
    /// Detectors built with [`ChangeDetector::with_global_cache`] use this.
    /// Callers that want isolation should pass their own cache instead.
    ///
    /// [`ChangeDetector::with_global_cache`]: crate::ChangeDetector::with_global_cache
    pub fn global() -> Self {
        GLOBAL_CACHE.get_or_init(SharedCache::new).clone()
    }

    /// Returns a copy of the current contents.
    pub fn snapshot(&self) -> FingerprintMap {
        self.lock().clone()
    }

    /// Returns `true` if both handles point at the same mapping.
    pub fn ptr_eq(&self, other: &SharedCache) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // A panic elsewhere cannot leave a half-written entry, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, FingerprintMap> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FingerprintCache for SharedCache {
    fn get(&self, key: &CacheKey) -> Option<Fingerprint> {
        self.lock().get(key)
    }

    fn insert(&mut self, key: CacheKey, fingerprint: Fingerprint) {
        self.lock().insert(key, fingerprint);
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inplace_common::{Digest, Timestamp};

    #[test]
    fn insert_overwrites() {
        let mut map = FingerprintMap::new();
        let key = CacheKey::from("a");
        map.insert(key.clone(), Digest::of(b"1").into());
        map.insert(key.clone(), Digest::of(b"2").into());
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&key), Some(Digest::of(b"2").into()));
    }

    #[test]
    fn missing_key_is_none() {
        let map = FingerprintMap::new();
        assert!(map.get(&CacheKey::from("nope")).is_none());
        assert!(map.is_empty());
    }

    #[test]
    fn borrowed_cache_writes_through() {
        fn record<C: FingerprintCache>(mut cache: C) {
            cache.insert(CacheKey::from("a"), Timestamp::from_millis(7).into());
        }

        let mut map = FingerprintMap::new();
        record(&mut map);
        assert_eq!(
            map.lookup("a"),
            Some(&Fingerprint::Timestamp(Timestamp::from_millis(7)))
        );
    }

    #[test]
    fn collect_from_pairs() {
        let map: FingerprintMap = [("a", Digest::of(b"x")), ("b", Digest::of(b"y"))]
            .into_iter()
            .collect();
        assert_eq!(map.len(), 2);
        assert_eq!(map.lookup("b"), Some(&Fingerprint::Digest(Digest::of(b"y"))));
    }

    #[test]
    fn shared_clones_see_same_entries() {
        let mut a = SharedCache::new();
        let b = a.clone();
        a.insert(CacheKey::from("k"), Timestamp::from_millis(1).into());
        assert_eq!(b.len(), 1);
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&SharedCache::new()));
    }

    #[test]
    fn global_is_one_mapping() {
        assert!(SharedCache::global().ptr_eq(&SharedCache::global()));
    }

    #[test]
    fn snapshot_is_detached() {
        let mut shared = SharedCache::new();
        shared.insert(CacheKey::from("a"), Timestamp::from_millis(1).into());
        let snap = shared.snapshot();
        shared.insert(CacheKey::from("b"), Timestamp::from_millis(2).into());
        assert_eq!(snap.len(), 1);
        assert_eq!(shared.len(), 2);
    }

    #[test]
    fn snapshot_with_non_hex_value_is_rejected() {
        let result = serde_json::from_str::<FingerprintMap>(r#"{"a":"not matching sha"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn json_snapshot_shape() {
        let map: FingerprintMap = [("a", Fingerprint::from(Timestamp::from_millis(5)))]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"a":5}"#);
        let back: FingerprintMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}

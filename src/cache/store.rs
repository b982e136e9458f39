//! Bounded Store Module
//!
//! Encoded items held under a byte budget, evicting least recently used
//! entries before inserts that would cross it.

use tracing::{debug, warn};

use crate::cache::EvictionList;
use crate::error::{CacheError, Result};

// == Bounded Store ==
/// Byte-budgeted, recency-ordered map of encoded items.
///
/// `bytes_used` always equals the summed length of resident entries: it
/// grows once per insert and shrinks only in [`BoundedStore::on_evicted`],
/// through which every removal path runs.
#[derive(Debug)]
pub struct BoundedStore {
    /// Recency-ordered entries
    entries: EvictionList,
    /// Sum of resident entry lengths
    bytes_used: usize,
    /// Aggregate ceiling
    bytes_limit: usize,
    /// Per-entry ceiling
    max_object_bytes: usize,
    /// Entries dropped by GC
    evictions: u64,
}

impl BoundedStore {
    // == Constructor ==
    /// Creates an empty store. Limits are taken as given; floors are
    /// applied by the engine's configuration.
    pub fn new(bytes_limit: usize, max_object_bytes: usize) -> Self {
        Self {
            entries: EvictionList::default(),
            bytes_used: 0,
            bytes_limit,
            max_object_bytes,
            evictions: 0,
        }
    }

    // == Get ==
    /// Looks up a key and marks it most recently used.
    pub fn get(&mut self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Looks up a key without touching recency.
    pub fn peek(&self, key: &str) -> Option<&[u8]> {
        self.entries.peek(key).map(Vec::as_slice)
    }

    // == Put ==
    /// Inserts `bytes` under `key`, replacing any previous entry.
    ///
    /// Oversized objects are rejected before anything else happens, so a
    /// failed put leaves the store untouched.
    pub fn put(&mut self, key: String, bytes: Vec<u8>) -> Result<()> {
        let size = bytes.len();
        if size > self.max_object_bytes {
            warn!(
                "Rejected {} bytes for key {}: object limit is {} bytes",
                size, key, self.max_object_bytes
            );
            return Err(CacheError::ObjectTooLarge {
                size,
                limit: self.max_object_bytes,
            });
        }

        // overwrite in place would double-count, release the old entry first
        self.remove(&key);
        self.gc(size);

        self.bytes_used += size;
        if let Some(displaced) = self.entries.insert(key, bytes) {
            self.on_evicted(&displaced);
        }
        Ok(())
    }

    // == Remove ==
    /// Removes an entry, returning whether it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some(bytes) => {
                self.on_evicted(&bytes);
                true
            }
            None => false,
        }
    }

    // == Flush ==
    /// Drains every entry through the eviction path.
    pub fn flush(&mut self) {
        while let Some((_, bytes)) = self.entries.remove_oldest() {
            self.on_evicted(&bytes);
        }
        debug_assert_eq!(self.bytes_used, 0, "byte accounting leaked on flush");
    }

    // == Garbage Collection ==
    /// Frees budget for an incoming entry of `incoming` bytes.
    ///
    /// When the insert would reach the limit, evicts oldest entries until
    /// usage drops to `limit - 2 * incoming` (or `limit - incoming` when
    /// that is not positive), leaving headroom for the next few inserts.
    fn gc(&mut self, incoming: usize) {
        if self.bytes_used + incoming < self.bytes_limit {
            return;
        }

        let release_size = match self.bytes_limit.checked_sub(incoming.saturating_mul(2)) {
            Some(target) if target > 0 => target,
            _ => self.bytes_limit.saturating_sub(incoming),
        };

        let before = self.bytes_used;
        let mut evicted = 0u64;
        while self.bytes_used > release_size {
            match self.entries.remove_oldest() {
                Some((_, bytes)) => {
                    self.on_evicted(&bytes);
                    evicted += 1;
                }
                None => break,
            }
        }
        self.evictions += evicted;

        debug!(
            "GC evicted {} entries, released {} bytes (target {} bytes)",
            evicted,
            before - self.bytes_used,
            release_size
        );
    }

    /// The single place `bytes_used` shrinks.
    fn on_evicted(&mut self, bytes: &[u8]) {
        self.bytes_used -= bytes.len();
    }

    // == Accessors ==
    pub fn bytes_used(&self) -> usize {
        self.bytes_used
    }

    pub fn bytes_limit(&self) -> usize {
        self.bytes_limit
    }

    pub fn max_object_bytes(&self) -> usize {
        self.max_object_bytes
    }

    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains(key)
    }

    /// Entries from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<u8>)> {
        self.entries.iter()
    }
}

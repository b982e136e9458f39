//! Memory Cache Module
//!
//! The in-process engine: codec, bounded store, TTL checks and counters
//! behind one reader/writer lock.

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::cache::codec;
use crate::cache::counter::{self, Step};
use crate::cache::item::current_timestamp_ms;
use crate::cache::{
    BoundedStore, CacheStats, Integer, Item, Kind, Value, MAX_OBJECT_BYTES, MEMORY_LIMIT,
    MEMORY_LIMIT_MIN,
};
use crate::cacher::Cacher;
use crate::config::{CacheOptions, BYTES_LIMIT_SETTING, MAX_OBJECT_BYTES_SETTING};
use crate::error::{CacheError, Result};

/// Adapter kind the memory engine registers under.
pub const MEMORY_ADAPTER: &str = "memory";

#[derive(Debug)]
struct Inner {
    store: BoundedStore,
    stats: CacheStats,
}

enum Lookup {
    Hit(Item),
    Miss,
    Expired,
}

impl Inner {
    /// Touching lookup. Expired and undecodable entries are removed.
    fn lookup(&mut self, key: &str) -> Lookup {
        let decoded = match self.store.get(key) {
            Some(bytes) => codec::decode(bytes),
            None => return Lookup::Miss,
        };

        match decoded {
            Ok(item) if item.is_expired() => {
                self.store.remove(key);
                Lookup::Expired
            }
            Ok(item) => Lookup::Hit(item),
            Err(e) => {
                warn!("Dropping undecodable entry {}: {}", key, e);
                self.store.remove(key);
                Lookup::Miss
            }
        }
    }

    /// Non-touching liveness check.
    fn is_live(&self, key: &str) -> Option<bool> {
        self.store
            .peek(key)
            .map(|bytes| matches!(codec::decode(bytes), Ok(item) if !item.is_expired()))
    }
}

// == Memory Cache ==
/// Byte-budgeted in-process cache.
///
/// Reads that only observe (`exist`) share the lock; everything that
/// touches recency or mutates takes it exclusively, so counters are
/// serialized per instance.
#[derive(Debug)]
pub struct MemoryCache {
    name: String,
    prefix: String,
    inner: RwLock<Inner>,
}

impl MemoryCache {
    // == Constructors ==
    /// Creates a cache with the default budget and object ceiling.
    pub fn new(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::with_limits(name, prefix, MEMORY_LIMIT, MAX_OBJECT_BYTES)
    }

    /// Creates a cache with exact limits, no floors applied.
    pub fn with_limits(
        name: impl Into<String>,
        prefix: impl Into<String>,
        bytes_limit: usize,
        max_object_bytes: usize,
    ) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            inner: RwLock::new(Inner {
                store: BoundedStore::new(bytes_limit, max_object_bytes),
                stats: CacheStats::new(),
            }),
        }
    }

    /// Starts a cache from a construction bundle.
    ///
    /// The budget is raised to at least [`MEMORY_LIMIT_MIN`] and the object
    /// ceiling capped at the budget, so no configuration leaves the cache
    /// unable to hold anything.
    pub fn start(options: &CacheOptions) -> Result<Self> {
        let bytes_limit = options
            .setting_usize(BYTES_LIMIT_SETTING)?
            .unwrap_or(MEMORY_LIMIT)
            .max(MEMORY_LIMIT_MIN);
        let max_object_bytes = options
            .setting_usize(MAX_OBJECT_BYTES_SETTING)?
            .unwrap_or(MAX_OBJECT_BYTES)
            .min(bytes_limit);

        info!(
            "Memory cache '{}' started: bytes_limit={}, max_object_bytes={}, prefix={:?}",
            options.name, bytes_limit, max_object_bytes, options.prefix
        );
        Ok(Self::with_limits(
            options.name.clone(),
            options.prefix.clone(),
            bytes_limit,
            max_object_bytes,
        ))
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn bytes_used(&self) -> usize {
        self.inner.read().store.bytes_used()
    }

    pub fn len(&self) -> usize {
        self.inner.read().store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().store.is_empty()
    }

    // == Counters ==
    /// Read, step and re-insert under one exclusive lock.
    fn mutate(&self, key: &str, step: Step) -> Result<Integer> {
        let full_key = self.full_key(key);
        let mut inner = self.inner.write();

        let item = match inner.lookup(&full_key) {
            Lookup::Hit(item) => item,
            // the stale entry is gone now, the next call sees an absent key
            Lookup::Expired => return Err(CacheError::Expired(key.to_string())),
            Lookup::Miss if step == Step::Incr => Item::new(Value::Int(Integer::I64(0)), 0),
            Lookup::Miss => return Err(CacheError::NotFound(key.to_string())),
        };

        let next = counter::apply(key, &item.value, step)?;
        let renewed = item
            .renewed(Value::Int(next))
            .ok_or_else(|| CacheError::Expired(key.to_string()))?;
        let bytes = codec::encode(&renewed)?;

        inner.store.put(full_key, bytes)?;
        Ok(next)
    }
}

impl Cacher for MemoryCache {
    fn name(&self) -> &str {
        &self.name
    }

    fn exist(&self, key: &str) -> bool {
        let full_key = self.full_key(key);

        match self.inner.read().is_live(&full_key) {
            None => return false,
            Some(true) => return true,
            Some(false) => {}
        }

        // Re-check under the write lock: a concurrent set may have replaced
        // the stale entry and must not be removed.
        let mut inner = self.inner.write();
        match inner.is_live(&full_key) {
            Some(true) => true,
            Some(false) => {
                inner.store.remove(&full_key);
                false
            }
            None => false,
        }
    }

    fn get_value(&self, key: &str, _hint: Option<Kind>) -> Result<Value> {
        let full_key = self.full_key(key);
        let mut inner = self.inner.write();

        match inner.lookup(&full_key) {
            Lookup::Hit(item) => {
                inner.stats.record_hit();
                Ok(item.value)
            }
            Lookup::Miss => {
                inner.stats.record_miss();
                Err(CacheError::NotFound(key.to_string()))
            }
            Lookup::Expired => {
                inner.stats.record_miss();
                Err(CacheError::Expired(key.to_string()))
            }
        }
    }

    fn set_value(&self, key: &str, value: Value, ttl: u64) -> Result<()> {
        let bytes = codec::encode(&Item::new(value, ttl))?;
        self.inner.write().store.put(self.full_key(key), bytes)
    }

    fn incr(&self, key: &str) -> Result<Integer> {
        self.mutate(key, Step::Incr)
    }

    fn decr(&self, key: &str) -> Result<Integer> {
        self.mutate(key, Step::Decr)
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.inner.write().store.remove(&self.full_key(key));
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        let mut inner = self.inner.write();
        let released = inner.store.bytes_used();
        inner.store.flush();
        debug!("Flushed cache '{}', released {} bytes", self.name, released);
        Ok(())
    }

    fn stats(&self) -> CacheStats {
        let inner = self.inner.read();
        CacheStats {
            evictions: inner.store.evictions(),
            total_entries: inner.store.len(),
            bytes_used: inner.store.bytes_used(),
            bytes_limit: inner.store.bytes_limit(),
            ..inner.stats.clone()
        }
    }

    fn purge_expired(&self) -> usize {
        let mut inner = self.inner.write();
        let now = current_timestamp_ms();

        let stale: Vec<String> = inner
            .store
            .iter()
            .filter(|(_, bytes)| match codec::decode(bytes) {
                Ok(item) => item.is_expired_at(now),
                Err(_) => true,
            })
            .map(|(key, _)| key.clone())
            .collect();

        for key in &stale {
            inner.store.remove(key);
        }
        stale.len()
    }
}

//! Remote Cache Module
//!
//! Adapts an external key-value store to the [`Cacher`] contract. Scalars
//! travel as plain text so the store's native counters can operate on
//! them; everything else uses the generic item encoding.

use tracing::warn;

use crate::cache::codec;
use crate::cache::{Integer, Item, Kind, Value};
use crate::cacher::Cacher;
use crate::error::{CacheError, Result};

// == Remote Store ==
/// Byte-level operations a remote backend provides.
///
/// Keys arrive already prefixed. Failures of the backend itself are
/// reported as [`CacheError::Backend`].
pub trait RemoteStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Stores `bytes`, expiring after `ttl` seconds (0 = never).
    fn set(&self, key: &str, bytes: Vec<u8>, ttl: u64) -> Result<()>;

    fn exists(&self, key: &str) -> Result<bool>;

    fn delete(&self, key: &str) -> Result<()>;

    fn flush(&self) -> Result<()>;

    /// Atomically adds `delta` to an integer stored as text.
    ///
    /// A missing key starts at 0 when `create` is set and yields `Ok(None)`
    /// otherwise. A value that is not integer text is a `TypeMismatch`.
    fn add(&self, key: &str, delta: i64, create: bool) -> Result<Option<i64>>;
}

// == Remote Cache ==
/// [`Cacher`] over any [`RemoteStore`].
///
/// Native counters have no notion of width, so counter results come back
/// as `i64` whatever type the value was stored with.
#[derive(Debug)]
pub struct RemoteCache<S> {
    name: String,
    prefix: String,
    store: S,
}

impl<S: RemoteStore> RemoteCache<S> {
    pub fn new(name: impl Into<String>, prefix: impl Into<String>, store: S) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            store,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    fn decode(&self, key: &str, full_key: &str, bytes: &[u8], hint: Kind) -> Result<Value> {
        if codec::is_generic(bytes) {
            let item = codec::decode(bytes)?;
            if item.is_expired() {
                self.store.delete(full_key)?;
                return Err(CacheError::Expired(key.to_string()));
            }
            return Ok(item.value);
        }

        codec::scalar_decode(bytes, hint)?.ok_or_else(|| CacheError::TypeMismatch {
            expected: hint.name().to_string(),
            found: "scalar text".to_string(),
        })
    }
}

impl<S: RemoteStore> Cacher for RemoteCache<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn exist(&self, key: &str) -> bool {
        match self.store.exists(&self.full_key(key)) {
            Ok(found) => found,
            Err(e) => {
                warn!("Existence check for {} failed: {}", key, e);
                false
            }
        }
    }

    fn get_value(&self, key: &str, hint: Option<Kind>) -> Result<Value> {
        let full_key = self.full_key(key);
        let bytes = self
            .store
            .get(&full_key)?
            .ok_or_else(|| CacheError::NotFound(key.to_string()))?;

        self.decode(key, &full_key, &bytes, hint.unwrap_or(Kind::String))
    }

    fn set_value(&self, key: &str, value: Value, ttl: u64) -> Result<()> {
        let bytes = match codec::scalar_encode(&value) {
            Some(text) => text,
            None => codec::encode(&Item::new(value, ttl))?,
        };
        self.store.set(&self.full_key(key), bytes, ttl)
    }

    fn incr(&self, key: &str) -> Result<Integer> {
        self.store
            .add(&self.full_key(key), 1, true)?
            .map(Integer::I64)
            .ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    fn decr(&self, key: &str) -> Result<Integer> {
        self.store
            .add(&self.full_key(key), -1, false)?
            .map(Integer::I64)
            .ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.store.delete(&self.full_key(key))
    }

    fn flush(&self) -> Result<()> {
        self.store.flush()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{IntKind, Structured};
    use crate::cacher::CacherExt;
    use parking_lot::Mutex;
    use serde::{Deserialize, Serialize};
    use std::collections::HashMap;

    /// In-process stand-in for a text-counter store. TTLs are recorded but
    /// not enforced.
    #[derive(Debug, Default)]
    struct FakeStore {
        data: Mutex<HashMap<String, (Vec<u8>, u64)>>,
    }

    impl FakeStore {
        fn raw(&self, key: &str) -> Option<Vec<u8>> {
            self.data.lock().get(key).map(|(bytes, _)| bytes.clone())
        }
    }

    impl RemoteStore for FakeStore {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
            Ok(self.raw(key))
        }

        fn set(&self, key: &str, bytes: Vec<u8>, ttl: u64) -> Result<()> {
            self.data.lock().insert(key.to_string(), (bytes, ttl));
            Ok(())
        }

        fn exists(&self, key: &str) -> Result<bool> {
            Ok(self.data.lock().contains_key(key))
        }

        fn delete(&self, key: &str) -> Result<()> {
            self.data.lock().remove(key);
            Ok(())
        }

        fn flush(&self) -> Result<()> {
            self.data.lock().clear();
            Ok(())
        }

        fn add(&self, key: &str, delta: i64, create: bool) -> Result<Option<i64>> {
            let mut data = self.data.lock();
            let (current, ttl) = match data.get(key) {
                Some((bytes, ttl)) => {
                    let text = String::from_utf8_lossy(bytes);
                    let current = text.parse::<i64>().map_err(|_| CacheError::TypeMismatch {
                        expected: "integer counter".to_string(),
                        found: "text".to_string(),
                    })?;
                    (current, *ttl)
                }
                None if create => (0, 0),
                None => return Ok(None),
            };

            let next = current
                .checked_add(delta)
                .ok_or_else(|| CacheError::Backend("increment out of range".to_string()))?;
            data.insert(key.to_string(), (next.to_string().into_bytes(), ttl));
            Ok(Some(next))
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    impl Structured for Point {}

    fn cache() -> RemoteCache<FakeStore> {
        RemoteCache::new("remote", "r:", FakeStore::default())
    }

    #[test]
    fn test_scalars_stored_as_text() {
        let cache = cache();
        cache.set("n", 42u16, 30).unwrap();
        cache.set("s", "hello".to_string(), 0).unwrap();

        assert_eq!(cache.store().raw("r:n").unwrap(), b"42");
        assert_eq!(cache.store().raw("r:s").unwrap(), b"hello");
        assert_eq!(cache.get::<u16>("n").unwrap(), 42);
        assert_eq!(cache.get::<String>("n").unwrap(), "42");
    }

    #[test]
    fn test_structured_uses_generic_encoding() {
        let cache = cache();
        let point = Point { x: 1, y: -2 };
        cache.set("p", point.clone(), 0).unwrap();

        let raw = cache.store().raw("r:p").unwrap();
        assert!(codec::is_generic(&raw));
        assert_eq!(cache.get::<Point>("p").unwrap(), point);
    }

    #[test]
    fn test_structured_read_of_scalar_text_is_mismatch() {
        let cache = cache();
        cache.set("s", "plain".to_string(), 0).unwrap();

        assert!(matches!(
            cache.get::<Point>("s"),
            Err(CacheError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_unparseable_scalar_is_codec_error() {
        let cache = cache();
        cache.set("s", "abc".to_string(), 0).unwrap();

        let mut out = 7i64;
        assert!(matches!(
            cache.get_into("s", &mut out),
            Err(CacheError::Codec(_))
        ));
        assert_eq!(out, 7);
    }

    #[test]
    fn test_get_missing() {
        let cache = cache();
        assert_eq!(
            cache.get::<String>("nope"),
            Err(CacheError::NotFound("nope".to_string()))
        );
    }

    #[test]
    fn test_expired_generic_item_is_removed() {
        let cache = cache();
        let item = Item {
            value: Value::Structured {
                type_name: "json".to_string(),
                payload: serde_json::json!({"a": 1}),
            },
            ttl: 1,
            expiration: Some(crate::cache::current_timestamp_ms() - 1),
        };
        cache
            .store()
            .set("r:old", codec::encode(&item).unwrap(), 1)
            .unwrap();

        assert_eq!(
            cache.get::<serde_json::Value>("old"),
            Err(CacheError::Expired("old".to_string()))
        );
        assert!(!cache.exist("old"));
    }

    #[test]
    fn test_native_counters() {
        let cache = cache();

        assert_eq!(cache.incr("c").unwrap(), Integer::I64(1));
        assert_eq!(cache.incr("c").unwrap(), Integer::I64(2));
        assert_eq!(cache.decr("c").unwrap(), Integer::I64(1));
        assert_eq!(
            cache.get_value("c", Some(Kind::Int(IntKind::I64))).unwrap(),
            Value::Int(Integer::I64(1))
        );
    }

    #[test]
    fn test_decr_missing_is_not_found() {
        let cache = cache();
        assert_eq!(
            cache.decr("none"),
            Err(CacheError::NotFound("none".to_string()))
        );
        assert!(!cache.exist("none"));
    }

    #[test]
    fn test_counter_on_text_is_mismatch() {
        let cache = cache();
        cache.set("word", "abc".to_string(), 0).unwrap();

        assert!(matches!(cache.incr("word"), Err(CacheError::TypeMismatch { .. })));
    }

    #[test]
    fn test_delete_and_flush() {
        let cache = cache();
        cache.set("a", 1i8, 0).unwrap();
        cache.set("b", 2i8, 0).unwrap();

        cache.delete("a").unwrap();
        cache.delete("a").unwrap();
        assert!(!cache.exist("a"));

        cache.flush().unwrap();
        assert!(!cache.exist("b"));
    }

    #[test]
    fn test_stats_default_for_remote() {
        let stats = cache().stats();
        assert_eq!(stats.bytes_limit, 0);
        assert_eq!(stats.total_entries, 0);
    }
}

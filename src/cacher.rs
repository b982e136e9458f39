//! Cacher Contract
//!
//! The capability set every backend implements. [`Cacher`] is object safe
//! and moves untyped [`Value`]s; [`CacherExt`] layers typed access on top
//! for any backend, including `dyn Cacher`.

use crate::cache::{CacheStats, CacheValue, Integer, Kind, Value};
use crate::error::Result;

/// A cache backend.
///
/// Implementations must be safe to share between threads; every method
/// takes `&self`.
pub trait Cacher: Send + Sync {
    /// Configured instance name.
    fn name(&self) -> &str;

    /// True if a live entry exists. Never fails.
    fn exist(&self, key: &str) -> bool;

    /// Reads the stored value.
    ///
    /// `hint` is the kind the caller will convert to. Backends that keep
    /// scalars as bare text need it to parse; with `None` such text is
    /// returned as a string.
    fn get_value(&self, key: &str, hint: Option<Kind>) -> Result<Value>;

    /// Stores `value` for `ttl` seconds, 0 meaning no expiry.
    fn set_value(&self, key: &str, value: Value, ttl: u64) -> Result<()>;

    /// Adds one to an integer counter, creating it at 1 when absent. A
    /// counter found past its expiration is removed and reported as
    /// expired.
    fn incr(&self, key: &str) -> Result<Integer>;

    /// Subtracts one from an existing integer counter.
    fn decr(&self, key: &str) -> Result<Integer>;

    fn delete(&self, key: &str) -> Result<()>;

    fn flush(&self) -> Result<()>;

    fn stats(&self) -> CacheStats {
        CacheStats::default()
    }

    /// Drops expired entries, returning how many were removed. Backends
    /// that expire natively have nothing to do.
    fn purge_expired(&self) -> usize {
        0
    }
}

/// Typed accessors over any [`Cacher`].
pub trait CacherExt: Cacher {
    /// Reads a value of exactly type `T`.
    fn get<T: CacheValue>(&self, key: &str) -> Result<T> {
        let value = self.get_value(key, Some(T::kind()))?;
        T::from_value(value)
    }

    /// Like [`CacherExt::get`], writing into `out`. `out` is left
    /// untouched on any error.
    fn get_into<T: CacheValue>(&self, key: &str, out: &mut T) -> Result<()> {
        *out = self.get(key)?;
        Ok(())
    }

    fn set<T: CacheValue>(&self, key: &str, value: T, ttl: u64) -> Result<()> {
        self.set_value(key, value.into_value()?, ttl)
    }
}

impl<C: Cacher + ?Sized> CacherExt for C {}

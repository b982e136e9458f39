//! Cache Item Module
//!
//! Defines the unit of storage: a value together with its TTL metadata.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::cache::Value;

// == Cache Item ==
/// A value plus the lifetime it was stored with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// The stored value
    pub value: Value,
    /// Requested lifetime in seconds, 0 = never expires
    pub ttl: u64,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expiration: Option<i64>,
}

impl Item {
    // == Constructor ==
    /// Creates a new item, deriving the absolute expiration from `ttl`.
    pub fn new(value: Value, ttl: u64) -> Self {
        let expiration = (ttl > 0).then(|| {
            let ttl_ms = i64::try_from(ttl).unwrap_or(i64::MAX).saturating_mul(1000);
            current_timestamp_ms().saturating_add(ttl_ms)
        });

        Self {
            value,
            ttl,
            expiration,
        }
    }

    // == Is Expired ==
    /// An item is expired once the current time reaches its expiration.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        match self.expiration {
            Some(expires) => now_ms >= expires,
            None => false,
        }
    }

    // == Renew ==
    /// Re-creates the item around a new value, keeping the stored absolute
    /// expiration. `ttl` becomes the remaining whole seconds, rounded up.
    ///
    /// Returns `None` when no lifetime is left.
    pub fn renewed(&self, value: Value) -> Option<Item> {
        let Some(expires) = self.expiration else {
            return Some(Item {
                value,
                ttl: 0,
                expiration: None,
            });
        };

        let remaining_ms = expires.saturating_sub(current_timestamp_ms());
        if remaining_ms <= 0 {
            return None;
        }

        let ttl = u64::try_from((remaining_ms + 999) / 1000).unwrap_or(u64::MAX);
        Some(Item {
            value,
            ttl,
            expiration: Some(expires),
        })
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}

//! Cache Module
//!
//! Provides the typed value model, the item codec, the byte-budgeted
//! in-memory engine and the adapter for remote key-value stores.

pub mod codec;
pub mod counter;
mod item;
mod lru;
mod memory;
pub mod remote;
mod stats;
mod store;
mod value;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use item::{current_timestamp_ms, Item};
pub use lru::EvictionList;
pub use memory::{MemoryCache, MEMORY_ADAPTER};
pub use remote::{RemoteCache, RemoteStore};
pub use stats::CacheStats;
pub use store::BoundedStore;
pub use value::{CacheValue, IntKind, Integer, Kind, Structured, Value};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Default aggregate byte budget of the memory engine (128 MiB)
pub const MEMORY_LIMIT: usize = 1 << 27;

/// Smallest byte budget the memory engine will start with (1 MiB)
pub const MEMORY_LIMIT_MIN: usize = 1 << 20;

/// Default per-object ceiling of the memory engine (1 MiB)
pub const MAX_OBJECT_BYTES: usize = 1 << 20;

//! Mini Cache - A pluggable cache with typed values and TTL expiry
//!
//! Backends implement the [`Cacher`] contract and are built by name through
//! an [`AdapterRegistry`]. The bundled `memory` engine keeps encoded items
//! under a byte budget with least-recently-used eviction.

pub mod api;
pub mod cache;
pub mod cacher;
pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod tasks;

pub use api::AppState;
pub use cache::{
    CacheStats, CacheValue, Integer, Kind, MemoryCache, RemoteCache, RemoteStore, Structured,
    Value,
};
pub use cacher::{Cacher, CacherExt};
pub use config::{CacheOptions, Config};
pub use error::{CacheError, Result};
pub use registry::AdapterRegistry;
pub use tasks::{spawn_expiry_sweep, SweepHandle};

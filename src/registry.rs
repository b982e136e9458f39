//! Adapter Registry
//!
//! Maps adapter kinds to factories building a [`Cacher`] from
//! [`CacheOptions`]. The registry is an ordinary value: populate it once
//! during startup, then share it read-only.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::cache::{MemoryCache, MEMORY_ADAPTER};
use crate::cacher::Cacher;
use crate::config::CacheOptions;
use crate::error::{CacheError, Result};

/// Instance name used when the options leave it empty.
pub const DEFAULT_CACHE_NAME: &str = "_DEFAULT_";

/// Builds a started cache from its options.
pub type Factory = Box<dyn Fn(&CacheOptions) -> Result<Arc<dyn Cacher>> + Send + Sync>;

#[derive(Default)]
pub struct AdapterRegistry {
    factories: HashMap<String, Factory>,
}

impl AdapterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in `memory` adapter.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.factories.insert(
            MEMORY_ADAPTER.to_string(),
            Box::new(|options: &CacheOptions| {
                let cache: Arc<dyn Cacher> = Arc::new(MemoryCache::start(options)?);
                Ok(cache)
            }),
        );
        registry
    }

    /// Registers `factory` under `name`.
    ///
    /// Fails on an empty name or a name that is already taken; the first
    /// registration stays in place.
    pub fn register<F>(&mut self, name: &str, factory: F) -> Result<()>
    where
        F: Fn(&CacheOptions) -> Result<Arc<dyn Cacher>> + Send + Sync + 'static,
    {
        if name.is_empty() {
            return Err(CacheError::Config("adapter name is empty".to_string()));
        }
        if self.factories.contains_key(name) {
            return Err(CacheError::Config(format!(
                "adapter '{}' is already registered",
                name
            )));
        }

        self.factories.insert(name.to_string(), Box::new(factory));
        info!("Registered cache adapter '{}'", name);
        Ok(())
    }

    /// Builds a cache for `options.adapter`.
    pub fn build(&self, options: &CacheOptions) -> Result<Arc<dyn Cacher>> {
        if options.adapter.is_empty() {
            return Err(CacheError::Config("no cache adapter configured".to_string()));
        }

        let factory = self.factories.get(&options.adapter).ok_or_else(|| {
            CacheError::Config(format!("unknown cache adapter '{}'", options.adapter))
        })?;

        let mut options = options.clone();
        if options.name.is_empty() {
            options.name = DEFAULT_CACHE_NAME.to_string();
        }

        let cache = factory(&options)?;
        info!(
            "Built cache '{}' with adapter '{}'",
            cache.name(),
            options.adapter
        );
        Ok(cache)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered adapter names, sorted.
    pub fn adapters(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("adapters", &self.adapters())
            .finish()
    }
}

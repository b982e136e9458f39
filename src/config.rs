//! Configuration Module
//!
//! Loads server configuration from environment variables and builds the
//! option bundle handed to the adapter registry.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{CacheError, Result};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Name of the cache instance
    pub cache_name: String,
    /// Registered adapter kind backing the cache
    pub adapter: String,
    /// Prefix prepended to every key
    pub prefix: String,
    /// Aggregate byte budget override for the memory adapter
    pub bytes_limit: Option<u64>,
    /// Per-object byte ceiling override for the memory adapter
    pub max_object_bytes: Option<u64>,
    /// HTTP server port
    pub server_port: u16,
    /// Expiry sweep interval in seconds, 0 disables the sweep
    pub sweep_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_NAME` - Cache instance name (default: `_DEFAULT_`)
    /// - `CACHE_ADAPTER` - Adapter kind (default: `memory`)
    /// - `CACHE_PREFIX` - Key prefix (default: empty)
    /// - `CACHE_BYTES_LIMIT` - Aggregate byte budget (default: 128 MiB)
    /// - `CACHE_MAX_OBJECT_BYTES` - Per-object ceiling (default: 1 MiB)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SWEEP_INTERVAL` - Expiry sweep frequency in seconds (default: 1)
    ///
    /// # Errors
    /// A numeric variable that is set but does not parse is a
    /// [`CacheError::Config`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Like [`Config::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            cache_name: lookup("CACHE_NAME").unwrap_or(defaults.cache_name),
            adapter: lookup("CACHE_ADAPTER").unwrap_or(defaults.adapter),
            prefix: lookup("CACHE_PREFIX").unwrap_or(defaults.prefix),
            bytes_limit: parsed_var(&lookup, "CACHE_BYTES_LIMIT")?,
            max_object_bytes: parsed_var(&lookup, "CACHE_MAX_OBJECT_BYTES")?,
            server_port: parsed_var(&lookup, "SERVER_PORT")?.unwrap_or(defaults.server_port),
            sweep_interval: parsed_var(&lookup, "SWEEP_INTERVAL")?
                .unwrap_or(defaults.sweep_interval),
        })
    }

    /// Construction bundle for the configured adapter.
    pub fn cache_options(&self) -> CacheOptions {
        let mut options = CacheOptions::new(self.adapter.clone())
            .with_name(self.cache_name.clone())
            .with_prefix(self.prefix.clone());
        if let Some(limit) = self.bytes_limit {
            options = options.with_setting(BYTES_LIMIT_SETTING, limit);
        }
        if let Some(max) = self.max_object_bytes {
            options = options.with_setting(MAX_OBJECT_BYTES_SETTING, max);
        }
        options
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_name: "_DEFAULT_".to_string(),
            adapter: "memory".to_string(),
            prefix: String::new(),
            bytes_limit: None,
            max_object_bytes: None,
            server_port: 3000,
            sweep_interval: 1,
        }
    }
}

/// Absent is `Ok(None)`; present but unparseable is a config error.
fn parsed_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|e| CacheError::Config(format!("{}={:?}: {}", name, raw, e)))
}

/// Settings key for the aggregate byte budget.
pub const BYTES_LIMIT_SETTING: &str = "bytes_limit";

/// Settings key for the per-object ceiling.
pub const MAX_OBJECT_BYTES_SETTING: &str = "max_object_bytes";

// == Cache Options ==
/// Everything an adapter needs to start: instance name, adapter kind,
/// key prefix and adapter-specific settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheOptions {
    #[serde(default)]
    pub name: String,
    pub adapter: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub settings: HashMap<String, serde_json::Value>,
}

impl CacheOptions {
    pub fn new(adapter: impl Into<String>) -> Self {
        Self {
            adapter: adapter.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    /// Reads a non-negative integer setting. Absent is `Ok(None)`; any
    /// other JSON type is a configuration error.
    pub fn setting_usize(&self, key: &str) -> Result<Option<usize>> {
        let Some(raw) = self.settings.get(key) else {
            return Ok(None);
        };
        raw.as_u64()
            .and_then(|v| usize::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| {
                CacheError::Config(format!(
                    "setting '{}' must be a non-negative integer, got {}",
                    key, raw
                ))
            })
    }
}

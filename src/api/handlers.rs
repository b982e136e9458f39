//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cacher::Cacher;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    validate_key, CounterResponse, DeleteResponse, ExistResponse, FlushResponse, GetResponse,
    HealthResponse, SetRequest, SetResponse, StatsResponse,
};
use crate::registry::AdapterRegistry;

/// Application state shared across all handlers.
///
/// Backends synchronize internally, so the cache is shared without an
/// outer lock.
#[derive(Clone)]
pub struct AppState {
    /// The configured cache backend
    pub cache: Arc<dyn Cacher>,
}

impl AppState {
    /// Creates a new AppState around a started cache.
    pub fn new(cache: Arc<dyn Cacher>) -> Self {
        Self { cache }
    }

    /// Builds the configured adapter through `registry`.
    pub fn from_config(config: &Config, registry: &AdapterRegistry) -> Result<Self> {
        let cache = registry.build(&config.cache_options())?;
        Ok(Self::new(cache))
    }
}

fn checked_key(key: String) -> Result<String> {
    match validate_key(&key) {
        Some(msg) => Err(CacheError::InvalidRequest(msg)),
        None => Ok(key),
    }
}

/// Handler for PUT /set
///
/// Stores any JSON value under a key with optional TTL.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let (key, value, ttl) = req.into_parts();
    state.cache.set_value(&key, value, ttl)?;

    Ok(Json(SetResponse::new(key)))
}

/// Handler for GET /get/:key
///
/// Returns the stored value with its type name.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let key = checked_key(key)?;
    let value = state.cache.get_value(&key, None)?;

    Ok(Json(GetResponse::new(key, &value)))
}

/// Handler for GET /exist/:key
pub async fn exist_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ExistResponse>> {
    let key = checked_key(key)?;
    let exists = state.cache.exist(&key);

    Ok(Json(ExistResponse::new(key, exists)))
}

/// Handler for POST /incr/:key
///
/// Creates the counter at 1 if the key is absent.
pub async fn incr_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<CounterResponse>> {
    let key = checked_key(key)?;
    let value = state.cache.incr(&key)?;

    Ok(Json(CounterResponse::new(key, value)))
}

/// Handler for POST /decr/:key
pub async fn decr_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<CounterResponse>> {
    let key = checked_key(key)?;
    let value = state.cache.decr(&key)?;

    Ok(Json(CounterResponse::new(key, value)))
}

/// Handler for DELETE /del/:key
///
/// Succeeds whether or not the key existed.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let key = checked_key(key)?;
    state.cache.delete(&key)?;

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for DELETE /flush
pub async fn flush_handler(State(state): State<AppState>) -> Result<Json<FlushResponse>> {
    state.cache.flush()?;
    Ok(Json(FlushResponse::new(state.cache.name())))
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.stats();
    Json(StatsResponse::new(state.cache.name(), &stats))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

//! API Module
//!
//! HTTP handlers and routing for the cache server REST API.
//!
//! # Endpoints
//! - `PUT /set` - Store a JSON value under a key
//! - `GET /get/:key` - Retrieve a value by key
//! - `GET /exist/:key` - Check whether a live entry exists
//! - `POST /incr/:key` - Increment an integer counter
//! - `POST /decr/:key` - Decrement an integer counter
//! - `DELETE /del/:key` - Delete a key
//! - `DELETE /flush` - Remove every entry
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;

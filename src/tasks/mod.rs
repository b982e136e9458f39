//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expiry sweep: purges expired cache entries at a configured interval

mod sweep;

pub use sweep::{spawn_expiry_sweep, SweepHandle};

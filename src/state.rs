//! Application state management
//!
//! Contains shared state accessible across all handlers.
//! All storage is backed by PostgreSQL; every handler checks out its own
//! pooled client for the duration of the request.

use deadpool_postgres::Pool;
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    /// Database connection pool (required)
    pub db_pool: Pool,
}

impl AppState {
    pub fn new(pool: Pool) -> Self {
        Self { db_pool: pool }
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;

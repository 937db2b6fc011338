//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::services::FarmReportEngine;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    engine: FarmReportEngine,
    pool: Option<PgPool>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `engine` - Report engine wired to its store and providers
    /// * `pool` - Pool backing the store, checked by the readiness probe;
    ///   `None` when the engine runs on the in-memory store
    #[must_use]
    pub fn new(engine: FarmReportEngine, pool: Option<PgPool>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { engine, pool }),
        }
    }

    /// Get a reference to the report engine.
    #[must_use]
    pub fn engine(&self) -> &FarmReportEngine {
        &self.inner.engine
    }

    /// Get a reference to the database connection pool, if any.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }
}

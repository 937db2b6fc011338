//! Database operations for farm records.
//!
//! # Database: `farms`
//!
//! ## Tables
//!
//! - `users` - Registered users (created by the registration flow)
//! - `farms` - Farm records, each owned by exactly one user
//!
//! # Store handles
//!
//! The report engine never touches a pool directly. It receives a store
//! handle implementing [`UserDirectory`] and [`FarmStore`]:
//!
//! - [`PgStore`] - `PostgreSQL` via the repositories in [`users`] and [`farms`]
//! - [`MemoryStore`] - in-process maps with identical semantics, for tests and
//!   local runs without a database
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p farm-report-cli -- migrate
//! ```

pub mod farms;
pub mod memory;
pub mod store;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use farm_report_core::{Cohort, FarmId, UserId};

pub use farms::FarmRepository;
pub use memory::MemoryStore;
pub use store::{FarmStore, UserDirectory};
pub use users::{NewUser, UserRepository};

use crate::models::{Farm, NewFarm, User};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email, unknown owner).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// `PostgreSQL`-backed store handle.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserDirectory for PgStore {
    async fn find_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        UserRepository::new(&self.pool).get_by_id(id).await
    }
}

#[async_trait]
impl FarmStore for PgStore {
    async fn create_farm(&self, farm: NewFarm) -> Result<Farm, RepositoryError> {
        FarmRepository::new(&self.pool).create(&farm).await
    }

    async fn find_farm(&self, id: FarmId) -> Result<Option<Farm>, RepositoryError> {
        FarmRepository::new(&self.pool).get_by_id(id).await
    }

    async fn delete_farm(&self, id: FarmId) -> Result<Farm, RepositoryError> {
        FarmRepository::new(&self.pool)
            .delete(id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn query_cohort(&self, cohort: Cohort) -> Result<Vec<Farm>, RepositoryError> {
        FarmRepository::new(&self.pool).list_cohort(cohort).await
    }
}

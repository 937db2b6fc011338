//! Store traits consumed by the report engine.

use async_trait::async_trait;

use farm_report_core::{Cohort, FarmId, UserId};

use super::RepositoryError;
use crate::models::{Farm, NewFarm, User};

/// Read access to registered users.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Look up a user by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the lookup itself fails.
    async fn find_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
}

/// Farm persistence plus the cohort query.
#[async_trait]
pub trait FarmStore: Send + Sync {
    /// Insert a farm and return it with its generated id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the owner does not exist.
    async fn create_farm(&self, farm: NewFarm) -> Result<Farm, RepositoryError>;

    /// Look up a farm by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the lookup itself fails.
    async fn find_farm(&self, id: FarmId) -> Result<Option<Farm>, RepositoryError>;

    /// Hard-delete a farm, returning the removed record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no farm has this id.
    async fn delete_farm(&self, id: FarmId) -> Result<Farm, RepositoryError>;

    /// Farms in `cohort`, relative to 30% of the live fleet-wide average
    /// yield, ordered by name ascending.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    async fn query_cohort(&self, cohort: Cohort) -> Result<Vec<Farm>, RepositoryError>;
}

//! Farm report engine.
//!
//! Every operation runs the same prefix: resolve the credential, then load
//! the caller. Create and delete then perform a single store action. The
//! report queries a yield cohort and enriches each row with the driving
//! distance from the farm to the caller's address.
//!
//! # Enrichment
//!
//! Distance lookups for a report run concurrently, bounded by
//! [`EnrichmentConfig::max_in_flight`], and each lookup is cut off after
//! [`EnrichmentConfig::timeout`]. A failed or timed-out lookup yields a row
//! with `driving_distance: None`; it never fails the report. Rows keep the
//! cohort's name order regardless of which lookup finishes first.

mod commands;

use std::sync::Arc;

use futures::future::join_all;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{info, instrument, warn};

use farm_report_core::{Distance, FarmId, UserId};

pub use commands::{CreateFarm, DeleteFarm, FarmReportQuery};

use super::guard::OwnershipGuard;
use super::identity::{IdentityError, IdentityResolver};
use super::maps::{DistanceProvider, Geocoder, geocode_or_origin};
use crate::config::EnrichmentConfig;
use crate::db::{FarmStore, RepositoryError, UserDirectory};
use crate::models::{Farm, NewFarm, RemovedFarm, ReportRow, User};

/// Errors from farm operations.
///
/// Everything except `Repository` is a domain rejection of the request.
#[derive(Debug, Error)]
pub enum FarmError {
    #[error("{0}")]
    CredentialInvalid(String),

    #[error("{0}")]
    CredentialExpired(String),

    #[error("User with id: {0} doesn't exist")]
    UnknownCaller(UserId),

    #[error("Farm with id: {0} doesn't exist")]
    FarmNotFound(FarmId),

    #[error("User with id: {caller} is not authorized to delete farm with id: {farm}")]
    NotOwner { caller: UserId, farm: FarmId },

    #[error("No farm retrieved")]
    NoFarmsFound,

    /// Store failure; not the caller's fault.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl FarmError {
    /// Stable error name reported to clients.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::CredentialInvalid(_) => "CredentialInvalid",
            Self::CredentialExpired(_) => "CredentialExpired",
            Self::UnknownCaller(_) => "UnknownCaller",
            Self::FarmNotFound(_) => "FarmNotFound",
            Self::NotOwner { .. } => "NotOwner",
            Self::NoFarmsFound => "NoFarmsFound",
            Self::Repository(_) => "InternalError",
        }
    }

    /// Whether this error rejects the request rather than reporting a fault.
    #[must_use]
    pub const fn is_domain(&self) -> bool {
        !matches!(self, Self::Repository(_))
    }
}

impl From<IdentityError> for FarmError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Invalid(message) => Self::CredentialInvalid(message),
            IdentityError::Expired(message) => Self::CredentialExpired(message),
        }
    }
}

/// Collaborators handed to the engine at construction.
#[derive(Clone)]
pub struct Collaborators {
    pub identity: Arc<dyn IdentityResolver>,
    pub users: Arc<dyn UserDirectory>,
    pub farms: Arc<dyn FarmStore>,
    pub geocoder: Arc<dyn Geocoder>,
    pub distances: Arc<dyn DistanceProvider>,
}

/// Orchestrates identity, ownership, persistence and distance enrichment.
pub struct FarmReportEngine {
    deps: Collaborators,
    limits: EnrichmentConfig,
}

impl FarmReportEngine {
    #[must_use]
    pub const fn new(deps: Collaborators, limits: EnrichmentConfig) -> Self {
        Self { deps, limits }
    }

    fn guard(&self) -> OwnershipGuard<'_> {
        OwnershipGuard::new(self.deps.users.as_ref())
    }

    async fn resolve_caller(&self, credential: &str) -> Result<User, FarmError> {
        let caller_id = self.deps.identity.resolve(credential)?;
        self.guard().ensure_caller_exists(caller_id).await
    }

    /// Create a farm owned by the caller.
    ///
    /// Coordinates are geocoded from the address; a geocoding failure stores
    /// the origin instead of rejecting the farm.
    ///
    /// # Errors
    ///
    /// Credential errors, `UnknownCaller`, or `Repository`.
    #[instrument(skip_all, fields(name = %cmd.name))]
    pub async fn create_farm(&self, cmd: CreateFarm) -> Result<Farm, FarmError> {
        let caller = self.resolve_caller(&cmd.credential).await?;
        let coordinates = geocode_or_origin(self.deps.geocoder.as_ref(), &cmd.address).await;

        let farm = self
            .deps
            .farms
            .create_farm(NewFarm {
                owner_id: caller.id,
                name: cmd.name,
                address: cmd.address,
                coordinates,
                size: cmd.size,
                farm_yield: cmd.farm_yield,
            })
            .await
            .map_err(|e| match e {
                // Owner removed between lookup and insert.
                RepositoryError::Conflict(_) => FarmError::UnknownCaller(caller.id),
                e => e.into(),
            })?;

        info!(farm_id = %farm.id, owner_id = %caller.id, "Farm created");
        Ok(farm)
    }

    /// Delete one of the caller's farms.
    ///
    /// # Errors
    ///
    /// Credential errors, `UnknownCaller`, `FarmNotFound`, `NotOwner`, or
    /// `Repository`. A rejected delete leaves the farm in place.
    #[instrument(skip_all, fields(farm_id = %cmd.id))]
    pub async fn delete_farm(&self, cmd: DeleteFarm) -> Result<RemovedFarm, FarmError> {
        let caller = self.resolve_caller(&cmd.credential).await?;

        let farm = self
            .deps
            .farms
            .find_farm(cmd.id)
            .await?
            .ok_or(FarmError::FarmNotFound(cmd.id))?;
        OwnershipGuard::ensure_owner(&farm, caller.id)?;

        let removed = self
            .deps
            .farms
            .delete_farm(cmd.id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => FarmError::FarmNotFound(cmd.id),
                e => e.into(),
            })?;

        info!(owner_id = %caller.id, "Farm deleted");
        Ok(removed.into_removed())
    }

    /// Yield report for one cohort, enriched with driving distances to the
    /// caller's address.
    ///
    /// # Errors
    ///
    /// Credential errors, `UnknownCaller`, `NoFarmsFound` when the cohort is
    /// empty, or `Repository`.
    #[instrument(skip_all, fields(cohort = %query.cohort))]
    pub async fn report(&self, query: FarmReportQuery) -> Result<Vec<ReportRow>, FarmError> {
        let caller = self.resolve_caller(&query.credential).await?;

        let farms = self.deps.farms.query_cohort(query.cohort).await?;
        if farms.is_empty() {
            return Err(FarmError::NoFarmsFound);
        }

        let distances = self.enrich(&farms, &caller.address).await;
        let resolved = distances.iter().filter(|d| d.is_some()).count();
        info!(rows = farms.len(), resolved, "Report assembled");

        Ok(farms
            .into_iter()
            .zip(distances)
            .map(|(farm, driving_distance)| ReportRow {
                name: farm.name,
                address: farm.address,
                owner: caller.email.clone(),
                size: farm.size,
                farm_yield: farm.farm_yield,
                driving_distance,
            })
            .collect())
    }

    /// One distance per farm, in the order of `farms`.
    async fn enrich(&self, farms: &[Farm], destination: &str) -> Vec<Option<Distance>> {
        let permits = Semaphore::new(self.limits.max_in_flight.max(1));
        let timeout = self.limits.timeout;

        let lookups = farms.iter().map(|farm| {
            let permits = &permits;
            async move {
                let _permit = permits.acquire().await.ok()?;
                let lookup = self.deps.distances.distance_between(&farm.address, destination);

                match tokio::time::timeout(timeout, lookup).await {
                    Ok(Ok(distance)) => Some(distance),
                    Ok(Err(e)) => {
                        warn!(farm_id = %farm.id, error = %e, "Distance lookup failed");
                        None
                    }
                    Err(_) => {
                        warn!(
                            farm_id = %farm.id,
                            timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                            "Distance lookup timed out"
                        );
                        None
                    }
                }
            }
        });

        join_all(lookups).await
    }
}

//! In-process store with the same semantics as [`super::PgStore`].
//!
//! Cohorts are ordered by byte-wise name comparison, matching the
//! `COLLATE "C"` ordering of the SQL query.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use farm_report_core::{Cohort, FarmId, UserId, fleet_average, yield_threshold};

use super::{FarmStore, RepositoryError, UserDirectory};
use crate::models::{Farm, NewFarm, User};

/// Store backed by hash maps behind an async `RwLock`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<UserId, User>>,
    farms: RwLock<HashMap<FarmId, Farm>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user, replacing any existing user with the same id.
    pub async fn insert_user(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }

    /// Number of stored farms.
    pub async fn farm_count(&self) -> usize {
        self.farms.read().await.len()
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().await.get(&id).cloned())
    }
}

#[async_trait]
impl FarmStore for MemoryStore {
    async fn create_farm(&self, farm: NewFarm) -> Result<Farm, RepositoryError> {
        if !self.users.read().await.contains_key(&farm.owner_id) {
            return Err(RepositoryError::Conflict(format!(
                "unknown owner {}",
                farm.owner_id
            )));
        }

        let farm = Farm {
            id: FarmId::generate(),
            name: farm.name,
            address: farm.address,
            coordinates: farm.coordinates,
            size: farm.size,
            farm_yield: farm.farm_yield,
            owner_id: farm.owner_id,
        };
        self.farms.write().await.insert(farm.id, farm.clone());
        Ok(farm)
    }

    async fn find_farm(&self, id: FarmId) -> Result<Option<Farm>, RepositoryError> {
        Ok(self.farms.read().await.get(&id).cloned())
    }

    async fn delete_farm(&self, id: FarmId) -> Result<Farm, RepositoryError> {
        self.farms
            .write()
            .await
            .remove(&id)
            .ok_or(RepositoryError::NotFound)
    }

    async fn query_cohort(&self, cohort: Cohort) -> Result<Vec<Farm>, RepositoryError> {
        let farms = self.farms.read().await;
        if farms.is_empty() {
            return Ok(Vec::new());
        }
        let yields: Vec<_> = farms.values().map(|f| f.farm_yield).collect();
        let average = fleet_average(&yields).ok_or_else(|| {
            RepositoryError::DataCorruption(format!(
                "total yield of {} farms overflows",
                yields.len()
            ))
        })?;
        let threshold = yield_threshold(average);

        let mut selected: Vec<Farm> = farms
            .values()
            .filter(|f| cohort.admits(f.farm_yield, threshold))
            .cloned()
            .collect();
        selected.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(selected)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use farm_report_core::{Coordinates, Email};

    use super::*;

    fn user() -> User {
        User {
            id: UserId::generate(),
            email: Email::parse("grower@example.com").unwrap(),
            address: "1 Home Rd".to_owned(),
            coordinates: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn new_farm(owner: UserId, name: &str, farm_yield: &str) -> NewFarm {
        NewFarm {
            owner_id: owner,
            name: name.to_owned(),
            address: format!("{name} Lane"),
            coordinates: Coordinates::ORIGIN,
            size: Decimal::TEN,
            farm_yield: farm_yield.parse().unwrap(),
        }
    }

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        let owner = user();
        let owner_id = owner.id;
        store.insert_user(owner).await;
        for (name, y) in [("E", "1.5"), ("C", "12"), ("A", "8.5"), ("D", "2"), ("B", "9.5")] {
            store.create_farm(new_farm(owner_id, name, y)).await.unwrap();
        }
        store
    }

    fn names(farms: &[Farm]) -> Vec<&str> {
        farms.iter().map(|f| f.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_cohorts_are_sorted_by_name() {
        let store = seeded().await;

        let outliers = store.query_cohort(Cohort::Outliers).await.unwrap();
        assert_eq!(names(&outliers), ["D", "E"]);

        let normal = store.query_cohort(Cohort::Normal).await.unwrap();
        assert_eq!(names(&normal), ["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_empty_store_yields_empty_cohorts() {
        let store = MemoryStore::new();
        assert!(store.query_cohort(Cohort::Outliers).await.unwrap().is_empty());
        assert!(store.query_cohort(Cohort::Normal).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_threshold_tracks_current_fleet() {
        let store = seeded().await;
        let owner_id = store.users.read().await.keys().copied().next().unwrap();

        // Average becomes (33.5 + 100) / 6 = 22.25, threshold 6.675.
        store
            .create_farm(new_farm(owner_id, "F", "100"))
            .await
            .unwrap();

        let outliers = store.query_cohort(Cohort::Outliers).await.unwrap();
        assert_eq!(names(&outliers), ["D", "E"]);
        let normal = store.query_cohort(Cohort::Normal).await.unwrap();
        assert_eq!(names(&normal), ["A", "B", "C", "F"]);

        let f = normal.iter().find(|f| f.name == "F").unwrap().id;
        store.delete_farm(f).await.unwrap();
        store.create_farm(new_farm(owner_id, "G", "200")).await.unwrap();

        // (33.5 + 200) / 6 = 38.91.., threshold 11.675: only C and G stay normal.
        let normal = store.query_cohort(Cohort::Normal).await.unwrap();
        assert_eq!(names(&normal), ["C", "G"]);
    }

    async fn store_with(farms: &[(&str, &str)]) -> MemoryStore {
        let store = MemoryStore::new();
        let owner = user();
        let owner_id = owner.id;
        store.insert_user(owner).await;
        for (name, y) in farms {
            store.create_farm(new_farm(owner_id, name, y)).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_farm_on_threshold_is_in_neither_cohort() {
        // Average (3 * 37 + 9) / 4 = 30, threshold exactly 9.
        let store = store_with(&[("A", "37"), ("B", "37"), ("C", "37"), ("Tie", "9")]).await;

        assert!(store.query_cohort(Cohort::Outliers).await.unwrap().is_empty());
        let normal = store.query_cohort(Cohort::Normal).await.unwrap();
        assert_eq!(names(&normal), ["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_overflowing_yields_are_an_error() {
        let max = Decimal::MAX.to_string();
        let store = store_with(&[("A", max.as_str()), ("B", max.as_str())]).await;

        for cohort in [Cohort::Outliers, Cohort::Normal] {
            assert!(matches!(
                store.query_cohort(cohort).await,
                Err(RepositoryError::DataCorruption(_))
            ));
        }
        // The read lock was released.
        assert_eq!(store.farm_count().await, 2);
    }

    #[tokio::test]
    async fn test_names_sort_bytewise() {
        let store = store_with(&[("alpha", "10"), ("Bravo", "10"), ("charlie", "10")]).await;

        let normal = store.query_cohort(Cohort::Normal).await.unwrap();
        assert_eq!(names(&normal), ["Bravo", "alpha", "charlie"]);
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_owner() {
        let store = MemoryStore::new();
        let result = store
            .create_farm(new_farm(UserId::generate(), "Orphan", "1"))
            .await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
        assert_eq!(store.farm_count().await, 0);
    }

    #[tokio::test]
    async fn test_delete_returns_removed_farm_once() {
        let store = MemoryStore::new();
        let owner = user();
        let owner_id = owner.id;
        store.insert_user(owner).await;
        let farm = store
            .create_farm(new_farm(owner_id, "Gone", "3"))
            .await
            .unwrap();

        let removed = store.delete_farm(farm.id).await.unwrap();
        assert_eq!(removed, farm);
        assert!(store.find_farm(farm.id).await.unwrap().is_none());
        assert!(matches!(
            store.delete_farm(farm.id).await,
            Err(RepositoryError::NotFound)
        ));
    }
}

//! `PgStore` against a real database.
//!
//! These tests require:
//! - A running `PostgreSQL` database reachable via `FARMS_DATABASE_URL`
//! - A scratch database: every test truncates `users` and `farms`
//!
//! Run with: cargo test -p farm-report-integration-tests -- --ignored --test-threads=1

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use sqlx::PgPool;

use farm_report_core::{Cohort, Coordinates, Email, FarmId};
use farm_report_server::db::{FarmStore, NewUser, PgStore, RepositoryError, UserDirectory, UserRepository};
use farm_report_server::models::{NewFarm, User};

async fn fresh_store() -> PgStore {
    let url = std::env::var("FARMS_DATABASE_URL").expect("FARMS_DATABASE_URL must be set");
    let pool = PgPool::connect(&url).await.unwrap();
    sqlx::migrate!("../server/migrations").run(&pool).await.unwrap();
    UserRepository::new(&pool).truncate_all().await.unwrap();
    PgStore::new(pool)
}

async fn user(store: &PgStore, email: &str) -> User {
    UserRepository::new(store.pool())
        .create(&NewUser {
            email: Email::parse(email).unwrap(),
            hashed_password: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_owned(),
            address: "Main St 1".to_owned(),
            coordinates: Coordinates::new(56.0, 10.0).ok(),
        })
        .await
        .unwrap()
}

fn farm(owner: &User, name: &str, farm_yield: &str) -> NewFarm {
    NewFarm {
        owner_id: owner.id,
        name: name.to_owned(),
        address: format!("{name} Road"),
        coordinates: Coordinates::new(55.5, 9.75).unwrap(),
        size: "3.5".parse().unwrap(),
        farm_yield: farm_yield.parse().unwrap(),
    }
}

#[tokio::test]
#[ignore = "Requires PostgreSQL via FARMS_DATABASE_URL"]
async fn test_user_round_trip_keeps_coordinates() {
    let store = fresh_store().await;
    let created = user(&store, "grower@example.com").await;

    let found = store.find_user(created.id).await.unwrap().unwrap();
    assert_eq!(found.email.as_str(), "grower@example.com");
    assert_eq!(found.coordinates, Coordinates::new(56.0, 10.0).ok());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL via FARMS_DATABASE_URL"]
async fn test_duplicate_email_is_conflict() {
    let store = fresh_store().await;
    user(&store, "dup@example.com").await;

    let err = UserRepository::new(store.pool())
        .create(&NewUser {
            email: Email::parse("dup@example.com").unwrap(),
            hashed_password: "x".to_owned(),
            address: String::new(),
            coordinates: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL via FARMS_DATABASE_URL"]
async fn test_cohort_query_matches_sample_fleet() {
    let store = fresh_store().await;
    let owner = user(&store, "grower@example.com").await;
    for (name, y) in [("E", "1.5"), ("C", "12"), ("A", "8.5"), ("D", "2"), ("B", "9.5")] {
        store.create_farm(farm(&owner, name, y)).await.unwrap();
    }

    let outliers: Vec<_> = store
        .query_cohort(Cohort::Outliers)
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();
    let normal: Vec<_> = store
        .query_cohort(Cohort::Normal)
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();

    assert_eq!(outliers, ["D", "E"]);
    assert_eq!(normal, ["A", "B", "C"]);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL via FARMS_DATABASE_URL"]
async fn test_farm_create_find_delete() {
    let store = fresh_store().await;
    let owner = user(&store, "grower@example.com").await;

    let created = store.create_farm(farm(&owner, "North", "4.25")).await.unwrap();
    assert_eq!(created.coordinates, Coordinates::new(55.5, 9.75).unwrap());
    assert_eq!(created.farm_yield, "4.25".parse::<Decimal>().unwrap());
    assert_eq!(store.find_farm(created.id).await.unwrap(), Some(created.clone()));

    let removed = store.delete_farm(created.id).await.unwrap();
    assert_eq!(removed, created);
    assert!(matches!(
        store.delete_farm(created.id).await,
        Err(RepositoryError::NotFound)
    ));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL via FARMS_DATABASE_URL"]
async fn test_farm_for_unknown_owner_is_conflict() {
    let store = fresh_store().await;
    let owner = user(&store, "grower@example.com").await;
    let mut orphan = farm(&owner, "Orphan", "1");
    orphan.owner_id = farm_report_core::UserId::generate();

    assert!(matches!(
        store.create_farm(orphan).await,
        Err(RepositoryError::Conflict(_))
    ));
    assert!(store.find_farm(FarmId::generate()).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL via FARMS_DATABASE_URL"]
async fn test_cohort_names_sort_bytewise() {
    let store = fresh_store().await;
    let owner = user(&store, "grower@example.com").await;
    for name in ["alpha", "Bravo", "charlie"] {
        store.create_farm(farm(&owner, name, "10")).await.unwrap();
    }

    let normal: Vec<_> = store
        .query_cohort(Cohort::Normal)
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(normal, ["Bravo", "alpha", "charlie"]);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL via FARMS_DATABASE_URL"]
async fn test_yield_above_cap_is_rejected_by_schema() {
    let store = fresh_store().await;
    let owner = user(&store, "grower@example.com").await;

    assert!(matches!(
        store.create_farm(farm(&owner, "Huge", "1000000000.1")).await,
        Err(RepositoryError::Database(_))
    ));
}

//! Integration test harness for the Farm Report API.
//!
//! Builds the real router over the in-memory store, a real JWT resolver and a
//! scripted maps provider, then drives it with `tower::ServiceExt::oneshot`.
//! No socket, database or network is needed.
//!
//! Tests that need `PostgreSQL` live in `tests/postgres_store.rs` and are
//! ignored unless run explicitly:
//!
//! ```bash
//! FARMS_DATABASE_URL=postgres://... cargo test -p farm-report-integration-tests -- --ignored
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use secrecy::SecretString;
use serde::Serialize;
use serde_json::Value;
use tower::ServiceExt;

use farm_report_core::{Coordinates, Distance, Email, UserId};
use farm_report_server::config::EnrichmentConfig;
use farm_report_server::db::MemoryStore;
use farm_report_server::models::User;
use farm_report_server::routes;
use farm_report_server::services::{
    Collaborators, DistanceProvider, FarmReportEngine, Geocoder, JwtIdentityResolver, MapsError,
};
use farm_report_server::state::AppState;

/// Signing secret shared by the harness and its resolver.
pub const JWT_SECRET: &str = "int3gration-t3sts-hs256-k3y-0f-adequate-length";

/// Scripted stand-in for the maps provider.
///
/// Distances are `len(origin)` kilometres so each row is recognisable.
#[derive(Debug, Clone, Copy)]
pub struct StubMaps {
    pub coordinates: Option<Coordinates>,
    pub reachable: bool,
}

impl Default for StubMaps {
    fn default() -> Self {
        Self {
            coordinates: Coordinates::new(56.1629, 10.2039).ok(),
            reachable: true,
        }
    }
}

impl StubMaps {
    /// Distance the stub reports for a farm at `origin`.
    #[must_use]
    pub fn distance_for(origin: &str) -> Distance {
        let km = origin.len() as u64;
        Distance::new(format!("{km} km"), km * 1000)
    }
}

#[async_trait]
impl Geocoder for StubMaps {
    async fn geocode(&self, _address: &str) -> Result<Coordinates, MapsError> {
        self.coordinates.ok_or(MapsError::NoResult("stub geocoder"))
    }
}

#[async_trait]
impl DistanceProvider for StubMaps {
    async fn distance_between(
        &self,
        origin: &str,
        _destination: &str,
    ) -> Result<Distance, MapsError> {
        if self.reachable {
            Ok(Self::distance_for(origin))
        } else {
            Err(MapsError::Status {
                status: "UNKNOWN_ERROR".to_owned(),
                message: "stub unreachable".to_owned(),
            })
        }
    }
}

/// A registered user plus a ready-to-send credential.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: UserId,
    pub email: String,
    pub bearer: String,
}

#[derive(Serialize)]
struct Claims<'a> {
    id: UserId,
    email: &'a str,
    iat: i64,
    exp: i64,
}

/// Sign a token for `id` that expires `ttl_secs` from now.
#[must_use]
pub fn mint_token(id: UserId, email: &str, ttl_secs: i64) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        id,
        email,
        iat: now,
        exp: now + ttl_secs,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

/// The application under test.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        Self::with_maps(StubMaps::default())
    }

    #[must_use]
    pub fn with_maps(maps: StubMaps) -> Self {
        let store = Arc::new(MemoryStore::new());
        let maps = Arc::new(maps);
        let engine = FarmReportEngine::new(
            Collaborators {
                identity: Arc::new(JwtIdentityResolver::new(&SecretString::from(JWT_SECRET))),
                users: store.clone(),
                farms: store.clone(),
                geocoder: maps.clone(),
                distances: maps,
            },
            EnrichmentConfig::default(),
        );

        Self {
            router: routes::app(AppState::new(engine, None)),
            store,
        }
    }

    /// Register a user directly in the store, as the registration flow would.
    pub async fn register(&self, email: &str, address: &str) -> TestUser {
        let id = UserId::generate();
        self.store
            .insert_user(User {
                id,
                email: Email::parse(email).unwrap(),
                address: address.to_owned(),
                coordinates: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .await;

        TestUser {
            id,
            email: email.to_owned(),
            bearer: format!("Bearer {}", mint_token(id, email, 3600)),
        }
    }

    /// POST a JSON body, optionally with an `Authorization` header.
    pub async fn post(&self, path: &str, authorization: Option<&str>, body: &Value) -> (StatusCode, Value) {
        let mut request = Request::post(path).header(header::CONTENT_TYPE, "application/json");
        if let Some(value) = authorization {
            request = request.header(header::AUTHORIZATION, value);
        }
        self.send(request.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// GET `path`, returning only the status.
    pub async fn get_status(&self, path: &str) -> StatusCode {
        let request = Request::get(path).body(Body::empty()).unwrap();
        self.router.clone().oneshot(request).await.unwrap().status()
    }

    /// Send a raw request and decode the JSON response (`Null` when empty).
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    /// Create a farm as `user`, asserting success; returns the farm JSON.
    pub async fn create_farm(&self, user: &TestUser, name: &str, farm_yield: &str) -> Value {
        let (status, body) = self
            .post(
                "/api/v1/farms/create",
                Some(&user.bearer),
                &serde_json::json!({
                    "name": name,
                    "address": format!("{name} Road 1"),
                    "size": "12.5",
                    "yield": farm_yield,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }
}

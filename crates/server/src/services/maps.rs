//! Google Maps adapter for geocoding and driving distances.
//!
//! Both lookups are enrichment: callers decide how to degrade when they fail.
//! Successful distance lookups are cached for 15 minutes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use farm_report_core::{Coordinates, Distance};

use crate::config::MapsConfig;

const STATUS_OK: &str = "OK";

/// Errors that can occur when calling the maps API.
#[derive(Debug, Error)]
pub enum MapsError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request URL could not be built.
    #[error("invalid request URL: {0}")]
    Url(#[from] url::ParseError),

    /// API returned a non-success HTTP status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// API answered but reported a failure status.
    #[error("maps status {status}: {message}")]
    Status { status: String, message: String },

    /// Response was well-formed but carried no usable result.
    #[error("no result: {0}")]
    NoResult(&'static str),

    /// Returned coordinates were out of range.
    #[error("invalid coordinates: {0}")]
    Coordinates(#[from] farm_report_core::CoordinatesError),
}

/// Resolves a free-text address to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// # Errors
    ///
    /// Returns `MapsError` when the provider fails or finds nothing.
    async fn geocode(&self, address: &str) -> Result<Coordinates, MapsError>;
}

/// Computes the driving distance between two free-text addresses.
#[async_trait]
pub trait DistanceProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns `MapsError` when the provider fails or has no route.
    async fn distance_between(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<Distance, MapsError>;
}

/// Geocode `address`, substituting [`Coordinates::ORIGIN`] on any failure.
pub async fn geocode_or_origin(geocoder: &dyn Geocoder, address: &str) -> Coordinates {
    match geocoder.geocode(address).await {
        Ok(coordinates) => coordinates,
        Err(e) => {
            warn!(error = %e, "geocoding failed, storing origin coordinates");
            Coordinates::ORIGIN
        }
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct DistanceMatrixResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    rows: Vec<MatrixRow>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    #[serde(default)]
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    status: String,
    #[serde(default)]
    distance: Option<Distance>,
}

fn check_status(status: String, message: Option<String>) -> Result<(), MapsError> {
    if status == STATUS_OK {
        return Ok(());
    }
    Err(MapsError::Status {
        status,
        message: message.unwrap_or_default(),
    })
}

// =============================================================================
// GoogleMapsClient
// =============================================================================

/// Client for the Google Geocoding and Distance Matrix APIs.
#[derive(Clone)]
pub struct GoogleMapsClient {
    inner: Arc<GoogleMapsClientInner>,
}

struct GoogleMapsClientInner {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    distances: Cache<(String, String), Distance>,
}

impl std::fmt::Debug for GoogleMapsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleMapsClient")
            .field("base_url", &self.inner.base_url)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl GoogleMapsClient {
    /// Create a new maps client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &MapsConfig) -> Result<Self, MapsError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        let distances = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(Duration::from_secs(15 * 60))
            .build();

        Ok(Self {
            inner: Arc::new(GoogleMapsClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_owned(),
                api_key: config.api_key.clone(),
                distances,
            }),
        })
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, MapsError> {
        let key = self.inner.api_key.expose_secret();
        let params = params.iter().copied().chain([("key", key)]);
        Ok(Url::parse_with_params(
            &format!("{}/{path}", self.inner.base_url),
            params,
        )?)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, MapsError> {
        let response = self.inner.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MapsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl Geocoder for GoogleMapsClient {
    #[instrument(skip(self))]
    async fn geocode(&self, address: &str) -> Result<Coordinates, MapsError> {
        let url = self.endpoint("geocode/json", &[("address", address)])?;
        let body: GeocodeResponse = self.get_json(url).await?;
        check_status(body.status, body.error_message)?;

        let location = body
            .results
            .into_iter()
            .next()
            .ok_or(MapsError::NoResult("geocode returned no results"))?
            .geometry
            .location;

        Ok(Coordinates::new(location.lat, location.lng)?)
    }
}

#[async_trait]
impl DistanceProvider for GoogleMapsClient {
    #[instrument(skip(self))]
    async fn distance_between(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<Distance, MapsError> {
        let cache_key = (origin.to_owned(), destination.to_owned());
        if let Some(distance) = self.inner.distances.get(&cache_key).await {
            debug!("Cache hit for distance");
            return Ok(distance);
        }

        let url = self.endpoint(
            "distancematrix/json",
            &[
                ("origins", origin),
                ("destinations", destination),
                ("units", "metric"),
            ],
        )?;
        let body: DistanceMatrixResponse = self.get_json(url).await?;
        check_status(body.status, body.error_message)?;

        let element = body
            .rows
            .into_iter()
            .next()
            .and_then(|row| row.elements.into_iter().next())
            .ok_or(MapsError::NoResult("distance matrix returned no elements"))?;
        check_status(element.status, None)?;
        let distance = element
            .distance
            .ok_or(MapsError::NoResult("distance matrix element has no distance"))?;

        self.inner.distances.insert(cache_key, distance.clone()).await;
        Ok(distance)
    }
}

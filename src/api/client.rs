//! HTTP client for the AQI prediction backend
//!
//! Issues the `/predict` and `/weather` POST requests and classifies every
//! failure path into a fixed error taxonomy. The client is a stateless
//! transform from (city, endpoint) to a payload or a typed error; it owns
//! no cache and no orchestration state.

use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use super::{AirQualityPayload, WeatherPayload};

/// Base URL for the prediction backend
const DEFAULT_BASE_URL: &str = "https://backendairquality.onrender.com";

/// Request timeout for the primary endpoints, in seconds
///
/// Generous because the backing service is a free-tier deployment that can
/// take most of a minute to cold-start.
pub const PRIMARY_TIMEOUT_SECS: u64 = 60;

/// Error classification, mutually exclusive per failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    TimeoutError,
    NetworkError,
    AuthError,
    ClientError,
    NotFound,
    RateLimit,
    ServerError,
    DataError,
    LocationError,
}

/// Errors produced by the fetch clients
///
/// Variants are checked in a fixed precedence order: transport-level
/// failures first (timeout, then no-response), then HTTP status, then body
/// validation. A 404 with a malformed body is therefore `NotFound`, not
/// `InvalidData`.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request exceeded the configured timeout
    #[error("Request timed out after {0} seconds. The prediction service may be starting up; try again shortly.")]
    Timeout(u64),

    /// No response was received at all (DNS or connection failure)
    #[error("Could not reach the prediction service. Check your internet connection.")]
    Network(#[source] reqwest::Error),

    /// HTTP 401 or 403
    #[error("Not authorized to query the prediction service (HTTP {0}).")]
    Auth(u16),

    /// HTTP 400
    #[error("The prediction service rejected the request (HTTP 400).")]
    BadRequest,

    /// HTTP 404; carries the city that was requested
    #[error("No data found for city \"{0}\". Check the spelling of the city name.")]
    NotFound(String),

    /// HTTP 429
    #[error("Too many requests; the prediction service is rate limiting (HTTP 429).")]
    RateLimit,

    /// HTTP 5xx or any other unexpected status
    #[error("The prediction service failed (HTTP {0}). Try again later.")]
    Server(u16),

    /// Response body failed validation
    #[error("Invalid data received from the prediction service.")]
    InvalidData,

    /// Geolocation / reverse-geocoding failure
    #[error("Unable to resolve location: {0}")]
    Location(String),
}

impl FetchError {
    /// The taxonomy kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Timeout(_) => ErrorKind::TimeoutError,
            FetchError::Network(_) => ErrorKind::NetworkError,
            FetchError::Auth(_) => ErrorKind::AuthError,
            FetchError::BadRequest => ErrorKind::ClientError,
            FetchError::NotFound(_) => ErrorKind::NotFound,
            FetchError::RateLimit => ErrorKind::RateLimit,
            FetchError::Server(_) => ErrorKind::ServerError,
            FetchError::InvalidData => ErrorKind::DataError,
            FetchError::Location(_) => ErrorKind::LocationError,
        }
    }

    /// The HTTP status that produced this error, where one exists
    pub fn http_status(&self) -> Option<u16> {
        match self {
            FetchError::Auth(status) | FetchError::Server(status) => Some(*status),
            FetchError::BadRequest => Some(400),
            FetchError::NotFound(_) => Some(404),
            FetchError::RateLimit => Some(429),
            _ => None,
        }
    }

    /// Whether an immediate unchanged retry is worth offering
    ///
    /// NotFound needs a corrected city name and auth/bad-request errors need
    /// a changed request, so blind retry is not suggested for those.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            FetchError::NotFound(_) | FetchError::Auth(_) | FetchError::BadRequest
        )
    }

    /// Projects this error into the presentation-facing shape
    pub fn to_info(&self) -> ErrorInfo {
        ErrorInfo {
            kind: self.kind(),
            message: self.to_string(),
            http_status: self.http_status(),
        }
    }
}

/// Presentation-facing error shape
///
/// What the report layer consumes; it carries exactly one kind plus a
/// human-readable message, so callers never inspect raw status codes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
    pub http_status: Option<u16>,
}

/// Request body for the prediction endpoints
#[derive(Debug, Serialize)]
struct CityRequest<'a> {
    city: &'a str,
}

/// Classifies an HTTP status into an error, or passes it through
///
/// Statuses in `[200, 300)` are success. Anything else maps to exactly one
/// taxonomy entry; unrecognized non-2xx statuses fall into `Server`.
pub(crate) fn classify_status(status: u16, city: &str) -> Option<FetchError> {
    match status {
        200..=299 => None,
        401 | 403 => Some(FetchError::Auth(status)),
        400 => Some(FetchError::BadRequest),
        404 => Some(FetchError::NotFound(city.to_string())),
        429 => Some(FetchError::RateLimit),
        _ => Some(FetchError::Server(status)),
    }
}

/// Classifies a transport-level reqwest failure
///
/// Timeouts take precedence over generic connection failures.
pub(crate) fn classify_transport(err: reqwest::Error, timeout_secs: u64) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout(timeout_secs)
    } else {
        FetchError::Network(err)
    }
}

/// Client for the AQI prediction backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_client: Client,
    base_url: String,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClient {
    /// Creates a new ApiClient against the default backend
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string())
    }

    /// Creates a new ApiClient with a custom base URL
    pub fn with_base_url(base_url: String) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(PRIMARY_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            base_url,
        }
    }

    /// Fetches the AQI prediction payload for a city
    ///
    /// On success the payload is stamped with `fetched_at` (ISO-8601) and
    /// `fetched_time` (epoch milliseconds) before it is returned.
    pub async fn fetch_air_quality(&self, city: &str) -> Result<AirQualityPayload, FetchError> {
        let mut payload: AirQualityPayload = self.post_city("/predict", city).await?;
        let now = Utc::now();
        payload.fetched_at = Some(now.to_rfc3339());
        payload.fetched_time = Some(now.timestamp_millis());
        Ok(payload)
    }

    /// Fetches the weather forecast payload for a city
    pub async fn fetch_weather(&self, city: &str) -> Result<WeatherPayload, FetchError> {
        let mut payload: WeatherPayload = self.post_city("/weather", city).await?;
        let now = Utc::now();
        payload.fetched_at = Some(now.to_rfc3339());
        payload.fetched_time = Some(now.timestamp_millis());
        Ok(payload)
    }

    /// Issues a POST with a `{"city": ...}` body and classifies the outcome
    async fn post_city<T: DeserializeOwned>(
        &self,
        path: &str,
        city: &str,
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, %city, "requesting prediction backend");

        let response = self
            .http_client
            .post(&url)
            .json(&CityRequest { city })
            .send()
            .await
            .map_err(|e| classify_transport(e, PRIMARY_TIMEOUT_SECS))?;

        // Status classification precedes body validation: a 404 with a
        // malformed body is still NotFound
        if let Some(err) = classify_status(response.status().as_u16(), city) {
            return Err(err);
        }

        let text = response.text().await.map_err(|_| FetchError::InvalidData)?;
        serde_json::from_str(&text).map_err(|_| FetchError::InvalidData)
    }
}

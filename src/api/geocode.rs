//! Reverse geocoding client
//!
//! Resolves coordinates to a city name so the active city can follow the
//! user's location. Every failure maps into the shared error taxonomy as a
//! Location error; callers decide whether to fall back to a default city.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::client::FetchError;

/// Base URL for the OpenWeatherMap geocoding API
const GEOCODE_BASE_URL: &str = "https://api.openweathermap.org/geo/1.0";

/// Timeout for geocoding lookups, in seconds
const GEOCODE_TIMEOUT_SECS: u64 = 10;

/// One place in a reverse-geocoding response
#[derive(Debug, Deserialize)]
struct GeoPlace {
    name: String,
    #[serde(default)]
    state: Option<String>,
}

/// Client for resolving coordinates to city names
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    http_client: Client,
    base_url: String,
    api_key: String,
}

impl GeocodeClient {
    /// Creates a new GeocodeClient with the given API key
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(GEOCODE_BASE_URL.to_string(), api_key)
    }

    /// Creates a new GeocodeClient with a custom base URL (for testing)
    pub fn with_base_url(base_url: String, api_key: String) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(GEOCODE_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            base_url,
            api_key,
        }
    }

    /// Resolves coordinates to a city name
    ///
    /// Returns the locality name closest to the coordinates, preferring the
    /// place name and falling back to its state. All failure paths surface
    /// as `FetchError::Location`.
    pub async fn city_for_coordinates(&self, lat: f64, lon: f64) -> Result<String, FetchError> {
        let url = format!(
            "{}/reverse?lat={}&lon={}&limit=1&appid={}",
            self.base_url, lat, lon, self.api_key
        );

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Location(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Location(format!(
                "geocoding service responded with HTTP {}",
                response.status().as_u16()
            )));
        }

        let places: Vec<GeoPlace> = response
            .json()
            .await
            .map_err(|e| FetchError::Location(e.to_string()))?;

        places
            .into_iter()
            .next()
            .map(|place| {
                if place.name.is_empty() {
                    place.state.unwrap_or_default()
                } else {
                    place.name
                }
            })
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                FetchError::Location(format!("no locality found at ({}, {})", lat, lon))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::ErrorKind;

    #[test]
    fn test_geo_place_parses_response_shape() {
        let json = r#"[{"name": "Indore", "lat": 22.72, "lon": 75.86, "country": "IN", "state": "Madhya Pradesh"}]"#;
        let places: Vec<GeoPlace> = serde_json::from_str(json).expect("Failed to parse");
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].name, "Indore");
        assert_eq!(places[0].state.as_deref(), Some("Madhya Pradesh"));
    }

    #[test]
    fn test_geo_place_tolerates_missing_state() {
        let json = r#"[{"name": "Bhopal"}]"#;
        let places: Vec<GeoPlace> = serde_json::from_str(json).expect("Failed to parse");
        assert!(places[0].state.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_service_maps_to_location_error() {
        let client =
            GeocodeClient::with_base_url("http://nonexistent.invalid".to_string(), "key".to_string());
        let err = client
            .city_for_coordinates(22.72, 75.86)
            .await
            .expect_err("lookup against a dead host must fail");
        assert_eq!(err.kind(), ErrorKind::LocationError);
    }
}

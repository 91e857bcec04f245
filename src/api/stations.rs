//! Per-station AQI telemetry from the EnvAlert network
//!
//! Best-effort enrichment data from a third-party station network. Each
//! station is fetched independently with a short timeout, and one station's
//! failure is captured into its own report without affecting the others.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

/// Base URL for the EnvAlert station network
const STATION_BASE_URL: &str = "https://erc.mp.gov.in";

/// Per-station request timeout, in seconds
///
/// Much shorter than the prediction endpoints: station telemetry is
/// auxiliary enrichment, not core data, so a slow station is dropped fast.
pub const STATION_TIMEOUT_SECS: u64 = 10;

/// Monitoring stations for each supported city
pub static CITY_STATIONS: [(&str, &[u32]); 24] = [
    ("Anuppur", &[18]),
    ("Betul", &[22]),
    ("Bhopal", &[27, 34, 10]),
    ("CTSDF", &[44]),
    ("Damoh", &[7]),
    ("Dewas", &[23, 3]),
    ("Gwalior", &[16, 29, 30, 15]),
    ("Indore", &[31, 36, 35, 37, 40, 38, 33, 13]),
    ("Jabalpur", &[41, 12, 42, 43]),
    ("Katni", &[11, 19]),
    ("Khandwa", &[32]),
    ("Khargone", &[25]),
    ("Maihar", &[8]),
    ("Mandideep", &[5]),
    ("Narsinghpur", &[26]),
    ("Neemuch", &[17]),
    ("Panna", &[39]),
    ("Pithampur", &[1]),
    ("Ratlam", &[9]),
    ("Rewa", &[20, 21]),
    ("Sagar", &[28, 14]),
    ("Satna", &[6]),
    ("Singrauli", &[4, 24]),
    ("Ujjain", &[2]),
];

/// Looks up the station ids for a city (case-insensitive)
pub fn stations_for_city(city: &str) -> Option<&'static [u32]> {
    let wanted = city.trim().to_lowercase();
    CITY_STATIONS
        .iter()
        .find(|(name, _)| name.to_lowercase() == wanted)
        .map(|(_, ids)| *ids)
}

/// Result of fetching one station's telemetry
///
/// Success and failure are both data: a failed station carries
/// `error = true` plus a message, never an `Err`, so a batch fetch always
/// yields one report per requested id.
#[derive(Debug, Clone, Serialize)]
pub struct StationReport {
    pub station_id: u32,
    /// Raw telemetry document, present on success
    pub data: Option<Value>,
    pub error: bool,
    pub error_message: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

impl StationReport {
    fn success(station_id: u32, data: Value) -> Self {
        Self {
            station_id,
            data: Some(data),
            error: false,
            error_message: None,
            fetched_at: Utc::now(),
        }
    }

    fn failure(station_id: u32, message: String) -> Self {
        Self {
            station_id,
            data: None,
            error: true,
            error_message: Some(message),
            fetched_at: Utc::now(),
        }
    }
}

/// Builds the HTTP client used for station requests
fn station_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(STATION_TIMEOUT_SECS))
        .build()
        .unwrap_or_default()
}

/// Fetches telemetry for a single station
///
/// Always resolves to a report; any failure is folded into it.
pub async fn fetch_station(station_id: u32) -> StationReport {
    fetch_station_with(&station_client(), STATION_BASE_URL, station_id).await
}

/// Classifies a station response into telemetry or an error message
///
/// Non-2xx statuses fail before the body is inspected.
fn parse_station_response(status: u16, body: &str) -> Result<Value, String> {
    if !(200..300).contains(&status) {
        return Err(format!("station responded with HTTP {}", status));
    }
    serde_json::from_str(body).map_err(|e| e.to_string())
}

async fn fetch_station_with(client: &Client, base_url: &str, station_id: u32) -> StationReport {
    let url = format!("{}/EnvAlert/Wa-CityAQI?id={}", base_url, station_id);

    let result: Result<Value, String> = async {
        let response = client
            .post(&url)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| e.to_string())?;
        parse_station_response(status, &body)
    }
    .await;

    match result {
        Ok(data) => StationReport::success(station_id, data),
        Err(message) => {
            warn!(station_id, %message, "station telemetry fetch failed");
            StationReport::failure(station_id, message)
        }
    }
}

/// Fetches telemetry for multiple stations concurrently
///
/// Fan-out/fan-in: one independent request per station id, joined with
/// `join_all` so every outcome is collected. Never short-circuits on a
/// failure; the returned vector has exactly one report per input id, in
/// input order.
pub async fn fetch_stations(station_ids: &[u32]) -> Vec<StationReport> {
    let client = station_client();
    let futures = station_ids
        .iter()
        .map(|&id| fetch_station_with(&client, STATION_BASE_URL, id));
    futures::future::join_all(futures).await
}

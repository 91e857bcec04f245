//! Core data models for the prediction backend
//!
//! This module contains the payload types returned by the air quality
//! prediction service and its weather endpoint, plus the clients that
//! fetch them.

pub mod client;
pub mod geocode;
pub mod stations;

pub use client::{ApiClient, ErrorInfo, ErrorKind, FetchError};
pub use geocode::GeocodeClient;
pub use stations::{fetch_stations, stations_for_city, StationReport, CITY_STATIONS};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One day of predicted values for a single pollutant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollutantDay {
    /// Display label for the day ("Today", "Tomorrow", weekday name)
    pub day: String,
    /// ISO date (YYYY-MM-DD)
    pub date: String,
    /// Predicted concentration
    pub value: f64,
    /// AQI sub-index for this pollutant
    pub aqi: f64,
    /// Category label assigned by the backend
    pub category: String,
    /// Health warning text assigned by the backend
    pub warning: String,
    /// Display color assigned by the backend
    pub color: String,
    /// Pollutant key, present in the today_pollutants listing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pollutant: Option<String>,
}

/// One day of the combined city-level AQI forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAqi {
    pub day: String,
    pub date: String,
    /// Pollutant driving the overall AQI that day
    pub main_pollutant: String,
    pub value: f64,
    pub aqi: f64,
    pub category: String,
    pub warning: String,
    pub color: String,
}

/// Full prediction payload for a city
///
/// The `fetched_at`/`fetched_time` pair is stamped by the client after a
/// successful fetch: an ISO-8601 string for display plus epoch milliseconds
/// for arithmetic. Both persist through the cache unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirQualityPayload {
    /// City the prediction was made for
    pub city: String,
    /// Per-pollutant daily predictions, keyed by pollutant (pm2_5, pm10, ...)
    #[serde(default)]
    pub predictions: HashMap<String, Vec<PollutantDay>>,
    /// Today's reading for each pollutant
    #[serde(default)]
    pub today_pollutants: Vec<PollutantDay>,
    /// Combined daily AQI forecast for the city
    #[serde(default)]
    pub overall_daily_aqi: Vec<DailyAqi>,
    /// Model error estimates reported by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    /// Which source (live telemetry vs model) produced each pollutant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<HashMap<String, String>>,
    /// When this payload was fetched (ISO-8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<String>,
    /// When this payload was fetched (epoch milliseconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched_time: Option<i64>,
}

/// One day of the weather forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: String,
    pub day: String,
    pub max_temp: f64,
    pub min_temp: f64,
    pub precipitation_mm: f64,
    pub max_wind_speed_kmh: f64,
}

/// Weather payload for a city
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherPayload {
    pub city: String,
    #[serde(default)]
    pub forecast: Vec<ForecastDay>,
    /// When this payload was fetched (ISO-8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<String>,
    /// When this payload was fetched (epoch milliseconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched_time: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_air_quality_payload_serialization_roundtrip() {
        let mut predictions = HashMap::new();
        predictions.insert(
            "pm2_5".to_string(),
            vec![PollutantDay {
                day: "Today".to_string(),
                date: "2026-08-26".to_string(),
                value: 54.2,
                aqi: 112.0,
                category: "Moderate".to_string(),
                warning: "Limit outdoor activities if sensitive.".to_string(),
                color: "#fb923c".to_string(),
                pollutant: None,
            }],
        );

        let payload = AirQualityPayload {
            city: "Indore".to_string(),
            predictions,
            today_pollutants: vec![],
            overall_daily_aqi: vec![],
            errors: None,
            lat: Some(22.72),
            lon: Some(75.86),
            data_source: None,
            fetched_at: Some("2026-08-26T10:00:00Z".to_string()),
            fetched_time: Some(1_787_997_600_000),
        };

        let json = serde_json::to_string(&payload).expect("Failed to serialize payload");
        let back: AirQualityPayload =
            serde_json::from_str(&json).expect("Failed to deserialize payload");

        assert_eq!(back.city, "Indore");
        assert_eq!(back.predictions["pm2_5"][0].date, "2026-08-26");
        assert_eq!(back.fetched_at.as_deref(), Some("2026-08-26T10:00:00Z"));
        assert_eq!(back.fetched_time, Some(1_787_997_600_000));
    }

    #[test]
    fn test_weather_payload_deserializes_backend_shape() {
        let json = r#"{
            "city": "Bhopal",
            "forecast": [
                {
                    "date": "2026-08-26",
                    "day": "Today",
                    "max_temp": 31.4,
                    "min_temp": 23.1,
                    "precipitation_mm": 4.2,
                    "max_wind_speed_kmh": 18.7
                },
                {
                    "date": "2026-08-27",
                    "day": "Tomorrow",
                    "max_temp": 30.0,
                    "min_temp": 22.8,
                    "precipitation_mm": 0.0,
                    "max_wind_speed_kmh": 14.2
                }
            ]
        }"#;

        let payload: WeatherPayload = serde_json::from_str(json).expect("Failed to parse");
        assert_eq!(payload.city, "Bhopal");
        assert_eq!(payload.forecast.len(), 2);
        assert_eq!(payload.forecast[1].day, "Tomorrow");
        assert!((payload.forecast[0].max_temp - 31.4).abs() < 0.01);
        // Not stamped until the client fetches it
        assert!(payload.fetched_at.is_none());
        assert!(payload.fetched_time.is_none());
    }

    #[test]
    fn test_payload_missing_optional_sections_defaults_empty() {
        let json = r#"{"city": "Ujjain"}"#;
        let payload: AirQualityPayload = serde_json::from_str(json).expect("Failed to parse");
        assert!(payload.predictions.is_empty());
        assert!(payload.today_pollutants.is_empty());
        assert!(payload.overall_daily_aqi.is_empty());
    }
}

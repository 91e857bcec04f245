//! Terminal report rendering
//!
//! Turns a `CityQueryResult` into plain-text output. This layer consumes
//! only the orchestrator's result shape, the tier table, and `ErrorInfo`;
//! it knows nothing about cache keys or HTTP status codes.

use std::fmt::Write;

use crate::api::{ErrorInfo, ErrorKind, StationReport};
use crate::aqi::{self, level_for_value, range_label};
use crate::orchestrator::{CityQueryResult, PayloadSource};
use crate::session::{format_timestamp, Session};

/// Renders a full report for a city load
pub fn render(result: &CityQueryResult, session: &Session) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Air quality for {}", result.city);
    let _ = writeln!(out, "{}", "=".repeat(18 + result.city.len()));

    if let Some(air) = &result.air_quality {
        if let Some(today) = air.overall_daily_aqi.first() {
            let level = level_for_value(today.aqi);
            let _ = writeln!(
                out,
                "\nToday's AQI: {} ({}, {})  main pollutant: {}",
                aqi::format_value(today.aqi),
                level.name,
                range_label(level),
                today.main_pollutant,
            );
            for advice in aqi::health_recommendations(today.aqi) {
                let _ = writeln!(out, "  - {}", advice);
            }
        }

        if !air.today_pollutants.is_empty() {
            let _ = writeln!(out, "\nToday's pollutants:");
            for reading in &air.today_pollutants {
                let level = level_for_value(reading.aqi);
                let _ = writeln!(
                    out,
                    "  {:>6}  AQI {:>4}  {}",
                    reading.pollutant.as_deref().unwrap_or("?"),
                    aqi::format_value(reading.aqi),
                    level.name,
                );
            }
        }

        if air.overall_daily_aqi.len() > 1 {
            let _ = writeln!(out, "\nForecast:");
            for day in &air.overall_daily_aqi {
                let level = level_for_value(day.aqi);
                let _ = writeln!(
                    out,
                    "  {:<10} {}  AQI {:>4}  {}",
                    day.day,
                    day.date,
                    aqi::format_value(day.aqi),
                    level.name,
                );
            }
        }

        let stamp = format_timestamp(air.fetched_at.as_deref(), session.language);
        if !stamp.is_empty() {
            let _ = writeln!(out, "\n{}", stamp);
        }
    }

    if let Some(weather) = &result.weather {
        if !weather.forecast.is_empty() {
            let _ = writeln!(out, "\nWeather:");
            for day in &weather.forecast {
                let _ = writeln!(
                    out,
                    "  {:<10} {}  {:>5.1}°C / {:>5.1}°C  rain {:>5.1} mm  wind {:>5.1} km/h",
                    day.day, day.date, day.max_temp, day.min_temp,
                    day.precipitation_mm, day.max_wind_speed_kmh,
                );
            }
        }
    }

    if result.source == PayloadSource::Cache && result.air_quality.is_some() {
        let _ = writeln!(out, "\n(showing cached data)");
    }

    if let Some(error) = &result.error {
        let _ = write!(out, "\n{}", render_error(error));
    }

    out
}

/// Renders an error block with a retry hint where a retry makes sense
pub fn render_error(error: &ErrorInfo) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Error: {}", error.message);
    let hint = match error.kind {
        ErrorKind::NotFound => "Check the city name and try again.",
        ErrorKind::AuthError | ErrorKind::ClientError => "The request cannot succeed as-is.",
        _ => "Retry with the same city may succeed.",
    };
    let _ = writeln!(out, "  {}", hint);
    out
}

/// Renders station telemetry reports
pub fn render_stations(reports: &[StationReport]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Station telemetry:");
    for report in reports {
        if report.error {
            let _ = writeln!(
                out,
                "  station {:>3}  unavailable ({})",
                report.station_id,
                report.error_message.as_deref().unwrap_or("unknown error"),
            );
        } else {
            let _ = writeln!(out, "  station {:>3}  ok", report.station_id);
        }
    }
    out
}

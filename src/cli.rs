//! Command-line interface parsing
//!
//! Handles parsing of CLI arguments using clap, including city selection,
//! forced refresh, station telemetry, and display language.

use clap::Parser;

use crate::session::{Language, Session};

/// Default city when none is given
pub const DEFAULT_CITY: &str = "Indore";

/// Vaayu - predicted air quality and weather for Indian cities
#[derive(Parser, Debug)]
#[command(name = "vaayu")]
#[command(about = "Predicted air quality and weather forecasts")]
#[command(version)]
pub struct Cli {
    /// City to show data for
    ///
    /// Examples:
    ///   vaayu                  # default city
    ///   vaayu Bhopal           # specific city
    ///   vaayu Bhopal --refresh # bypass the cache
    #[arg(value_name = "CITY", default_value = DEFAULT_CITY)]
    pub city: String,

    /// Bypass the cache and fetch fresh data
    #[arg(long)]
    pub refresh: bool,

    /// Include per-station telemetry for the city, where stations exist
    #[arg(long)]
    pub stations: bool,

    /// Emit the raw payloads as JSON instead of the rendered report
    #[arg(long)]
    pub json: bool,

    /// Display language
    #[arg(long, value_enum, default_value_t = Language::English)]
    pub lang: Language,

    /// Resolve the city from coordinates via reverse geocoding
    ///
    /// Overrides the positional city when the lookup succeeds; on a
    /// location error the positional (or default) city is used instead.
    #[arg(long, value_name = "LAT,LON")]
    pub at: Option<String>,
}

impl Cli {
    /// Builds the session context from the parsed arguments
    pub fn session(&self) -> Session {
        Session::new(self.lang, self.city.clone())
    }
}

/// Parses a "lat,lon" coordinate pair
pub fn parse_coordinates(s: &str) -> Option<(f64, f64)> {
    let (lat, lon) = s.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;
    if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) {
        Some((lat, lon))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args_uses_default_city() {
        let cli = Cli::parse_from(["vaayu"]);
        assert_eq!(cli.city, DEFAULT_CITY);
        assert!(!cli.refresh);
        assert!(!cli.stations);
        assert!(!cli.json);
        assert_eq!(cli.lang, Language::English);
    }

    #[test]
    fn test_cli_parse_city_positional() {
        let cli = Cli::parse_from(["vaayu", "Bhopal"]);
        assert_eq!(cli.city, "Bhopal");
    }

    #[test]
    fn test_cli_parse_refresh_flag() {
        let cli = Cli::parse_from(["vaayu", "Gwalior", "--refresh"]);
        assert_eq!(cli.city, "Gwalior");
        assert!(cli.refresh);
    }

    #[test]
    fn test_cli_parse_stations_flag() {
        let cli = Cli::parse_from(["vaayu", "--stations"]);
        assert!(cli.stations);
    }

    #[test]
    fn test_cli_parse_lang() {
        let cli = Cli::parse_from(["vaayu", "--lang", "hindi"]);
        assert_eq!(cli.lang, Language::Hindi);
    }

    #[test]
    fn test_parse_coordinates_valid() {
        assert_eq!(parse_coordinates("22.72,75.86"), Some((22.72, 75.86)));
        assert_eq!(parse_coordinates(" 22.72 , 75.86 "), Some((22.72, 75.86)));
        assert_eq!(parse_coordinates("-33.9,151.2"), Some((-33.9, 151.2)));
    }

    #[test]
    fn test_parse_coordinates_invalid() {
        assert_eq!(parse_coordinates("22.72"), None);
        assert_eq!(parse_coordinates("not,numbers"), None);
        assert_eq!(parse_coordinates("91.0,10.0"), None);
        assert_eq!(parse_coordinates("10.0,181.0"), None);
    }

    #[test]
    fn test_cli_parse_at_coordinates() {
        let cli = Cli::parse_from(["vaayu", "--at", "22.72,75.86"]);
        assert_eq!(cli.at.as_deref(), Some("22.72,75.86"));
    }

    #[test]
    fn test_session_from_cli() {
        let cli = Cli::parse_from(["vaayu", "Ujjain", "--lang", "hindi"]);
        let session = cli.session();
        assert_eq!(session.active_city, "Ujjain");
        assert_eq!(session.language, Language::Hindi);
    }
}

//! Vaayu - predicted air quality and weather for Indian cities
//!
//! Fetches AQI predictions and weather forecasts for a city from the
//! prediction backend, caches them locally, and prints a terminal report.

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use vaayu::api::{fetch_stations, stations_for_city, ApiClient, GeocodeClient};
use vaayu::cache::CacheStore;
use vaayu::cli::{parse_coordinates, Cli};
use vaayu::orchestrator::{Orchestrator, PayloadSource};
use vaayu::report;

/// How long to wait for a background refresh before giving up and leaving
/// the cached report on screen
const REFRESH_WAIT: Duration = Duration::from_secs(70);

/// Environment variable holding the reverse-geocoding API key
const GEO_API_KEY_VAR: &str = "VAAYU_GEO_API_KEY";

/// Resolves the active city, preferring `--at` coordinates when given
///
/// A failed lookup falls back to the positional (or default) city, with
/// the location error printed rather than aborting the run.
async fn resolve_city(cli: &Cli) -> String {
    let Some(raw) = &cli.at else {
        return cli.city.clone();
    };

    let Some((lat, lon)) = parse_coordinates(raw) else {
        eprintln!("Invalid coordinates \"{}\"; using {}", raw, cli.city);
        return cli.city.clone();
    };

    let Ok(api_key) = std::env::var(GEO_API_KEY_VAR) else {
        eprintln!("{} is not set; using {}", GEO_API_KEY_VAR, cli.city);
        return cli.city.clone();
    };

    match GeocodeClient::new(api_key).city_for_coordinates(lat, lon).await {
        Ok(city) => city,
        Err(err) => {
            eprint!("{}", report::render_error(&err.to_info()));
            cli.city.clone()
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut cli = Cli::parse();
    cli.city = resolve_city(&cli).await;
    let session = cli.session();

    let cache = CacheStore::new();
    let mut orchestrator = Orchestrator::new(cache, ApiClient::new());

    let result = if cli.refresh {
        orchestrator.refresh(&cli.city).await
    } else {
        orchestrator.load_city(&cli.city).await
    };

    // JSON mode emits exactly one document to stdout; station telemetry
    // is folded into it rather than appended as a second document
    if cli.json {
        let mut doc = match serde_json::to_value(&result) {
            Ok(doc) => doc,
            Err(e) => {
                eprintln!("failed to encode result: {}", e);
                return;
            }
        };
        if cli.stations {
            if let Some(ids) = stations_for_city(&cli.city) {
                let reports = fetch_stations(ids).await;
                if let (Some(map), Ok(value)) =
                    (doc.as_object_mut(), serde_json::to_value(&reports))
                {
                    map.insert("stations".to_string(), value);
                }
            }
        }
        match serde_json::to_string_pretty(&doc) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("failed to encode result: {}", e),
        }
        return;
    }

    print!("{}", report::render(&result, &session));

    // Cached results kick off a background refresh; wait for it so the
    // user sees fresh data (or the refresh failure) before exit
    if result.source == PayloadSource::Cache && result.error.is_none() {
        if let Some(update) = orchestrator.wait_for_update(REFRESH_WAIT).await {
            if update.source == PayloadSource::Network {
                println!("\nRefreshed:");
                print!("{}", report::render(&update, &session));
            } else if let Some(error) = &update.error {
                print!("\n{}", report::render_error(error));
            }
        }
    }

    if cli.stations {
        if let Some(ids) = stations_for_city(&cli.city) {
            let reports = fetch_stations(ids).await;
            print!("\n{}", report::render_stations(&reports));
        } else {
            println!("\nNo monitoring stations known for {}", cli.city);
        }
    }
}

//! Cache-then-refresh orchestration
//!
//! Combines the cache store and the fetch client: a city load serves cached
//! payloads immediately when they exist and refreshes them in the
//! background, or blocks on the network when the cache is cold. Background
//! outcomes arrive over a channel so a stale response can never clobber
//! state for a newer city (last-request-wins).

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::api::{AirQualityPayload, ApiClient, ErrorInfo, FetchError, WeatherPayload};
use crate::cache::{CacheStore, DataType};

/// Where a query result's payloads came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadSource {
    Cache,
    Network,
}

/// State of the current city-load cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    /// Blocking network fetch with no cache to fall back on
    Loading,
    /// Cached data is displayed while a background fetch runs
    Refreshing,
    Ready(PayloadSource),
    /// Terminal for this invocation; an explicit retry re-enters Loading
    Error,
}

/// The orchestrator's output for one fetch invocation
///
/// Immutable once returned; a later load for the same city supersedes it
/// rather than mutating it. When `error` is set alongside payloads, the
/// payloads are stale cached data retained through a failed refresh.
#[derive(Debug, Clone, Serialize)]
pub struct CityQueryResult {
    /// City the load was issued for
    pub city: String,
    pub air_quality: Option<AirQualityPayload>,
    pub weather: Option<WeatherPayload>,
    /// When the payloads were obtained (cache write time or fetch time)
    pub fetched_at: DateTime<Utc>,
    pub source: PayloadSource,
    pub error: Option<ErrorInfo>,
}

/// Outcome of a background refresh, tagged with the load it belongs to
#[derive(Debug)]
struct RefreshOutcome {
    city: String,
    generation: u64,
    result: Result<(AirQualityPayload, WeatherPayload), ErrorInfo>,
}

/// Orchestrates cache reads, network fetches, and background refreshes
///
/// Sole writer of the cache; background tasks write through the same
/// whole-value overwrite path, so interleaved loads cannot corrupt an entry.
pub struct Orchestrator {
    cache: Option<CacheStore>,
    client: ApiClient,
    updates_tx: mpsc::Sender<RefreshOutcome>,
    updates_rx: mpsc::Receiver<RefreshOutcome>,
    /// Monotonic id handed to each load; stale outcomes are discarded
    generation: Arc<AtomicU64>,
    active_city: String,
    state: LoadState,
}

/// Compares city names the way the cache keys them
fn same_city(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Fetches the air quality and weather payloads concurrently
///
/// Both requests are issued together and joined; the load succeeds only if
/// both do, otherwise the first failure is returned.
async fn fetch_both(
    client: &ApiClient,
    city: &str,
) -> Result<(AirQualityPayload, WeatherPayload), FetchError> {
    let (air, weather) = tokio::join!(client.fetch_air_quality(city), client.fetch_weather(city));
    Ok((air?, weather?))
}

impl Orchestrator {
    /// Creates a new orchestrator over the given cache and client
    ///
    /// `cache` may be `None` (e.g., no resolvable cache directory), in which
    /// case every load is network-only.
    pub fn new(cache: Option<CacheStore>, client: ApiClient) -> Self {
        let (updates_tx, updates_rx) = mpsc::channel(16);
        Self {
            cache,
            client,
            updates_tx,
            updates_rx,
            generation: Arc::new(AtomicU64::new(0)),
            active_city: String::new(),
            state: LoadState::Idle,
        }
    }

    /// Current load state
    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Loads data for a city, cache-first
    ///
    /// With both payloads cached the result is returned immediately from
    /// cache and a background refresh is spawned (stale-while-revalidate);
    /// its outcome arrives via [`poll_update`](Self::poll_update) or
    /// [`wait_for_update`](Self::wait_for_update). On a cache miss the
    /// network fetch is awaited before returning.
    pub async fn load_city(&mut self, city: &str) -> CityQueryResult {
        self.active_city = city.to_string();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let cached_air = self
            .cache
            .as_ref()
            .and_then(|c| c.get::<AirQualityPayload>(city, DataType::AirQuality));
        let cached_weather = self
            .cache
            .as_ref()
            .and_then(|c| c.get::<WeatherPayload>(city, DataType::Weather));

        if let (Some(air), Some(weather)) = (cached_air, cached_weather) {
            debug!(%city, "serving cached payloads, refreshing in background");
            self.state = LoadState::Refreshing;
            self.spawn_refresh(city.to_string(), generation);

            return CityQueryResult {
                city: city.to_string(),
                // The older entry bounds how stale the result can be
                fetched_at: air.written_at.min(weather.written_at),
                air_quality: Some(air.data),
                weather: Some(weather.data),
                source: PayloadSource::Cache,
                error: None,
            };
        }

        // Cold cache: block on the network
        self.state = LoadState::Loading;
        self.fetch_and_store(city).await
    }

    /// Explicitly refreshes a city from the network
    ///
    /// On failure with cached data available, the cached payloads are
    /// returned with the error surfaced alongside them; stale data plus a
    /// visible error beats no data.
    pub async fn refresh(&mut self, city: &str) -> CityQueryResult {
        self.active_city = city.to_string();
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state = LoadState::Loading;
        self.fetch_and_store(city).await
    }

    /// Blocking fetch of both payloads, writing the cache on success
    async fn fetch_and_store(&mut self, city: &str) -> CityQueryResult {
        match fetch_both(&self.client, city).await {
            Ok((air, weather)) => {
                self.store(city, &air, &weather);
                self.state = LoadState::Ready(PayloadSource::Network);
                info!(%city, "city load complete");
                CityQueryResult {
                    city: city.to_string(),
                    air_quality: Some(air),
                    weather: Some(weather),
                    fetched_at: Utc::now(),
                    source: PayloadSource::Network,
                    error: None,
                }
            }
            Err(err) => {
                self.state = LoadState::Error;
                self.result_for_failure(city, err.to_info())
            }
        }
    }

    /// Builds a failure result, retaining any cached payloads
    fn result_for_failure(&self, city: &str, error: ErrorInfo) -> CityQueryResult {
        let cached_air = self
            .cache
            .as_ref()
            .and_then(|c| c.get::<AirQualityPayload>(city, DataType::AirQuality));
        let cached_weather = self
            .cache
            .as_ref()
            .and_then(|c| c.get::<WeatherPayload>(city, DataType::Weather));

        let fetched_at = cached_air
            .as_ref()
            .map(|entry| entry.written_at)
            .unwrap_or_else(Utc::now);
        let source = if cached_air.is_some() || cached_weather.is_some() {
            PayloadSource::Cache
        } else {
            PayloadSource::Network
        };

        CityQueryResult {
            city: city.to_string(),
            air_quality: cached_air.map(|entry| entry.data),
            weather: cached_weather.map(|entry| entry.data),
            fetched_at,
            source,
            error: Some(error),
        }
    }

    /// Writes both payloads through the cache (whole-value overwrite)
    fn store(&self, city: &str, air: &AirQualityPayload, weather: &WeatherPayload) {
        if let Some(cache) = &self.cache {
            cache.set(city, DataType::AirQuality, air);
            cache.set(city, DataType::Weather, weather);
        }
    }

    /// Spawns a background refresh tagged with its load generation
    fn spawn_refresh(&self, city: String, generation: u64) {
        let client = self.client.clone();
        let cache = self.cache.clone();
        let tx = self.updates_tx.clone();

        tokio::spawn(async move {
            let result = match fetch_both(&client, &city).await {
                Ok((air, weather)) => {
                    if let Some(cache) = &cache {
                        cache.set(&city, DataType::AirQuality, &air);
                        cache.set(&city, DataType::Weather, &weather);
                    }
                    Ok((air, weather))
                }
                Err(err) => Err(err.to_info()),
            };

            // Receiver dropped means the orchestrator is gone; nothing to do
            let _ = tx
                .send(RefreshOutcome {
                    city,
                    generation,
                    result,
                })
                .await;
        });
    }

    /// Applies a refresh outcome if it still belongs to the active load
    ///
    /// Outcomes for a superseded city or generation are discarded
    /// (last-request-wins). A failed refresh never blanks cached payloads:
    /// the returned result carries the cached data with the error raised
    /// independently.
    fn apply_outcome(&mut self, outcome: RefreshOutcome) -> Option<CityQueryResult> {
        let current = self.generation.load(Ordering::SeqCst);
        if outcome.generation != current || !same_city(&outcome.city, &self.active_city) {
            debug!(
                city = %outcome.city,
                generation = outcome.generation,
                "discarding stale refresh outcome"
            );
            return None;
        }

        match outcome.result {
            Ok((air, weather)) => {
                self.state = LoadState::Ready(PayloadSource::Network);
                Some(CityQueryResult {
                    city: outcome.city,
                    air_quality: Some(air),
                    weather: Some(weather),
                    fetched_at: Utc::now(),
                    source: PayloadSource::Network,
                    error: None,
                })
            }
            Err(error) => {
                // Stale-while-revalidate: stay on the cached payloads
                self.state = LoadState::Ready(PayloadSource::Cache);
                Some(self.result_for_failure(&outcome.city, error))
            }
        }
    }

    /// Checks for a pending refresh outcome without blocking
    pub fn poll_update(&mut self) -> Option<CityQueryResult> {
        while let Ok(outcome) = self.updates_rx.try_recv() {
            if let Some(result) = self.apply_outcome(outcome) {
                return Some(result);
            }
        }
        None
    }

    /// Waits up to `timeout` for a refresh outcome for the active load
    ///
    /// Stale outcomes are discarded and the wait continues within the same
    /// deadline. Returns `None` on timeout.
    pub async fn wait_for_update(&mut self, timeout: Duration) -> Option<CityQueryResult> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let outcome =
                match tokio::time::timeout_at(deadline, self.updates_rx.recv()).await {
                    Ok(Some(outcome)) => outcome,
                    Ok(None) | Err(_) => return None,
                };
            if let Some(result) = self.apply_outcome(outcome) {
                return Some(result);
            }
        }
    }
}

//! Cache store for persisting API payloads to disk
//!
//! Stores serializable payloads as JSON files in an XDG-compliant cache
//! directory, one file per (city, data type) pair. There is no TTL and no
//! eviction: retention is unbounded and every write is a whole-file
//! overwrite, so the newest successful fetch always wins.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

/// The kind of payload a cache entry holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    AirQuality,
    Weather,
}

impl DataType {
    /// Key prefix for this data type
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::AirQuality => "airQuality",
            DataType::Weather => "weather",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wrapper struct for cached data stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct CacheRecord<T> {
    /// The cached payload
    data: T,
    /// When the payload was written
    written_at: DateTime<Utc>,
}

/// Result of reading from the cache
#[derive(Debug)]
pub struct CachedEntry<T> {
    /// The cached payload
    pub data: T,
    /// When the payload was written
    pub written_at: DateTime<Utc>,
}

/// Manages reading and writing cached payloads to disk
///
/// Payloads are stored as JSON files in an XDG-compliant cache directory
/// (`~/.cache/vaayu/` on Linux). Read failures of any kind degrade to a
/// cache miss and write failures are logged and swallowed, so a corrupt or
/// unavailable cache never fails the fetch that triggered it.
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl CacheStore {
    /// Creates a new CacheStore using the XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no
    /// home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "vaayu")?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a new CacheStore with a custom cache directory
    ///
    /// Useful for testing or when a specific cache location is needed.
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Derives the cache key for a city and data type
    ///
    /// The city name is trimmed, lowercased, and spaces become underscores
    /// so that differently-cased spellings of the same city share one entry.
    pub fn cache_key(city: &str, data_type: DataType) -> String {
        format!(
            "{}_{}",
            data_type.as_str(),
            city.trim().to_lowercase().replace(' ', "_")
        )
    }

    /// Returns the path to a cache file for the given key
    fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }

    /// Ensures the cache directory exists
    fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.cache_dir)
    }

    /// Writes a payload to the cache, overwriting any previous entry
    ///
    /// Serialization or filesystem failures are logged and swallowed; the
    /// caller's fetch must not fail because the cache could not be written.
    pub fn set<T: Serialize>(&self, city: &str, data_type: DataType, data: &T) {
        let key = Self::cache_key(city, data_type);
        if let Err(e) = self.write_entry(&key, data) {
            warn!(key = %key, error = %e, "failed to write cache entry");
        }
    }

    fn write_entry<T: Serialize>(&self, key: &str, data: &T) -> std::io::Result<()> {
        self.ensure_dir()?;

        let record = CacheRecord {
            data,
            written_at: Utc::now(),
        };

        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        fs::write(self.cache_path(key), json)
    }

    /// Reads a payload from the cache
    ///
    /// Returns `None` if the entry doesn't exist or cannot be parsed; a
    /// missing or corrupt entry is simply a cache miss, never an error.
    pub fn get<T: DeserializeOwned>(&self, city: &str, data_type: DataType) -> Option<CachedEntry<T>> {
        let path = self.cache_path(&Self::cache_key(city, data_type));
        let content = fs::read_to_string(path).ok()?;
        let record: CacheRecord<T> = serde_json::from_str(&content).ok()?;

        Some(CachedEntry {
            data: record.data,
            written_at: record.written_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestPayload {
        city: String,
        aqi: i32,
    }

    fn create_test_cache() -> (CacheStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = CacheStore::with_dir(temp_dir.path().to_path_buf());
        (cache, temp_dir)
    }

    #[test]
    fn test_cache_key_normalizes_city() {
        assert_eq!(
            CacheStore::cache_key("Indore", DataType::AirQuality),
            "airQuality_indore"
        );
        assert_eq!(
            CacheStore::cache_key("  INDORE  ", DataType::AirQuality),
            "airQuality_indore"
        );
        assert_eq!(
            CacheStore::cache_key("New Delhi", DataType::Weather),
            "weather_new_delhi"
        );
    }

    #[test]
    fn test_differently_cased_cities_share_an_entry() {
        let (cache, _temp_dir) = create_test_cache();
        let payload = TestPayload {
            city: "Indore".to_string(),
            aqi: 120,
        };

        cache.set("Indore", DataType::AirQuality, &payload);

        let result: CachedEntry<TestPayload> = cache
            .get("indore", DataType::AirQuality)
            .expect("lowercased lookup should hit the same entry");
        assert_eq!(result.data, payload);
    }

    #[test]
    fn test_get_returns_none_for_missing_key() {
        let (cache, _temp_dir) = create_test_cache();

        let result: Option<CachedEntry<TestPayload>> = cache.get("nowhere", DataType::Weather);

        assert!(result.is_none(), "Should return None for missing key");
    }

    #[test]
    fn test_set_then_get_roundtrip() {
        let (cache, _temp_dir) = create_test_cache();
        let payload = TestPayload {
            city: "Bhopal".to_string(),
            aqi: 85,
        };

        cache.set("Bhopal", DataType::AirQuality, &payload);

        let result: CachedEntry<TestPayload> = cache
            .get("Bhopal", DataType::AirQuality)
            .expect("Should read back cached payload");

        assert_eq!(result.data, payload, "Payload should survive roundtrip");
    }

    #[test]
    fn test_set_creates_file_in_cache_directory() {
        let (cache, temp_dir) = create_test_cache();
        let payload = TestPayload {
            city: "Gwalior".to_string(),
            aqi: 42,
        };

        cache.set("Gwalior", DataType::Weather, &payload);

        let expected_path = temp_dir.path().join("weather_gwalior.json");
        assert!(expected_path.exists(), "Cache file should exist");

        let content = fs::read_to_string(&expected_path).expect("Should read file");
        assert!(content.contains("\"city\""));
        assert!(content.contains("\"Gwalior\""));
        assert!(content.contains("\"written_at\""));
    }

    #[test]
    fn test_overwrite_is_last_write_wins() {
        let (cache, _temp_dir) = create_test_cache();
        let first = TestPayload {
            city: "Ujjain".to_string(),
            aqi: 60,
        };
        let second = TestPayload {
            city: "Ujjain".to_string(),
            aqi: 95,
        };

        cache.set("Ujjain", DataType::AirQuality, &first);
        cache.set("Ujjain", DataType::AirQuality, &second);

        let result: CachedEntry<TestPayload> = cache
            .get("Ujjain", DataType::AirQuality)
            .expect("Should read cache");
        assert_eq!(result.data, second, "Cache should contain latest payload");
    }

    #[test]
    fn test_air_quality_and_weather_entries_are_distinct() {
        let (cache, _temp_dir) = create_test_cache();
        let air = TestPayload {
            city: "Rewa".to_string(),
            aqi: 110,
        };
        let weather = TestPayload {
            city: "Rewa".to_string(),
            aqi: 0,
        };

        cache.set("Rewa", DataType::AirQuality, &air);
        cache.set("Rewa", DataType::Weather, &weather);

        let got_air: CachedEntry<TestPayload> =
            cache.get("Rewa", DataType::AirQuality).unwrap();
        let got_weather: CachedEntry<TestPayload> =
            cache.get("Rewa", DataType::Weather).unwrap();
        assert_eq!(got_air.data, air);
        assert_eq!(got_weather.data, weather);
    }

    #[test]
    fn test_corrupt_entry_degrades_to_cache_miss() {
        let (cache, temp_dir) = create_test_cache();
        fs::create_dir_all(temp_dir.path()).unwrap();
        fs::write(
            temp_dir.path().join("airQuality_satna.json"),
            "{ not valid json",
        )
        .unwrap();

        let result: Option<CachedEntry<TestPayload>> = cache.get("Satna", DataType::AirQuality);
        assert!(result.is_none(), "Corrupt entry should read as a miss");
    }

    #[test]
    fn test_set_creates_directory_if_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested_path = temp_dir.path().join("nested").join("cache").join("dir");
        let cache = CacheStore::with_dir(nested_path.clone());

        let payload = TestPayload {
            city: "Katni".to_string(),
            aqi: 7,
        };

        cache.set("Katni", DataType::Weather, &payload);

        assert!(nested_path.exists(), "Nested directory should be created");
        assert!(
            nested_path.join("weather_katni.json").exists(),
            "Cache file should exist"
        );
    }

    #[test]
    fn test_written_at_timestamp_is_recorded() {
        let (cache, _temp_dir) = create_test_cache();
        let payload = TestPayload {
            city: "Dewas".to_string(),
            aqi: 33,
        };

        let before = Utc::now();
        cache.set("Dewas", DataType::AirQuality, &payload);
        let after = Utc::now();

        let result: CachedEntry<TestPayload> =
            cache.get("Dewas", DataType::AirQuality).expect("Should read cache");

        assert!(result.written_at >= before);
        assert!(result.written_at <= after);
    }

    #[test]
    fn test_new_creates_xdg_compliant_path() {
        if let Some(cache) = CacheStore::new() {
            let path_str = cache.cache_dir.to_string_lossy();
            assert!(
                path_str.contains("vaayu"),
                "Cache path should contain project name"
            );
        }
        // Test passes if new() returns None (e.g., no home directory in CI)
    }
}

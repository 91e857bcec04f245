//! Cache module for storing API responses to disk
//!
//! This module provides a cache store that persists fetched payloads to the
//! filesystem as JSON, keyed by city and data type. Entries never expire:
//! every successful fetch overwrites the previous entry for its key, and the
//! last written payload is served until replaced (last-write-wins).

mod store;

pub use store::{CacheStore, CachedEntry, DataType};

//! Vaayu library
//!
//! Exposes the fetch client boundary, cache store, AQI classifier,
//! orchestrator, and CLI modules for use in integration tests.

pub mod api;
pub mod aqi;
pub mod cache;
pub mod cli;
pub mod orchestrator;
pub mod report;
pub mod session;

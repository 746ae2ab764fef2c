pub mod config;
pub mod data;
pub mod dates;
pub mod format;
pub mod ingest_log;
pub mod numbers;
pub mod retry;
pub mod station_api;
pub mod tracker_api;
pub mod xml;

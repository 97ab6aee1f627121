//! warmwatch service library
//!
//! Probes registered serverless function URLs on a schedule, stores the
//! measured latency and serves registration and query operations for the
//! HTTP server.

pub mod config;
pub mod database;
pub mod monitoring;
pub mod pool;
pub mod registry;

pub use config::Config;
pub use database::{Database, DatabaseImpl};
pub use registry::MonitorRegistry;

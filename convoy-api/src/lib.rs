//! CONVOY API - REST Facade over the Telemetry Log Tables
//!
//! This crate exposes the five uniform repository operations (list, get,
//! create, update, delete) for every registered log table as REST endpoints,
//! backed by a PostgreSQL record store with a read-through result cache and a
//! periodic materialized-view refresh scheduler.

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod jobs;
pub mod repository;
pub mod routes;
pub mod store;

// Re-export commonly used types
pub use config::ApiConfig;
pub use db::{DbClient, DbConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use repository::Repository;
pub use routes::create_api_router;
pub use store::{EntityStore, PgStore};

//! CONVOY Core - Entity Descriptors and Log-Table Models
//!
//! This crate defines the static table metadata (entity descriptors), the
//! `Entity` trait that the generic repository and HTTP facade are built on,
//! and the row-record models for every log table in the content-distribution
//! telemetry database.
//!
//! Descriptors are `const` data defined at compile time and immutable for the
//! process lifetime; the record store auto-creates its schema from them at
//! startup.

pub mod entity;
pub mod macros;
pub mod models;

// Re-exported so the `declare_entity!` macro can reference row/param types
// through `$crate` regardless of where it is invoked.
pub use tokio_postgres;

pub use entity::{ColumnInfo, ColumnType, Entity, MergeField, TableDescriptor};
pub use models::ALL_TABLES;

//! CONVOY Storage - Result Cache
//!
//! A capacity-bounded (byte budget) and time-bounded (fixed TTL) cache for
//! query results, keyed by query signature. Sits in front of the record
//! store's read path: repeated identical list queries within the TTL window
//! are served from memory without a store round-trip.
//!
//! Entries are evicted least-recently-used when the byte budget is exceeded,
//! and force-evicted by a background purge sweep once expired. Writes do not
//! invalidate entries; staleness is bounded by the TTL.

pub mod cache;

pub use cache::{CacheConfig, CacheMetrics, CacheSnapshot, QueryKey, ResultCache};

//! Generic Repository
//!
//! One repository type serves every registered log table. It layers the
//! read-through result cache over the entity store and pins down the
//! operation semantics the routes rely on: list pages with a total count,
//! fetch-before-write for update and delete, and per-operation error kinds.

use std::marker::PhantomData;
use std::sync::Arc;

use convoy_core::Entity;
use convoy_storage::{QueryKey, ResultCache};

use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::store::EntityStore;

/// A page of records plus the unpaginated total.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Page<E> {
    pub records: Vec<E>,
    pub total_rows: i64,
}

/// Cached CRUD operations over one entity type.
pub struct Repository<E: Entity, S: EntityStore<E>> {
    store: S,
    cache: Arc<ResultCache>,
    _marker: PhantomData<fn() -> E>,
}

/// Re-tag a store error with the failing operation's code. Client errors
/// (invalid input) keep their kind so they still map to 400, and pool
/// exhaustion stays 503 rather than masquerading as an operation failure.
fn reclassify(err: ApiError, code: ErrorCode) -> ApiError {
    if matches!(
        err.code,
        ErrorCode::InvalidInput | ErrorCode::ServiceUnavailable
    ) {
        err
    } else {
        ApiError::new(code, err.message).with_details(
            err.details
                .unwrap_or_else(|| serde_json::json!({ "cause": err.code.to_string() })),
        )
    }
}

impl<E: Entity, S: EntityStore<E>> Repository<E, S> {
    pub fn new(store: S, cache: Arc<ResultCache>) -> Self {
        Self {
            store,
            cache,
            _marker: PhantomData,
        }
    }

    /// List one page of records with the total row count.
    ///
    /// Identical (table, page, pageSize, order) queries within the cache TTL
    /// are answered from the cache without touching the store. Any store
    /// failure surfaces as NotFound; a bad order expression stays a client
    /// error.
    pub async fn list(&self, page: i64, page_size: i64, order: &str) -> ApiResult<Page<E>> {
        let key = QueryKey::new(E::TABLE.name, page, page_size, order);

        if let Some(payload) = self.cache.get(&key) {
            return Ok(serde_json::from_slice(&payload)
                .map_err(|e| ApiError::internal_error(format!("Corrupt cache entry: {}", e)))?);
        }

        let (records, total_rows) = self
            .store
            .fetch_page(page, page_size, order)
            .await
            .map_err(|e| reclassify(e, ErrorCode::NotFound))?;

        let result = Page {
            records,
            total_rows,
        };

        match serde_json::to_vec(&result) {
            Ok(payload) => self.cache.insert(key, payload),
            // Skipping admission only costs the next call a store round trip.
            Err(e) => tracing::warn!(table = E::TABLE.name, "Result not cacheable: {}", e),
        }

        Ok(result)
    }

    /// Fetch a single record by primary key.
    pub async fn get(&self, id: i64) -> ApiResult<E> {
        let record = self
            .store
            .fetch_by_id(id)
            .await
            .map_err(|e| reclassify(e, ErrorCode::NotFound))?;

        record.ok_or_else(|| ApiError::not_found(E::TABLE.name, id))
    }

    /// Insert a new record, returning it as stored plus the rows written.
    pub async fn create(&self, record: &E) -> ApiResult<(E, u64)> {
        let (stored, rows) = self
            .store
            .insert(record)
            .await
            .map_err(|e| reclassify(e, ErrorCode::InsertFailed))?;

        tracing::debug!(table = E::TABLE.name, id = stored.primary_key(), "Record created");
        Ok((stored, rows))
    }

    /// Update an existing record by copy-merging the set fields of `patch`
    /// onto the stored record, then writing it back whole.
    ///
    /// The fetch runs first, so updating an absent record is NotFound, not
    /// UpdateFailed.
    pub async fn update(&self, id: i64, patch: &E) -> ApiResult<(E, u64)> {
        let mut current = self.get(id).await?;
        current.merge_from(patch);

        let (stored, rows) = self
            .store
            .persist(&current)
            .await
            .map_err(|e| reclassify(e, ErrorCode::UpdateFailed))?;

        if rows == 0 {
            return Err(ApiError::update_failed(format!(
                "{} record with id {} vanished during update",
                E::TABLE.name,
                id
            )));
        }

        tracing::debug!(table = E::TABLE.name, id, "Record updated");
        Ok((stored, rows))
    }

    /// Delete a record by primary key, returning the rows removed.
    /// Fetch-first, so deleting an absent record is NotFound.
    pub async fn delete(&self, id: i64) -> ApiResult<u64> {
        self.get(id).await?;

        let rows = self
            .store
            .remove(id)
            .await
            .map_err(|e| reclassify(e, ErrorCode::DeleteFailed))?;

        tracing::debug!(table = E::TABLE.name, id, "Record deleted");
        Ok(rows)
    }
}

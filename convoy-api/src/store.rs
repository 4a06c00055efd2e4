//! Entity Store
//!
//! The persistence seam between the generic repository and PostgreSQL. The
//! `EntityStore` trait carries exactly the row operations the repository
//! needs; `PgStore` implements them with SQL generated from the entity's
//! table descriptor. Tests swap in the in-memory store from [`mem`].

use std::marker::PhantomData;

use async_trait::async_trait;
use convoy_core::{Entity, TableDescriptor};
use thiserror::Error;

use crate::db::DbClient;
use crate::error::{ApiError, ApiResult};

// ============================================================================
// STORE TRAIT
// ============================================================================

/// Row-level persistence operations for one entity type.
#[async_trait]
pub trait EntityStore<E: Entity>: Send + Sync {
    /// Fetch one page of records plus the unpaginated total row count.
    ///
    /// `page <= 0` disables the offset and returns the first `page_size`
    /// records; `page >= 1` skips `(page - 1) * page_size` records. The total
    /// count always covers the whole table, not the returned page.
    async fn fetch_page(
        &self,
        page: i64,
        page_size: i64,
        order: &str,
    ) -> ApiResult<(Vec<E>, i64)>;

    /// Fetch a single record by primary key. `Ok(None)` when absent.
    async fn fetch_by_id(&self, id: i64) -> ApiResult<Option<E>>;

    /// Insert a record and return it as stored, with the number of rows
    /// written. A zero primary key lets the store assign one.
    async fn insert(&self, record: &E) -> ApiResult<(E, u64)>;

    /// Write every non-key column of an existing record, returning the
    /// record and the number of rows affected.
    async fn persist(&self, record: &E) -> ApiResult<(E, u64)>;

    /// Delete a record by primary key, returning the number of rows removed.
    async fn remove(&self, id: i64) -> ApiResult<u64>;
}

// ============================================================================
// PAGINATION AND ORDERING
// ============================================================================

/// Row offset for a one-based page number, or `None` when pagination is
/// disabled (`page <= 0`).
///
/// Both arguments come straight from query parameters, so the offset math is
/// checked; an overflowing combination is a client error, not a panic.
pub fn page_offset(page: i64, page_size: i64) -> ApiResult<Option<i64>> {
    if page <= 0 {
        return Ok(None);
    }

    page.checked_sub(1)
        .and_then(|p| p.checked_mul(page_size))
        .map(Some)
        .ok_or_else(|| {
            ApiError::invalid_input(format!(
                "page {} with pageSize {} overflows the row offset",
                page, page_size
            ))
        })
}

/// A rejected order expression.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderExprError {
    #[error("unknown column in order expression: {0}")]
    UnknownColumn(String),

    #[error("bad sort direction: {0} (expected asc or desc)")]
    BadDirection(String),

    #[error("empty term in order expression")]
    EmptyTerm,
}

impl From<OrderExprError> for ApiError {
    fn from(err: OrderExprError) -> Self {
        ApiError::invalid_input(err.to_string())
    }
}

/// Validate a client-supplied order expression against the table descriptor
/// and render it as an `ORDER BY` body.
///
/// The expression is a comma-separated list of `column [asc|desc]` terms.
/// Column names must exist in the descriptor; this is what keeps the raw
/// string out of SQL. An empty expression yields `Ok(None)`.
pub fn order_clause(
    order: &str,
    table: &TableDescriptor,
) -> Result<Option<String>, OrderExprError> {
    if order.trim().is_empty() {
        return Ok(None);
    }

    let mut terms = Vec::new();
    for raw in order.split(',') {
        let mut parts = raw.split_whitespace();
        let column = parts.next().ok_or(OrderExprError::EmptyTerm)?;

        if !table.has_column(column) {
            return Err(OrderExprError::UnknownColumn(column.to_string()));
        }

        let term = match parts.next() {
            None => column.to_string(),
            Some(dir) if dir.eq_ignore_ascii_case("asc") => format!("{} ASC", column),
            Some(dir) if dir.eq_ignore_ascii_case("desc") => format!("{} DESC", column),
            Some(dir) => return Err(OrderExprError::BadDirection(dir.to_string())),
        };

        if parts.next().is_some() {
            return Err(OrderExprError::BadDirection(raw.trim().to_string()));
        }

        terms.push(term);
    }

    Ok(Some(terms.join(", ")))
}

// ============================================================================
// SQL GENERATION
// ============================================================================

fn select_page_sql(table: &TableDescriptor, order_by: Option<&str>, offset: Option<i64>) -> String {
    let mut sql = format!("SELECT {} FROM {}", table.column_list(), table.name);

    if let Some(order_by) = order_by {
        sql.push_str(" ORDER BY ");
        sql.push_str(order_by);
    }

    if let Some(offset) = offset {
        sql.push_str(&format!(" OFFSET {}", offset));
    }

    sql.push_str(" LIMIT $1");
    sql
}

fn select_by_id_sql(table: &TableDescriptor) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} = $1",
        table.column_list(),
        table.name,
        table.primary_key().name
    )
}

fn count_sql(table: &TableDescriptor) -> String {
    format!("SELECT COUNT(*) FROM {}", table.name)
}

/// INSERT statement. `with_key` includes the primary key column; otherwise
/// the identity column assigns it. Either way RETURNING hands back the row
/// as stored.
fn insert_sql(table: &TableDescriptor, with_key: bool) -> String {
    let columns: Vec<&str> = if with_key {
        table.columns.iter().map(|c| c.name).collect()
    } else {
        table.columns[1..].iter().map(|c| c.name).collect()
    };

    let placeholders = (1..=columns.len())
        .map(|i| format!("${}", i))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        table.name,
        columns.join(", "),
        placeholders,
        table.column_list()
    )
}

fn update_sql(table: &TableDescriptor) -> String {
    // Parameters arrive in descriptor order, key first, so the SET
    // placeholders start at $2.
    let assignments = table.columns[1..]
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = ${}", c.name, i + 2))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "UPDATE {} SET {} WHERE {} = $1",
        table.name,
        assignments,
        table.primary_key().name
    )
}

fn delete_sql(table: &TableDescriptor) -> String {
    format!(
        "DELETE FROM {} WHERE {} = $1",
        table.name,
        table.primary_key().name
    )
}

// ============================================================================
// POSTGRES STORE
// ============================================================================

/// PostgreSQL-backed store for one entity type.
pub struct PgStore<E: Entity> {
    db: DbClient,
    _marker: PhantomData<fn() -> E>,
}

impl<E: Entity> PgStore<E> {
    pub fn new(db: DbClient) -> Self {
        Self {
            db,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<E: Entity> EntityStore<E> for PgStore<E> {
    async fn fetch_page(
        &self,
        page: i64,
        page_size: i64,
        order: &str,
    ) -> ApiResult<(Vec<E>, i64)> {
        let order_by = order_clause(order, &E::TABLE)?;
        let offset = page_offset(page, page_size)?;
        let sql = select_page_sql(&E::TABLE, order_by.as_deref(), offset);

        let conn = self.db.get_conn().await?;

        let rows = conn.query(&sql, &[&page_size]).await?;
        let records = rows.iter().map(E::from_row).collect();

        let count_row = conn.query_one(&count_sql(&E::TABLE), &[]).await?;
        let total: i64 = count_row.get(0);

        Ok((records, total))
    }

    async fn fetch_by_id(&self, id: i64) -> ApiResult<Option<E>> {
        let conn = self.db.get_conn().await?;
        let row = conn.query_opt(&select_by_id_sql(&E::TABLE), &[&id]).await?;
        Ok(row.as_ref().map(E::from_row))
    }

    async fn insert(&self, record: &E) -> ApiResult<(E, u64)> {
        let with_key = record.primary_key() != 0;
        let sql = insert_sql(&E::TABLE, with_key);

        let params = record.params();
        let params = if with_key { &params[..] } else { &params[1..] };

        let conn = self.db.get_conn().await?;
        let row = conn.query_one(&sql, params).await?;
        Ok((E::from_row(&row), 1))
    }

    async fn persist(&self, record: &E) -> ApiResult<(E, u64)> {
        let conn = self.db.get_conn().await?;
        let affected = conn
            .execute(&update_sql(&E::TABLE), &record.params())
            .await?;
        Ok((record.clone(), affected))
    }

    async fn remove(&self, id: i64) -> ApiResult<u64> {
        let conn = self.db.get_conn().await?;
        let affected = conn.execute(&delete_sql(&E::TABLE), &[&id]).await?;
        Ok(affected)
    }
}

// ============================================================================
// IN-MEMORY STORE (TESTS)
// ============================================================================


#[cfg(test)]
mod tests {
    use super::*;
    use convoy_core::models::ContentWalletLogs;

    #[test]
    fn test_page_offset() -> ApiResult<()> {
        assert_eq!(page_offset(0, 20)?, None);
        assert_eq!(page_offset(-3, 20)?, None);
        assert_eq!(page_offset(1, 20)?, Some(0));
        assert_eq!(page_offset(3, 10)?, Some(20));
        Ok(())
    }

    #[test]
    fn test_page_offset_overflow_is_invalid_input() {
        let err = page_offset(i64::MAX, 20).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InvalidInput);

        let err = page_offset(3, i64::MAX).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InvalidInput);
    }

    #[test]
    fn test_order_clause_empty() -> Result<(), OrderExprError> {
        assert_eq!(order_clause("", &ContentWalletLogs::TABLE)?, None);
        assert_eq!(order_clause("   ", &ContentWalletLogs::TABLE)?, None);
        Ok(())
    }

    #[test]
    fn test_order_clause_valid() -> Result<(), OrderExprError> {
        let clause = order_clause("created_at desc, id", &ContentWalletLogs::TABLE)?;
        assert_eq!(clause.as_deref(), Some("created_at DESC, id"));
        Ok(())
    }

    #[test]
    fn test_order_clause_rejects_unknown_column() {
        let err = order_clause("no_such_col", &ContentWalletLogs::TABLE).unwrap_err();
        assert_eq!(err, OrderExprError::UnknownColumn("no_such_col".to_string()));

        // Injection attempts read as unknown columns.
        let err = order_clause("id; DROP TABLE x", &ContentWalletLogs::TABLE).unwrap_err();
        assert!(matches!(err, OrderExprError::UnknownColumn(_)));
    }

    #[test]
    fn test_order_clause_rejects_bad_direction() {
        let err = order_clause("id sideways", &ContentWalletLogs::TABLE).unwrap_err();
        assert_eq!(err, OrderExprError::BadDirection("sideways".to_string()));
    }

    #[test]
    fn test_order_error_maps_to_invalid_input() {
        let api: ApiError = OrderExprError::UnknownColumn("x".to_string()).into();
        assert_eq!(api.code, crate::error::ErrorCode::InvalidInput);
    }

    #[test]
    fn test_select_page_sql_variants() {
        let table = &ContentWalletLogs::TABLE;

        let sql = select_page_sql(table, None, None);
        assert!(sql.starts_with("SELECT id, "));
        assert!(sql.ends_with("FROM content_wallet_logs LIMIT $1"));

        let sql = select_page_sql(table, Some("created_at DESC"), Some(40));
        assert!(sql.contains("ORDER BY created_at DESC"));
        assert!(sql.contains("OFFSET 40 LIMIT $1"));
    }

    #[test]
    fn test_insert_sql_omits_key_when_unassigned() {
        let table = &ContentWalletLogs::TABLE;

        let sql = insert_sql(table, false);
        assert!(sql.starts_with("INSERT INTO content_wallet_logs (content, "));
        assert!(!sql.contains("(id,"));
        assert!(sql.contains("RETURNING id, "));

        let sql = insert_sql(table, true);
        assert!(sql.starts_with("INSERT INTO content_wallet_logs (id, "));
    }

    #[test]
    fn test_update_sql_shape() {
        let sql = update_sql(&ContentWalletLogs::TABLE);
        assert!(sql.starts_with("UPDATE content_wallet_logs SET content = $2"));
        assert!(sql.ends_with("WHERE id = $1"));
        assert!(!sql.contains("id = $2"));
    }

    #[test]
    fn test_delete_sql_shape() {
        assert_eq!(
            delete_sql(&ContentWalletLogs::TABLE),
            "DELETE FROM content_wallet_logs WHERE id = $1"
        );
    }

    #[tokio::test]
    async fn test_mem_store_crud() -> ApiResult<()> {
        let store = mem::MemStore::<ContentWalletLogs>::new();

        let record = ContentWalletLogs {
            wallet: Some("f1abc".to_string()),
            ..Default::default()
        };

        let (stored, rows) = store.insert(&record).await?;
        assert_eq!(rows, 1);
        assert_eq!(stored.id, 1);
        assert_eq!(stored.wallet.as_deref(), Some("f1abc"));

        let fetched = store.fetch_by_id(1).await?;
        assert_eq!(fetched, Some(stored.clone()));

        let (page, total) = store.fetch_page(0, 20, "").await?;
        assert_eq!(total, 1);
        assert_eq!(page.len(), 1);

        assert_eq!(store.remove(1).await?, 1);
        assert_eq!(store.remove(1).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_page_rejects_overflowing_page_number() {
        let store = mem::MemStore::<ContentWalletLogs>::new();

        let err = store.fetch_page(i64::MAX, 20, "").await.unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InvalidInput);
    }
}

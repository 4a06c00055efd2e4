//! Entity Descriptors
//!
//! Static per-table metadata (column names, semantic types, primary key) plus
//! the `Entity` trait implemented by every row-record model. The generic
//! repository, the schema auto-create step, and the order-expression
//! validation all consume this metadata instead of per-table code.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_postgres::types::ToSql;
use tokio_postgres::Row;

// ============================================================================
// COLUMN METADATA
// ============================================================================

/// Semantic column type used by the log tables.
///
/// Nullability is a per-column property (every non-key column in the log
/// schema is nullable), not a separate type variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// 64-bit integer (`BIGINT`).
    Int8,
    /// Unbounded text (`TEXT`).
    Text,
    /// Timestamp with time zone (`TIMESTAMPTZ`).
    TimestampTz,
}

impl ColumnType {
    /// PostgreSQL type name used when auto-creating the schema.
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Int8 => "BIGINT",
            ColumnType::Text => "TEXT",
            ColumnType::TimestampTz => "TIMESTAMPTZ",
        }
    }
}

/// Static description of a single table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name. Stable identifier; renaming requires a migration.
    pub name: &'static str,
    /// Semantic type of the column.
    pub kind: ColumnType,
    /// Whether this column is the table's primary key. At most one column per
    /// table carries this flag, and it is always first and non-null.
    pub primary_key: bool,
}

/// Static description of a table: its name and ordered column set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDescriptor {
    /// Table name. Stable identifier; renaming requires a migration.
    pub name: &'static str,
    /// Ordered column set. The primary key is always `columns[0]`.
    pub columns: &'static [ColumnInfo],
}

impl TableDescriptor {
    /// The primary key column.
    pub fn primary_key(&self) -> &ColumnInfo {
        // Invariant upheld by `declare_entity!`: the pk is declared first.
        &self.columns[0]
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Whether the table declares a column with the given name.
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Comma-separated column list for SELECT/INSERT statements.
    pub fn column_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| c.name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// ============================================================================
// ENTITY TRAIT
// ============================================================================

/// A row record of one log table.
///
/// Implemented by the `declare_entity!` macro for every model. The associated
/// `TABLE` descriptor drives schema creation, SQL generation, and order
/// expression validation; the methods provide row mapping and the copy-merge
/// used by update operations.
pub trait Entity:
    Clone + Default + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Static descriptor for this entity's table.
    const TABLE: TableDescriptor;

    /// The primary key value. Zero means "not yet assigned by the store".
    fn primary_key(&self) -> i64;

    /// Map a database row (fetched with the descriptor's column list) into
    /// a record.
    fn from_row(row: &Row) -> Self;

    /// Field references in descriptor column order, primary key first, for
    /// use as SQL statement parameters.
    fn params(&self) -> Vec<&(dyn ToSql + Sync)>;

    /// Overlay the set fields of `patch` onto `self` (copy-merge).
    ///
    /// `Option` fields are copied only when `Some`; the non-null primary key
    /// is copied only when non-zero. An explicit `Some(0)` therefore counts
    /// as "set", unlike the zero-value convention this replaces.
    fn merge_from(&mut self, patch: &Self);
}

// ============================================================================
// FIELD MERGE
// ============================================================================

/// Per-field overlay used by [`Entity::merge_from`].
pub trait MergeField {
    /// Copy `patch` over `self` when `patch` carries a value.
    fn merge_field(&mut self, patch: &Self);
}

impl<T: Clone> MergeField for Option<T> {
    fn merge_field(&mut self, patch: &Self) {
        if patch.is_some() {
            *self = patch.clone();
        }
    }
}

impl MergeField for i64 {
    fn merge_field(&mut self, patch: &Self) {
        if *patch != 0 {
            *self = *patch;
        }
    }
}

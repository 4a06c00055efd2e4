//! Declarative entity definition.
//!
//! `declare_entity!` replaces the per-table generated model files of the
//! original system with one declaration per table: it emits the struct, the
//! serde derives, and the full [`Entity`](crate::entity::Entity) impl from a
//! single column list, so every table gets identical semantics by
//! construction.

/// Declare a row-record model and implement [`Entity`](crate::entity::Entity)
/// for it.
///
/// The primary key must be the first column, named `id`, of type `i64`, and
/// flagged `primary`. Every other column is nullable and must use an
/// `Option` type matching its declared kind.
///
/// # Example
///
/// ```
/// convoy_core::declare_entity! {
///     /// Row record of the `wallet_logs` table.
///     pub struct WalletLogs {
///         table: "wallet_logs",
///         columns: [
///             id: i64 => Int8 primary,
///             addr: Option<String> => Text,
///             created_at: Option<chrono::DateTime<chrono::Utc>> => TimestampTz,
///         ],
///     }
/// }
/// ```
#[macro_export]
macro_rules! declare_entity {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            table: $table:literal,
            columns: [
                $( $field:ident : $ty:ty => $kind:ident $($primary:ident)? ),+ $(,)?
            ],
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
        #[serde(default)]
        pub struct $name {
            $( pub $field: $ty, )+
        }

        impl $crate::entity::Entity for $name {
            const TABLE: $crate::entity::TableDescriptor = $crate::entity::TableDescriptor {
                name: $table,
                columns: &[
                    $(
                        $crate::entity::ColumnInfo {
                            name: stringify!($field),
                            kind: $crate::entity::ColumnType::$kind,
                            primary_key: $crate::declare_entity!(@primary $($primary)?),
                        },
                    )+
                ],
            };

            fn primary_key(&self) -> i64 {
                self.id
            }

            fn from_row(row: &$crate::tokio_postgres::Row) -> Self {
                Self {
                    $( $field: row.get(stringify!($field)), )+
                }
            }

            fn params(&self) -> Vec<&(dyn $crate::tokio_postgres::types::ToSql + Sync)> {
                vec![ $( &self.$field, )+ ]
            }

            fn merge_from(&mut self, patch: &Self) {
                $( $crate::entity::MergeField::merge_field(&mut self.$field, &patch.$field); )+
            }
        }
    };

    (@primary primary) => { true };
    (@primary) => { false };
}

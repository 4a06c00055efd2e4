//! Content-level log tables: content processing, miner assignment, and
//! wallet assignment events reported by delta nodes.

use chrono::{DateTime, Utc};

crate::declare_entity! {
    /// Row record of the `content_logs` table.
    pub struct ContentLogs {
        table: "content_logs",
        columns: [
            id: i64 => Int8 primary,
            name: Option<String> => Text,
            size: Option<i64> => Int8,
            cid: Option<String> => Text,
            status: Option<String> => Text,
            origins: Option<String> => Text,
            piece_commitment_id: Option<i64> => Int8,
            node_info: Option<String> => Text,
            requester_info: Option<String> => Text,
            requesting_api_key: Option<String> => Text,
            system_content_id: Option<i64> => Int8,
            created_at: Option<DateTime<Utc>> => TimestampTz,
            updated_at: Option<DateTime<Utc>> => TimestampTz,
            delta_node_uuid: Option<String> => Text,
        ],
    }
}

crate::declare_entity! {
    /// Row record of the `content_miner_logs` table.
    pub struct ContentMinerLogs {
        table: "content_miner_logs",
        columns: [
            id: i64 => Int8 primary,
            content: Option<i64> => Int8,
            miner: Option<String> => Text,
            node_info: Option<String> => Text,
            requester_info: Option<String> => Text,
            requesting_api_key: Option<String> => Text,
            system_content_miner_id: Option<i64> => Int8,
            created_at: Option<DateTime<Utc>> => TimestampTz,
            updated_at: Option<DateTime<Utc>> => TimestampTz,
            delta_node_uuid: Option<String> => Text,
        ],
    }
}

crate::declare_entity! {
    /// Row record of the `content_wallet_logs` table.
    pub struct ContentWalletLogs {
        table: "content_wallet_logs",
        columns: [
            id: i64 => Int8 primary,
            content: Option<i64> => Int8,
            wallet: Option<String> => Text,
            node_info: Option<String> => Text,
            requester_info: Option<String> => Text,
            requesting_api_key: Option<String> => Text,
            system_content_wallet_id: Option<i64> => Int8,
            created_at: Option<DateTime<Utc>> => TimestampTz,
            updated_at: Option<DateTime<Utc>> => TimestampTz,
            delta_node_uuid: Option<String> => Text,
            wallet_id: Option<i64> => Int8,
        ],
    }
}

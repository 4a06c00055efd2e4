//! System-level log tables: generic log events, piece commitments, and
//! wallet registrations.

use chrono::{DateTime, Utc};

crate::declare_entity! {
    /// Row record of the `log_events` table.
    pub struct LogEvents {
        table: "log_events",
        columns: [
            id: i64 => Int8 primary,
            log_event_type: Option<String> => Text,
            log_event_object: Option<String> => Text,
            log_event_id: Option<i64> => Int8,
            log_event: Option<String> => Text,
            source_host: Option<String> => Text,
            source_ip: Option<String> => Text,
            created_at: Option<DateTime<Utc>> => TimestampTz,
            updated_at: Option<DateTime<Utc>> => TimestampTz,
            delta_uuid: Option<String> => Text,
        ],
    }
}

crate::declare_entity! {
    /// Row record of the `piece_commitment_logs` table.
    pub struct PieceCommitmentLogs {
        table: "piece_commitment_logs",
        columns: [
            id: i64 => Int8 primary,
            cid: Option<String> => Text,
            piece: Option<String> => Text,
            size: Option<i64> => Int8,
            padded_piece_size: Option<i64> => Int8,
            unpadded_piece_size: Option<i64> => Int8,
            status: Option<String> => Text,
            last_message: Option<String> => Text,
            node_info: Option<String> => Text,
            requester_info: Option<String> => Text,
            requesting_api_key: Option<String> => Text,
            system_content_piece_commitment_id: Option<i64> => Int8,
            created_at: Option<DateTime<Utc>> => TimestampTz,
            updated_at: Option<DateTime<Utc>> => TimestampTz,
            delta_node_uuid: Option<String> => Text,
        ],
    }
}

crate::declare_entity! {
    /// Row record of the `wallet_logs` table.
    pub struct WalletLogs {
        table: "wallet_logs",
        columns: [
            id: i64 => Int8 primary,
            uuid: Option<String> => Text,
            addr: Option<String> => Text,
            owner: Option<String> => Text,
            key_type: Option<String> => Text,
            private_key: Option<String> => Text,
            node_info: Option<String> => Text,
            requester_info: Option<String> => Text,
            requesting_api_key: Option<String> => Text,
            system_wallet_id: Option<i64> => Int8,
            created_at: Option<DateTime<Utc>> => TimestampTz,
            updated_at: Option<DateTime<Utc>> => TimestampTz,
            delta_node_uuid: Option<String> => Text,
        ],
    }
}

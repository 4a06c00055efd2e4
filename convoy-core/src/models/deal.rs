//! Deal-level log tables: deal lifecycle, proposals, and proposal parameters.

use chrono::{DateTime, Utc};

crate::declare_entity! {
    /// Row record of the `content_deal_logs` table.
    pub struct ContentDealLogs {
        table: "content_deal_logs",
        columns: [
            id: i64 => Int8 primary,
            content: Option<i64> => Int8,
            propose_to_sign: Option<String> => Text,
            deal_id: Option<i64> => Int8,
            deal_uuid: Option<String> => Text,
            miner: Option<String> => Text,
            verified: Option<String> => Text,
            node_info: Option<String> => Text,
            requester_info: Option<String> => Text,
            requesting_api_key: Option<String> => Text,
            system_content_deal_id: Option<i64> => Int8,
            created_at: Option<DateTime<Utc>> => TimestampTz,
            updated_at: Option<DateTime<Utc>> => TimestampTz,
            delta_node_uuid: Option<String> => Text,
        ],
    }
}

crate::declare_entity! {
    /// Row record of the `content_deal_proposal_logs` table.
    pub struct ContentDealProposalLogs {
        table: "content_deal_proposal_logs",
        columns: [
            id: i64 => Int8 primary,
            content: Option<i64> => Int8,
            unsigned: Option<String> => Text,
            signed: Option<String> => Text,
            meta: Option<String> => Text,
            node_info: Option<String> => Text,
            requester_info: Option<String> => Text,
            requesting_api_key: Option<String> => Text,
            system_content_deal_proposal_id: Option<i64> => Int8,
            created_at: Option<DateTime<Utc>> => TimestampTz,
            updated_at: Option<DateTime<Utc>> => TimestampTz,
            delta_node_uuid: Option<String> => Text,
        ],
    }
}

crate::declare_entity! {
    /// Row record of the `content_deal_proposal_parameters_logs` table.
    pub struct ContentDealProposalParametersLogs {
        table: "content_deal_proposal_parameters_logs",
        columns: [
            id: i64 => Int8 primary,
            content: Option<i64> => Int8,
            label: Option<String> => Text,
            duration: Option<i64> => Int8,
            start_epoch: Option<i64> => Int8,
            end_epoch: Option<i64> => Int8,
            transfer_params: Option<String> => Text,
            remove_unsealed_copy: Option<i64> => Int8,
            skip_ipni_announce: Option<i64> => Int8,
            node_info: Option<String> => Text,
            requester_info: Option<String> => Text,
            requesting_api_key: Option<String> => Text,
            system_content_deal_proposal_parameters_id: Option<i64> => Int8,
            created_at: Option<DateTime<Utc>> => TimestampTz,
            updated_at: Option<DateTime<Utc>> => TimestampTz,
            delta_node_uuid: Option<String> => Text,
        ],
    }
}

//! Node-level log tables: geo locations, startup reports, and instance
//! metadata snapshots.

use chrono::{DateTime, Utc};

crate::declare_entity! {
    /// Row record of the `delta_node_geo_locations` table.
    pub struct DeltaNodeGeoLocations {
        table: "delta_node_geo_locations",
        columns: [
            id: i64 => Int8 primary,
            ip: Option<String> => Text,
            country: Option<String> => Text,
            region: Option<String> => Text,
            city: Option<String> => Text,
            latitude: Option<String> => Text,
            longitude: Option<String> => Text,
            created_at: Option<DateTime<Utc>> => TimestampTz,
            updated_at: Option<DateTime<Utc>> => TimestampTz,
            delta_node_uuid: Option<String> => Text,
        ],
    }
}

crate::declare_entity! {
    /// Row record of the `delta_startup_logs` table.
    pub struct DeltaStartupLogs {
        table: "delta_startup_logs",
        columns: [
            id: i64 => Int8 primary,
            node_info: Option<String> => Text,
            os_details: Option<String> => Text,
            ip_address: Option<String> => Text,
            created_at: Option<DateTime<Utc>> => TimestampTz,
            updated_at: Option<DateTime<Utc>> => TimestampTz,
            delta_node_uuid: Option<String> => Text,
        ],
    }
}

crate::declare_entity! {
    /// Row record of the `instance_meta_logs` table.
    pub struct InstanceMetaLogs {
        table: "instance_meta_logs",
        columns: [
            id: i64 => Int8 primary,
            instance_start: Option<DateTime<Utc>> => TimestampTz,
            os_details: Option<String> => Text,
            public_ip: Option<String> => Text,
            memory_limit: Option<i64> => Int8,
            cpu_limit: Option<i64> => Int8,
            storage_limit: Option<i64> => Int8,
            disable_request: Option<i64> => Int8,
            node_info: Option<String> => Text,
            requester_info: Option<String> => Text,
            requesting_api_key: Option<String> => Text,
            system_instance_meta_id: Option<i64> => Int8,
            created_at: Option<DateTime<Utc>> => TimestampTz,
            updated_at: Option<DateTime<Utc>> => TimestampTz,
            delta_node_uuid: Option<String> => Text,
        ],
    }
}

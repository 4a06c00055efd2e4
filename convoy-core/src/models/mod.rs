//! Row-record models for the telemetry log tables.
//!
//! One `declare_entity!` declaration per table. `ALL_TABLES` is the
//! registration set consumed by the schema auto-create step at startup;
//! adding a table means adding its declaration and listing it here.

pub mod content;
pub mod deal;
pub mod node;
pub mod system;

pub use content::{ContentLogs, ContentMinerLogs, ContentWalletLogs};
pub use deal::{ContentDealLogs, ContentDealProposalLogs, ContentDealProposalParametersLogs};
pub use node::{DeltaNodeGeoLocations, DeltaStartupLogs, InstanceMetaLogs};
pub use system::{LogEvents, PieceCommitmentLogs, WalletLogs};

use crate::entity::{Entity, TableDescriptor};

/// Every registered table, in schema-creation order.
pub const ALL_TABLES: &[TableDescriptor] = &[
    ContentDealLogs::TABLE,
    ContentDealProposalLogs::TABLE,
    ContentDealProposalParametersLogs::TABLE,
    ContentLogs::TABLE,
    ContentMinerLogs::TABLE,
    ContentWalletLogs::TABLE,
    DeltaNodeGeoLocations::TABLE,
    DeltaStartupLogs::TABLE,
    InstanceMetaLogs::TABLE,
    LogEvents::TABLE,
    PieceCommitmentLogs::TABLE,
    WalletLogs::TABLE,
];

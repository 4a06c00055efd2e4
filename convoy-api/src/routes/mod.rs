//! Route Registration
//!
//! Wires the generic entity router to every registered log table and mounts
//! the health endpoints. Each table is served under its own table-name path
//! segment.

pub mod entity;
pub mod health;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use convoy_core::models::{
    ContentDealLogs, ContentDealProposalLogs, ContentDealProposalParametersLogs, ContentLogs,
    ContentMinerLogs, ContentWalletLogs, DeltaNodeGeoLocations, DeltaStartupLogs,
    InstanceMetaLogs, LogEvents, PieceCommitmentLogs, WalletLogs,
};
use convoy_core::Entity;
use convoy_storage::ResultCache;

use crate::db::DbClient;
use crate::repository::Repository;
use crate::store::PgStore;

pub use entity::{entity_router, ListParams, ListResponse};

/// Mount the CRUD routes for one table under its table-name segment.
fn table_router<E: Entity>(db: &DbClient, cache: &Arc<ResultCache>) -> Router {
    let repo = Arc::new(Repository::new(
        PgStore::<E>::new(db.clone()),
        Arc::clone(cache),
    ));

    Router::new().nest(&format!("/{}", E::TABLE.name), entity_router(repo))
}

/// Create the complete API router: one CRUD route set per registered table,
/// health endpoints, and request tracing.
pub fn create_api_router(db: DbClient, cache: Arc<ResultCache>) -> Router {
    Router::new()
        .merge(table_router::<ContentDealLogs>(&db, &cache))
        .merge(table_router::<ContentDealProposalLogs>(&db, &cache))
        .merge(table_router::<ContentDealProposalParametersLogs>(&db, &cache))
        .merge(table_router::<ContentLogs>(&db, &cache))
        .merge(table_router::<ContentMinerLogs>(&db, &cache))
        .merge(table_router::<ContentWalletLogs>(&db, &cache))
        .merge(table_router::<DeltaNodeGeoLocations>(&db, &cache))
        .merge(table_router::<DeltaStartupLogs>(&db, &cache))
        .merge(table_router::<InstanceMetaLogs>(&db, &cache))
        .merge(table_router::<LogEvents>(&db, &cache))
        .merge(table_router::<PieceCommitmentLogs>(&db, &cache))
        .merge(table_router::<WalletLogs>(&db, &cache))
        .nest("/health", health::create_router(db))
        .layer(TraceLayer::new_for_http())
}

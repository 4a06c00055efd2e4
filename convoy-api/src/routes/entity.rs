//! Generic Entity Routes
//!
//! One handler set serves every registered log table:
//! - GET    /{table}          - list with pagination and ordering
//! - POST   /{table}          - create
//! - GET    /{table}/{id}     - fetch by primary key
//! - PUT    /{table}/{id}     - copy-merge update
//! - DELETE /{table}/{id}     - delete
//!
//! The table segment is fixed per router instance; handlers are generic over
//! the entity type and the store behind the repository.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use convoy_core::Entity;

use crate::constants::DEFAULT_PAGE_SIZE;
use crate::error::{ApiError, ApiResult};
use crate::repository::Repository;
use crate::store::EntityStore;

// ============================================================================
// QUERY PARAMETERS AND RESPONSE SHAPE
// ============================================================================

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

/// List query parameters.
///
/// `page` defaults to 0, which disables the offset. `pageSize` accepts the
/// lowercase `pagesize` spelling as well.
#[derive(Debug, Clone, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub page: i64,

    #[serde(
        default = "default_page_size",
        rename = "pageSize",
        alias = "pagesize"
    )]
    pub page_size: i64,

    #[serde(default)]
    pub order: String,
}

/// List response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<E> {
    pub data: Vec<E>,
    #[serde(rename = "totalRows")]
    pub total_rows: i64,
    pub page: i64,
    #[serde(rename = "pageSize")]
    pub page_size: i64,
}

// ============================================================================
// HANDLERS
// ============================================================================

async fn list_records<E: Entity, S: EntityStore<E>>(
    State(repo): State<Arc<Repository<E, S>>>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<ListResponse<E>>> {
    if params.page_size < 1 {
        return Err(ApiError::invalid_input(format!(
            "pageSize must be positive, got {}",
            params.page_size
        )));
    }

    let page = repo
        .list(params.page, params.page_size, &params.order)
        .await?;

    Ok(Json(ListResponse {
        data: page.records,
        total_rows: page.total_rows,
        page: params.page,
        page_size: params.page_size,
    }))
}

async fn get_record<E: Entity, S: EntityStore<E>>(
    State(repo): State<Arc<Repository<E, S>>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<E>> {
    let record = repo.get(id).await?;
    Ok(Json(record))
}

async fn create_record<E: Entity, S: EntityStore<E>>(
    State(repo): State<Arc<Repository<E, S>>>,
    Json(record): Json<E>,
) -> ApiResult<impl IntoResponse> {
    let (stored, _rows) = repo.create(&record).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

async fn update_record<E: Entity, S: EntityStore<E>>(
    State(repo): State<Arc<Repository<E, S>>>,
    Path(id): Path<i64>,
    Json(patch): Json<E>,
) -> ApiResult<Json<E>> {
    let (updated, _rows) = repo.update(id, &patch).await?;
    Ok(Json(updated))
}

async fn delete_record<E: Entity, S: EntityStore<E>>(
    State(repo): State<Arc<Repository<E, S>>>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// ROUTER
// ============================================================================

/// Build the CRUD router for one entity type. Nested under the table-name
/// path segment by the top-level router.
pub fn entity_router<E: Entity, S: EntityStore<E> + 'static>(
    repo: Arc<Repository<E, S>>,
) -> Router {
    Router::new()
        .route("/", get(list_records::<E, S>).post(create_record::<E, S>))
        .route(
            "/:id",
            get(get_record::<E, S>)
                .put(update_record::<E, S>)
                .delete(delete_record::<E, S>),
        )
        .with_state(repo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::util::ServiceExt;

    use convoy_core::models::ContentMinerLogs;
    use convoy_storage::ResultCache;

    use crate::store::mem::MemStore;

    fn test_router() -> Router {
        let repo = Arc::new(Repository::<ContentMinerLogs, _>::new(
            MemStore::new(),
            Arc::new(ResultCache::with_defaults()),
        ));
        Router::new().nest("/content_miner_logs", entity_router(repo))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_roundtrip() {
        let app = test_router();

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/content_miner_logs",
                serde_json::json!({ "miner": "f01000", "content": 12 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let created = body_json(response).await;
        assert_eq!(created["id"], 1);
        assert_eq!(created["miner"], "f01000");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/content_miner_logs/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let fetched = body_json(response).await;
        assert_eq!(fetched["content"], 12);
    }

    #[tokio::test]
    async fn test_get_absent_returns_404() {
        let app = test_router();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/content_miner_logs/42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_list_envelope_and_pagination() {
        let app = test_router();

        for i in 0..3 {
            let response = app
                .clone()
                .oneshot(json_request(
                    "POST",
                    "/content_miner_logs",
                    serde_json::json!({ "miner": format!("f0{}", i) }),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/content_miner_logs?page=1&pageSize=2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["totalRows"], 3);
        assert_eq!(body["page"], 1);
        assert_eq!(body["pageSize"], 2);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_rejects_non_positive_page_size() {
        let app = test_router();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/content_miner_logs?pageSize=0")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_rejects_unknown_order_column() {
        let app = test_router();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/content_miner_logs?order=evil_col")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_merges_patch() {
        let app = test_router();

        app.clone()
            .oneshot(json_request(
                "POST",
                "/content_miner_logs",
                serde_json::json!({ "miner": "f01000", "content": 12 }),
            ))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/content_miner_logs/1",
                serde_json::json!({ "miner": "f02000" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let updated = body_json(response).await;
        assert_eq!(updated["miner"], "f02000");
        // Fields absent from the patch keep their stored values.
        assert_eq!(updated["content"], 12);
    }

    #[tokio::test]
    async fn test_update_absent_returns_404() {
        let app = test_router();

        let response = app
            .oneshot(json_request(
                "PUT",
                "/content_miner_logs/9",
                serde_json::json!({ "miner": "f02000" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_then_404() {
        let app = test_router();

        app.clone()
            .oneshot(json_request(
                "POST",
                "/content_miner_logs",
                serde_json::json!({ "miner": "f01000" }),
            ))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/content_miner_logs/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/content_miner_logs/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_body_returns_client_error() {
        let app = test_router();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/content_miner_logs")
                    .header("content-type", "application/json")
                    .body(Body::from("{ not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }
}

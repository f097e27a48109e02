//! HTTP endpoint handlers

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use log::warn;
use serde::Serialize;
use subtrack_core::{
    core_version, ping, ListParams, PriceSummary, ServiceResult, SqliteSubscriptionRepository,
    Subscription, SubscriptionService, SummaryParams,
};

use crate::error::ApiError;
use crate::AppState;

type Service<'conn> = SubscriptionService<SqliteSubscriptionRepository<'conn>>;

/// Response for a successful delete
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub status: &'static str,
}

/// Response for the health probe
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
}

/// Runs one service operation against the shared store on the blocking pool.
async fn run<T, F>(state: Arc<AppState>, operation: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Service<'_>) -> ServiceResult<T> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || {
        state.store.with_conn(|conn| {
            let service = SubscriptionService::new(SqliteSubscriptionRepository::new(conn));
            operation(&service)
        })
    })
    .await
    .map_err(|err| ApiError::Worker(err.to_string()))?;

    Ok(result?)
}

/// Path ids that fail to extract behave like unknown ids.
fn path_id(path: Result<Path<String>, PathRejection>) -> String {
    match path {
        Ok(Path(id)) => id,
        Err(rejection) => {
            warn!("event=http_path module=server status=rejected error={rejection}");
            String::new()
        }
    }
}

fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| ApiError::InvalidQuery(rejection.body_text()))
}

/// Create a subscription
pub async fn create_subscription(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<Subscription>), ApiError> {
    let created = run(state, move |service| service.create(&body)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get a subscription by id
pub async fn get_subscription(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Subscription>, ApiError> {
    let id = path_id(path);
    let subscription = run(state, move |service| service.get(&id)).await?;
    Ok(Json(subscription))
}

/// Replace every mutable field of a subscription
pub async fn update_subscription(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> Result<Json<Subscription>, ApiError> {
    let id = path_id(path);
    let updated = run(state, move |service| service.update(&id, &body)).await?;
    Ok(Json(updated))
}

/// Delete a subscription; unknown ids succeed
pub async fn delete_subscription(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id = path_id(path);
    run(state, move |service| service.delete(&id)).await?;
    Ok(Json(DeleteResponse { status: "deleted" }))
}

/// List subscriptions filtered by user and service name
pub async fn list_subscriptions(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Subscription>>, ApiError> {
    let params = query_params(query)?;
    let subscriptions = run(state, move |service| service.list(&params)).await?;
    Ok(Json(subscriptions))
}

/// Sum prices of matching subscriptions
pub async fn summarize_subscriptions(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SummaryParams>, QueryRejection>,
) -> Result<Json<PriceSummary>, ApiError> {
    let params = query_params(query)?;
    let summary = run(state, move |service| service.summary(&params)).await?;
    Ok(Json(summary))
}

/// Liveness probe; 503 once the store handle is gone
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let available = tokio::task::spawn_blocking(move || state.store.is_available())
        .await
        .unwrap_or(false);
    let (code, database) = if available {
        (StatusCode::OK, "available")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    };
    (
        code,
        Json(HealthResponse {
            status: ping(),
            version: core_version(),
            database,
        }),
    )
}

/// Machine-readable API description
pub async fn openapi() -> Json<serde_json::Value> {
    Json(crate::openapi::api_document())
}

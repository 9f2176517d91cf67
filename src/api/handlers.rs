use crate::api::AppState;
use crate::error::Result;
use crate::events::{ChangeEvent, QueueMessage};
use crate::search::SearchRequest;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Health check endpoint
pub async fn health_check() -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Structured case search
pub async fn search_cases(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>> {
    let cases = state.search.search(&request).await?;
    Ok(Json(SearchResponse { cases }))
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub cases: Vec<Uuid>,
}

/// Fetch a single case document by UUID
pub async fn get_case(
    State(state): State<AppState>,
    Path(case_uuid): Path<Uuid>,
) -> Result<Json<Value>> {
    let case_type = state.resolver.resolve(case_uuid)?.to_string();
    let document = state.index.find_by_id(&case_type, case_uuid).await?;
    Ok(Json(document))
}

/// Accept a change event for asynchronous processing
pub async fn ingest_event(
    State(state): State<AppState>,
    Json(event): Json<ChangeEvent>,
) -> Result<StatusCode> {
    let body = serde_json::to_string(&event)?;
    state.queue.enqueue(QueueMessage::new(body));
    Ok(StatusCode::ACCEPTED)
}

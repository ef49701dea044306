use axum::Json;
use axum::extract::{Query, State};

use crate::error::ApiError;
use crate::fetcher::Fetch;

use super::AppState;
use super::models::{HealthResponse, SearchParams, SearchResponse};

pub async fn search_handler<F: Fetch>(
    State(state): State<AppState<F>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let queries = params.queries();
    if queries.is_empty() {
        return Err(ApiError::MissingQuery);
    }

    let outcome = state.coordinator.run_batch(&queries).await;

    Ok(Json(SearchResponse::from_outcome(
        outcome,
        params.wants_diagnostics(),
    )))
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

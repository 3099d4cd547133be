use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{EventSummary, RecommendedEvent},
    services::recommend_events,
};

use super::AppState;

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// List every event by id and name
pub async fn list_events(State(state): State<AppState>) -> AppResult<Json<Vec<EventSummary>>> {
    let mut session = state.store.session().await?;
    let events = session.list_events().await?;
    Ok(Json(events.iter().map(EventSummary::from).collect()))
}

/// Recommend up to two events for a user
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<RecommendedEvent>>> {
    tracing::info!(
        request_id = %request_id,
        user_id,
        "Processing recommendation request"
    );

    let mut session = state.store.session().await?;
    let recommendations =
        recommend_events(&mut *session, user_id, state.interest_matching).await?;

    tracing::info!(
        request_id = %request_id,
        count = recommendations.len(),
        "Recommendation completed"
    );

    Ok(Json(recommendations))
}

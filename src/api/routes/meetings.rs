//! Meeting history endpoints.
//!
//! Provides HTTP endpoints for:
//! - Listing meetings, newest first (GET /meetings)
//! - Deleting a meeting by start time (DELETE /meetings?start_time=...)
//! - Getting a specific meeting (GET /meetings/:id)
//! - Editing an archived meeting (PATCH /meetings/:id)

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::ApiState;
use crate::meeting::{archive, MeetingRecord, MeetingUpdate};

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    pub start_time: String,
}

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/meetings", get(list_meetings).delete(delete_meeting))
        .route("/meetings/:id", get(get_meeting).patch(update_meeting))
}

async fn list_meetings(State(state): State<ApiState>) -> Json<Vec<MeetingRecord>> {
    Json(archive::list_all(state.context.repository()).await)
}

async fn get_meeting(
    Path(id): Path<String>,
    State(state): State<ApiState>,
) -> ApiResult<Json<MeetingRecord>> {
    state
        .context
        .repository()
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Meeting {} not found", id)))
}

async fn update_meeting(
    Path(id): Path<String>,
    State(state): State<ApiState>,
    Json(update): Json<MeetingUpdate>,
) -> ApiResult<Json<MeetingRecord>> {
    let updated = archive::update_archived(state.context.repository(), &id, update)
        .await
        .ok_or_else(|| ApiError::not_found(format!("Meeting {} not found or not saved", id)))?;

    // The live view may be showing this meeting
    if state.context.record().is_some_and(|r| r.id == updated.id) {
        state.context.reload_data().await;
    }

    Ok(Json(updated))
}

async fn delete_meeting(
    Query(params): Query<DeleteParams>,
    State(state): State<ApiState>,
) -> Json<Value> {
    let deleted = archive::delete_by_start_time(state.context.repository(), &params.start_time).await;
    if deleted {
        info!("Meeting started at {} deleted via API", params.start_time);

        // Drop the in-memory copy if it was the one removed
        if let Some(loaded) = state.context.record() {
            if archive::get(state.context.repository(), &loaded.id).await.is_none() {
                state.context.reload_data().await;
            }
        }
    }

    Json(json!({ "deleted": deleted }))
}

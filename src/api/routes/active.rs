//! Live meeting endpoints.
//!
//! Everything under `/active` goes through the shared `MeetingContext`, so
//! the API sees the same in-memory copy as any other subscriber.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::ApiState;
use crate::meeting::{
    MeetingAnalysis, MeetingContext, MeetingRecord, Note, Question, TranscriptChunk,
    TranscriptSegment, ViewModes,
};

#[derive(Debug, Deserialize)]
pub struct TitleRequest {
    pub title: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetRequest {
    pub meeting_id: Option<String>,
}

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/active", get(get_active))
        .route("/active/reload", post(reload))
        .route("/active/target", put(set_target))
        .route("/active/archive", post(archive_active))
        .route("/active/title", put(set_title))
        .route("/active/notes", put(set_notes))
        .route("/active/analysis", put(set_analysis))
        .route("/active/questions", put(set_questions))
        .route("/active/chunks", post(ingest_chunk))
        .route("/active/segments", get(segments))
        .route("/active/speakers/:speaker/color", get(speaker_color))
        .route("/active/view", get(view_modes))
        .route("/active/view/notes", post(toggle_notes_view))
        .route("/active/view/transcription", post(toggle_transcription_view))
}

fn loaded(context: &MeetingContext) -> ApiResult<MeetingRecord> {
    context
        .record()
        .ok_or_else(|| ApiError::not_found("No meeting loaded"))
}

/// Turn a context write result into the response body.
fn saved(context: &MeetingContext, ok: bool) -> ApiResult<Json<MeetingRecord>> {
    if !ok {
        return Err(ApiError::unavailable("Meeting could not be saved"));
    }
    loaded(context).map(Json)
}

async fn get_active(State(state): State<ApiState>) -> ApiResult<Json<MeetingRecord>> {
    loaded(&state.context).map(Json)
}

async fn reload(State(state): State<ApiState>) -> ApiResult<Json<MeetingRecord>> {
    let ok = state.context.reload_data().await;
    saved(&state.context, ok)
}

async fn set_target(
    State(state): State<ApiState>,
    Json(req): Json<TargetRequest>,
) -> ApiResult<Json<MeetingRecord>> {
    let ok = state.context.set_target(req.meeting_id.as_deref()).await;
    saved(&state.context, ok)
}

async fn archive_active(State(state): State<ApiState>) -> ApiResult<Json<MeetingRecord>> {
    let archived = state
        .context
        .repository()
        .archive_active()
        .await?
        .ok_or_else(|| ApiError::not_found("No active meeting to archive"))?;

    info!("Meeting {} archived via API", archived.id);

    // Start the next live meeting right away
    state.context.reload_data().await;

    Ok(Json(archived))
}

async fn set_title(
    State(state): State<ApiState>,
    Json(req): Json<TitleRequest>,
) -> ApiResult<Json<MeetingRecord>> {
    loaded(&state.context)?;
    let ok = state.context.set_title(req.title).await;
    saved(&state.context, ok)
}

async fn set_notes(
    State(state): State<ApiState>,
    Json(notes): Json<Vec<Note>>,
) -> ApiResult<Json<MeetingRecord>> {
    loaded(&state.context)?;
    let ok = state.context.set_notes(notes).await;
    saved(&state.context, ok)
}

async fn set_analysis(
    State(state): State<ApiState>,
    Json(analysis): Json<Option<MeetingAnalysis>>,
) -> ApiResult<Json<MeetingRecord>> {
    loaded(&state.context)?;
    let ok = state.context.set_analysis(analysis).await;
    saved(&state.context, ok)
}

async fn set_questions(
    State(state): State<ApiState>,
    Json(questions): Json<Vec<Question>>,
) -> ApiResult<Json<MeetingRecord>> {
    loaded(&state.context)?;
    let ok = state.context.set_questions(questions).await;
    saved(&state.context, ok)
}

async fn ingest_chunk(
    State(state): State<ApiState>,
    Json(chunk): Json<TranscriptChunk>,
) -> ApiResult<Json<MeetingRecord>> {
    loaded(&state.context)?;
    let ok = state.context.ingest_chunk(chunk).await;
    saved(&state.context, ok)
}

async fn segments(State(state): State<ApiState>) -> Json<Vec<TranscriptSegment>> {
    Json(state.context.segments())
}

async fn speaker_color(
    Path(speaker): Path<String>,
    State(state): State<ApiState>,
) -> Json<Value> {
    let color = state.context.speaker_color(&speaker);
    Json(json!({ "speaker": speaker, "color": color }))
}

async fn view_modes(State(state): State<ApiState>) -> Json<ViewModes> {
    Json(state.context.view_modes())
}

async fn toggle_notes_view(State(state): State<ApiState>) -> Json<ViewModes> {
    state.context.toggle_notes_view();
    Json(state.context.view_modes())
}

async fn toggle_transcription_view(State(state): State<ApiState>) -> Json<ViewModes> {
    state.context.toggle_transcription_view();
    Json(state.context.view_modes())
}

//! Document import and triage handlers.
//!
//! An upload is chunked into candidate cards which the user then walks
//! through one at a time, approving or skipping each. The walk state lives
//! in the per-user [`TriageRegistry`](crate::services::TriageRegistry).
//! Users without a registered session act on a detached `Upload` session,
//! which rejects every disposition.

use std::time::Instant;

use axum::{extract::Multipart, extract::State, Json};
use serde::Serialize;
use tracing::info;

use super::topics::retain_owned_topics;
use crate::{ApiError, AppState, RequireAuth};
use brain_core::{
    chunk_text, extract_text, Card, CandidateCard, DraftEdit, TriagePhase, TriageSession, TriageView,
};

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ApproveResponse {
    /// The card written from the approved draft.
    pub card: Card,
    pub view: TriageView,
}

/// Upload a `.txt`, `.md` or `.docx` file and start triage over its paragraphs.
///
/// # Multipart Fields
/// - `file`: the document (required)
#[utoipa::path(post, path = "/api/v1/import", tag = "Import",
    responses((status = 200, description = "Triage started", body = TriageView),
              (status = 409, description = "An import is already in progress"),
              (status = 422, description = "Unsupported file or no content")))]
pub async fn upload_import(
    State(state): State<AppState>,
    auth: RequireAuth,
    mut multipart: Multipart,
) -> Result<Json<TriageView>, ApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart error: {}", e)))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Read error: {}", e)))?
                .to_vec();
            upload = Some((filename, data));
            break;
        }
    }

    let (filename, data) = upload.ok_or_else(|| {
        ApiError::BadRequest("No file uploaded. Use field name 'file'.".to_string())
    })?;

    let start = Instant::now();
    let text = extract_text(&data, &filename, state.converter.as_ref()).await?;
    let chunks = chunk_text(&text);

    let session = state.triage.session(auth.user_id).await;
    let mut session = session.lock().await;
    if let Err(err) = session.start(filename.as_str(), chunks) {
        if session.phase() == TriagePhase::Upload {
            state.triage.remove(auth.user_id).await;
        }
        return Err(err.into());
    }
    let view = session.view();

    info!(
        subsystem = "api",
        component = "import",
        op = "upload",
        user_id = %auth.user_id,
        filename = %filename,
        chunk_count = view.total,
        total_found = view.total_found,
        duration_ms = start.elapsed().as_millis() as u64,
        "Document chunked for triage"
    );
    Ok(Json(view))
}

/// Current triage state.
#[utoipa::path(get, path = "/api/v1/import", tag = "Import",
    responses((status = 200, description = "Success", body = TriageView)))]
pub async fn get_import(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<Json<TriageView>, ApiError> {
    let view = match state.triage.existing(auth.user_id).await {
        Some(session) => session.lock().await.view(),
        None => TriageSession::new().view(),
    };
    Ok(Json(view))
}

/// Edit the active draft. Omitted fields keep their current value.
#[utoipa::path(patch, path = "/api/v1/import/draft", tag = "Import",
    request_body = DraftEdit,
    responses((status = 200, description = "Updated draft", body = CandidateCard),
              (status = 409, description = "No import in progress")))]
pub async fn edit_draft(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(mut edit): Json<DraftEdit>,
) -> Result<Json<CandidateCard>, ApiError> {
    if let Some(ids) = edit.connected_topic_ids.as_mut() {
        retain_owned_topics(&state, auth.user_id, ids).await?;
    }
    let session = state.triage.existing(auth.user_id).await.unwrap_or_default();
    let mut session = session.lock().await;
    let draft = session.edit_draft(edit)?.clone();
    Ok(Json(draft))
}

/// Save the active draft as a card and move to the next candidate.
///
/// The response carries the completion summary after the last candidate;
/// the session is released at that point.
#[utoipa::path(post, path = "/api/v1/import/approve", tag = "Import",
    responses((status = 200, description = "Card created", body = ApproveResponse),
              (status = 409, description = "No import in progress")))]
pub async fn approve_draft(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<Json<ApproveResponse>, ApiError> {
    let session = state.triage.existing(auth.user_id).await.unwrap_or_default();
    let mut session = session.lock().await;
    let card = session.approve(state.cards.as_ref(), auth.user_id).await?;
    let view = session.view();
    if view.phase == TriagePhase::Complete {
        state.triage.remove(auth.user_id).await;
    }
    Ok(Json(ApproveResponse { card, view }))
}

/// Discard the active draft and move to the next candidate.
#[utoipa::path(post, path = "/api/v1/import/skip", tag = "Import",
    responses((status = 200, description = "Skipped", body = TriageView),
              (status = 409, description = "No import in progress")))]
pub async fn skip_draft(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<Json<TriageView>, ApiError> {
    let session = state.triage.existing(auth.user_id).await.unwrap_or_default();
    let mut session = session.lock().await;
    session.skip()?;
    let view = session.view();
    if view.phase == TriagePhase::Complete {
        state.triage.remove(auth.user_id).await;
    }
    Ok(Json(view))
}

/// Abandon the current import and return to the upload step.
#[utoipa::path(post, path = "/api/v1/import/reset", tag = "Import",
    responses((status = 200, description = "Reset", body = TriageView)))]
pub async fn reset_import(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<Json<TriageView>, ApiError> {
    if let Some(session) = state.triage.existing(auth.user_id).await {
        session.lock().await.reset();
        state.triage.remove(auth.user_id).await;
    }
    Ok(Json(TriageSession::new().view()))
}

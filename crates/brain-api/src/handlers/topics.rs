//! Topic tree HTTP handlers.
//!
//! Every write goes through a [`TopicEditor`] built against a fresh snapshot
//! of the caller's topics, so numbers and levels are always computed here and
//! never taken from the request.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{ApiError, AppState, RequireAuth};
use brain_core::{Topic, TopicCommand, TopicDetail, TopicEditor, TopicForm, TopicIndex};

/// Request body for creating a topic.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateTopicRequest {
    /// Parent topic; absent creates a root.
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub related_topic_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct NextNumberQuery {
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct NextNumberResponse {
    pub number: String,
    pub level: i32,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DeleteTopicResponse {
    /// The topic and all of its descendants.
    pub deleted: Vec<Uuid>,
}

async fn load_index(state: &AppState, user_id: Uuid) -> Result<TopicIndex, ApiError> {
    Ok(TopicIndex::new(state.topics.list(user_id).await?))
}

/// Drop related ids that do not name one of the caller's topics.
fn known_related(index: &TopicIndex, mut form: TopicForm) -> TopicForm {
    form.related_topic_ids.retain(|id| index.get(*id).is_some());
    form
}

/// Restrict card topic links to topics the caller owns.
pub(crate) async fn retain_owned_topics(
    state: &AppState,
    user_id: Uuid,
    ids: &mut Vec<Uuid>,
) -> Result<(), ApiError> {
    if ids.is_empty() {
        return Ok(());
    }
    let index = load_index(state, user_id).await?;
    ids.retain(|id| index.get(*id).is_some());
    Ok(())
}

async fn execute(state: &AppState, user_id: Uuid, command: TopicCommand) -> Result<Topic, ApiError> {
    let topic = match command {
        TopicCommand::Create(new_topic) => state.topics.insert(user_id, new_topic).await?,
        TopicCommand::Update { id, changes } => state.topics.update(user_id, id, changes).await?,
    };
    Ok(topic)
}

/// List the caller's topics ordered by number.
#[utoipa::path(get, path = "/api/v1/topics", tag = "Topics",
    responses((status = 200, description = "Success", body = Vec<Topic>)))]
pub async fn list_topics(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<Json<Vec<Topic>>, ApiError> {
    Ok(Json(state.topics.list(auth.user_id).await?))
}

/// Create a root or child topic with the next free number.
#[utoipa::path(post, path = "/api/v1/topics", tag = "Topics",
    request_body = CreateTopicRequest,
    responses((status = 201, description = "Created", body = Topic),
              (status = 400, description = "Missing title"),
              (status = 404, description = "Parent not found")))]
pub async fn create_topic(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(req): Json<CreateTopicRequest>,
) -> Result<(StatusCode, Json<Topic>), ApiError> {
    let index = load_index(&state, auth.user_id).await?;
    let editor = TopicEditor::create(req.parent_id);
    let form = known_related(
        &index,
        TopicForm {
            title: req.title,
            emoji: req.emoji,
            related_topic_ids: req.related_topic_ids,
        },
    );

    let command = editor.submit(form, &index)?;
    let topic = execute(&state, auth.user_id, command).await?;

    info!(
        subsystem = "api",
        component = "topics",
        op = "create",
        user_id = %auth.user_id,
        topic_id = %topic.id,
        topic_number = %topic.number,
        "Topic created"
    );
    Ok((StatusCode::CREATED, Json(topic)))
}

/// Preview the number a new topic under `parent_id` would receive.
#[utoipa::path(get, path = "/api/v1/topics/next-number", tag = "Topics",
    params(("parent_id" = Option<Uuid>, Query, description = "Parent topic, absent for a root")),
    responses((status = 200, description = "Success", body = NextNumberResponse)))]
pub async fn next_topic_number(
    State(state): State<AppState>,
    auth: RequireAuth,
    Query(query): Query<NextNumberQuery>,
) -> Result<Json<NextNumberResponse>, ApiError> {
    let index = load_index(&state, auth.user_id).await?;
    let (number, level) = index.plan_child(query.parent_id)?;
    Ok(Json(NextNumberResponse { number, level }))
}

/// Topic with breadcrumb, children, related topics and linked cards.
#[utoipa::path(get, path = "/api/v1/topics/{id}", tag = "Topics",
    params(("id" = Uuid, Path, description = "Topic ID")),
    responses((status = 200, description = "Success", body = TopicDetail),
              (status = 404, description = "Not found")))]
pub async fn get_topic(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<TopicDetail>, ApiError> {
    let index = load_index(&state, auth.user_id).await?;
    let cards = state.cards.list(auth.user_id).await?;
    Ok(Json(TopicDetail::build(&index, id, &cards)?))
}

/// Update title, emoji and related topics. Number, level and parent are fixed.
#[utoipa::path(put, path = "/api/v1/topics/{id}", tag = "Topics",
    params(("id" = Uuid, Path, description = "Topic ID")),
    request_body = TopicForm,
    responses((status = 200, description = "Success", body = Topic),
              (status = 404, description = "Not found")))]
pub async fn update_topic(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
    Json(form): Json<TopicForm>,
) -> Result<Json<Topic>, ApiError> {
    let index = load_index(&state, auth.user_id).await?;
    let editor = TopicEditor::Edit {
        topic: index.require(id)?.clone(),
    };
    let command = editor.submit(known_related(&index, form), &index)?;
    Ok(Json(execute(&state, auth.user_id, command).await?))
}

/// Delete a topic and its whole subtree.
#[utoipa::path(delete, path = "/api/v1/topics/{id}", tag = "Topics",
    params(("id" = Uuid, Path, description = "Topic ID")),
    responses((status = 200, description = "Deleted", body = DeleteTopicResponse),
              (status = 404, description = "Not found")))]
pub async fn delete_topic(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteTopicResponse>, ApiError> {
    let deleted = state.topics.delete_cascade(auth.user_id, id).await?;
    Ok(Json(DeleteTopicResponse { deleted }))
}

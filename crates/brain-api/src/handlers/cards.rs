//! Card HTTP handlers.
//!
//! Status is never accepted from clients. It is derived from the category
//! whenever a card is written. Topic links naming topics the caller does not
//! own are dropped.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::topics::retain_owned_topics;
use crate::{ApiError, AppState, RequireAuth};
use brain_core::{Card, CardFilter, CardInput, Category, KanbanBoard};

/// Query parameters for listing cards.
#[derive(Debug, Default, Deserialize)]
pub struct ListCardsQuery {
    /// Category display name; empty or "All" shows every category.
    pub category: Option<String>,
    /// Case-insensitive search over title and body.
    pub q: Option<String>,
}

impl ListCardsQuery {
    fn into_filter(self) -> Result<CardFilter, ApiError> {
        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(all) if all.eq_ignore_ascii_case("all") => None,
            Some(name) => Some(name.parse::<Category>().map_err(ApiError::BadRequest)?),
        };
        Ok(CardFilter {
            category,
            search: self.q,
        })
    }
}

/// List the caller's cards, newest first.
#[utoipa::path(get, path = "/api/v1/cards", tag = "Cards",
    params(
        ("category" = Option<String>, Query, description = "Category name, or All"),
        ("q" = Option<String>, Query, description = "Search text"),
    ),
    responses((status = 200, description = "Success", body = Vec<Card>)))]
pub async fn list_cards(
    State(state): State<AppState>,
    auth: RequireAuth,
    Query(query): Query<ListCardsQuery>,
) -> Result<Json<Vec<Card>>, ApiError> {
    let filter = query.into_filter()?;
    let cards = state.cards.list(auth.user_id).await?;
    Ok(Json(filter.apply(cards)))
}

/// Cards grouped into one column per category.
#[utoipa::path(get, path = "/api/v1/cards/board", tag = "Cards",
    responses((status = 200, description = "Success", body = KanbanBoard)))]
pub async fn card_board(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<Json<KanbanBoard>, ApiError> {
    let cards = state.cards.list(auth.user_id).await?;
    Ok(Json(KanbanBoard::from_cards(cards)))
}

/// Create a card.
#[utoipa::path(post, path = "/api/v1/cards", tag = "Cards",
    request_body = CardInput,
    responses((status = 201, description = "Created", body = Card)))]
pub async fn create_card(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(mut input): Json<CardInput>,
) -> Result<(StatusCode, Json<Card>), ApiError> {
    retain_owned_topics(&state, auth.user_id, &mut input.connected_topic_ids).await?;
    let card = state.cards.insert(auth.user_id, input).await?;
    info!(
        subsystem = "api",
        component = "cards",
        op = "create",
        user_id = %auth.user_id,
        card_id = %card.id,
        "Card created"
    );
    Ok((StatusCode::CREATED, Json(card)))
}

#[utoipa::path(get, path = "/api/v1/cards/{id}", tag = "Cards",
    params(("id" = Uuid, Path, description = "Card ID")),
    responses((status = 200, description = "Success", body = Card),
              (status = 404, description = "Not found")))]
pub async fn get_card(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<Card>, ApiError> {
    let card = state
        .cards
        .get(auth.user_id, id)
        .await?
        .ok_or_else(|| ApiError::from(brain_core::Error::CardNotFound(id)))?;
    Ok(Json(card))
}

/// Replace a card's writable fields.
#[utoipa::path(put, path = "/api/v1/cards/{id}", tag = "Cards",
    params(("id" = Uuid, Path, description = "Card ID")),
    request_body = CardInput,
    responses((status = 200, description = "Success", body = Card),
              (status = 404, description = "Not found")))]
pub async fn update_card(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
    Json(mut input): Json<CardInput>,
) -> Result<Json<Card>, ApiError> {
    retain_owned_topics(&state, auth.user_id, &mut input.connected_topic_ids).await?;
    let card = state.cards.update(auth.user_id, id, input).await?;
    Ok(Json(card))
}

#[utoipa::path(delete, path = "/api/v1/cards/{id}", tag = "Cards",
    params(("id" = Uuid, Path, description = "Card ID")),
    responses((status = 204, description = "Deleted"),
              (status = 404, description = "Not found")))]
pub async fn delete_card(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.cards.delete(auth.user_id, id).await?;
    info!(
        subsystem = "api",
        component = "cards",
        op = "delete",
        user_id = %auth.user_id,
        card_id = %id,
        "Card deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}

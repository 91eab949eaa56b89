use super::models::{CardListQuery, CreateCardRequest, UpdateCardRequest};
use super::services::CardsService;
use crate::auth::AuthedUser;
use crate::common::{json_message, ApiError, AppState};
use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;

// ============================================================================
// Card CRUD Handlers
// ============================================================================

/// POST /api/cards - Create a card for the authenticated user
pub async fn create_card(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Json(request): Json<CreateCardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let cards_service = CardsService::new(app_state.db.clone());

    let card = cards_service.create_card(&user.id, request).await?;

    Ok((
        StatusCode::CREATED,
        json_message("Card created successfully.", json!({ "card": card })),
    ))
}

/// GET /api/cards - List the user's cards with pagination and filters
pub async fn list_cards(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Query(query): Query<CardListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let cards_service = CardsService::new(app_state.db.clone());

    let params = CardsService::resolve_list_params(&query)?;
    let page = cards_service.list_cards(&user.id, &params).await?;

    Ok(json_message(
        "Cards retrieved successfully.",
        json!({
            "items": page.items,
            "pagination": page.pagination,
            "filters": {
                "type": params.type_filter,
                "sort": params.sort,
                "order": params.order.as_str(),
            },
        }),
    ))
}

/// GET /api/cards/:id - Fetch a single card
pub async fn get_card(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(card_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let cards_service = CardsService::new(app_state.db.clone());

    let card = cards_service.get_card(&user.id, &card_id).await?;

    Ok(json_message(
        "Card retrieved successfully.",
        json!({ "card": card }),
    ))
}

/// PUT/PATCH /api/cards/:id - Update a card
pub async fn update_card(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(card_id): Path<String>,
    Json(request): Json<UpdateCardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let cards_service = CardsService::new(app_state.db.clone());

    let card = cards_service.update_card(&user.id, &card_id, request).await?;

    Ok(json_message(
        "Card updated successfully.",
        json!({ "card": card }),
    ))
}

/// DELETE /api/cards/:id - Delete a card (409 while expenses reference it)
pub async fn delete_card(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(card_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let cards_service = CardsService::new(app_state.db.clone());

    cards_service.delete_card(&user.id, &card_id).await?;

    Ok(json_message(
        "Card deleted successfully.",
        json!({ "card_id": card_id }),
    ))
}

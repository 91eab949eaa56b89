use super::handlers;
use axum::{routing::get, Router};

/// Creates the cards router with all card CRUD routes
pub fn cards_routes() -> Router {
    Router::new()
        .route(
            "/api/cards",
            get(handlers::list_cards).post(handlers::create_card),
        )
        .route(
            "/api/cards/:id",
            get(handlers::get_card)
                .put(handlers::update_card)
                .patch(handlers::update_card)
                .delete(handlers::delete_card),
        )
}

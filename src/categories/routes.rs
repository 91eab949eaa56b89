use super::handlers;
use axum::{routing::get, Router};

/// Creates the categories router with all category CRUD routes
pub fn categories_routes() -> Router {
    Router::new()
        .route(
            "/api/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/api/categories/:id",
            get(handlers::get_category)
                .put(handlers::update_category)
                .patch(handlers::update_category)
                .delete(handlers::delete_category),
        )
}

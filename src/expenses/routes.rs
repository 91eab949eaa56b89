use super::handlers;
use axum::{routing::get, Router};

/// Creates the expenses router with all expense CRUD routes
pub fn expenses_routes() -> Router {
    Router::new()
        .route(
            "/api/expenses",
            get(handlers::list_expenses).post(handlers::create_expense),
        )
        .route(
            "/api/expenses/:id",
            get(handlers::get_expense)
                .put(handlers::update_expense)
                .patch(handlers::update_expense)
                .delete(handlers::delete_expense),
        )
}

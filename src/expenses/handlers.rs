use super::models::{CreateExpenseRequest, ExpenseListQuery, UpdateExpenseRequest};
use super::services::ExpensesService;
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
// Expense CRUD Handlers
// ============================================================================

/// POST /api/expenses - Record an expense for the authenticated user
pub async fn create_expense(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Json(request): Json<CreateExpenseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let expenses_service = ExpensesService::new(app_state.db.clone());

    let expense = expenses_service.create_expense(&user.id, request).await?;

    Ok((
        StatusCode::CREATED,
        json_message("Expense created successfully.", json!({ "expense": expense })),
    ))
}

/// GET /api/expenses - List the user's expenses with pagination and filters
pub async fn list_expenses(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Query(query): Query<ExpenseListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let expenses_service = ExpensesService::new(app_state.db.clone());

    let params = ExpensesService::resolve_list_params(&query)?;
    let page = expenses_service.list_expenses(&user.id, &params).await?;

    Ok(json_message(
        "Expenses retrieved successfully.",
        json!({
            "items": page.items,
            "pagination": page.pagination,
            "filters": {
                "category": params.category_filter,
                "type": params.type_filter,
                "sort": params.sort,
                "order": params.order.as_str(),
            },
        }),
    ))
}

/// GET /api/expenses/:id - Fetch a single expense
pub async fn get_expense(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(expense_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let expenses_service = ExpensesService::new(app_state.db.clone());

    let expense = expenses_service.get_expense(&user.id, &expense_id).await?;

    Ok(json_message(
        "Expense retrieved successfully.",
        json!({ "expense": expense }),
    ))
}

/// PUT/PATCH /api/expenses/:id - Update an expense
pub async fn update_expense(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(expense_id): Path<String>,
    Json(request): Json<UpdateExpenseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let expenses_service = ExpensesService::new(app_state.db.clone());

    let expense = expenses_service
        .update_expense(&user.id, &expense_id, request)
        .await?;

    Ok(json_message(
        "Expense updated successfully.",
        json!({ "expense": expense }),
    ))
}

/// DELETE /api/expenses/:id - Delete an expense
pub async fn delete_expense(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(expense_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let expenses_service = ExpensesService::new(app_state.db.clone());

    expenses_service.delete_expense(&user.id, &expense_id).await?;

    Ok(json_message(
        "Expense deleted successfully.",
        json!({ "expense_id": expense_id }),
    ))
}

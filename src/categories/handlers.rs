use super::models::{CategoryListQuery, CreateCategoryRequest, UpdateCategoryRequest};
use super::services::CategoriesService;
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
// Category CRUD Handlers
// ============================================================================

/// POST /api/categories - Create a category
pub async fn create_category(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    _user: AuthedUser,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let categories_service = CategoriesService::new(app_state.db.clone());

    let category = categories_service.create_category(request).await?;

    Ok((
        StatusCode::CREATED,
        json_message(
            "Category created successfully.",
            json!({ "category": category }),
        ),
    ))
}

/// GET /api/categories - List categories with search and pagination
pub async fn list_categories(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    _user: AuthedUser,
    Query(query): Query<CategoryListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let categories_service = CategoriesService::new(app_state.db.clone());

    let params = CategoriesService::resolve_list_params(&query)?;
    let page = categories_service.list_categories(&params).await?;

    Ok(json_message(
        "Categories retrieved successfully.",
        json!({
            "items": page.items,
            "pagination": page.pagination,
            "filters": {
                "search": params.search,
                "sort": params.sort,
                "order": params.order.as_str(),
            },
        }),
    ))
}

/// GET /api/categories/:id - Fetch a single category
pub async fn get_category(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    _user: AuthedUser,
    Path(category_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let categories_service = CategoriesService::new(app_state.db.clone());

    let category = categories_service.get_category(&category_id).await?;

    Ok(json_message(
        "Category retrieved successfully.",
        json!({ "category": category }),
    ))
}

/// PUT/PATCH /api/categories/:id - Update a category
pub async fn update_category(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    _user: AuthedUser,
    Path(category_id): Path<String>,
    Json(request): Json<UpdateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let categories_service = CategoriesService::new(app_state.db.clone());

    let category = categories_service
        .update_category(&category_id, request)
        .await?;

    Ok(json_message(
        "Category updated successfully.",
        json!({ "category": category }),
    ))
}

/// DELETE /api/categories/:id - Delete a category (409 while expenses use it)
pub async fn delete_category(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    _user: AuthedUser,
    Path(category_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await;
    let categories_service = CategoriesService::new(app_state.db.clone());

    categories_service.delete_category(&category_id).await?;

    Ok(json_message(
        "Category deleted successfully.",
        json!({ "category_id": category_id }),
    ))
}

use super::models::{Category, CategoryListQuery, CreateCategoryRequest, UpdateCategoryRequest};
use super::validators::{self, slugify};
use crate::common::pagination::{PageWindow, Pagination, SortOrder};
use crate::common::{generate_category_id, ApiError, ValidationResult, Validator};
use sqlx::SqlitePool;
use tracing::info;

/// Resolved list parameters: clamped window plus whitelisted sort and an
/// optional free-text search.
pub struct CategoryListParams {
    pub window: PageWindow,
    pub sort: String,
    pub sort_column: &'static str,
    pub order: SortOrder,
    pub search: Option<String>,
}

/// A page of categories plus its pagination metadata.
pub struct CategoryPage {
    pub items: Vec<Category>,
    pub pagination: Pagination,
}

/// CRUD over the shared category taxonomy. Categories are global rows, not
/// owner-scoped; any authenticated user may manage them.
pub struct CategoriesService {
    db: SqlitePool,
}

impl CategoriesService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create a category, rejecting names whose slug is already taken.
    pub async fn create_category(
        &self,
        request: CreateCategoryRequest,
    ) -> Result<Category, ApiError> {
        let validation = request.validate(&request);
        if !validation.is_valid {
            return Err(validation.into());
        }

        let name = request.name.unwrap_or_default().trim().to_string();
        let slug = slugify(&name);

        if self.slug_taken(&slug, None).await? {
            let mut validation = ValidationResult::new();
            validation.add_error("name", "Category with this name already exists.");
            return Err(validation.into());
        }

        let id = generate_category_id();
        sqlx::query("INSERT INTO categories (id, name, slug, description) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(&name)
            .bind(&slug)
            .bind(request.description.as_deref().map(str::trim))
            .execute(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        info!(category_id = %id, slug = %slug, "Category created");

        self.get_category(&id).await
    }

    /// Fetch a single category by id.
    pub async fn get_category(&self, category_id: &str) -> Result<Category, ApiError> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?")
            .bind(category_id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?
            .ok_or_else(|| ApiError::NotFound("Category not found.".to_string()))
    }

    /// Resolve and validate list query parameters.
    pub fn resolve_list_params(query: &CategoryListQuery) -> Result<CategoryListParams, ApiError> {
        let mut validation = ValidationResult::new();

        let sort = query.sort.clone().unwrap_or_else(|| "name".to_string());
        let sort_column = match validators::sort_column(&sort) {
            Some(col) => col,
            None => {
                validation.add_error("sort", "sort must be one of: name, slug");
                "name"
            }
        };

        let order_raw = query.order.clone().unwrap_or_else(|| "asc".to_string());
        let order = match SortOrder::parse(&order_raw) {
            Some(o) => o,
            None => {
                validation.add_error("order", "order must be asc or desc");
                SortOrder::Asc
            }
        };

        if !validation.is_valid {
            return Err(validation.into());
        }

        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(CategoryListParams {
            window: PageWindow::clamp(query.page, query.limit),
            sort,
            sort_column,
            order,
            search,
        })
    }

    /// List categories with pagination, sorting and an optional search over
    /// name and slug. Ties are broken by id so pages are deterministic.
    pub async fn list_categories(
        &self,
        params: &CategoryListParams,
    ) -> Result<CategoryPage, ApiError> {
        let search_clause = if params.search.is_some() {
            " WHERE LOWER(name) LIKE ? OR slug LIKE ?"
        } else {
            ""
        };
        let pattern = params
            .search
            .as_deref()
            .map(|s| format!("%{}%", s.to_lowercase()));

        let count_sql = format!("SELECT COUNT(*) FROM categories{}", search_clause);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(pattern) = &pattern {
            count_query = count_query.bind(pattern).bind(pattern);
        }
        let total_items = count_query
            .fetch_one(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        // sort_column comes from a whitelist, never from user input directly
        let list_sql = format!(
            "SELECT * FROM categories{} ORDER BY {} {}, id ASC LIMIT ? OFFSET ?",
            search_clause,
            params.sort_column,
            params.order.as_sql(),
        );
        let mut list_query = sqlx::query_as::<_, Category>(&list_sql);
        if let Some(pattern) = &pattern {
            list_query = list_query.bind(pattern).bind(pattern);
        }
        let items = list_query
            .bind(params.window.limit)
            .bind(params.window.offset())
            .fetch_all(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        Ok(CategoryPage {
            pagination: Pagination::new(params.window, total_items),
            items,
        })
    }

    /// Apply a partial update. A renamed category gets a fresh slug, which
    /// must not collide with another category's.
    pub async fn update_category(
        &self,
        category_id: &str,
        request: UpdateCategoryRequest,
    ) -> Result<Category, ApiError> {
        let category = self.get_category(category_id).await?;

        let mut validation = ValidationResult::new();

        let (name, slug) = match &request.name {
            Some(n) if n.trim().is_empty() => {
                validation.add_error("name", "name is required and must be a non-empty string");
                (category.name.clone(), category.slug.clone())
            }
            Some(n) => {
                let name = n.trim().to_string();
                let slug = slugify(&name);
                if slug.is_empty() {
                    validation.add_error("name", "name must contain letters or digits");
                } else if self.slug_taken(&slug, Some(category_id)).await? {
                    validation.add_error("name", "Category with this name already exists.");
                }
                (name, slug)
            }
            None => (category.name.clone(), category.slug.clone()),
        };

        if !validation.is_valid {
            return Err(validation.into());
        }

        let description = request
            .description
            .map(|d| d.trim().to_string())
            .or(category.description);

        sqlx::query("UPDATE categories SET name = ?, slug = ?, description = ? WHERE id = ?")
            .bind(&name)
            .bind(&slug)
            .bind(&description)
            .bind(category_id)
            .execute(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        self.get_category(category_id).await
    }

    /// Delete a category unless expenses still carry its slug.
    pub async fn delete_category(&self, category_id: &str) -> Result<(), ApiError> {
        let category = self.get_category(category_id).await?;

        let referencing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM expenses WHERE category = ?")
                .bind(&category.slug)
                .fetch_one(&self.db)
                .await
                .map_err(ApiError::DatabaseError)?;

        if referencing > 0 {
            return Err(ApiError::Conflict(
                "Unable to delete category with associated expenses.".to_string(),
            ));
        }

        sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(category_id)
            .execute(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        info!(category_id = %category_id, slug = %category.slug, "Category deleted");

        Ok(())
    }

    async fn slug_taken(&self, slug: &str, exclude_id: Option<&str>) -> Result<bool, ApiError> {
        let count: i64 = match exclude_id {
            Some(id) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE slug = ? AND id != ?")
                    .bind(slug)
                    .bind(id)
                    .fetch_one(&self.db)
                    .await
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE slug = ?")
                    .bind(slug)
                    .fetch_one(&self.db)
                    .await
            }
        }
        .map_err(ApiError::DatabaseError)?;
        Ok(count > 0)
    }
}

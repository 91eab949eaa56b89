use super::models::{CreateExpenseRequest, Expense, ExpenseListQuery, UpdateExpenseRequest};
use super::validators::{self, parse_expense_date, validate_kind};
use crate::common::pagination::{PageWindow, Pagination, SortOrder};
use crate::common::{generate_expense_id, ApiError, ValidationResult, Validator};
use sqlx::SqlitePool;
use tracing::info;

/// Resolved list parameters: clamped window plus whitelisted sort/filters.
pub struct ExpenseListParams {
    pub window: PageWindow,
    pub sort: String,
    pub sort_column: &'static str,
    pub order: SortOrder,
    pub category_filter: Option<String>,
    pub type_filter: Option<String>,
}

/// A page of expenses plus its pagination metadata.
pub struct ExpensePage {
    pub items: Vec<Expense>,
    pub pagination: Pagination,
}

pub struct ExpensesService {
    db: SqlitePool,
}

impl ExpensesService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create an expense after validating the payload and the card reference.
    pub async fn create_expense(
        &self,
        user_id: &str,
        request: CreateExpenseRequest,
    ) -> Result<Expense, ApiError> {
        let mut validation = request.validate(&request);

        if validation.is_valid {
            let card_id = request.card_id.as_deref().unwrap_or_default();
            if !self.card_belongs_to_user(user_id, card_id).await? {
                validation.add_error("card_id", "card_id must reference one of your cards");
            }
        }

        if !validation.is_valid {
            return Err(validation.into());
        }

        let id = generate_expense_id();
        let date = request
            .date
            .as_deref()
            .and_then(parse_expense_date);

        // date is NULL-coalesced to now by the column default only on
        // omission, so insert explicitly when the client supplied one.
        match date {
            Some(date) => {
                sqlx::query(
                    r#"
                    INSERT INTO expenses (id, user_id, title, amount, category, type, card_id, description, date)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(&id)
                .bind(user_id)
                .bind(request.title.as_deref().map(str::trim))
                .bind(request.amount)
                .bind(&request.category)
                .bind(&request.expense_type)
                .bind(&request.card_id)
                .bind(&request.description)
                .bind(&date)
                .execute(&self.db)
                .await
            }
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO expenses (id, user_id, title, amount, category, type, card_id, description)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(&id)
                .bind(user_id)
                .bind(request.title.as_deref().map(str::trim))
                .bind(request.amount)
                .bind(&request.category)
                .bind(&request.expense_type)
                .bind(&request.card_id)
                .bind(&request.description)
                .execute(&self.db)
                .await
            }
        }
        .map_err(ApiError::DatabaseError)?;

        info!(expense_id = %id, user_id = %user_id, "Expense created");

        self.get_expense(user_id, &id).await
    }

    /// Fetch a single expense scoped to its owner.
    pub async fn get_expense(&self, user_id: &str, expense_id: &str) -> Result<Expense, ApiError> {
        sqlx::query_as::<_, Expense>("SELECT * FROM expenses WHERE id = ? AND user_id = ?")
            .bind(expense_id)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?
            .ok_or_else(|| ApiError::NotFound("Expense not found.".to_string()))
    }

    /// Resolve and validate list query parameters.
    pub fn resolve_list_params(query: &ExpenseListQuery) -> Result<ExpenseListParams, ApiError> {
        let mut validation = ValidationResult::new();

        let sort = query.sort.clone().unwrap_or_else(|| "date".to_string());
        let sort_column = match validators::sort_column(&sort) {
            Some(col) => col,
            None => {
                validation.add_error("sort", "sort must be one of: date, amount, title, category");
                "date"
            }
        };

        let order_raw = query.order.clone().unwrap_or_else(|| "desc".to_string());
        let order = match SortOrder::parse(&order_raw) {
            Some(o) => o,
            None => {
                validation.add_error("order", "order must be asc or desc");
                SortOrder::Desc
            }
        };

        if query.category.is_some() {
            validation.merge(validate_kind("category", query.category.as_deref()));
        }
        if query.expense_type.is_some() {
            validation.merge(validate_kind("type", query.expense_type.as_deref()));
        }

        if !validation.is_valid {
            return Err(validation.into());
        }

        Ok(ExpenseListParams {
            window: PageWindow::clamp(query.page, query.limit),
            sort,
            sort_column,
            order,
            category_filter: query.category.clone(),
            type_filter: query.expense_type.clone(),
        })
    }

    /// List the user's expenses with pagination, sorting and optional
    /// category/type filters. Ties are broken by id so pages are
    /// deterministic.
    pub async fn list_expenses(
        &self,
        user_id: &str,
        params: &ExpenseListParams,
    ) -> Result<ExpensePage, ApiError> {
        let mut where_clause = String::from("user_id = ?");
        if params.category_filter.is_some() {
            where_clause.push_str(" AND category = ?");
        }
        if params.type_filter.is_some() {
            where_clause.push_str(" AND type = ?");
        }

        let count_sql = format!("SELECT COUNT(*) FROM expenses WHERE {}", where_clause);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(user_id);
        if let Some(category) = &params.category_filter {
            count_query = count_query.bind(category);
        }
        if let Some(expense_type) = &params.type_filter {
            count_query = count_query.bind(expense_type);
        }
        let total_items = count_query
            .fetch_one(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        // sort_column comes from a whitelist, never from user input directly
        let list_sql = format!(
            "SELECT * FROM expenses WHERE {} ORDER BY {} {}, id ASC LIMIT ? OFFSET ?",
            where_clause,
            params.sort_column,
            params.order.as_sql(),
        );
        let mut list_query = sqlx::query_as::<_, Expense>(&list_sql).bind(user_id);
        if let Some(category) = &params.category_filter {
            list_query = list_query.bind(category);
        }
        if let Some(expense_type) = &params.type_filter {
            list_query = list_query.bind(expense_type);
        }
        let items = list_query
            .bind(params.window.limit)
            .bind(params.window.offset())
            .fetch_all(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        Ok(ExpensePage {
            pagination: Pagination::new(params.window, total_items),
            items,
        })
    }

    /// Apply a partial update, re-validating the merged expense.
    ///
    /// Fields omitted from the payload keep their stored values; in
    /// particular `description` cannot be cleared back to null through an
    /// update, only overwritten.
    pub async fn update_expense(
        &self,
        user_id: &str,
        expense_id: &str,
        request: UpdateExpenseRequest,
    ) -> Result<Expense, ApiError> {
        let expense = self.get_expense(user_id, expense_id).await?;

        let mut validation = ValidationResult::new();

        let title = match &request.title {
            Some(t) if t.trim().is_empty() => {
                validation.add_error("title", "Title is required");
                expense.title.clone()
            }
            Some(t) => {
                if t.len() > 100 {
                    validation.add_error("title", "title must not exceed 100 characters");
                }
                t.trim().to_string()
            }
            None => expense.title.clone(),
        };

        let amount = match request.amount {
            Some(a) if a.is_finite() => a,
            Some(_) => {
                validation.add_error("amount", "Amount must be a number");
                expense.amount
            }
            None => expense.amount,
        };

        let category = match &request.category {
            Some(c) => {
                validation.merge(validate_kind("category", Some(c)));
                c.clone()
            }
            None => expense.category.clone(),
        };

        let expense_type = match &request.expense_type {
            Some(t) => {
                validation.merge(validate_kind("type", Some(t)));
                t.clone()
            }
            None => expense.expense_type.clone(),
        };

        let card_id = match &request.card_id {
            Some(c) => {
                if validation.is_valid && !self.card_belongs_to_user(user_id, c).await? {
                    validation.add_error("card_id", "card_id must reference one of your cards");
                }
                c.clone()
            }
            None => expense.card_id.clone(),
        };

        let date = match &request.date {
            Some(d) => match parse_expense_date(d) {
                Some(parsed) => parsed,
                None => {
                    validation.add_error("date", "Invalid date format. Use ISO 8601 format.");
                    expense.date.clone()
                }
            },
            None => expense.date.clone(),
        };

        if !validation.is_valid {
            return Err(validation.into());
        }

        let description = request.description.or(expense.description);

        sqlx::query(
            r#"
            UPDATE expenses
            SET title = ?, amount = ?, category = ?, type = ?, card_id = ?, description = ?, date = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&title)
        .bind(amount)
        .bind(&category)
        .bind(&expense_type)
        .bind(&card_id)
        .bind(&description)
        .bind(&date)
        .bind(expense_id)
        .bind(user_id)
        .execute(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        self.get_expense(user_id, expense_id).await
    }

    /// Delete an expense owned by the user.
    pub async fn delete_expense(&self, user_id: &str, expense_id: &str) -> Result<(), ApiError> {
        self.get_expense(user_id, expense_id).await?;

        sqlx::query("DELETE FROM expenses WHERE id = ? AND user_id = ?")
            .bind(expense_id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        info!(expense_id = %expense_id, user_id = %user_id, "Expense deleted");

        Ok(())
    }

    async fn card_belongs_to_user(&self, user_id: &str, card_id: &str) -> Result<bool, ApiError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM cards WHERE id = ? AND user_id = ?")
                .bind(card_id)
                .bind(user_id)
                .fetch_one(&self.db)
                .await
                .map_err(ApiError::DatabaseError)?;
        Ok(count > 0)
    }
}

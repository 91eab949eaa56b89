use super::models::{Card, CardListQuery, CreateCardRequest, UpdateCardRequest};
use super::validators::{self, validate_card_state, validate_last_four, validate_type_filter};
use crate::common::pagination::{PageWindow, Pagination, SortOrder};
use crate::common::{generate_card_id, ApiError, ValidationResult, Validator};
use sqlx::SqlitePool;
use tracing::info;

/// Resolved list parameters: clamped window plus whitelisted sort/filter.
pub struct CardListParams {
    pub window: PageWindow,
    pub sort: String,
    pub sort_column: &'static str,
    pub order: SortOrder,
    pub type_filter: Option<String>,
}

/// A page of cards plus its pagination metadata.
pub struct CardPage {
    pub items: Vec<Card>,
    pub pagination: Pagination,
}

pub struct CardsService {
    db: SqlitePool,
}

impl CardsService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create a card for the given user after full validation.
    pub async fn create_card(
        &self,
        user_id: &str,
        request: CreateCardRequest,
    ) -> Result<Card, ApiError> {
        let validation = request.validate(&request);
        if !validation.is_valid {
            return Err(validation.into());
        }

        let id = generate_card_id();
        let card_type = request.card_type.unwrap_or_default().to_lowercase();
        let (credit_limit, total_balance, balance_left) = normalize_numeric_fields(
            &card_type,
            request.credit_limit,
            request.total_balance,
            request.balance_left,
        );

        sqlx::query(
            r#"
            INSERT INTO cards (id, user_id, name, type, credit_limit, total_balance,
                               balance_left, apple_slug, brand, last_four)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(request.name.as_deref().map(str::trim))
        .bind(&card_type)
        .bind(credit_limit)
        .bind(total_balance)
        .bind(balance_left)
        .bind(request.apple_slug.as_deref().map(str::trim))
        .bind(request.brand.as_deref().map(str::trim))
        .bind(request.last_four.as_deref().map(str::trim))
        .execute(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        info!(card_id = %id, user_id = %user_id, "Card created");

        self.get_card(user_id, &id).await
    }

    /// Fetch a single card scoped to its owner.
    pub async fn get_card(&self, user_id: &str, card_id: &str) -> Result<Card, ApiError> {
        sqlx::query_as::<_, Card>("SELECT * FROM cards WHERE id = ? AND user_id = ?")
            .bind(card_id)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?
            .ok_or_else(|| ApiError::NotFound("Card not found.".to_string()))
    }

    /// Resolve and validate list query parameters.
    pub fn resolve_list_params(query: &CardListQuery) -> Result<CardListParams, ApiError> {
        let mut validation = ValidationResult::new();

        let sort = query.sort.clone().unwrap_or_else(|| "created".to_string());
        let sort_column = match validators::sort_column(&sort) {
            Some(col) => col,
            None => {
                validation.add_error(
                    "sort",
                    "sort must be one of: created, name, type, limit, total_balance, balance_left",
                );
                "id"
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

        let type_filter = query.card_type.as_ref().map(|t| t.to_lowercase());
        if let Some(filter) = &type_filter {
            validation.merge(validate_type_filter(filter));
        }

        if !validation.is_valid {
            return Err(validation.into());
        }

        Ok(CardListParams {
            window: PageWindow::clamp(query.page, query.limit),
            sort,
            sort_column,
            order,
            type_filter,
        })
    }

    /// List the user's cards with pagination, sorting and an optional type
    /// filter. Ties are broken by id so pages are deterministic.
    pub async fn list_cards(
        &self,
        user_id: &str,
        params: &CardListParams,
    ) -> Result<CardPage, ApiError> {
        let mut count_sql = "SELECT COUNT(*) FROM cards WHERE user_id = ?".to_string();
        if params.type_filter.is_some() {
            count_sql.push_str(" AND type = ?");
        }

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(user_id);
        if let Some(filter) = &params.type_filter {
            count_query = count_query.bind(filter);
        }
        let total_items = count_query
            .fetch_one(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        // sort_column comes from a whitelist, never from user input directly
        let list_sql = format!(
            "SELECT * FROM cards WHERE user_id = ?{} ORDER BY {} {}, id ASC LIMIT ? OFFSET ?",
            if params.type_filter.is_some() {
                " AND type = ?"
            } else {
                ""
            },
            params.sort_column,
            params.order.as_sql(),
        );

        let mut list_query = sqlx::query_as::<_, Card>(&list_sql).bind(user_id);
        if let Some(filter) = &params.type_filter {
            list_query = list_query.bind(filter);
        }
        let items = list_query
            .bind(params.window.limit)
            .bind(params.window.offset())
            .fetch_all(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        Ok(CardPage {
            pagination: Pagination::new(params.window, total_items),
            items,
        })
    }

    /// Apply a partial update, re-validating the merged card state.
    ///
    /// Fields omitted from the payload keep their stored values, so an
    /// update cannot clear an optional text field (`apple_slug`, `brand`,
    /// `last_four`) back to null. The numeric fields are the exception:
    /// changing the card type nulls whichever of them the new type does not
    /// carry.
    pub async fn update_card(
        &self,
        user_id: &str,
        card_id: &str,
        request: UpdateCardRequest,
    ) -> Result<Card, ApiError> {
        let card = self.get_card(user_id, card_id).await?;

        let mut validation = ValidationResult::new();

        let card_type = match &request.card_type {
            Some(t) => {
                let t = t.to_lowercase();
                if !super::models::ALLOWED_CARD_TYPES.contains(&t.as_str()) {
                    validation.add_error("type", "type must be one of: credit, debit, prepaid");
                }
                t
            }
            None => card.card_type.clone(),
        };

        let name = match &request.name {
            Some(n) if n.trim().is_empty() => {
                validation.add_error("name", "name is required and must be a non-empty string");
                card.name.clone()
            }
            Some(n) => n.trim().to_string(),
            None => card.name.clone(),
        };

        if let Some(last_four) = &request.last_four {
            validation.merge(validate_last_four(last_four));
        }

        let credit_limit = request.credit_limit.or(card.credit_limit);
        let total_balance = request.total_balance.or(card.total_balance);
        let balance_left = request.balance_left.or(card.balance_left);

        validation.merge(validate_card_state(
            &card_type,
            credit_limit,
            total_balance,
            balance_left,
        ));

        if !validation.is_valid {
            return Err(validation.into());
        }

        let (credit_limit, total_balance, balance_left) =
            normalize_numeric_fields(&card_type, credit_limit, total_balance, balance_left);

        sqlx::query(
            r#"
            UPDATE cards
            SET name = ?, type = ?, credit_limit = ?, total_balance = ?, balance_left = ?,
                apple_slug = ?, brand = ?, last_four = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&name)
        .bind(&card_type)
        .bind(credit_limit)
        .bind(total_balance)
        .bind(balance_left)
        .bind(request.apple_slug.as_deref().map(str::trim).or(card.apple_slug.as_deref()))
        .bind(request.brand.as_deref().map(str::trim).or(card.brand.as_deref()))
        .bind(request.last_four.as_deref().map(str::trim).or(card.last_four.as_deref()))
        .bind(card_id)
        .bind(user_id)
        .execute(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        self.get_card(user_id, card_id).await
    }

    /// Delete a card unless expenses still reference it.
    pub async fn delete_card(&self, user_id: &str, card_id: &str) -> Result<(), ApiError> {
        // 404 before 409 so a foreign card is indistinguishable from a
        // missing one.
        self.get_card(user_id, card_id).await?;

        let referencing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM expenses WHERE card_id = ?")
                .bind(card_id)
                .fetch_one(&self.db)
                .await
                .map_err(ApiError::DatabaseError)?;

        if referencing > 0 {
            return Err(ApiError::Conflict(
                "Unable to delete card with associated expenses.".to_string(),
            ));
        }

        sqlx::query("DELETE FROM cards WHERE id = ? AND user_id = ?")
            .bind(card_id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        info!(card_id = %card_id, user_id = %user_id, "Card deleted");

        Ok(())
    }
}

/// Null out the numeric fields a card type does not carry.
fn normalize_numeric_fields(
    card_type: &str,
    credit_limit: Option<f64>,
    total_balance: Option<f64>,
    balance_left: Option<f64>,
) -> (Option<f64>, Option<f64>, Option<f64>) {
    match card_type {
        "credit" => (credit_limit, None, None),
        "prepaid" => (None, total_balance, balance_left),
        _ => (None, None, None),
    }
}

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Allowed values for both `category` and `type`
pub const ALLOWED_EXPENSE_KINDS: [&str; 3] = ["investment", "wants", "need"];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Expense {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub amount: f64,
    pub category: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub expense_type: String,
    pub card_id: String,
    pub description: Option<String>,
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    pub title: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub expense_type: Option<String>,
    pub card_id: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateExpenseRequest {
    pub title: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub expense_type: Option<String>,
    pub card_id: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
}

/// Query parameters accepted by GET /api/expenses
#[derive(Debug, Deserialize)]
pub struct ExpenseListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub expense_type: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

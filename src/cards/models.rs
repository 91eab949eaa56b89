use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Allowed card types
pub const ALLOWED_CARD_TYPES: [&str; 3] = ["credit", "debit", "prepaid"];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Card {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub card_type: String,
    #[serde(rename = "limit")]
    pub credit_limit: Option<f64>,
    pub total_balance: Option<f64>,
    pub balance_left: Option<f64>,
    pub apple_slug: Option<String>,
    pub brand: Option<String>,
    pub last_four: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCardRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub card_type: Option<String>,
    #[serde(rename = "limit")]
    pub credit_limit: Option<f64>,
    pub total_balance: Option<f64>,
    pub balance_left: Option<f64>,
    pub apple_slug: Option<String>,
    pub brand: Option<String>,
    pub last_four: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCardRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub card_type: Option<String>,
    #[serde(rename = "limit")]
    pub credit_limit: Option<f64>,
    pub total_balance: Option<f64>,
    pub balance_left: Option<f64>,
    pub apple_slug: Option<String>,
    pub brand: Option<String>,
    pub last_four: Option<String>,
}

/// Query parameters accepted by GET /api/cards
#[derive(Debug, Deserialize)]
pub struct CardListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(rename = "type")]
    pub card_type: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

use super::models::{CreateExpenseRequest, ALLOWED_EXPENSE_KINDS};
use crate::common::{ValidationResult, Validator};
use chrono::{NaiveDate, NaiveDateTime};

impl Validator<CreateExpenseRequest> for CreateExpenseRequest {
    fn validate(&self, data: &CreateExpenseRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        match &data.title {
            Some(title) if !title.trim().is_empty() => {
                if title.len() > 100 {
                    result.add_error("title", "title must not exceed 100 characters");
                }
            }
            _ => result.add_error("title", "Title is required"),
        }

        match data.amount {
            Some(amount) if amount.is_finite() => {}
            _ => result.add_error("amount", "Amount must be a number"),
        }

        result.merge(validate_kind("category", data.category.as_deref()));
        result.merge(validate_kind("type", data.expense_type.as_deref()));

        match &data.card_id {
            Some(card_id) if !card_id.trim().is_empty() => {}
            _ => result.add_error("card_id", "card_id is required"),
        }

        if let Some(date) = &data.date {
            if parse_expense_date(date).is_none() {
                result.add_error("date", "Invalid date format. Use ISO 8601 format.");
            }
        }

        result
    }
}

/// Validate a category/type value against the declared set.
pub fn validate_kind(field: &str, value: Option<&str>) -> ValidationResult {
    let mut result = ValidationResult::new();
    match value {
        Some(v) if ALLOWED_EXPENSE_KINDS.contains(&v) => {}
        _ => result.add_error(
            field,
            &format!("{} must be one of: investment, need, wants", field),
        ),
    }
    result
}

/// Parse an incoming date and normalize it to the storage format
/// (`YYYY-MM-DD HH:MM:SS`, matching SQLite's `datetime('now')`).
pub fn parse_expense_date(value: &str) -> Option<String> {
    const STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.format(STORAGE_FORMAT).to_string());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, STORAGE_FORMAT) {
        return Some(dt.format(STORAGE_FORMAT).to_string());
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc().format(STORAGE_FORMAT).to_string());
    }
    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(
            d.and_hms_opt(0, 0, 0)?
                .format(STORAGE_FORMAT)
                .to_string(),
        );
    }
    None
}

/// Map a sortable field name to its column. Unknown fields return None and
/// must be rejected by the caller rather than silently defaulted.
pub fn sort_column(sort: &str) -> Option<&'static str> {
    match sort {
        "date" => Some("date"),
        "amount" => Some("amount"),
        "title" => Some("title"),
        "category" => Some("category"),
        _ => None,
    }
}

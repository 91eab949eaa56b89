use super::models::{CreateCardRequest, ALLOWED_CARD_TYPES};
use crate::common::{ValidationResult, Validator};

impl Validator<CreateCardRequest> for CreateCardRequest {
    fn validate(&self, data: &CreateCardRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        match &data.name {
            Some(name) if !name.trim().is_empty() => {
                if name.len() > 255 {
                    result.add_error("name", "name must not exceed 255 characters");
                }
            }
            _ => result.add_error("name", "name is required and must be a non-empty string"),
        }

        let card_type = data.card_type.as_deref().map(str::to_lowercase);
        match card_type.as_deref() {
            Some(t) if ALLOWED_CARD_TYPES.contains(&t) => {
                result.merge(validate_card_state(
                    t,
                    data.credit_limit,
                    data.total_balance,
                    data.balance_left,
                ));
            }
            _ => result.add_error("type", "type must be one of: credit, debit, prepaid"),
        }

        if let Some(last_four) = &data.last_four {
            result.merge(validate_last_four(last_four));
        }

        result
    }
}

/// Type-specific invariants, checked on create and after merged updates.
pub fn validate_card_state(
    card_type: &str,
    credit_limit: Option<f64>,
    total_balance: Option<f64>,
    balance_left: Option<f64>,
) -> ValidationResult {
    let mut result = ValidationResult::new();

    match card_type {
        "credit" => {
            if credit_limit.is_none() {
                result.add_error("limit", "limit is required for credit cards");
            }
        }
        "prepaid" => {
            if total_balance.is_none() {
                result.add_error("total_balance", "total_balance is required for prepaid cards");
            }
            if balance_left.is_none() {
                result.add_error("balance_left", "balance_left is required for prepaid cards");
            }
            if let (Some(total), Some(left)) = (total_balance, balance_left) {
                if left > total {
                    result.add_error("balance_left", "balance_left cannot exceed total_balance");
                }
            }
        }
        _ => {} // debit carries no numeric fields
    }

    result
}

pub fn validate_last_four(last_four: &str) -> ValidationResult {
    let mut result = ValidationResult::new();
    let digits = last_four.trim();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        result.add_error("last_four", "last_four must be a four digit string");
    }
    result
}

/// Validate a type filter value; unknown values are a validation error.
pub fn validate_type_filter(value: &str) -> ValidationResult {
    let mut result = ValidationResult::new();
    if !ALLOWED_CARD_TYPES.contains(&value.to_lowercase().as_str()) {
        result.add_error("type", "type filter must be one of: credit, debit, prepaid");
    }
    result
}

/// Map a sortable field name to its column. Unknown fields return None and
/// must be rejected by the caller rather than silently defaulted.
pub fn sort_column(sort: &str) -> Option<&'static str> {
    match sort {
        "created" => Some("created_at"),
        "name" => Some("name"),
        "type" => Some("type"),
        "limit" => Some("credit_limit"),
        "total_balance" => Some("total_balance"),
        "balance_left" => Some("balance_left"),
        _ => None,
    }
}

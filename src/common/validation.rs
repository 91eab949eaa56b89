// Field-level validation accumulator
//
// Request validators collect every problem in one pass so the client sees
// the whole list at once instead of fixing fields one 400 at a time.

/// A single rejected field and the reason it was rejected.
#[derive(Debug)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

/// Accumulated outcome of validating one request payload.
#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.is_valid = false;
        self.errors.push(ValidationError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    /// Fold another result in, keeping every error from both.
    pub fn merge(&mut self, other: ValidationResult) {
        if !other.is_valid {
            self.is_valid = false;
            self.errors.extend(other.errors);
        }
    }

    /// Flatten the errors into `"field: message"` strings for the response
    /// envelope.
    pub fn field_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect()
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Self-validation hook implemented by the create-request types.
pub trait Validator<T> {
    fn validate(&self, data: &T) -> ValidationResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_errors_from_both_sides() {
        let mut a = ValidationResult::new();
        a.add_error("name", "name is required");

        let mut b = ValidationResult::new();
        b.add_error("type", "type must be one of: credit, debit, prepaid");

        a.merge(b);
        assert!(!a.is_valid);
        assert_eq!(a.errors.len(), 2);
        assert_eq!(
            a.field_messages(),
            vec![
                "name: name is required".to_string(),
                "type: type must be one of: credit, debit, prepaid".to_string(),
            ]
        );
    }

    #[test]
    fn test_merging_a_valid_result_changes_nothing() {
        let mut a = ValidationResult::new();
        a.merge(ValidationResult::new());
        assert!(a.is_valid);
        assert!(a.errors.is_empty());
    }
}

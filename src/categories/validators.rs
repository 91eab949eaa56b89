use super::models::CreateCategoryRequest;
use crate::common::{ValidationResult, Validator};

impl Validator<CreateCategoryRequest> for CreateCategoryRequest {
    fn validate(&self, data: &CreateCategoryRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        match &data.name {
            Some(name) if !name.trim().is_empty() => {
                if name.len() > 255 {
                    result.add_error("name", "name must not exceed 255 characters");
                }
                if slugify(name).is_empty() {
                    result.add_error("name", "name must contain letters or digits");
                }
            }
            _ => result.add_error("name", "name is required and must be a non-empty string"),
        }

        result
    }
}

/// Derive the URL-safe slug a category is keyed by: word characters kept,
/// runs of whitespace/underscores/hyphens collapsed to a single hyphen,
/// everything lowercased.
pub fn slugify(value: &str) -> String {
    let cleaned: String = value
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-' || *c == '_')
        .collect();

    let mut slug = String::new();
    let mut pending_separator = false;
    for c in cleaned.trim().chars() {
        if c.is_whitespace() || c == '-' || c == '_' {
            pending_separator = !slug.is_empty();
        } else {
            if pending_separator {
                slug.push('-');
                pending_separator = false;
            }
            slug.push(c);
        }
    }
    slug
}

/// Map a sortable field name to its column. Unknown fields return None and
/// must be rejected by the caller rather than silently defaulted.
pub fn sort_column(sort: &str) -> Option<&'static str> {
    match sort {
        "name" => Some("name"),
        "slug" => Some("slug"),
        _ => None,
    }
}

// Common module - shared types and utilities across all modules

pub mod auth_mode;
pub mod error;
pub mod helpers;
pub mod id_generator;
pub mod migrations;
pub mod pagination;
pub mod state;
pub mod validation;

// Re-export commonly used types for convenience
pub use error::ApiError;
pub use helpers::{json_message, safe_email_log};
pub use id_generator::*;
pub use pagination::{PageWindow, Pagination, SortOrder};
pub use state::AppState;
pub use validation::{ValidationError, ValidationResult, Validator};

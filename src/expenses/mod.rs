//! # Expenses Module
//!
//! This module handles expense tracking functionality including:
//! - Expense CRUD operations scoped to the authenticated owner
//! - Category/type filtering and deterministic pagination
//! - Card ownership checks on the `card_id` reference

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;


pub use routes::expenses_routes;

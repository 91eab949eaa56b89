//! # Categories Module
//!
//! This module handles the shared expense-category taxonomy including:
//! - Category CRUD keyed by a slug derived from the name
//! - Duplicate-slug rejection on create and rename
//! - The delete guard against categories still carried by expenses
//!
//! A default set of categories is seeded at migration time.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::categories_routes;

//! # Cards Module
//!
//! This module handles payment card functionality including:
//! - Card CRUD operations scoped to the authenticated owner
//! - Card-type invariants (credit limit, prepaid balances)
//! - The delete guard against cards still referenced by expenses

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;


pub use routes::cards_routes;

//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - Google OAuth authorization-code flow with single-use state
//! - Bearer token issue / verify / refresh
//! - AuthedUser extractor for protected routes

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod oauth;
pub mod routes;
pub mod token;

#[cfg(test)]
mod tests;

pub use extractors::AuthedUser;
pub use models::User;
pub use routes::auth_routes;

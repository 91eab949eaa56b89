//! Authentication data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// JWT claims structure
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Claims {
    /// User id the token was issued for
    pub sub: String,
    pub email: String,
    pub iat: usize,
    pub exp: usize,
}

/// User database model
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub created_at: Option<String>,
}

/// Query parameters for GET /api/auth/google/init
#[derive(Deserialize)]
pub struct InitParams {
    pub redirect_uri: Option<String>,
}

/// Request body for POST /api/auth/google/callback
#[derive(Deserialize)]
pub struct CallbackRequest {
    pub code: Option<String>,
    pub state: Option<String>,
    pub redirect_uri: Option<String>,
}

/// Request body for the token verify/refresh endpoints
#[derive(Deserialize)]
pub struct TokenRequest {
    pub token: Option<String>,
}

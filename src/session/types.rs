use serde::{Deserialize, Serialize};

use super::models::SessionModel;
use crate::user::models::UserModel;

/// JWT claims structure containing session information
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    pub session_id: String,
    pub user_id: String,
    pub exp: usize, // Expiration timestamp (standard JWT claim)
    pub iat: usize, // Issued at timestamp (standard JWT claim)
}

/// A resolved, server-verified session together with the user it belongs to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthSession {
    pub session: SessionModel,
    pub user: UserModel,
}

impl AuthSession {
    /// The authenticated actor's identifier
    pub fn subject(&self) -> &str {
        &self.session.user_id
    }
}

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Token and user returned once a session has been opened
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AuthResponse {
    pub token: String, // The JWT token
    pub user: UserModel,
}

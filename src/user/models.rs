use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for the users table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct UserModel {
    pub id: String,
    pub email: String,
    pub name: String,
    pub email_verified: bool,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserModel {
    /// Creates a new unverified user. A missing or blank name falls back to
    /// the local part of the email address.
    pub fn new(email: String, name: Option<String>, password_hash: String) -> Self {
        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| default_name(&email));

        Self {
            id: Uuid::new_v4().to_string(),
            email,
            name,
            email_verified: false,
            password_hash,
            created_at: Utc::now(),
        }
    }
}

fn default_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

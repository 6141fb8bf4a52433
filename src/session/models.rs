use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for the sessions table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct SessionModel {
    pub id: String,      // UUID v4 as string, carried inside the signed token
    pub user_id: String, // Owning user
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionModel {
    /// Creates a new session for the given user with generated ID and timestamps
    pub fn new(user_id: String, expiration_days: i64) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            created_at: now,
            expires_at: now + chrono::Duration::days(expiration_days),
        }
    }

    /// A session is still valid at the instant it expires
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::SessionModel;
use crate::shared::AppError;

/// Storage for issued sessions. Rows are written on sign-in/sign-up and
/// removed by sign-out or the expiry sweep; nothing updates them in place.
#[async_trait]
pub trait SessionRepository {
    async fn create(&self, session: &SessionModel) -> Result<(), AppError>;
    async fn find_by_id(&self, session_id: &str) -> Result<Option<SessionModel>, AppError>;
    /// Newest first
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<SessionModel>, AppError>;
    /// Returns whether a row was removed
    async fn delete(&self, session_id: &str) -> Result<bool, AppError>;
    /// Removes sessions whose expiry is strictly before `now`
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}

/// Session store kept in process memory, used when no database is configured
#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<String, SessionModel>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sessions(sessions: Vec<SessionModel>) -> Self {
        let by_id = sessions.into_iter().map(|s| (s.id.clone(), s)).collect();
        Self {
            sessions: RwLock::new(by_id),
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().unwrap().len()
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.read().unwrap().contains_key(session_id)
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    #[instrument(skip(self, session), fields(session_id = %session.id))]
    async fn create(&self, session: &SessionModel) -> Result<(), AppError> {
        let mut sessions = self.sessions.write().unwrap();
        if sessions.contains_key(&session.id) {
            return Err(AppError::DatabaseError(format!(
                "session {} already stored",
                session.id
            )));
        }
        sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn find_by_id(&self, session_id: &str) -> Result<Option<SessionModel>, AppError> {
        Ok(self.sessions.read().unwrap().get(session_id).cloned())
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<SessionModel>, AppError> {
        let mut owned: Vec<SessionModel> = self
            .sessions
            .read()
            .unwrap()
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    #[instrument(skip(self))]
    async fn delete(&self, session_id: &str) -> Result<bool, AppError> {
        let removed = self.sessions.write().unwrap().remove(session_id).is_some();
        debug!(removed, "Session delete in memory");
        Ok(removed)
    }

    #[instrument(skip(self))]
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let mut sessions = self.sessions.write().unwrap();
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at >= now);
        Ok((before - sessions.len()) as u64)
    }
}

/// Session store backed by the `sessions` table
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SESSION_COLUMNS: &str = "id, user_id, created_at, expires_at";

fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |e| {
        warn!(error = %e, "{}", context);
        AppError::DatabaseError(e.to_string())
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    #[instrument(skip(self, session), fields(session_id = %session.id))]
    async fn create(&self, session: &SessionModel) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO sessions (id, user_id, created_at, expires_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(&session.id)
        .bind(&session.user_id)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to insert session"))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, session_id: &str) -> Result<Option<SessionModel>, AppError> {
        sqlx::query_as::<_, SessionModel>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1"
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to load session"))
    }

    #[instrument(skip(self))]
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<SessionModel>, AppError> {
        sqlx::query_as::<_, SessionModel>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list sessions for user"))
    }

    #[instrument(skip(self))]
    async fn delete(&self, session_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete session"))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to sweep expired sessions"))?;

        Ok(result.rows_affected())
    }
}

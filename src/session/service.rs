use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::SessionModel,
    password::{hash_password, verify_password},
    repository::SessionRepository,
    token::TokenConfig,
    types::{AuthResponse, SignInRequest, SignUpRequest},
};
use crate::shared::AppError;
use crate::user::{models::UserModel, repository::UserRepository};

const MIN_PASSWORD_CHARS: usize = 8;

/// Service for handling credential checks and session lifecycle
pub struct SessionService {
    repository: Arc<dyn SessionRepository + Send + Sync>,
    user_repository: Arc<dyn UserRepository + Send + Sync>,
    token_config: TokenConfig,
}

impl SessionService {
    pub fn new(
        repository: Arc<dyn SessionRepository + Send + Sync>,
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        token_config: TokenConfig,
    ) -> Self {
        Self {
            repository,
            user_repository,
            token_config,
        }
    }

    /// Registers a new email/password user and signs them straight in
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<AuthResponse, AppError> {
        let email = normalize_email(&request.email)?;
        if request.password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AppError::BadRequest(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_CHARS
            )));
        }

        let password_hash = hash_password(&request.password)?;
        let user = UserModel::new(email, request.name, password_hash);
        self.user_repository.create_user(&user).await?;

        info!(user_id = %user.id, "User signed up");
        self.open_session(user).await
    }

    /// Checks credentials and opens a new session, returning its signed token
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn sign_in(&self, request: SignInRequest) -> Result<AuthResponse, AppError> {
        let email = normalize_email(&request.email)?;

        let user = match self.user_repository.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                warn!("Sign-in attempt for unknown email");
                return Err(AppError::InvalidCredentials);
            }
        };

        if !verify_password(&request.password, &user.password_hash) {
            warn!(user_id = %user.id, "Sign-in attempt with wrong password");
            return Err(AppError::InvalidCredentials);
        }

        self.open_session(user).await
    }

    async fn open_session(&self, user: UserModel) -> Result<AuthResponse, AppError> {
        let session = SessionModel::new(user.id.clone(), self.token_config.expiration_days);
        self.repository.create(&session).await?;
        let token = self
            .token_config
            .create_token(session.id.clone(), user.id.clone())?;

        info!(
            user_id = %user.id,
            session_id = %session.id,
            "Session created"
        );

        Ok(AuthResponse { token, user })
    }

    /// Revokes a session by removing it from the store
    #[instrument(skip(self))]
    pub async fn sign_out(&self, session_id: &str) -> Result<(), AppError> {
        if !self.repository.delete(session_id).await? {
            return Err(AppError::NotFound("Session not found".to_string()));
        }
        info!(session_id = %session_id, "Session revoked");
        Ok(())
    }

    /// Every session a user currently holds, newest first
    #[instrument(skip(self))]
    pub async fn list_sessions(&self, user_id: &str) -> Result<Vec<SessionModel>, AppError> {
        let sessions = self.repository.find_by_user(user_id).await?;
        Ok(sessions.into_iter().filter(|s| !s.is_expired()).collect())
    }

    /// Cleans up expired sessions from the store
    #[instrument(skip(self))]
    pub async fn cleanup_expired_sessions(&self) -> Result<u64, AppError> {
        let removed_count = self.repository.delete_expired(Utc::now()).await?;

        info!(
            removed_sessions = removed_count,
            "Expired sessions cleanup completed"
        );
        Ok(removed_count)
    }
}

fn normalize_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(AppError::BadRequest("Invalid email address".to_string())),
    }
}

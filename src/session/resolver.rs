use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::{repository::SessionRepository, token::TokenConfig, types::AuthSession};
use crate::shared::AppError;
use crate::user::repository::UserRepository;

/// Turns inbound request headers into the current authenticated session, if any.
///
/// Implementations must treat every resolution failure as "no session".
#[async_trait]
pub trait SessionResolver: Send + Sync {
    async fn get_session(&self, headers: &HeaderMap) -> Option<AuthSession>;
}

/// Resolves sessions from a signed bearer token or session cookie, backed by
/// the session and user repositories. Nothing is cached between calls.
pub struct TokenSessionResolver {
    token_config: TokenConfig,
    cookie_name: String,
    session_repository: Arc<dyn SessionRepository + Send + Sync>,
    user_repository: Arc<dyn UserRepository + Send + Sync>,
}

impl TokenSessionResolver {
    pub fn new(
        token_config: TokenConfig,
        cookie_name: String,
        session_repository: Arc<dyn SessionRepository + Send + Sync>,
        user_repository: Arc<dyn UserRepository + Send + Sync>,
    ) -> Self {
        Self {
            token_config,
            cookie_name,
            session_repository,
            user_repository,
        }
    }

    async fn resolve(&self, headers: &HeaderMap) -> Result<AuthSession, AppError> {
        let token = extract_token(headers, &self.cookie_name)
            .ok_or_else(|| AppError::Unauthenticated("No session token".to_string()))?;

        let claims = self.token_config.validate_token(&token)?;

        let session = self
            .session_repository
            .find_by_id(&claims.session_id)
            .await?
            .ok_or_else(|| {
                AppError::Unauthenticated("Session not found or has been revoked".to_string())
            })?;

        if session.is_expired() {
            return Err(AppError::Unauthenticated("Session has expired".to_string()));
        }

        if session.user_id != claims.user_id {
            return Err(AppError::Unauthenticated(
                "Token does not match session owner".to_string(),
            ));
        }

        let user = self
            .user_repository
            .find_by_id(&session.user_id)
            .await?
            .ok_or_else(|| AppError::Unauthenticated("Session user no longer exists".to_string()))?;

        Ok(AuthSession { session, user })
    }
}

#[async_trait]
impl SessionResolver for TokenSessionResolver {
    #[instrument(skip(self, headers))]
    async fn get_session(&self, headers: &HeaderMap) -> Option<AuthSession> {
        match self.resolve(headers).await {
            Ok(auth) => {
                debug!(
                    user_id = %auth.user.id,
                    session_id = %auth.session.id,
                    "Session resolved"
                );
                Some(auth)
            }
            Err(AppError::Unauthenticated(reason)) => {
                debug!(reason = %reason, "No valid session");
                None
            }
            Err(e) => {
                warn!(error = %e, "Session resolution failed, treating as signed out");
                None
            }
        }
    }
}

/// Reads the session token from `Authorization: Bearer`, falling back to the
/// named cookie.
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

use axum::{
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::session::{AuthSession, SessionResolver};
use crate::shared::AppError;

/// Where the gate sends callers it turns away
#[derive(Debug, Clone, PartialEq)]
pub struct RedirectConfig {
    pub sign_in_path: String,
    pub home_path: String,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            sign_in_path: "/auth/sign-in".to_string(),
            home_path: "/".to_string(),
        }
    }
}

/// Why a caller was turned away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    Unauthenticated,
    AlreadyAuthenticated,
}

impl From<Denial> for AppError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::Unauthenticated => {
                AppError::Unauthenticated("A valid session is required".to_string())
            }
            Denial::AlreadyAuthenticated => AppError::AlreadyAuthenticated,
        }
    }
}

/// Outcome of a gate check. The caller renders on `Proceed` and must return
/// the redirect on `Redirect` without running the rest of the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Gate<T> {
    Proceed(T),
    Redirect { to: String, reason: Denial },
}

impl<T> Gate<T> {
    pub fn is_redirect(&self) -> bool {
        matches!(self, Gate::Redirect { .. })
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Gate::Redirect { to, .. } => Some(to),
            Gate::Proceed(_) => None,
        }
    }

    pub fn into_proceed(self) -> Option<T> {
        match self {
            Gate::Proceed(value) => Some(value),
            Gate::Redirect { .. } => None,
        }
    }

    /// The allowed value, or the denial as an error for JSON endpoints
    pub fn into_result(self) -> Result<T, Denial> {
        match self {
            Gate::Proceed(value) => Ok(value),
            Gate::Redirect { reason, .. } => Err(reason),
        }
    }

    /// The allowed value, or a 307 response pointing at the redirect target
    pub fn into_response_result(self) -> Result<T, Response> {
        match self {
            Gate::Proceed(value) => Ok(value),
            Gate::Redirect { to, .. } => Err(Redirect::temporary(&to).into_response()),
        }
    }
}

/// Page-level authentication gate over an injected session resolver
#[derive(Clone)]
pub struct AuthGate {
    resolver: Arc<dyn SessionResolver>,
    redirects: RedirectConfig,
}

impl AuthGate {
    pub fn new(resolver: Arc<dyn SessionResolver>, redirects: RedirectConfig) -> Self {
        Self {
            resolver,
            redirects,
        }
    }

    /// Lets signed-in callers through with their session; everyone else goes
    /// to the sign-in page.
    #[instrument(skip(self, headers))]
    pub async fn require_auth(&self, headers: &HeaderMap) -> Gate<AuthSession> {
        match self.resolver.get_session(headers).await {
            Some(auth) => Gate::Proceed(auth),
            None => {
                debug!(to = %self.redirects.sign_in_path, "No session, redirecting to sign-in");
                Gate::Redirect {
                    to: self.redirects.sign_in_path.clone(),
                    reason: Denial::Unauthenticated,
                }
            }
        }
    }

    /// Lets signed-out callers through; signed-in callers go home.
    #[instrument(skip(self, headers))]
    pub async fn require_no_auth(&self, headers: &HeaderMap) -> Gate<()> {
        match self.resolver.get_session(headers).await {
            Some(auth) => {
                debug!(user_id = %auth.user.id, to = %self.redirects.home_path, "Already signed in, redirecting home");
                Gate::Redirect {
                    to: self.redirects.home_path.clone(),
                    reason: Denial::AlreadyAuthenticated,
                }
            }
            None => Gate::Proceed(()),
        }
    }
}

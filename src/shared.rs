use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::config::AppConfig;
use crate::gate::AuthGate;
use crate::jobs::JobClient;
use crate::rpc::{app_router, ProcedureRouter};
use crate::session::repository::SessionRepository;
use crate::session::resolver::SessionResolver;
use crate::session::service::SessionService;
use crate::user::repository::UserRepository;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub user_repository: Arc<dyn UserRepository + Send + Sync>,
    pub session_resolver: Arc<dyn SessionResolver>,
    pub session_service: Arc<SessionService>,
    pub auth_gate: AuthGate,
    pub job_client: Arc<dyn JobClient>,
    pub rpc_router: Arc<ProcedureRouter>,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        session_repository: Arc<dyn SessionRepository + Send + Sync>,
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        session_resolver: Arc<dyn SessionResolver>,
        job_client: Arc<dyn JobClient>,
    ) -> Self {
        let session_service = Arc::new(SessionService::new(
            session_repository,
            Arc::clone(&user_repository),
            config.token.clone(),
        ));
        let auth_gate = AuthGate::new(Arc::clone(&session_resolver), config.redirects.clone());

        Self {
            config,
            user_repository,
            session_resolver,
            session_service,
            auth_gate,
            job_client,
            rpc_router: Arc::new(app_router()),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Already authenticated")]
    AlreadyAuthenticated,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Method not supported: {0}")]
    MethodNotSupported(String),

    #[error("Job error: {0}")]
    JobError(String),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    /// Machine-readable error code, mirrored in every error body
    pub fn code(&self) -> &'static str {
        match self {
            AppError::JwtError(_) => "BAD_REQUEST",
            AppError::Unauthenticated(_) | AppError::InvalidCredentials => "UNAUTHORIZED",
            AppError::AlreadyAuthenticated => "FORBIDDEN",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Conflict(_) => "CONFLICT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::MethodNotSupported(_) => "METHOD_NOT_SUPPORTED",
            AppError::DatabaseError(_) | AppError::JobError(_) | AppError::Internal => {
                "INTERNAL_SERVER_ERROR"
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, error_message) = match self {
            AppError::JwtError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::AlreadyAuthenticated => {
                (StatusCode::FORBIDDEN, "Already authenticated".to_string())
            }
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid email or password".to_string(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::MethodNotSupported(msg) => (StatusCode::METHOD_NOT_ALLOWED, msg),
            AppError::JobError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Job error: {}", msg),
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message,
            "code": code,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
pub mod test_utils {
    use super::*;
    use crate::jobs::{JobEvent, SendReceipt};
    use crate::session::models::SessionModel;
    use crate::session::repository::InMemorySessionRepository;
    use crate::session::resolver::TokenSessionResolver;
    use crate::session::types::AuthSession;
    use crate::user::models::UserModel;
    use crate::user::repository::InMemoryUserRepository;
    use async_trait::async_trait;
    use axum::http::HeaderMap;
    use std::sync::Mutex;

    /// Job client that keeps every sent event in memory instead of dispatching it
    pub struct RecordingJobClient {
        sent: Mutex<Vec<JobEvent>>,
    }

    impl RecordingJobClient {
        pub fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
            }
        }

        pub fn sent_events(&self) -> Vec<JobEvent> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl JobClient for RecordingJobClient {
        async fn send(&self, event: JobEvent) -> Result<SendReceipt, AppError> {
            let id = event.id.clone();
            self.sent.lock().unwrap().push(event);
            Ok(SendReceipt { ids: vec![id] })
        }
    }

    /// Resolver that always answers with the same fixed outcome, no token involved
    pub struct FixedSessionResolver {
        session: Option<AuthSession>,
    }

    impl FixedSessionResolver {
        pub fn signed_in(session: AuthSession) -> Self {
            Self {
                session: Some(session),
            }
        }

        pub fn signed_out() -> Self {
            Self { session: None }
        }
    }

    #[async_trait]
    impl SessionResolver for FixedSessionResolver {
        async fn get_session(&self, _headers: &HeaderMap) -> Option<AuthSession> {
            self.session.clone()
        }
    }

    /// Builds an authenticated session for a freshly created user
    pub fn sample_auth_session(email: &str) -> AuthSession {
        let user = UserModel::new(email.to_string(), None, "not-a-real-hash".to_string());
        let session = SessionModel::new(user.id.clone(), 7);
        AuthSession { session, user }
    }

    /// Builder for creating AppState with overrides for testing
    pub struct AppStateBuilder {
        config: AppConfig,
        session_repository: Option<Arc<dyn SessionRepository + Send + Sync>>,
        user_repository: Option<Arc<dyn UserRepository + Send + Sync>>,
        session_resolver: Option<Arc<dyn SessionResolver>>,
        job_client: Option<Arc<dyn JobClient>>,
    }

    impl AppStateBuilder {
        pub fn new() -> Self {
            Self {
                config: AppConfig::default(),
                session_repository: None,
                user_repository: None,
                session_resolver: None,
                job_client: None,
            }
        }

        pub fn with_config(mut self, config: AppConfig) -> Self {
            self.config = config;
            self
        }

        pub fn with_session_repository(
            mut self,
            repo: Arc<dyn SessionRepository + Send + Sync>,
        ) -> Self {
            self.session_repository = Some(repo);
            self
        }

        pub fn with_user_repository(mut self, repo: Arc<dyn UserRepository + Send + Sync>) -> Self {
            self.user_repository = Some(repo);
            self
        }

        pub fn with_session_resolver(mut self, resolver: Arc<dyn SessionResolver>) -> Self {
            self.session_resolver = Some(resolver);
            self
        }

        pub fn with_job_client(mut self, client: Arc<dyn JobClient>) -> Self {
            self.job_client = Some(client);
            self
        }

        /// Unset repositories default to empty in-memory ones; an unset resolver
        /// is the real token resolver over those repositories.
        pub fn build(self) -> AppState {
            let session_repository = self
                .session_repository
                .unwrap_or_else(|| Arc::new(InMemorySessionRepository::new()));
            let user_repository = self
                .user_repository
                .unwrap_or_else(|| Arc::new(InMemoryUserRepository::new()));
            let session_resolver = self.session_resolver.unwrap_or_else(|| {
                Arc::new(TokenSessionResolver::new(
                    self.config.token.clone(),
                    self.config.session_cookie_name.clone(),
                    Arc::clone(&session_repository),
                    Arc::clone(&user_repository),
                ))
            });
            let job_client = self
                .job_client
                .unwrap_or_else(|| Arc::new(RecordingJobClient::new()));

            AppState::new(
                Arc::new(self.config),
                session_repository,
                user_repository,
                session_resolver,
                job_client,
            )
        }
    }

    impl Default for AppStateBuilder {
        fn default() -> Self {
            Self::new()
        }
    }
}

use async_trait::async_trait;
use axum::http::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use strum_macros::Display;
use tracing::{debug, instrument, warn};

use crate::session::AuthSession;
use crate::shared::{AppError, AppState};

/// Queries read, mutations write; each is reachable over its own HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ProcedureKind {
    Query,
    Mutation,
}

/// Ambient context of a single RPC call
#[derive(Clone)]
pub struct RpcContext {
    pub state: AppState,
    pub headers: HeaderMap,
}

/// Context handed to protected bodies; `auth` is the session resolved for this call
#[derive(Clone)]
pub struct ProtectedContext {
    pub state: AppState,
    pub auth: AuthSession,
}

/// An RPC entry point taking and returning JSON
#[async_trait]
pub trait Procedure: Send + Sync {
    async fn call(&self, ctx: RpcContext, input: Value) -> Result<Value, AppError>;
}

/// The body of a procedure that only runs for authenticated callers
#[async_trait]
pub trait ProtectedBody: Send + Sync {
    async fn run(&self, ctx: ProtectedContext, input: Value) -> Result<Value, AppError>;
}

/// Guard that resolves the caller's session before running the wrapped body.
///
/// Without a session the call is rejected and the body is never invoked; with
/// one, the body runs once and its result is passed through untouched.
pub struct Protected<B> {
    body: B,
}

impl<B: ProtectedBody> Protected<B> {
    pub fn new(body: B) -> Self {
        Self { body }
    }
}

#[async_trait]
impl<B: ProtectedBody> Procedure for Protected<B> {
    #[instrument(skip_all)]
    async fn call(&self, ctx: RpcContext, input: Value) -> Result<Value, AppError> {
        let auth = match ctx.state.session_resolver.get_session(&ctx.headers).await {
            Some(auth) => auth,
            None => {
                warn!("Rejecting protected procedure call without a session");
                return Err(AppError::Unauthenticated(
                    "You must be signed in to call this procedure".to_string(),
                ));
            }
        };

        debug!(user_id = %auth.user.id, "Protected procedure authorized");

        self.body
            .run(
                ProtectedContext {
                    state: ctx.state,
                    auth,
                },
                input,
            )
            .await
    }
}

/// Deserializes procedure input, reporting shape mismatches as bad requests
pub fn parse_input<T: DeserializeOwned>(input: Value) -> Result<T, AppError> {
    serde_json::from_value(input).map_err(|e| AppError::BadRequest(format!("Invalid input: {}", e)))
}

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::procedure::{
    parse_input, Procedure, Protected, ProtectedBody, ProtectedContext, RpcContext,
};
use super::router::ProcedureRouter;
use crate::jobs::{EventName, JobEvent};
use crate::shared::AppError;

#[derive(Debug, Deserialize)]
pub struct HelloInput {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct HelloOutput {
    pub greeting: String,
}

/// `hello` - public query
pub struct Hello;

#[async_trait]
impl Procedure for Hello {
    async fn call(&self, _ctx: RpcContext, input: Value) -> Result<Value, AppError> {
        let input: HelloInput = parse_input(input)?;
        Ok(json!(HelloOutput {
            greeting: format!("hello {}", input.text),
        }))
    }
}

/// `getUser` - the signed-in user's record, or null if it has since vanished
pub struct GetUser;

#[async_trait]
impl ProtectedBody for GetUser {
    async fn run(&self, ctx: ProtectedContext, _input: Value) -> Result<Value, AppError> {
        let user = ctx
            .state
            .user_repository
            .find_by_id(&ctx.auth.user.id)
            .await?;
        Ok(json!(user))
    }
}

/// `inngestCheckUser` - asks the job runner to look up the signed-in user
pub struct InngestCheckUser;

#[async_trait]
impl ProtectedBody for InngestCheckUser {
    async fn run(&self, ctx: ProtectedContext, _input: Value) -> Result<Value, AppError> {
        let event = JobEvent::new(
            EventName::DemoGetCurrentUser,
            json!({ "id": ctx.auth.user.id }),
        );
        let receipt = ctx.state.job_client.send(event).await?;

        info!(user_id = %ctx.auth.user.id, event_ids = ?receipt.ids, "Queued current-user job");
        Ok(json!(receipt))
    }
}

/// The application's procedure table
pub fn app_router() -> ProcedureRouter {
    ProcedureRouter::new()
        .query("hello", Hello)
        .query("getUser", Protected::new(GetUser))
        .query("inngestCheckUser", Protected::new(InngestCheckUser))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::procedure::ProcedureKind;
    use crate::shared::test_utils::{
        sample_auth_session, AppStateBuilder, FixedSessionResolver, RecordingJobClient,
    };
    use crate::user::repository::InMemoryUserRepository;
    use axum::http::HeaderMap;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_hello_greets() {
        let ctx = RpcContext {
            state: AppStateBuilder::new().build(),
            headers: HeaderMap::new(),
        };

        let output = app_router()
            .call("hello", ProcedureKind::Query, ctx, json!({"text": "world"}))
            .await
            .unwrap();

        assert_eq!(output, json!({"greeting": "hello world"}));
    }

    #[tokio::test]
    async fn test_hello_rejects_missing_text() {
        let ctx = RpcContext {
            state: AppStateBuilder::new().build(),
            headers: HeaderMap::new(),
        };

        let result = app_router()
            .call("hello", ProcedureKind::Query, ctx, json!({}))
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_get_user_returns_current_user() {
        let auth = sample_auth_session("ada@example.com");
        let users = Arc::new(InMemoryUserRepository::with_users(vec![auth.user.clone()]));
        let ctx = RpcContext {
            state: AppStateBuilder::new()
                .with_user_repository(users)
                .with_session_resolver(Arc::new(FixedSessionResolver::signed_in(auth.clone())))
                .build(),
            headers: HeaderMap::new(),
        };

        let output = app_router()
            .call("getUser", ProcedureKind::Query, ctx, Value::Null)
            .await
            .unwrap();

        assert_eq!(output["id"], json!(auth.user.id));
        assert_eq!(output["email"], "ada@example.com");
    }

    #[tokio::test]
    async fn test_get_user_requires_session() {
        let ctx = RpcContext {
            state: AppStateBuilder::new()
                .with_session_resolver(Arc::new(FixedSessionResolver::signed_out()))
                .build(),
            headers: HeaderMap::new(),
        };

        let result = app_router()
            .call("getUser", ProcedureKind::Query, ctx, Value::Null)
            .await;

        assert!(matches!(result, Err(AppError::Unauthenticated(_))));
    }

    #[tokio::test]
    async fn test_inngest_check_user_emits_event_with_user_id() {
        let auth = sample_auth_session("ada@example.com");
        let jobs = Arc::new(RecordingJobClient::new());
        let ctx = RpcContext {
            state: AppStateBuilder::new()
                .with_job_client(jobs.clone())
                .with_session_resolver(Arc::new(FixedSessionResolver::signed_in(auth.clone())))
                .build(),
            headers: HeaderMap::new(),
        };

        let output = app_router()
            .call("inngestCheckUser", ProcedureKind::Query, ctx, Value::Null)
            .await
            .unwrap();

        let sent = jobs.sent_events();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].name, "test/demo.get-current-user");
        assert_eq!(sent[0].data, json!({"id": auth.user.id}));
        assert_eq!(output, json!({"ids": [sent[0].id.clone()]}));
    }

    #[tokio::test]
    async fn test_inngest_check_user_without_session_sends_nothing() {
        let jobs = Arc::new(RecordingJobClient::new());
        let ctx = RpcContext {
            state: AppStateBuilder::new()
                .with_job_client(jobs.clone())
                .with_session_resolver(Arc::new(FixedSessionResolver::signed_out()))
                .build(),
            headers: HeaderMap::new(),
        };

        let result = app_router()
            .call("inngestCheckUser", ProcedureKind::Query, ctx, Value::Null)
            .await;

        assert!(result.is_err());
        assert!(jobs.sent_events().is_empty());
    }
}

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::{
    events::{EventName, JobEvent},
    function::{JobError, JobFunction, Step},
};
use crate::user::repository::UserRepository;

/// Greets `data.email` after a short pause
pub struct HelloWorld {
    wait: Duration,
}

impl HelloWorld {
    pub fn new(wait: Duration) -> Self {
        Self { wait }
    }
}

impl Default for HelloWorld {
    fn default() -> Self {
        Self::new(Duration::from_secs(4))
    }
}

#[async_trait]
impl JobFunction for HelloWorld {
    fn id(&self) -> &'static str {
        "hello-world"
    }

    fn trigger(&self) -> &'static str {
        EventName::HelloWorld.as_str()
    }

    async fn run(&self, event: &JobEvent, step: &Step) -> Result<Value, JobError> {
        let email = event
            .data
            .get("email")
            .and_then(Value::as_str)
            .ok_or_else(|| JobError::non_retryable("event data is missing `email`"))?;

        step.sleep("wait-a-moment", self.wait).await;

        Ok(json!({ "message": format!("Hello {}!", email) }))
    }
}

/// Loads the user named by `data.id`
pub struct DemoGetCurrentUser {
    user_repository: Arc<dyn UserRepository + Send + Sync>,
}

impl DemoGetCurrentUser {
    pub fn new(user_repository: Arc<dyn UserRepository + Send + Sync>) -> Self {
        Self { user_repository }
    }
}

#[async_trait]
impl JobFunction for DemoGetCurrentUser {
    fn id(&self) -> &'static str {
        "demo-get-current-user"
    }

    fn trigger(&self) -> &'static str {
        EventName::DemoGetCurrentUser.as_str()
    }

    async fn run(&self, event: &JobEvent, step: &Step) -> Result<Value, JobError> {
        let user_id = event
            .data
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| JobError::non_retryable("event data is missing `id`"))?;

        let user = step
            .run("fetching current user", || async {
                self.user_repository
                    .find_by_id(user_id)
                    .await
                    .map_err(|e| JobError::retryable(e.to_string()))
            })
            .await?;

        info!(user_id = %user_id, found = user.is_some(), "Fetched current user in background");

        serde_json::to_value(user).map_err(|e| JobError::non_retryable(e.to_string()))
    }
}

use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use super::events::JobEvent;

/// Errors that can occur when running a job function
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Job timed out")]
    Timeout,

    #[error("Retryable error: {0}")]
    Retryable(String),

    #[error("Non-retryable error: {0}")]
    NonRetryable(String),
}

impl JobError {
    /// Whether this error indicates the run should be retried
    pub fn is_retryable(&self) -> bool {
        matches!(self, JobError::Retryable(_) | JobError::Timeout)
    }

    pub fn retryable(msg: impl Into<String>) -> Self {
        JobError::Retryable(msg.into())
    }

    pub fn non_retryable(msg: impl Into<String>) -> Self {
        JobError::NonRetryable(msg.into())
    }
}

/// A background function triggered by events with a matching name
#[async_trait]
pub trait JobFunction: Send + Sync {
    /// Stable identifier used in logs and outcomes
    fn id(&self) -> &'static str;

    /// Event name this function runs for
    fn trigger(&self) -> &'static str;

    async fn run(&self, event: &JobEvent, step: &Step) -> Result<Value, JobError>;
}

/// Named, logged units of work inside a single function run
pub struct Step {
    function_id: &'static str,
    event_id: String,
}

impl Step {
    pub fn new(function_id: &'static str, event_id: impl Into<String>) -> Self {
        Self {
            function_id,
            event_id: event_id.into(),
        }
    }

    pub async fn sleep(&self, name: &str, duration: Duration) {
        debug!(
            function = self.function_id,
            event_id = %self.event_id,
            step = name,
            millis = duration.as_millis() as u64,
            "Step sleeping"
        );
        tokio::time::sleep(duration).await;
    }

    pub async fn run<T, F, Fut>(&self, name: &str, work: F) -> Result<T, JobError>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T, JobError>> + Send,
    {
        debug!(
            function = self.function_id,
            event_id = %self.event_id,
            step = name,
            "Step started"
        );

        let result = work().await;
        if let Err(e) = &result {
            warn!(
                function = self.function_id,
                event_id = %self.event_id,
                step = name,
                error = %e,
                "Step failed"
            );
        }
        result
    }
}

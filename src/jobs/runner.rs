use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use super::{
    client::JobBus,
    events::JobEvent,
    function::{JobError, JobFunction, Step},
};

/// Final result of one function run for one event
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub function_id: &'static str,
    pub event_id: String,
    pub attempts: u32,
    pub result: Result<Value, String>,
}

/// Routes events from the job bus to every function whose trigger matches
///
/// Each run gets its own task, a timeout per attempt, and bounded retries with
/// exponential backoff for retryable failures.
pub struct JobRunner {
    functions: Vec<Arc<dyn JobFunction>>,
    bus: JobBus,
    run_timeout: Duration,
    max_retries: u32,
    outcomes: broadcast::Sender<JobOutcome>,
}

impl JobRunner {
    pub fn new(bus: JobBus) -> Self {
        let (outcomes, _) = broadcast::channel(256);
        Self {
            functions: Vec::new(),
            bus,
            run_timeout: Duration::from_secs(30),
            max_retries: 3,
            outcomes,
        }
    }

    pub fn add_function(&mut self, function: Arc<dyn JobFunction>) {
        info!(
            function = function.id(),
            trigger = function.trigger(),
            "Registering job function"
        );
        self.functions.push(function);
    }

    pub fn with_run_timeout(mut self, run_timeout: Duration) -> Self {
        self.run_timeout = run_timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Stream of finished runs, mostly useful for tests and monitoring
    pub fn subscribe_outcomes(&self) -> broadcast::Receiver<JobOutcome> {
        self.outcomes.subscribe()
    }

    /// Subscribes to the bus and spawns the dispatch loop. Events sent after
    /// this returns are guaranteed to be seen.
    pub fn start(self) -> JoinHandle<()> {
        let mut receiver = self.bus.subscribe();
        let functions = self.functions;
        let run_timeout = self.run_timeout;
        let max_retries = self.max_retries;
        let outcomes = self.outcomes;

        info!(
            function_count = functions.len(),
            timeout_secs = run_timeout.as_secs(),
            max_retries = max_retries,
            "Starting job runner"
        );

        tokio::spawn(async move {
            loop {
                let event = match receiver.recv().await {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped = skipped, "Job runner lagged, events dropped");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };

                let matching: Vec<_> = functions
                    .iter()
                    .filter(|f| f.trigger() == event.name)
                    .cloned()
                    .collect();

                if matching.is_empty() {
                    debug!(event_name = %event.name, "No job function registered for event");
                    continue;
                }

                for function in matching {
                    let event = event.clone();
                    let outcomes = outcomes.clone();

                    // Spawn each run in its own task for isolation
                    tokio::spawn(async move {
                        let function_id = function.id();
                        let event_id = event.id.clone();
                        let (attempts, result) =
                            Self::run_with_retry(function, event, run_timeout, max_retries).await;

                        let _ = outcomes.send(JobOutcome {
                            function_id,
                            event_id,
                            attempts,
                            result: result.map_err(|e| e.to_string()),
                        });
                    });
                }
            }

            info!("Job runner stopped listening");
        })
    }

    /// Runs one function for one event with timeout and retry; returns the
    /// number of attempts made alongside the final result
    async fn run_with_retry(
        function: Arc<dyn JobFunction>,
        event: JobEvent,
        run_timeout: Duration,
        max_retries: u32,
    ) -> (u32, Result<Value, JobError>) {
        let function_id = function.id();
        let step = Step::new(function_id, event.id.clone());
        let mut attempt = 0;

        loop {
            attempt += 1;
            let error = match timeout(run_timeout, function.run(&event, &step)).await {
                Ok(Ok(output)) => {
                    if attempt > 1 {
                        info!(
                            function = function_id,
                            event_id = %event.id,
                            attempt = attempt,
                            "Job succeeded after retry"
                        );
                    } else {
                        debug!(function = function_id, event_id = %event.id, "Job succeeded");
                    }
                    return (attempt, Ok(output));
                }
                Ok(Err(e)) => e,
                Err(_elapsed) => JobError::Timeout,
            };

            if !error.is_retryable() || attempt > max_retries {
                error!(
                    function = function_id,
                    event_id = %event.id,
                    attempt = attempt,
                    error = %error,
                    "Job failed permanently"
                );
                return (attempt, Err(error));
            }

            warn!(
                function = function_id,
                event_id = %event.id,
                attempt = attempt,
                error = %error,
                "Job failed, will retry"
            );

            tokio::time::sleep(backoff_delay(attempt)).await;
        }
    }
}

const BASE_BACKOFF: Duration = Duration::from_millis(100);
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Delay after the given failed attempt: 100ms doubling per attempt, capped at a minute
fn backoff_delay(attempt: u32) -> Duration {
    let factor = 2_u32.saturating_pow(attempt.saturating_sub(1));
    BASE_BACKOFF.saturating_mul(factor).min(MAX_BACKOFF)
}

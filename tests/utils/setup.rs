use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

use saas_starter::{
    build_router,
    config::AppConfig,
    jobs::{DemoGetCurrentUser, HelloWorld, JobBus, JobClient, JobOutcome, JobRunner},
    session::repository::InMemorySessionRepository,
    user::InMemoryUserRepository,
    AppState, SessionResolver, TokenSessionResolver,
};

use super::mocks::RecordingJobClient;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub app: Router,
    pub session_repository: Arc<InMemorySessionRepository>,
    pub user_repository: Arc<InMemoryUserRepository>,
    pub job_client: Arc<RecordingJobClient>,
    /// Present only when the setup runs a real job runner
    pub job_outcomes: Option<broadcast::Receiver<JobOutcome>>,
}

pub struct TestSetupBuilder {
    config: AppConfig,
    with_job_runner: bool,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            with_job_runner: false,
        }
    }

    #[allow(dead_code)]
    pub fn with_cookie_name(mut self, name: &str) -> Self {
        self.config.session_cookie_name = name.to_string();
        self
    }

    /// Sends job events through a real bus and runner instead of recording them
    #[allow(dead_code)]
    pub fn with_job_runner(mut self) -> Self {
        self.with_job_runner = true;
        self
    }

    pub fn build(self) -> TestSetup {
        let session_repository = Arc::new(InMemorySessionRepository::new());
        let user_repository = Arc::new(InMemoryUserRepository::new());
        let recording_client = Arc::new(RecordingJobClient::new());

        let session_resolver: Arc<dyn SessionResolver> = Arc::new(TokenSessionResolver::new(
            self.config.token.clone(),
            self.config.session_cookie_name.clone(),
            session_repository.clone(),
            user_repository.clone(),
        ));

        let mut job_outcomes = None;
        let job_client: Arc<dyn JobClient> = if self.with_job_runner {
            let bus = JobBus::default();
            let mut runner = JobRunner::new(bus.clone()).with_max_retries(0);
            runner.add_function(Arc::new(HelloWorld::new(Duration::ZERO)));
            runner.add_function(Arc::new(DemoGetCurrentUser::new(user_repository.clone())));
            job_outcomes = Some(runner.subscribe_outcomes());
            runner.start();
            Arc::new(bus)
        } else {
            recording_client.clone()
        };

        let state = AppState::new(
            Arc::new(self.config),
            session_repository.clone(),
            user_repository.clone(),
            session_resolver,
            job_client,
        );

        TestSetup {
            app: build_router(state),
            session_repository,
            user_repository,
            job_client: recording_client,
            job_outcomes,
        }
    }
}

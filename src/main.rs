use saas_starter::{
    build_router,
    config::AppConfig,
    jobs::{DemoGetCurrentUser, HelloWorld, JobBus, JobClient, JobRunner},
    session::{
        repository::{InMemorySessionRepository, PostgresSessionRepository, SessionRepository},
        start_cleanup_task, SessionResolver, TokenSessionResolver,
    },
    shared::AppState,
    user::{InMemoryUserRepository, PostgresUserRepository, UserRepository},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Repositories = (
    Arc<dyn SessionRepository + Send + Sync>,
    Arc<dyn UserRepository + Send + Sync>,
);

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "saas_starter=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SaaS starter server");

    let config = Arc::new(AppConfig::from_env());
    let (session_repository, user_repository) = repositories(&config).await?;

    let session_resolver: Arc<dyn SessionResolver> = Arc::new(TokenSessionResolver::new(
        config.token.clone(),
        config.session_cookie_name.clone(),
        Arc::clone(&session_repository),
        Arc::clone(&user_repository),
    ));

    // Job runner must subscribe before the first event goes out
    let job_bus = JobBus::default();
    let mut job_runner = JobRunner::new(job_bus.clone());
    job_runner.add_function(Arc::new(HelloWorld::default()));
    job_runner.add_function(Arc::new(DemoGetCurrentUser::new(Arc::clone(
        &user_repository,
    ))));
    job_runner.start();
    let job_client: Arc<dyn JobClient> = Arc::new(job_bus);

    let app_state = AppState::new(
        Arc::clone(&config),
        session_repository,
        user_repository,
        session_resolver,
        job_client,
    );

    let cleanup_service = Arc::clone(&app_state.session_service);
    let cleanup_interval = config.session_cleanup_interval;
    tokio::spawn(async move {
        start_cleanup_task(cleanup_service, cleanup_interval).await;
    });

    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Postgres repositories when DATABASE_URL is set, in-memory ones otherwise
async fn repositories(config: &AppConfig) -> Result<Repositories, Box<dyn std::error::Error>> {
    match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Connected to PostgreSQL, migrations applied");

            let sessions: Arc<dyn SessionRepository + Send + Sync> =
                Arc::new(PostgresSessionRepository::new(pool.clone()));
            let users: Arc<dyn UserRepository + Send + Sync> =
                Arc::new(PostgresUserRepository::new(pool));
            Ok((sessions, users))
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory repositories");
            let sessions: Arc<dyn SessionRepository + Send + Sync> =
                Arc::new(InMemorySessionRepository::new());
            let users: Arc<dyn UserRepository + Send + Sync> =
                Arc::new(InMemoryUserRepository::new());
            Ok((sessions, users))
        }
    }
}

use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info, instrument};

use super::service::SessionService;

/// Starts the background task that periodically removes expired sessions
#[instrument(skip(session_service))]
pub async fn start_cleanup_task(session_service: Arc<SessionService>, cleanup_interval: Duration) {
    info!(
        cleanup_interval_secs = cleanup_interval.as_secs(),
        "Starting session cleanup background task"
    );

    let mut ticker = interval(cleanup_interval);

    loop {
        ticker.tick().await;
        run_cleanup_once(&session_service).await;
    }
}

/// One cleanup pass; failures are logged and the next tick tries again
async fn run_cleanup_once(session_service: &SessionService) -> u64 {
    match session_service.cleanup_expired_sessions().await {
        Ok(deleted_count) => {
            info!(deleted_count = deleted_count, "Session cleanup completed");
            deleted_count
        }
        Err(e) => {
            error!(error = %e, "Session cleanup task failed");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::models::SessionModel;
    use crate::session::repository::{InMemorySessionRepository, SessionRepository};
    use crate::session::token::TokenConfig;
    use crate::user::repository::InMemoryUserRepository;
    use chrono::Utc;

    #[tokio::test]
    async fn test_cleanup_removes_only_expired_sessions() {
        let mut expired = SessionModel::new("user-1".to_string(), 7);
        expired.expires_at = Utc::now() - chrono::Duration::minutes(5);
        let live = SessionModel::new("user-2".to_string(), 7);
        let sessions = Arc::new(InMemorySessionRepository::with_sessions(vec![
            expired.clone(),
            live.clone(),
        ]));
        let service = SessionService::new(
            sessions.clone(),
            Arc::new(InMemoryUserRepository::new()),
            TokenConfig::with_secret("cleanup-secret", 7),
        );

        assert_eq!(run_cleanup_once(&service).await, 1);
        assert!(sessions.find_by_id(&expired.id).await.unwrap().is_none());
        assert!(sessions.find_by_id(&live.id).await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_task_runs_on_interval() {
        let mut expired = SessionModel::new("user-1".to_string(), 7);
        expired.expires_at = Utc::now() - chrono::Duration::minutes(5);
        let sessions = Arc::new(InMemorySessionRepository::with_sessions(vec![expired]));
        let service = Arc::new(SessionService::new(
            sessions.clone(),
            Arc::new(InMemoryUserRepository::new()),
            TokenConfig::with_secret("cleanup-secret", 7),
        ));

        let handle = tokio::spawn(start_cleanup_task(service, Duration::from_secs(60)));
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(sessions.session_count(), 0);
        handle.abort();
    }
}

use async_trait::async_trait;
use std::sync::Mutex;

use saas_starter::{AppError, JobClient, JobEvent, SendReceipt};

// ============================================================================
// Mock Job Client
// ============================================================================

/// Captures emitted job events instead of running them
pub struct RecordingJobClient {
    sent: Mutex<Vec<JobEvent>>,
}

impl RecordingJobClient {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
        }
    }

    #[allow(dead_code)]
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

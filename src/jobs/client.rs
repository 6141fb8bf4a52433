use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, instrument, warn};

use super::events::{JobEvent, SendReceipt};
use crate::shared::AppError;

/// Fire-and-forget emission of job events
#[async_trait]
pub trait JobClient: Send + Sync {
    async fn send(&self, event: JobEvent) -> Result<SendReceipt, AppError>;
}

/// In-process event bus feeding the job runner
#[derive(Debug, Clone)]
pub struct JobBus {
    sender: broadcast::Sender<JobEvent>,
}

impl JobBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.sender.subscribe()
    }
}

impl Default for JobBus {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[async_trait]
impl JobClient for JobBus {
    #[instrument(skip(self, event), fields(event_name = %event.name, event_id = %event.id))]
    async fn send(&self, event: JobEvent) -> Result<SendReceipt, AppError> {
        let id = event.id.clone();

        match self.sender.send(event) {
            Ok(receiver_count) => {
                debug!(receivers = receiver_count, "Job event emitted");
            }
            Err(_) => {
                // Nobody is listening; the event is dropped but the send itself succeeded
                warn!("Job event emitted with no runner listening");
            }
        }

        Ok(SendReceipt { ids: vec![id] })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_send_reaches_subscriber() {
        let bus = JobBus::new(16);
        let mut receiver = bus.subscribe();

        let event = JobEvent::new("test/hello.world", json!({"email": "ada@example.com"}));
        let receipt = bus.send(event.clone()).await.unwrap();

        assert_eq!(receipt.ids, vec![event.id.clone()]);
        assert_eq!(receiver.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_send_without_runner_still_succeeds() {
        let bus = JobBus::new(16);
        let receipt = bus
            .send(JobEvent::new("test/hello.world", json!({})))
            .await
            .unwrap();

        assert_eq!(receipt.ids.len(), 1);
    }
}

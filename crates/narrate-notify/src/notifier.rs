//! Notifier trait and local implementations

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::NotifyError;

/// Delivers a text message to a phone number
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, phone_number: &str, message: &str) -> Result<(), NotifyError>;
}

/// Notifier that only writes messages to the log
///
/// Meant for local development where no gateway credentials exist.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, phone_number: &str, message: &str) -> Result<(), NotifyError> {
        debug!(phone_number, "Log notifier recipient");
        info!("Outbound message (log notifier): {}", message);
        Ok(())
    }
}

/// A message captured by [`RecordingNotifier`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub phone_number: String,
    pub message: String,
}

/// Notifier that keeps every message in memory
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentMessage>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages sent so far, oldest first
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().clone()
    }

    /// The most recent message sent to `phone_number`
    pub fn last_for(&self, phone_number: &str) -> Option<String> {
        self.sent
            .lock()
            .iter()
            .rev()
            .find(|m| m.phone_number == phone_number)
            .map(|m| m.message.clone())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, phone_number: &str, message: &str) -> Result<(), NotifyError> {
        self.sent.lock().push(SentMessage {
            phone_number: phone_number.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_notifier() {
        let notifier = RecordingNotifier::new();
        notifier.send("+15550001", "first").await.unwrap();
        notifier.send("+15550002", "other").await.unwrap();
        notifier.send("+15550001", "second").await.unwrap();

        assert_eq!(notifier.sent().len(), 3);
        assert_eq!(notifier.last_for("+15550001").as_deref(), Some("second"));
        assert!(notifier.last_for("+15550003").is_none());
    }

    #[tokio::test]
    async fn test_log_notifier_never_fails() {
        assert!(LogNotifier.send("+15550001", "hello").await.is_ok());
    }
}

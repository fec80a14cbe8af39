//! Progress, notification and cancellation plumbing between a run and its host.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::info;

/// Determinate/indeterminate progress bar owned by the host.
pub trait ProgressSink {
    fn switch_to_indeterminate(&self);
    fn switch_to_determinate(&self, total: usize);
    fn progress(&self, done: usize);
    fn progress_text(&self, text: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Data,
    Error,
}

/// A message for the host's ingest inbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestMessage {
    pub message_type: MessageType,
    pub module: String,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl IngestMessage {
    pub fn data(module: &str, subject: impl Into<String>) -> Self {
        Self {
            message_type: MessageType::Data,
            module: module.to_string(),
            subject: subject.into(),
            detail: None,
        }
    }

    pub fn error(module: &str, subject: impl Into<String>) -> Self {
        Self {
            message_type: MessageType::Error,
            ..Self::data(module, subject)
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

pub trait MessageSink {
    fn post(&self, message: IngestMessage);
}

/// Cooperative cancellation flag shared with the host.
#[derive(Debug, Clone, Default)]
pub struct IngestJobContext {
    cancelled: Arc<AtomicBool>,
}

impl IngestJobContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share an existing flag, e.g. one set from a signal handler.
    pub fn with_flag(cancelled: Arc<AtomicBool>) -> Self {
        Self { cancelled }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_job_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Progress sink that logs through `tracing`.
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn switch_to_indeterminate(&self) {
        info!("Progress: indeterminate");
    }

    fn switch_to_determinate(&self, total: usize) {
        info!(total, "Progress: determinate");
    }

    fn progress(&self, done: usize) {
        info!(done, "Progress");
    }

    fn progress_text(&self, text: &str) {
        info!("Progress: {}", text);
    }
}

/// Message sink that keeps every posted message, in order.
#[derive(Debug, Default)]
pub struct CollectedMessages {
    messages: Mutex<Vec<IngestMessage>>,
}

impl CollectedMessages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<IngestMessage> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    pub fn subjects(&self) -> Vec<String> {
        self.messages().into_iter().map(|m| m.subject).collect()
    }
}

impl MessageSink for CollectedMessages {
    fn post(&self, message: IngestMessage) {
        info!(module = %message.module, "{}", message.subject);
        if let Ok(mut guard) = self.messages.lock() {
            guard.push(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_is_shared() {
        let flag = Arc::new(AtomicBool::new(false));
        let context = IngestJobContext::with_flag(flag.clone());
        let clone = context.clone();
        assert!(!context.is_job_cancelled());

        clone.cancel();
        assert!(context.is_job_cancelled());
        assert!(flag.load(Ordering::Relaxed));
    }

    #[test]
    fn test_collected_messages_keep_order() {
        let sink = CollectedMessages::new();
        sink.post(IngestMessage::data("ProtonMail", "Starting to analyze 1 file(s)"));
        sink.post(
            IngestMessage::data("ProtonMail", "Finished to analyze 1 file(s)")
                .with_detail("1 record(s)"),
        );

        let messages = sink.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].detail.as_deref(), Some("1 record(s)"));
        assert_eq!(
            sink.subjects(),
            vec![
                "Starting to analyze 1 file(s)".to_string(),
                "Finished to analyze 1 file(s)".to_string()
            ]
        );
    }
}

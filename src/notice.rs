// User-visible alerts
use std::sync::{Arc, Mutex};

/// Shows a blocking, user-visible warning (the browser `alert` of the portal).
pub trait Notifier: Send + Sync {
    fn warn(&self, message: &str);
}

/// Prints to stderr and records the warning in the trace log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
        eprintln!("⚠ {}", message);
    }
}

/// Keeps every warning for later inspection.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn warn(&self, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}

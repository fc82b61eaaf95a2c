//! Where surfaced failures go

use std::sync::{Arc, Mutex};
use tracing::error;

use crate::error::SnippetError;

/// Fire-and-forget sink for failures the user should see
pub trait ErrorReporter: Send + Sync {
    fn report(&self, error: &SnippetError);
}

/// Reports through the tracing subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, err: &SnippetError) {
        error!(error = %err, "snippet operation failed");
    }
}

/// Keeps reported messages in memory; cloned handles share the same list
#[derive(Debug, Clone, Default)]
pub struct MemoryReporter {
    messages: Arc<Mutex<Vec<String>>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.messages().is_empty()
    }
}

impl ErrorReporter for MemoryReporter {
    fn report(&self, err: &SnippetError) {
        error!(error = %err, "snippet operation failed");
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(err.to_string());
        }
    }
}

//! Handoff targets for the post-verification redirect

use std::sync::{Mutex, PoisonError};

use tracing::info;

use cg_core::services::Navigator;

/// Keeps every handoff URL for the host to act on
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    urls: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent handoff, if any
    pub fn last_url(&self) -> Option<String> {
        self.urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &str) {
        self.urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());
    }
}

/// Logs the handoff; for hosts that have nowhere to go
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn navigate(&self, url: &str) {
        info!(url = url, event = "navigation_handoff", "Handing off to callback");
    }
}

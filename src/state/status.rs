//! Observable save status.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// `Saved -> Saving -> {Saved | Unsaved}`, plus `Unsaved` on any edit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    #[default]
    Saved,
    Saving,
    Unsaved,
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveStatus::Saved => write!(f, "saved"),
            SaveStatus::Saving => write!(f, "saving"),
            SaveStatus::Unsaved => write!(f, "unsaved"),
        }
    }
}

/// Holds the current status and notifies subscribers of changes.
#[derive(Debug)]
pub struct StatusTracker {
    tx: watch::Sender<SaveStatus>,
}

impl Default for StatusTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SaveStatus::Saved);
        Self { tx }
    }

    pub fn get(&self) -> SaveStatus {
        *self.tx.borrow()
    }

    /// Works with or without subscribers.
    pub fn set(&self, status: SaveStatus) {
        let previous = self.tx.send_replace(status);
        if previous != status {
            tracing::debug!(from = %previous, to = %status, "save status changed");
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_saved() {
        assert_eq!(StatusTracker::new().get(), SaveStatus::Saved);
    }

    #[test]
    fn test_subscriber_sees_latest() {
        let tracker = StatusTracker::new();
        let mut rx = tracker.subscribe();
        tracker.set(SaveStatus::Saving);
        tracker.set(SaveStatus::Unsaved);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), SaveStatus::Unsaved);
    }

    #[test]
    fn test_display() {
        assert_eq!(SaveStatus::Saving.to_string(), "saving");
    }
}

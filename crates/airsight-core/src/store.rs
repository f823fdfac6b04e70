//! Shared selection state observed by every dashboard panel.
//!
//! A single [`SelectionStore`] is created at startup and handed (cloned) to
//! whoever reads or writes the selection. Readers subscribe and are woken on
//! every change, so no panel ever polls.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

use crate::models::SentimentResult;

/// Snapshot of the current selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    /// Airline chosen in the top bar; `None` until the first search.
    pub target_airline: Option<String>,
    /// Result of the most recent sentiment submission.
    pub sentiment: Option<SentimentResult>,
    /// Bumped on every airline change, including set-to-same-name.
    pub airline_revision: u64,
    /// Bumped on every sentiment change, including resets.
    pub sentiment_revision: u64,
}

#[derive(Debug, Clone)]
pub struct SelectionStore {
    tx: watch::Sender<Selection>,
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Selection::default());
        Self { tx }
    }

    pub fn snapshot(&self) -> Selection {
        self.tx.borrow().clone()
    }

    pub fn target_airline(&self) -> Option<String> {
        self.tx.borrow().target_airline.clone()
    }

    pub fn sentiment(&self) -> Option<SentimentResult> {
        self.tx.borrow().sentiment.clone()
    }

    pub fn sentiment_revision(&self) -> u64 {
        self.tx.borrow().sentiment_revision
    }

    /// Select an airline. Blank names are ignored.
    pub fn set_target_airline(&self, name: impl Into<String>) {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return;
        }
        let trimmed = trimmed.to_string();
        debug!(airline = %trimmed, "Selecting airline");
        self.tx.send_modify(|selection| {
            selection.target_airline = Some(trimmed);
            selection.airline_revision += 1;
        });
    }

    pub fn clear_target_airline(&self) {
        let changed = self.tx.send_if_modified(|selection| {
            if selection.target_airline.is_none() {
                return false;
            }
            selection.target_airline = None;
            selection.airline_revision += 1;
            true
        });
        if changed {
            debug!("Cleared airline selection");
        }
    }

    pub fn set_sentiment(&self, result: SentimentResult) {
        self.tx.send_modify(|selection| {
            selection.sentiment = Some(result);
            selection.sentiment_revision += 1;
        });
    }

    /// Clear the sentiment result. The revision always moves so that a
    /// submission still in flight can tell it was superseded.
    pub fn reset_sentiment(&self) {
        self.tx.send_modify(|selection| {
            selection.sentiment = None;
            selection.sentiment_revision += 1;
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<Selection> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_store_is_empty() {
        let store = SelectionStore::new();
        let snapshot = store.snapshot();
        assert!(snapshot.target_airline.is_none());
        assert!(snapshot.sentiment.is_none());
        assert_eq!(snapshot.airline_revision, 0);
    }

    #[test]
    fn test_set_and_clear_airline() {
        let store = SelectionStore::new();
        store.set_target_airline("  Qatar Airways ");
        assert_eq!(store.target_airline().as_deref(), Some("Qatar Airways"));

        store.clear_target_airline();
        assert!(store.target_airline().is_none());
        assert_eq!(store.snapshot().airline_revision, 2);

        // Clearing twice does not notify again
        store.clear_target_airline();
        assert_eq!(store.snapshot().airline_revision, 2);
    }

    #[test]
    fn test_blank_airline_is_ignored() {
        let store = SelectionStore::new();
        store.set_target_airline("   ");
        assert!(store.target_airline().is_none());
        assert_eq!(store.snapshot().airline_revision, 0);
    }

    #[tokio::test]
    async fn test_subscribers_are_notified() {
        let store = SelectionStore::new();
        let mut rx = store.subscribe();

        store.set_target_airline("Emirates");
        rx.changed().await.unwrap();
        assert_eq!(
            rx.borrow_and_update().target_airline.as_deref(),
            Some("Emirates")
        );

        // Re-selecting the same airline still counts as a change
        store.set_target_airline("Emirates");
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().airline_revision, 2);
    }

    #[test]
    fn test_sentiment_reset_bumps_revision() {
        let store = SelectionStore::new();
        store.set_sentiment(SentimentResult {
            text: "lovely crew".to_string(),
            ..Default::default()
        });
        assert_eq!(store.sentiment_revision(), 1);
        assert!(store.sentiment().is_some());

        store.reset_sentiment();
        assert!(store.sentiment().is_none());
        assert_eq!(store.sentiment_revision(), 2);
    }

    #[test]
    fn test_clones_share_state() {
        let store = SelectionStore::new();
        let other = store.clone();
        other.set_target_airline("KLM");
        assert_eq!(store.target_airline().as_deref(), Some("KLM"));
    }
}

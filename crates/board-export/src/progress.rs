//! Progress notifications emitted during an export run.
//!
//! The engine reports through a [`ProgressReporter`]. [`TracingReporter`]
//! logs each event; a `tokio::sync::broadcast` sender also implements the
//! trait so several listeners can subscribe independently. When no receiver
//! exists, events are silently dropped.

use serde::{Deserialize, Serialize};

/// Something worth telling the operator about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProgressEvent {
    /// Enumeration finished; the worklist is ready.
    Enumerated {
        total_items: usize,
        total_groups: usize,
    },
    /// No groups or items were discovered. The run continues and produces
    /// an empty export.
    EmptyEnumeration,
    /// Periodic counter, emitted every `log_every` processed items.
    Progress { index: usize, total: usize },
    /// A task was abandoned and left out of the export. `recoverable` is
    /// false when the failure was not a view-level one (I/O, serialization).
    ItemSkipped {
        item_id: String,
        error: String,
        recoverable: bool,
    },
    /// The user declined at the confirmation gate.
    Cancelled,
    /// All worklist entries were processed.
    Finished { attempted: usize, exported: usize },
}

/// Receiver of progress events.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Logs every event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ProgressReporter for TracingReporter {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Enumerated {
                total_items,
                total_groups,
            } => tracing::info!("Found {total_items} tasks across {total_groups} groups"),
            ProgressEvent::EmptyEnumeration => {
                tracing::warn!("No groups or tasks found on the board; the export will be empty")
            }
            ProgressEvent::Progress { index, total } => {
                tracing::info!("Scraped {index}/{total} tasks")
            }
            ProgressEvent::ItemSkipped {
                item_id,
                error,
                recoverable: true,
            } => tracing::warn!("Skipped task {item_id}: {error}"),
            ProgressEvent::ItemSkipped {
                item_id,
                error,
                recoverable: false,
            } => tracing::error!("Skipped task {item_id} after unexpected error: {error}"),
            ProgressEvent::Cancelled => tracing::info!("Canceled by user"),
            ProgressEvent::Finished {
                attempted,
                exported,
            } => tracing::info!("Exported {exported} of {attempted} tasks"),
        }
    }
}

/// Sender handle for broadcasting progress events.
pub type ProgressSender = tokio::sync::broadcast::Sender<ProgressEvent>;

/// Receiver handle for consuming progress events.
pub type ProgressReceiver = tokio::sync::broadcast::Receiver<ProgressEvent>;

/// Create a new progress broadcast channel with a bounded buffer.
pub fn channel() -> (ProgressSender, ProgressReceiver) {
    tokio::sync::broadcast::channel(256)
}

impl ProgressReporter for ProgressSender {
    fn report(&self, event: ProgressEvent) {
        let _ = self.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = ProgressEvent::ItemSkipped {
            item_id: "1207".to_string(),
            error: "Timed out".to_string(),
            recoverable: true,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("ItemSkipped"));
        assert!(json.contains("1207"));

        let parsed: ProgressEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_channel_no_receivers() {
        let (tx, rx) = channel();
        drop(rx);
        // Should not panic
        tx.report(ProgressEvent::EmptyEnumeration);
    }

    #[test]
    fn test_channel_delivers_in_order() {
        let (tx, mut rx) = channel();
        tx.report(ProgressEvent::Progress { index: 10, total: 20 });
        tx.report(ProgressEvent::Progress { index: 20, total: 20 });
        assert_eq!(
            rx.try_recv().unwrap(),
            ProgressEvent::Progress { index: 10, total: 20 }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            ProgressEvent::Progress { index: 20, total: 20 }
        );
    }
}

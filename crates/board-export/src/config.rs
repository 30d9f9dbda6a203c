//! Engine tunables.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing and budget knobs for one export run.
///
/// All durations are milliseconds so the struct maps one-to-one onto a JSON
/// config file; missing fields fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Emit a progress notification every N processed items.
    pub log_every: usize,
    /// Pause after activating a card before looking for the pane.
    pub open_delay_ms: u64,
    /// Deadline for the pane's title surface to appear.
    pub wait_timeout_ms: u64,
    /// Interval between polls while waiting.
    pub poll_step_ms: u64,
    /// Pause after each feed scroll.
    pub feed_scroll_pause_ms: u64,
    /// Hard cap on feed paging rounds.
    pub max_feed_rounds: usize,
    /// Consecutive unchanged, at-bottom rounds required to stop paging.
    pub stability_rounds: usize,
    /// Forced scroll cycles per column before reading its cards.
    pub column_scroll_cycles: usize,
    /// Pause after each column scroll.
    pub column_scroll_pause_ms: u64,
    /// Pause after dismissing the pane.
    pub close_pause_ms: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            log_every: 10,
            open_delay_ms: 250,
            wait_timeout_ms: 12_000,
            poll_step_ms: 60,
            feed_scroll_pause_ms: 250,
            max_feed_rounds: 300,
            stability_rounds: 3,
            column_scroll_cycles: 8,
            column_scroll_pause_ms: 250,
            close_pause_ms: 250,
        }
    }
}

impl ExportConfig {
    pub fn open_delay(&self) -> Duration {
        Duration::from_millis(self.open_delay_ms)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    pub fn poll_step(&self) -> Duration {
        Duration::from_millis(self.poll_step_ms)
    }

    pub fn feed_scroll_pause(&self) -> Duration {
        Duration::from_millis(self.feed_scroll_pause_ms)
    }

    pub fn column_scroll_pause(&self) -> Duration {
        Duration::from_millis(self.column_scroll_pause_ms)
    }

    pub fn close_pause(&self) -> Duration {
        Duration::from_millis(self.close_pause_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg: ExportConfig = serde_json::from_str(r#"{"wait_timeout_ms": 3000}"#).unwrap();
        assert_eq!(cfg.wait_timeout(), Duration::from_secs(3));
        assert_eq!(cfg.stability_rounds, 3);
        assert_eq!(cfg.max_feed_rounds, 300);
    }
}

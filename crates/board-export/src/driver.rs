//! Per-task detail view lifecycle.
//!
//! ```text
//! Idle → Activating → AwaitingSettle → Settled → Closing → Closed
//!            └──────────────┴──────────────┴──→ Failed
//! ```
//!
//! Exactly one close attempt is made per task whatever happened before it,
//! so a half-open pane never leaks into the next task. After a failure the
//! close attempt still runs but the driver stays in `Failed`.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::ExportConfig;
use crate::error::{ExportError, ExportResult};
use crate::extractor::read_records;
use crate::feed::FeedExhauster;
use crate::locator::ViewLocator;
use crate::types::{Activation, ItemId, TaskRecord, WorklistEntry};
use crate::waiter::wait_until;

static PERMALINK_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/task/(\d+)|/(?:0|1)/\d+/(\d+)").expect("static regex")
});

/// Lifecycle state of the detail view for one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverState {
    Idle,
    Activating,
    AwaitingSettle,
    Settled,
    Closing,
    Closed,
    Failed,
}

/// Permalink and canonical id for a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permalink {
    pub url: String,
    pub item_id: Option<ItemId>,
}

/// Resolve the pane's permalink `href` against `origin`, falling back to a
/// URL synthesized from the known id when the pane shows no permalink.
pub fn resolve_permalink(href: Option<&str>, origin: &str, known: &ItemId) -> Permalink {
    let base = Url::parse(origin).ok();
    let origin = origin.trim_end_matches('/');
    let known = (!known.is_empty()).then(|| known.clone());

    match href.map(str::trim).filter(|h| !h.is_empty()) {
        Some(href) => {
            let url = join(base.as_ref(), href).unwrap_or_else(|| href.to_string());
            let parsed = PERMALINK_ID
                .captures(&url)
                .and_then(|c| c.get(1).or_else(|| c.get(2)))
                .map(|m| ItemId::new(m.as_str()));
            Permalink {
                url,
                item_id: known.or(parsed),
            }
        }
        None => Permalink {
            url: match &known {
                Some(id) => {
                    let path = format!("/0/0/{id}");
                    join(base.as_ref(), &path).unwrap_or_else(|| format!("{origin}{path}"))
                }
                None => origin.to_string(),
            },
            item_id: known,
        },
    }
}

fn join(base: Option<&Url>, relative: &str) -> Option<String> {
    base?.join(relative).ok().map(|u| u.to_string())
}

/// Scheme, host and port of `url`, or the whole string when it has none.
pub fn origin_of(url: &str) -> String {
    match Url::parse(url).map(|u| u.origin()) {
        Ok(origin) if origin.is_tuple() => origin.ascii_serialization(),
        _ => url.to_string(),
    }
}

/// Drives one task's detail view through open, read and close.
pub struct DetailViewDriver<'a, L: ?Sized> {
    locator: &'a L,
    config: &'a ExportConfig,
    origin: &'a str,
    state: DriverState,
}

impl<'a, L> DetailViewDriver<'a, L>
where
    L: ViewLocator + ?Sized,
{
    pub fn new(locator: &'a L, config: &'a ExportConfig, origin: &'a str) -> Self {
        Self {
            locator,
            config,
            origin,
            state: DriverState::Idle,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Open the task, read everything, and close it again.
    pub async fn run(&mut self, entry: &WorklistEntry) -> ExportResult<TaskRecord> {
        let result = self.open_and_read(entry).await;
        if result.is_err() {
            self.transition(DriverState::Failed);
        }
        self.close().await;
        result
    }

    async fn open_and_read(&mut self, entry: &WorklistEntry) -> ExportResult<TaskRecord> {
        self.transition(DriverState::Activating);
        match self.locator.activate(&entry.activation_handle).await? {
            Activation::Dispatched => {}
            Activation::Stale => {
                return Err(ExportError::StaleHandle(entry.activation_handle.to_string()));
            }
        }

        self.transition(DriverState::AwaitingSettle);
        tokio::time::sleep(self.config.open_delay()).await;
        let locator = self.locator;
        let surface = wait_until(
            "task pane title",
            self.config.wait_timeout(),
            self.config.poll_step(),
            || locator.find_title_surface(),
        )
        .await?;

        self.transition(DriverState::Settled);
        let title = surface.title().to_string();

        let report = FeedExhauster::new(self.locator, self.config).exhaust().await?;
        tracing::debug!(
            "Task {}: feed {:?} after {} rounds",
            entry.item_id,
            report.outcome,
            report.rounds
        );
        let comments = read_records(self.locator).await?;

        let href = self.locator.find_permalink().await?;
        let permalink = resolve_permalink(href.as_deref(), self.origin, &entry.item_id);

        Ok(TaskRecord {
            item_id: permalink.item_id.unwrap_or_else(|| entry.item_id.clone()),
            title,
            permalink: permalink.url,
            comments,
        })
    }

    /// The single close attempt. Never fails: a missing or unclickable
    /// close control is logged and the pane is left as is.
    async fn close(&mut self) {
        let failed = self.state == DriverState::Failed;
        if !failed {
            self.transition(DriverState::Closing);
        }

        match self.locator.find_close_control().await {
            Ok(Some(control)) => {
                if let Err(e) = self.locator.invoke(&control).await {
                    tracing::debug!("Close control {control} not clickable: {e}");
                }
            }
            Ok(None) => tracing::debug!("No close control found; pane may already be dismissed"),
            Err(e) => tracing::debug!("Close control lookup failed: {e}"),
        }
        tokio::time::sleep(self.config.close_pause()).await;

        if !failed {
            self.transition(DriverState::Closed);
        }
    }

    fn transition(&mut self, next: DriverState) {
        tracing::debug!("Detail view: {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

//! Driving a lazily-paged activity feed until nothing more loads.
//!
//! The host gives no end-of-feed signal. Each round expands truncated
//! content, scrolls the feed to its end, pauses, and re-counts the rendered
//! entries. The feed is considered exhausted once the count has stayed the
//! same with the scroll position pinned to the bottom for
//! `stability_rounds` consecutive rounds. A single unchanged round is not
//! enough: the count regularly stalls for a round while a page is in flight.
//!
//! Known approximation: a host that delivers pages in bursts slower than the
//! pause interval can still be cut short.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::ExportConfig;
use crate::error::ExportResult;
use crate::locator::ViewLocator;
use crate::types::{ExpandCandidate, FeedSnapshot};

static EXPAND_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(show more|see more|read more|expand)$").expect("static regex")
});

static UNRELATED_ACTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"like|react|menu|more options").expect("static regex"));

/// Whether a feed button expands truncated rich text.
///
/// The label must be exactly one of the known expand phrases (case and
/// spacing aside), the button must sit inside a rich-text region, and its
/// accessible label must not name an unrelated action such as reacting or
/// opening a menu.
pub fn is_expand_control(candidate: &ExpandCandidate) -> bool {
    let label = normalize_label(&candidate.label);
    let aria = candidate
        .aria_label
        .as_deref()
        .map(|a| a.to_lowercase())
        .unwrap_or_default();

    candidate.in_rich_text && EXPAND_LABEL.is_match(&label) && !UNRELATED_ACTION.is_match(&aria)
}

fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// How a feed exhaustion pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustionOutcome {
    /// The detail view has no feed.
    NoFeed,
    /// The stability rule confirmed no more content is arriving.
    Exhausted,
    /// Stopped at the round cap; best effort.
    RoundCapReached,
}

/// Summary of one exhaustion pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExhaustionReport {
    pub outcome: ExhaustionOutcome,
    pub rounds: usize,
    pub entry_count: usize,
    pub expanded: usize,
}

/// One exhaustion pass over the feed of the currently open detail view.
///
/// Counters live on the instance; create a fresh one per task.
pub struct FeedExhauster<'a, L: ?Sized> {
    locator: &'a L,
    config: &'a ExportConfig,
    rounds: usize,
    stable_rounds: usize,
    last_count: Option<usize>,
    expanded: usize,
}

impl<'a, L> FeedExhauster<'a, L>
where
    L: ViewLocator + ?Sized,
{
    pub fn new(locator: &'a L, config: &'a ExportConfig) -> Self {
        Self {
            locator,
            config,
            rounds: 0,
            stable_rounds: 0,
            last_count: None,
            expanded: 0,
        }
    }

    /// Page the feed until it is stable or the round cap is hit.
    pub async fn exhaust(mut self) -> ExportResult<ExhaustionReport> {
        if !self.locator.feed_present().await? {
            return Ok(self.report(ExhaustionOutcome::NoFeed));
        }
        self.locator.select_comments_tab().await?;

        let required = self.config.stability_rounds.max(1);
        while self.rounds < self.config.max_feed_rounds {
            self.rounds += 1;

            self.expand_truncated().await?;
            self.locator.scroll_feed_to_end().await?;
            tokio::time::sleep(self.config.feed_scroll_pause()).await;

            let snapshot = self.locator.feed_snapshot().await?;
            if self.observe(snapshot) >= required {
                tracing::debug!(
                    "Feed stable after {} rounds ({} entries)",
                    self.rounds,
                    snapshot.entry_count
                );
                return Ok(self.report(ExhaustionOutcome::Exhausted));
            }
        }

        tracing::debug!(
            "Feed round cap of {} reached with {} entries",
            self.config.max_feed_rounds,
            self.last_count.unwrap_or(0)
        );
        Ok(self.report(ExhaustionOutcome::RoundCapReached))
    }

    /// Apply the stability rule to one round's snapshot; returns the
    /// current consecutive-stable count.
    fn observe(&mut self, snapshot: FeedSnapshot) -> usize {
        if self.last_count == Some(snapshot.entry_count) && snapshot.scroll.is_at_bottom() {
            self.stable_rounds += 1;
        } else {
            self.stable_rounds = 0;
        }
        self.last_count = Some(snapshot.entry_count);
        self.stable_rounds
    }

    async fn expand_truncated(&mut self) -> ExportResult<()> {
        let candidates = self.locator.expand_candidates().await?;
        for candidate in candidates.iter().filter(|c| is_expand_control(c)) {
            match self.locator.invoke(&candidate.handle).await {
                Ok(()) => self.expanded += 1,
                Err(e) => tracing::debug!("Expand control {} not clickable: {e}", candidate.handle),
            }
        }
        Ok(())
    }

    fn report(&self, outcome: ExhaustionOutcome) -> ExhaustionReport {
        ExhaustionReport {
            outcome,
            rounds: self.rounds,
            entry_count: self.last_count.unwrap_or(0),
            expanded: self.expanded,
        }
    }
}

//! The view capability the engine observes and drives the host board through.
//!
//! Everything host-specific (selectors, markup quirks, how a click is
//! synthesized) lives behind this trait. Swapping host applications means
//! supplying a different implementation, not changing the engine.

use async_trait::async_trait;

use crate::error::ExportResult;
use crate::types::{
    Activation, ActivationHandle, CardProbe, ColumnProbe, ControlHandle, ExpandCandidate,
    FeedSnapshot, StoryProbe, TitleSurface,
};

/// Read/act access to a live, client-rendered board.
#[async_trait]
pub trait ViewLocator: Send + Sync {
    /// Every board column in on-screen order.
    async fn columns(&self) -> ExportResult<Vec<ColumnProbe>>;
    /// Raw column header titles in on-screen order.
    async fn column_headers(&self) -> ExportResult<Vec<String>>;
    /// Scroll a column's scroll container to its maximum extent.
    async fn scroll_column_to_end(&self, column: usize) -> ExportResult<()>;
    /// Cards currently materialized in a column.
    async fn cards(&self, column: usize) -> ExportResult<Vec<CardProbe>>;

    /// Click the activation surface at its visual center.
    async fn activate(&self, handle: &ActivationHandle) -> ExportResult<Activation>;
    /// The first recognized title surface of the detail view, if settled.
    async fn find_title_surface(&self) -> ExportResult<Option<TitleSurface>>;
    /// `href` of the first link matching the task-permalink pattern.
    async fn find_permalink(&self) -> ExportResult<Option<String>>;
    /// The detail view's dismiss control, if one is rendered.
    async fn find_close_control(&self) -> ExportResult<Option<ControlHandle>>;
    /// Click a control previously returned by this locator.
    async fn invoke(&self, control: &ControlHandle) -> ExportResult<()>;

    /// Whether the detail view contains a story feed.
    async fn feed_present(&self) -> ExportResult<bool>;
    /// Select the feed's comments tab when it is not already selected.
    async fn select_comments_tab(&self) -> ExportResult<()>;
    /// Buttons inside the feed that may expand truncated content.
    async fn expand_candidates(&self) -> ExportResult<Vec<ExpandCandidate>>;
    /// Scroll the feed's nearest scrollable ancestor to its maximum extent.
    async fn scroll_feed_to_end(&self) -> ExportResult<()>;
    /// Top-level entry count and scroll position of the feed.
    async fn feed_snapshot(&self) -> ExportResult<FeedSnapshot>;
    /// Every top-level feed entry currently rendered.
    async fn stories(&self) -> ExportResult<Vec<StoryProbe>>;

    /// Location of the board being exported.
    async fn source_url(&self) -> ExportResult<String>;
}

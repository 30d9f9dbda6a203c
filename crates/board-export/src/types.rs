//! Core data types for board groups, work items, and exported records.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Opaque, board-wide unique identifier of a work item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Adapter token naming the surface that opens an item's detail view.
///
/// Only meaningful while the enumeration snapshot it came from is live.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivationHandle(pub String);

/// Adapter token naming a clickable control inside the detail view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControlHandle(pub String);

impl fmt::Display for ActivationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ControlHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One item as seen inside a group during enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupItem {
    pub item_id: ItemId,
    pub handle: ActivationHandle,
}

/// A board column with the items materialized in it at enumeration time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub items: Vec<GroupItem>,
}

impl Group {
    /// Item ids in on-screen order.
    pub fn item_ids(&self) -> impl Iterator<Item = &ItemId> {
        self.items.iter().map(|i| &i.item_id)
    }
}

/// A single unit of work: one distinct item and the group it is exported under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorklistEntry {
    pub item_id: ItemId,
    pub first_group_name: String,
    pub activation_handle: ActivationHandle,
}

/// Whether a feed entry is a human comment or a system/audit story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentKind {
    Comment,
    Story,
}

impl CommentKind {
    /// `Comment` iff an author is present and the text is non-empty.
    pub fn classify(author: Option<&str>, text: &str) -> Self {
        match author {
            Some(a) if !a.is_empty() && !text.is_empty() => CommentKind::Comment,
            _ => CommentKind::Story,
        }
    }
}

/// One normalized entry of a task's activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    #[serde(rename = "type")]
    pub kind: CommentKind,
    pub text: String,
    pub author: Option<String>,
    pub created: Option<String>,
}

impl CommentRecord {
    pub fn new(text: String, author: Option<String>, created: Option<String>) -> Self {
        let kind = CommentKind::classify(author.as_deref(), &text);
        Self {
            kind,
            text,
            author,
            created,
        }
    }
}

/// Identity of a feed entry within one feed-read pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "source", content = "key", rename_all = "snake_case")]
pub enum StoryKey {
    /// Identifier exposed by the host for the entry.
    Native(String),
    /// SHA-256 of `author|created|text`, absent fields as empty strings.
    Digest(String),
}

impl StoryKey {
    pub fn digest(author: Option<&str>, created: Option<&str>, text: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(author.unwrap_or("").as_bytes());
        hasher.update(b"|");
        hasher.update(created.unwrap_or("").as_bytes());
        hasher.update(b"|");
        hasher.update(text.as_bytes());
        StoryKey::Digest(hex::encode(hasher.finalize()))
    }

    /// Prefer the native id when the host provides a non-empty one.
    pub fn for_entry(
        native_id: Option<&str>,
        author: Option<&str>,
        created: Option<&str>,
        text: &str,
    ) -> Self {
        match native_id.map(str::trim) {
            Some(id) if !id.is_empty() => StoryKey::Native(id.to_string()),
            _ => Self::digest(author, created, text),
        }
    }
}

/// Everything exported for a single task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(rename = "task_gid")]
    pub item_id: ItemId,
    pub title: String,
    #[serde(rename = "permalink_url")]
    pub permalink: String,
    pub comments: Vec<CommentRecord>,
}

/// Tasks attributed to one group in the export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportGroup {
    pub group_name: String,
    pub task_count: usize,
    pub tasks: Vec<TaskRecord>,
}

/// The complete export, grouped by board column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub exported_at: chrono::DateTime<chrono::Utc>,
    pub source_url: String,
    pub items_attempted: usize,
    pub items_exported: usize,
    pub groups: Vec<ExportGroup>,
}

impl ExportDocument {
    /// Total number of tasks across all groups.
    pub fn task_total(&self) -> usize {
        self.groups.iter().map(|g| g.tasks.len()).sum()
    }
}

/// Counts reported to the confirmation gate before bulk processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_items: usize,
    pub total_groups: usize,
}

// Observations produced by a `ViewLocator`.

/// Rendered geometry and computed style of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementBox {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub display: String,
    #[serde(default)]
    pub visibility: String,
}

impl ElementBox {
    /// A visible box of the given size with default styling.
    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            display: "block".to_string(),
            visibility: "visible".to_string(),
        }
    }
}

/// A board column as observed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProbe {
    pub index: usize,
    pub element: ElementBox,
}

/// A card as observed inside a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardProbe {
    pub item_id: Option<String>,
    pub element: ElementBox,
    pub handle: ActivationHandle,
}

/// A surface carrying the task title once the detail view has settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TitleSurface {
    /// Value-bearing form control (input, textarea).
    Control { value: String },
    /// Element whose text content is the title.
    Text { text: String },
}

impl TitleSurface {
    pub fn title(&self) -> &str {
        match self {
            TitleSurface::Control { value } => value.trim(),
            TitleSurface::Text { text } => text.trim(),
        }
    }
}

/// Result of asking the adapter to click an activation surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Dispatched,
    /// The surface is no longer attached to the document.
    Stale,
}

/// A button inside the feed that may expand truncated content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandCandidate {
    pub label: String,
    #[serde(default)]
    pub aria_label: Option<String>,
    pub in_rich_text: bool,
    pub handle: ControlHandle,
}

/// Scroll position of a scroll container.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    /// Within one pixel of the maximum scroll extent (sub-pixel safe).
    pub fn is_at_bottom(&self) -> bool {
        (self.scroll_height - self.client_height - self.scroll_top).abs() <= 1.0
    }
}

/// Entry count and scroll state of the feed after a paging round.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeedSnapshot {
    pub entry_count: usize,
    pub scroll: ScrollMetrics,
}

/// One top-level feed entry as observed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoryProbe {
    #[serde(default)]
    pub native_id: Option<String>,
    #[serde(default)]
    pub in_composer: bool,
    /// Inner HTML of the rich-text region; `None` when the entry has no body.
    #[serde(default)]
    pub body_html: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    /// Machine-readable `datetime` attribute of the timestamp, if any.
    #[serde(default)]
    pub datetime: Option<String>,
    /// Displayed timestamp text.
    #[serde(default)]
    pub timestamp_text: Option<String>,
}

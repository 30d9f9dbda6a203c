//! Selectors for the host board's markup.
//!
//! Everything that couples the exporter to one host's class names lives
//! here. Supporting another host means replacing this table.

use serde_json::{json, Value};

/// Substring of a tab URL that marks it as showing a board.
pub const BOARD_URL_MARKER: &str = "/board";

/// Attribute used to tag elements the engine holds handles to.
pub const HANDLE_ATTR: &str = "data-board-export-handle";

pub const COLUMN: &str = ".BoardColumn.BoardBody-column";
pub const COLUMN_HEADER: &str = ".BoardGroupHeader h3.BoardColumnHeaderTitle";
pub const COLUMN_SCROLLER: &str = "[data-testid=\"VerticalScroller\"]";
pub const CARD: &str = ".BoardColumnScrollableContainer-cardsList .BoardCard-layout[data-task-id]";
pub const CARD_ID_ATTR: &str = "data-task-id";
/// Clicking the name rather than the card avoids like and completion toggles.
pub const CARD_CLICK_TARGET: &str = ".BoardCard-taskName";

/// Title surfaces, tried as one selector list.
pub const TITLE: &[&str] = &[
    "[aria-label=\"Task Name\"]",
    "[aria-label=\"Task name\"]",
    "[data-testid*=\"TaskName\"]",
    "[data-testid*=\"TaskTitle\"]",
    "input[placeholder*=\"Task name\"]",
    "h1[contenteditable=\"true\"]",
    "h2[contenteditable=\"true\"]",
];

pub const PERMALINK: &str = "a[href*=\"/task/\"], a[href^=\"/0/\"]";
pub const CLOSE: &str =
    "button[aria-label*=\"Close\"], [data-testid*=\"CloseTaskPane\"], [aria-label*=\"Dismiss\"]";

pub const FEED: &str = ".TaskStoryFeed";
pub const TABLIST: &str = "[role=\"tablist\"]";
pub const COMMENTS_TAB: &str = "#Comments[role=\"tab\"]";
/// Top-level feed entries only; replies and nested stories are excluded.
pub const STORY: &str = ".TaskStoryFeed .FeedBlockStory[data-testid=\"FeedBlockStory\"]";
pub const STORY_ID_ATTR: &str = "data-story-id";
pub const COMPOSER: &str = ".TaskCreationBlockStory";
pub const STORY_BODY: &str = ".BlockStoryStructure-body";
pub const RICH_TEXT: &str = ".TruncatedRichText, .RichText3, [class*=\"RichText\"]";
pub const TRUNCATED_REGION: &str = ".TruncatedRichText, [class*=\"RichText\"]";
pub const ACTOR: &str = ".BlockStory-actorName";
pub const TIMESTAMP: &str = ".BlockStory-timestamp";
pub const TIMESTAMP_TIME: &str = ".BlockStory-timestamp time";

/// The selector table as a JSON object, injected into every probe script.
pub fn selector_table() -> Value {
    json!({
        "handleAttr": HANDLE_ATTR,
        "column": COLUMN,
        "columnHeader": COLUMN_HEADER,
        "columnScroller": COLUMN_SCROLLER,
        "card": CARD,
        "cardIdAttr": CARD_ID_ATTR,
        "cardClickTarget": CARD_CLICK_TARGET,
        "title": TITLE.join(","),
        "permalink": PERMALINK,
        "close": CLOSE,
        "feed": FEED,
        "tablist": TABLIST,
        "commentsTab": COMMENTS_TAB,
        "story": STORY,
        "storyIdAttr": STORY_ID_ATTR,
        "composer": COMPOSER,
        "storyBody": STORY_BODY,
        "richText": RICH_TEXT,
        "truncatedRegion": TRUNCATED_REGION,
        "actor": ACTOR,
        "timestamp": TIMESTAMP,
        "timestampTime": TIMESTAMP_TIME,
    })
}

//! Normalizing an exhausted feed into deduplicated comment records.

use std::collections::HashSet;

use crate::error::ExportResult;
use crate::locator::ViewLocator;
use crate::rich_text::to_plain_text;
use crate::types::{CommentRecord, StoryKey, StoryProbe};

/// Turn observed feed entries into records, in feed order.
///
/// Composer placeholders, entries without a body and entries whose text is
/// empty are dropped. Entries sharing a [`StoryKey`] are kept once. The
/// result depends only on `stories`, so re-reading an unchanged feed gives
/// the same sequence.
pub fn extract_records(stories: &[StoryProbe]) -> Vec<CommentRecord> {
    let mut seen: HashSet<StoryKey> = HashSet::new();
    let mut records = Vec::new();

    for story in stories {
        if story.in_composer {
            continue;
        }
        let Some(body) = story.body_html.as_deref() else {
            continue;
        };

        let text = to_plain_text(body);
        if text.is_empty() {
            continue;
        }

        let author = non_blank(story.author.as_deref());
        let created = non_blank(story.datetime.as_deref())
            .or_else(|| non_blank(story.timestamp_text.as_deref()));

        let key = StoryKey::for_entry(
            story.native_id.as_deref(),
            author.as_deref(),
            created.as_deref(),
            &text,
        );
        if !seen.insert(key) {
            continue;
        }

        records.push(CommentRecord::new(text, author, created));
    }

    records
}

/// Read the feed currently rendered in the detail view.
pub async fn read_records<L>(locator: &L) -> ExportResult<Vec<CommentRecord>>
where
    L: ViewLocator + ?Sized,
{
    let stories = locator.stories().await?;
    let records = extract_records(&stories);
    tracing::debug!(
        "Extracted {} records from {} feed entries",
        records.len(),
        stories.len()
    );
    Ok(records)
}

fn non_blank(s: Option<&str>) -> Option<String> {
    s.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

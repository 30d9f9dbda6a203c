//! Column discovery and scroll-to-materialize card enumeration.
//!
//! The board only renders cards near the viewport, so each column is
//! scrolled to its end a fixed number of times before its cards are read.
//! Cards that never materialize within that budget are simply absent.

use crate::config::ExportConfig;
use crate::error::ExportResult;
use crate::locator::ViewLocator;
use crate::types::{Group, GroupItem, ItemId};
use crate::visibility::is_interactable;

/// Name for the column at `position` among visible columns.
///
/// Uses the header title at the same position when it is non-blank,
/// otherwise `Column {position + 1}`.
pub fn column_name(position: usize, headers: &[String]) -> String {
    headers
        .get(position)
        .map(|h| h.trim())
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Column {}", position + 1))
}

/// Discover visible columns and the visible, identified cards in each.
pub async fn enumerate_groups<L>(locator: &L, config: &ExportConfig) -> ExportResult<Vec<Group>>
where
    L: ViewLocator + ?Sized,
{
    let columns: Vec<_> = locator
        .columns()
        .await?
        .into_iter()
        .filter(|c| is_interactable(&c.element))
        .collect();

    let headers: Vec<String> = locator
        .column_headers()
        .await?
        .into_iter()
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .collect();

    if columns.is_empty() {
        tracing::warn!("No board columns matched; check the locator's column selector");
    }

    let mut groups = Vec::with_capacity(columns.len());
    for (position, column) in columns.iter().enumerate() {
        let name = column_name(position, &headers);

        for _ in 0..config.column_scroll_cycles {
            locator.scroll_column_to_end(column.index).await?;
            tokio::time::sleep(config.column_scroll_pause()).await;
        }

        let items: Vec<GroupItem> = locator
            .cards(column.index)
            .await?
            .into_iter()
            .filter(|card| is_interactable(&card.element))
            .filter_map(|card| {
                let id = card.item_id?.trim().to_string();
                (!id.is_empty()).then(|| GroupItem {
                    item_id: ItemId(id),
                    handle: card.handle,
                })
            })
            .collect();

        tracing::debug!("Column {name:?}: {} materialized cards", items.len());
        groups.push(Group { name, items });
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBoard, FakeColumn};

    #[test]
    fn test_column_name_fallback() {
        let headers = vec!["Backlog".to_string(), "  ".to_string()];
        assert_eq!(column_name(0, &headers), "Backlog");
        assert_eq!(column_name(1, &headers), "Column 2");
        assert_eq!(column_name(5, &headers), "Column 6");
    }

    #[tokio::test(start_paused = true)]
    async fn test_enumerates_visible_columns_in_order() {
        let board = FakeBoard::builder()
            .column(FakeColumn::named("To do").cards(&["1", "2"]))
            .column(FakeColumn::named("Hidden").cards(&["9"]).hidden())
            .column(FakeColumn::unnamed().cards(&["3"]))
            .build();

        let groups = enumerate_groups(&board, &ExportConfig::default()).await.unwrap();
        let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["To do", "Column 2"]);
        let ids: Vec<_> = groups[0].item_ids().map(|i| i.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scrolling_materializes_virtualized_cards() {
        let board = FakeBoard::builder()
            .column(
                FakeColumn::named("Doing")
                    .cards(&["1", "2", "3", "4", "5", "6"])
                    .virtualized(2, 2),
            )
            .build();

        let config = ExportConfig {
            column_scroll_cycles: 1,
            ..ExportConfig::default()
        };
        let groups = enumerate_groups(&board, &config).await.unwrap();
        assert_eq!(groups[0].items.len(), 4);

        let groups = enumerate_groups(&board, &ExportConfig::default()).await.unwrap();
        assert_eq!(groups[0].items.len(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_skips_hidden_and_unidentified_cards() {
        let board = FakeBoard::builder()
            .column(
                FakeColumn::named("Review")
                    .cards(&["1", "", "3"])
                    .hidden_card("3"),
            )
            .build();
        let groups = enumerate_groups(&board, &ExportConfig::default()).await.unwrap();
        let ids: Vec<_> = groups[0].item_ids().map(|i| i.as_str()).collect();
        assert_eq!(ids, vec!["1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_board() {
        let board = FakeBoard::builder().build();
        let groups = enumerate_groups(&board, &ExportConfig::default()).await.unwrap();
        assert!(groups.is_empty());
    }
}

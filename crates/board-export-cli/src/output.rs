//! Writing the finished export to disk.

use std::path::Path;

use board_export::{ExportDocument, ExportResult};

/// Write `doc` as pretty-printed JSON, replacing any existing file.
pub fn write_document(doc: &ExportDocument, path: &Path) -> ExportResult<()> {
    let json = serde_json::to_string_pretty(doc)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)?;
    tracing::info!(
        "Wrote {} tasks in {} groups to {}",
        doc.task_total(),
        doc.groups.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use board_export::{ExportGroup, ItemId, TaskRecord};
    use chrono::Utc;

    #[test]
    fn test_writes_into_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("board.json");
        let doc = ExportDocument {
            exported_at: Utc::now(),
            source_url: "https://app.example.com/0/1/board".to_string(),
            items_attempted: 1,
            items_exported: 1,
            groups: vec![ExportGroup {
                group_name: "Done".to_string(),
                task_count: 1,
                tasks: vec![TaskRecord {
                    item_id: ItemId::new("9"),
                    title: "Ship it".to_string(),
                    permalink: "https://app.example.com/0/0/9".to_string(),
                    comments: Vec::new(),
                }],
            }],
        };

        write_document(&doc, &path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\n  \"groups\""));
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["groups"][0]["tasks"][0]["task_gid"], "9");
    }
}

//! Folding per-task results back into column-ordered export groups.

use chrono::Utc;
use indexmap::IndexMap;

use crate::types::{ExportDocument, ExportGroup, Group, TaskRecord};

/// Build the export document.
///
/// `results` pairs each exported task with the group it was first seen in,
/// in worklist order. Groups keep their on-screen order; groups sharing a
/// name are exported once, at the position of the first.
pub fn assemble(
    groups: &[Group],
    results: Vec<(String, TaskRecord)>,
    source_url: &str,
    items_attempted: usize,
) -> ExportDocument {
    let mut by_group: IndexMap<String, Vec<TaskRecord>> = groups
        .iter()
        .map(|g| (g.name.clone(), Vec::new()))
        .collect();

    let items_exported = results.len();
    for (group_name, task) in results {
        by_group.entry(group_name).or_default().push(task);
    }

    ExportDocument {
        exported_at: Utc::now(),
        source_url: source_url.to_string(),
        items_attempted,
        items_exported,
        groups: by_group
            .into_iter()
            .map(|(group_name, tasks)| ExportGroup {
                group_name,
                task_count: tasks.len(),
                tasks,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemId;

    fn group(name: &str) -> Group {
        Group {
            name: name.to_string(),
            items: Vec::new(),
        }
    }

    fn task(id: &str) -> TaskRecord {
        TaskRecord {
            item_id: ItemId::new(id),
            title: format!("Task {id}"),
            permalink: format!("https://app.example.com/0/0/{id}"),
            comments: Vec::new(),
        }
    }

    #[test]
    fn test_preserves_column_order_and_counts() {
        let groups = vec![group("Backlog"), group("Doing"), group("Done")];
        let results = vec![
            ("Doing".to_string(), task("3")),
            ("Backlog".to_string(), task("1")),
            ("Doing".to_string(), task("4")),
        ];
        let doc = assemble(&groups, results, "https://app.example.com/0/5/board", 5);

        let names: Vec<_> = doc.groups.iter().map(|g| g.group_name.as_str()).collect();
        assert_eq!(names, vec!["Backlog", "Doing", "Done"]);
        assert_eq!(doc.groups[1].task_count, 2);
        assert_eq!(doc.groups[1].tasks[0].item_id.as_str(), "3");
        assert_eq!(doc.groups[2].task_count, 0);
        assert_eq!(doc.items_attempted, 5);
        assert_eq!(doc.items_exported, 3);
    }

    #[test]
    fn test_same_named_groups_merge() {
        let groups = vec![group("Done"), group("Doing"), group("Done")];
        let doc = assemble(&groups, vec![("Done".to_string(), task("1"))], "u", 1);
        assert_eq!(doc.groups.len(), 2);
        assert_eq!(doc.task_total(), 1);
    }

    #[test]
    fn test_document_serializes_wire_fields() {
        let doc = assemble(&[group("Doing")], vec![("Doing".to_string(), task("9"))], "u", 1);
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json["exported_at"].is_string());
        assert_eq!(json["source_url"], "u");
        assert_eq!(json["groups"][0]["group_name"], "Doing");
        assert_eq!(json["groups"][0]["task_count"], 1);
        assert_eq!(json["groups"][0]["tasks"][0]["task_gid"], "9");
    }
}

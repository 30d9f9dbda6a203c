//! Folding enumerated groups into a single deduplicated worklist.

use indexmap::IndexMap;

use crate::types::{Group, ItemId, WorklistEntry};

/// One entry per distinct item, in group-then-card order.
///
/// An item shown in several columns keeps the first column it was seen in,
/// along with the activation handle captured there.
pub fn build_worklist(groups: &[Group]) -> Vec<WorklistEntry> {
    let mut seen: IndexMap<&ItemId, WorklistEntry> = IndexMap::new();
    for group in groups {
        for item in &group.items {
            seen.entry(&item.item_id).or_insert_with(|| WorklistEntry {
                item_id: item.item_id.clone(),
                first_group_name: group.name.clone(),
                activation_handle: item.handle.clone(),
            });
        }
    }
    seen.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActivationHandle, GroupItem};
    use pretty_assertions::assert_eq;

    fn group(name: &str, ids: &[&str]) -> Group {
        Group {
            name: name.to_string(),
            items: ids
                .iter()
                .map(|id| GroupItem {
                    item_id: ItemId::from(*id),
                    handle: ActivationHandle(format!("{name}/{id}")),
                })
                .collect(),
        }
    }

    #[test]
    fn test_first_group_wins() {
        let groups = vec![group("G1", &["a", "b"]), group("G2", &["c", "a"])];
        let work = build_worklist(&groups);

        let ids: Vec<_> = work.iter().map(|w| w.item_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        let a = work.iter().find(|w| w.item_id.as_str() == "a").unwrap();
        assert_eq!(a.first_group_name, "G1");
        assert_eq!(a.activation_handle, ActivationHandle("G1/a".to_string()));
    }

    #[test]
    fn test_duplicate_within_group() {
        let work = build_worklist(&[group("G1", &["a", "a", "b"])]);
        assert_eq!(work.len(), 2);
    }

    #[test]
    fn test_empty_groups() {
        assert!(build_worklist(&[]).is_empty());
        assert!(build_worklist(&[group("G1", &[])]).is_empty());
    }
}

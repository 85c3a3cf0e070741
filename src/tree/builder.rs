//! Level-order construction of a plugin tree
//!
//! Issues one `children_of` query per depth level. Forms are shallow, so the
//! number of round-trips stays small regardless of the number of fields.

use std::collections::HashMap;

use super::{PluginId, PluginNode, PluginRecord};
use crate::error::{ConfigurationError, Error, Result};
use crate::storage::PluginStore;

struct Slot {
    record: PluginRecord,
    children: Vec<usize>,
    /// Ids of ancestors and of alias targets expanded above this slot
    lineage: Vec<PluginId>,
}

/// Rebuild the tree rooted at `root`, resolving alias plugins
pub async fn build_tree(
    store: &dyn PluginStore,
    root: PluginId,
    max_depth: usize,
) -> Result<PluginNode> {
    let root_record = store
        .get(root)
        .await
        .map_err(Error::Storage)?
        .ok_or(ConfigurationError::UnknownPlugin(root))?;

    let mut slots = vec![Slot {
        record: root_record,
        children: Vec::new(),
        lineage: Vec::new(),
    }];
    let mut level = vec![0];
    let mut depth = 0;

    while !level.is_empty() {
        let mut sources = Vec::with_capacity(level.len());
        for &index in &level {
            let slot = &slots[index];
            let source = slot.record.children_source();
            let self_alias = slot.record.alias_of == Some(slot.record.id);
            if slot.record.is_alias() && (self_alias || slot.lineage.contains(&source)) {
                return Err(ConfigurationError::AliasCycle {
                    alias: slot.record.id,
                    target: source,
                }
                .into());
            }
            sources.push(source);
        }

        let mut query = sources.clone();
        query.sort_unstable();
        query.dedup();
        tracing::debug!("Fetching children of {} plugins at depth {}", query.len(), depth);
        let records = store.children_of(&query).await.map_err(Error::Storage)?;
        if !records.is_empty() {
            depth += 1;
            if depth > max_depth {
                return Err(ConfigurationError::TreeTooDeep(max_depth).into());
            }
        }

        let mut by_parent: HashMap<PluginId, Vec<PluginRecord>> = HashMap::new();
        for record in records {
            if let Some(parent) = record.parent {
                by_parent.entry(parent).or_default().push(record);
            }
        }
        for children in by_parent.values_mut() {
            children.sort_by_key(|r| (r.position, r.id));
        }

        let mut next = Vec::new();
        for (&index, &source) in level.iter().zip(&sources) {
            let Some(children) = by_parent.get(&source) else {
                if slots[index].record.is_alias() {
                    tracing::warn!(
                        "Alias plugin {} points at plugin {} which has no children",
                        slots[index].record.id,
                        source
                    );
                }
                continue;
            };
            let mut lineage = slots[index].lineage.clone();
            lineage.push(slots[index].record.id);
            if source != slots[index].record.id {
                lineage.push(source);
            }
            for child in children {
                let child_index = slots.len();
                slots.push(Slot {
                    record: child.clone(),
                    children: Vec::new(),
                    lineage: lineage.clone(),
                });
                slots[index].children.push(child_index);
                next.push(child_index);
            }
        }
        level = next;
    }

    Ok(assemble(&slots, 0))
}

fn assemble(slots: &[Slot], index: usize) -> PluginNode {
    let slot = &slots[index];
    PluginNode {
        record: slot.record.clone(),
        children: slot.children.iter().map(|&c| assemble(slots, c)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::ALIAS_KIND;
    use crate::storage::{MemoryPluginStore, MockPluginStore};
    use pretty_assertions::assert_eq;

    fn ids(node: &PluginNode) -> Vec<PluginId> {
        node.descendants().iter().map(|n| n.record.id).collect()
    }

    fn form_with_alias() -> MemoryPluginStore {
        MemoryPluginStore::new(vec![
            PluginRecord::new(1, None, 0, "Form"),
            PluginRecord::new(2, Some(1), 0, "TextField"),
            PluginRecord::new(3, Some(1), 1, ALIAS_KIND).aliasing(20),
            PluginRecord::new(4, Some(1), 2, "SubmitButton"),
            // shared subtree living outside the form
            PluginRecord::new(20, None, 0, "Fieldset"),
            PluginRecord::new(22, Some(20), 1, "PhoneField"),
            PluginRecord::new(21, Some(20), 0, "EmailField"),
        ])
    }

    #[tokio::test]
    async fn test_children_keep_position_order() {
        let store = MemoryPluginStore::new(vec![
            PluginRecord::new(1, None, 0, "Form"),
            PluginRecord::new(3, Some(1), 2, "EmailField"),
            PluginRecord::new(2, Some(1), 1, "TextField"),
            PluginRecord::new(4, Some(1), 0, "Fieldset"),
            PluginRecord::new(5, Some(4), 0, "PhoneField"),
        ]);
        let tree = build_tree(&store, 1, 32).await.unwrap();
        assert_eq!(ids(&tree), vec![4, 5, 2, 3]);
    }

    #[tokio::test]
    async fn test_alias_subtree_takes_alias_position() {
        let tree = build_tree(&form_with_alias(), 1, 32).await.unwrap();
        assert_eq!(ids(&tree), vec![2, 21, 22, 4]);
    }

    #[tokio::test]
    async fn test_nested_aliases_resolve_recursively() {
        let store = MemoryPluginStore::new(vec![
            PluginRecord::new(1, None, 0, "Form"),
            PluginRecord::new(2, Some(1), 0, ALIAS_KIND).aliasing(20),
            PluginRecord::new(20, None, 0, "Fieldset"),
            PluginRecord::new(21, Some(20), 0, "TextField"),
            PluginRecord::new(22, Some(20), 1, ALIAS_KIND).aliasing(30),
            PluginRecord::new(30, None, 0, "Fieldset"),
            PluginRecord::new(31, Some(30), 0, "EmailField"),
        ]);
        let tree = build_tree(&store, 1, 32).await.unwrap();
        assert_eq!(ids(&tree), vec![21, 31]);
    }

    #[tokio::test]
    async fn test_alias_to_ancestor_is_a_cycle() {
        let store = MemoryPluginStore::new(vec![
            PluginRecord::new(1, None, 0, "Form"),
            PluginRecord::new(2, Some(1), 0, "Fieldset"),
            PluginRecord::new(3, Some(2), 0, ALIAS_KIND).aliasing(1),
        ]);
        let err = build_tree(&store, 1, 32).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration(ConfigurationError::AliasCycle { alias: 3, target: 1 })
        ));
    }

    #[tokio::test]
    async fn test_mutual_aliases_are_a_cycle() {
        let store = MemoryPluginStore::new(vec![
            PluginRecord::new(1, None, 0, "Form"),
            PluginRecord::new(2, Some(1), 0, ALIAS_KIND).aliasing(10),
            PluginRecord::new(10, None, 0, "Fieldset"),
            PluginRecord::new(11, Some(10), 0, ALIAS_KIND).aliasing(20),
            PluginRecord::new(20, None, 0, "Fieldset"),
            PluginRecord::new(21, Some(20), 0, ALIAS_KIND).aliasing(10),
        ]);
        let err = build_tree(&store, 1, 32).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration(ConfigurationError::AliasCycle { alias: 21, target: 10 })
        ));
    }

    #[tokio::test]
    async fn test_self_alias_is_a_cycle() {
        let store = MemoryPluginStore::new(vec![
            PluginRecord::new(1, None, 0, "Form"),
            PluginRecord::new(2, Some(1), 0, ALIAS_KIND).aliasing(2),
        ]);
        let err = build_tree(&store, 1, 32).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration(ConfigurationError::AliasCycle { alias: 2, target: 2 })
        ));
    }

    #[tokio::test]
    async fn test_alias_without_target_keeps_own_children() {
        let store = MemoryPluginStore::new(vec![
            PluginRecord::new(1, None, 0, "Form"),
            PluginRecord::new(2, Some(1), 0, ALIAS_KIND),
            PluginRecord::new(3, Some(2), 0, "TextField"),
        ]);
        let tree = build_tree(&store, 1, 32).await.unwrap();
        assert_eq!(ids(&tree), vec![3]);
    }

    #[tokio::test]
    async fn test_dangling_alias_is_empty() {
        let store = MemoryPluginStore::new(vec![
            PluginRecord::new(1, None, 0, "Form"),
            PluginRecord::new(2, Some(1), 0, ALIAS_KIND).aliasing(99),
            PluginRecord::new(3, Some(1), 1, "TextField"),
        ]);
        let tree = build_tree(&store, 1, 32).await.unwrap();
        assert_eq!(ids(&tree), vec![3]);
    }

    #[tokio::test]
    async fn test_same_subtree_aliased_twice_is_not_a_cycle() {
        let store = MemoryPluginStore::new(vec![
            PluginRecord::new(1, None, 0, "Form"),
            PluginRecord::new(2, Some(1), 0, ALIAS_KIND).aliasing(20),
            PluginRecord::new(3, Some(1), 1, ALIAS_KIND).aliasing(20),
            PluginRecord::new(20, None, 0, "Fieldset"),
            PluginRecord::new(21, Some(20), 0, "TextField"),
        ]);
        let tree = build_tree(&store, 1, 32).await.unwrap();
        assert_eq!(ids(&tree), vec![21, 21]);
    }

    #[tokio::test]
    async fn test_depth_limit() {
        let store = MemoryPluginStore::new(vec![
            PluginRecord::new(1, None, 0, "Form"),
            PluginRecord::new(2, Some(1), 0, "Fieldset"),
            PluginRecord::new(3, Some(2), 0, "Fieldset"),
            PluginRecord::new(4, Some(3), 0, "TextField"),
        ]);
        assert!(build_tree(&store, 1, 3).await.is_ok());
        let err = build_tree(&store, 1, 2).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration(ConfigurationError::TreeTooDeep(2))
        ));
    }

    #[tokio::test]
    async fn test_missing_root() {
        let store = MemoryPluginStore::new(Vec::new());
        let err = build_tree(&store, 7, 32).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration(ConfigurationError::UnknownPlugin(7))
        ));
    }

    #[test]
    fn test_one_query_per_level() {
        let mut store = MockPluginStore::new();
        store
            .expect_get()
            .returning(|_| Ok(Some(PluginRecord::new(1, None, 0, "Form"))));
        let mut seq = mockall::Sequence::new();
        store
            .expect_children_of()
            .withf(|parents| parents == [1u64])
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(vec![
                    PluginRecord::new(2, Some(1), 0, "Fieldset"),
                    PluginRecord::new(3, Some(1), 1, "Fieldset"),
                ])
            });
        store
            .expect_children_of()
            .withf(|parents| parents == [2u64, 3])
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(vec![
                    PluginRecord::new(4, Some(2), 0, "TextField"),
                    PluginRecord::new(5, Some(3), 0, "TextField"),
                ])
            });
        store
            .expect_children_of()
            .withf(|parents| parents == [4u64, 5])
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Vec::new()));

        let tree = tokio_test::block_on(build_tree(&store, 1, 32)).unwrap();
        assert_eq!(ids(&tree), vec![2, 4, 3, 5]);
    }

    #[test]
    fn test_storage_failure_is_propagated() {
        let mut store = MockPluginStore::new();
        store
            .expect_get()
            .returning(|_| Err(anyhow::anyhow!("connection refused")));
        let err = tokio_test::block_on(build_tree(&store, 1, 32)).unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }
}

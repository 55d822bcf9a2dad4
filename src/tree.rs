//! Cost tree construction from flat upload records.
//!
//! Records are placed into an index arena keyed by name, linked to their
//! parents through a transient child-index table, then assembled into an
//! owned forest where every node holds its children by value. The parent
//! linkage never leaves this module.

use crate::models::{CostNode, FlatRecord};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Build the forest of cost trees for one upload
///
/// Roots are the records with no parent or with a parent name that does
/// not resolve within the upload. On duplicate names the later record
/// wins but keeps the position of the first occurrence.
pub fn build_forest(records: &[FlatRecord]) -> Vec<CostNode> {
    if records.is_empty() {
        return Vec::new();
    }

    let arena = NodeArena::from_records(records);
    let forest = arena.into_forest();

    debug!(
        "Built forest of {} roots from {} records",
        forest.len(),
        records.len()
    );

    forest
}

/// Name-keyed node slots awaiting linkage
struct NodeArena {
    nodes: Vec<Option<CostNode>>,
    parent_names: Vec<Option<String>>,
    index_by_name: HashMap<String, usize>,
}

impl NodeArena {
    fn from_records(records: &[FlatRecord]) -> Self {
        let mut arena = Self {
            nodes: Vec::with_capacity(records.len()),
            parent_names: Vec::with_capacity(records.len()),
            index_by_name: HashMap::with_capacity(records.len()),
        };

        for record in records {
            if record.name.is_empty() {
                debug!("Skipping record without a name");
                continue;
            }

            let node = CostNode::from_record(record);
            let parent_name = record.parent().map(str::to_string);

            match arena.index_by_name.get(&record.name) {
                Some(&index) => {
                    warn!(
                        "Duplicate item name '{}': later record replaces the earlier one",
                        record.name
                    );
                    arena.nodes[index] = Some(node);
                    arena.parent_names[index] = parent_name;
                }
                None => {
                    arena
                        .index_by_name
                        .insert(record.name.clone(), arena.nodes.len());
                    arena.nodes.push(Some(node));
                    arena.parent_names.push(parent_name);
                }
            }
        }

        arena
    }

    fn into_forest(mut self) -> Vec<CostNode> {
        let slot_count = self.nodes.len();
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); slot_count];
        let mut roots = Vec::new();

        for index in 0..slot_count {
            let parent_name = self.parent_names[index].as_deref();
            match parent_name.and_then(|name| self.index_by_name.get(name)) {
                Some(&parent) => children[parent].push(index),
                None => {
                    if let Some(name) = parent_name {
                        debug!(
                            "Parent '{}' not found, treating as root: {}",
                            name,
                            self.slot_name(index)
                        );
                    }
                    roots.push(index);
                }
            }
        }

        let forest: Vec<CostNode> = roots
            .into_iter()
            .filter_map(|root| self.assemble(root, &mut children))
            .collect();

        let unreachable: Vec<&str> = self
            .nodes
            .iter()
            .flatten()
            .map(|node| node.name.as_str())
            .collect();
        if !unreachable.is_empty() {
            warn!(
                "Cyclic parent chain, {} items left out of the tree: {}",
                unreachable.len(),
                unreachable.join(", ")
            );
        }

        forest
    }

    /// Move a node and its linked descendants out of the arena
    fn assemble(&mut self, index: usize, children: &mut [Vec<usize>]) -> Option<CostNode> {
        let mut node = self.nodes[index].take()?;
        for child in std::mem::take(&mut children[index]) {
            if let Some(child_node) = self.assemble(child, children) {
                node.children.push(child_node);
            }
        }
        Some(node)
    }

    fn slot_name(&self, index: usize) -> &str {
        self.nodes[index]
            .as_ref()
            .map(|node| node.name.as_str())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget_records() -> Vec<FlatRecord> {
        vec![
            FlatRecord::new("Widget", "Product", 1)
                .with_price(0.0)
                .with_failure_rate(0.0)
                .with_parent(""),
            FlatRecord::new("Bolt", "Part", 4)
                .with_price(0.10)
                .with_failure_rate(2.0)
                .with_parent("Widget"),
        ]
    }

    #[test]
    fn test_single_product_with_child() {
        let forest = build_forest(&widget_records());

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].name, "Widget");
        assert_eq!(forest[0].children.len(), 1);
        assert_eq!(forest[0].children[0].name, "Bolt");
    }

    #[test]
    fn test_empty_input_gives_empty_forest() {
        assert!(build_forest(&[]).is_empty());
    }

    #[test]
    fn test_unresolved_parent_becomes_root() {
        let records = vec![
            FlatRecord::new("Widget", "Product", 1),
            FlatRecord::new("Gear", "Part", 2).with_parent("Gearbox"),
        ];
        let forest = build_forest(&records);

        let roots: Vec<&str> = forest.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(roots, vec!["Widget", "Gear"]);
    }

    #[test]
    fn test_children_keep_input_order() {
        let records = vec![
            FlatRecord::new("Widget", "Product", 1),
            FlatRecord::new("Zeta", "Part", 1).with_parent("Widget"),
            FlatRecord::new("Alpha", "Part", 1).with_parent("Widget"),
            FlatRecord::new("Mid", "Part", 1).with_parent("Widget"),
        ];
        let forest = build_forest(&records);

        let children: Vec<&str> = forest[0]
            .children
            .iter()
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(children, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_child_listed_before_parent() {
        let records = vec![
            FlatRecord::new("Bolt", "Part", 4).with_parent("Arm"),
            FlatRecord::new("Arm", "Assembly", 2).with_parent("Widget"),
            FlatRecord::new("Widget", "Product", 1),
        ];
        let forest = build_forest(&records);

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].name, "Widget");
        assert_eq!(forest[0].children[0].name, "Arm");
        assert_eq!(forest[0].children[0].children[0].name, "Bolt");
    }

    #[test]
    fn test_duplicate_name_last_write_wins() {
        let records = vec![
            FlatRecord::new("X", "Part", 1),
            FlatRecord::new("Y", "Part", 7),
            FlatRecord::new("X", "Part", 9),
        ];
        let forest = build_forest(&records);

        let xs: Vec<&CostNode> = forest.iter().filter(|n| n.name == "X").collect();
        assert_eq!(xs.len(), 1);
        assert_eq!(xs[0].quantity, 9);
        // Position of the first occurrence is kept
        assert_eq!(forest[0].name, "X");
        assert_eq!(forest[1].name, "Y");
    }

    #[test]
    fn test_duplicate_name_takes_later_parent() {
        let records = vec![
            FlatRecord::new("Widget", "Product", 1),
            FlatRecord::new("Arm", "Assembly", 1).with_parent("Widget"),
            FlatRecord::new("Bolt", "Part", 1).with_parent("Widget"),
            FlatRecord::new("Bolt", "Part", 3).with_parent("Arm"),
        ];
        let forest = build_forest(&records);

        assert_eq!(forest.len(), 1);
        let widget = &forest[0];
        assert_eq!(widget.children.len(), 1);
        assert_eq!(widget.children[0].name, "Arm");
        assert_eq!(widget.children[0].children[0].quantity, 3);
    }

    #[test]
    fn test_cyclic_items_are_left_out() {
        let records = vec![
            FlatRecord::new("Widget", "Product", 1),
            FlatRecord::new("A", "Part", 1).with_parent("B"),
            FlatRecord::new("B", "Part", 1).with_parent("A"),
            FlatRecord::new("Self", "Part", 1).with_parent("Self"),
        ];
        let forest = build_forest(&records);

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].name, "Widget");
        assert!(!forest[0].has_children());
    }

    #[test]
    fn test_nameless_records_are_skipped() {
        let records = vec![
            FlatRecord::new("", "Part", 1),
            FlatRecord::new("Widget", "Product", 1),
        ];
        let forest = build_forest(&records);

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].name, "Widget");
    }
}

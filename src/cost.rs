//! Annualized cost aggregation.
//!
//! Two paths compute the same totals: a recursive sum over a built cost
//! tree, and a parent-name chase over a flat record list for callers that
//! never built the tree. Nothing is cached; every call reads the current
//! field values.

use crate::models::{CostNode, FlatRecord};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Direct annual cost of a node, excluding descendants
pub fn own_cost(node: &CostNode) -> f64 {
    node.quantity as f64 * node.price * node.failure_rate
}

/// Own cost plus the total cost of every descendant
pub fn total_cost(node: &CostNode) -> f64 {
    own_cost(node) + node.children.iter().map(total_cost).sum::<f64>()
}

/// Sum of the total costs of every root in a forest
pub fn forest_cost(forest: &[CostNode]) -> f64 {
    forest.iter().map(total_cost).sum()
}

/// Direct annual cost of a flat record; absent price or rate counts as zero
pub fn record_cost(record: &FlatRecord) -> f64 {
    match (record.price, record.failure_rate) {
        (Some(price), Some(failure_rate)) => record.quantity as f64 * price * failure_rate,
        _ => 0.0,
    }
}

/// Total cost of the subtree rooted at `root_name`, computed on the flat list
///
/// Records are resolved with the same last-write-wins rule as the tree
/// builder, so for acyclic input this equals [`total_cost`] of the node of
/// that name. A name met twice during the chase is skipped, which stops
/// cyclic parent chains.
pub fn subtree_cost(records: &[FlatRecord], root_name: &str) -> f64 {
    let effective = effective_records(records);

    let mut total = effective
        .iter()
        .find(|record| record.name == root_name)
        .map(|record| record_cost(record))
        .unwrap_or(0.0);

    let mut visited: HashSet<&str> = HashSet::from([root_name]);
    let mut pending = vec![root_name];

    while let Some(parent) = pending.pop() {
        for record in effective.iter().filter(|r| r.parent() == Some(parent)) {
            if !visited.insert(record.name.as_str()) {
                warn!(
                    "Cyclic parent chain at '{}' under '{}', skipping",
                    record.name, root_name
                );
                continue;
            }
            total += record_cost(record);
            pending.push(record.name.as_str());
        }
    }

    total
}

/// Named records with later duplicates replacing earlier ones
fn effective_records(records: &[FlatRecord]) -> Vec<&FlatRecord> {
    let last_index: HashMap<&str, usize> = records
        .iter()
        .enumerate()
        .map(|(index, record)| (record.name.as_str(), index))
        .collect();

    records
        .iter()
        .enumerate()
        .filter(|(index, record)| {
            !record.name.is_empty() && last_index.get(record.name.as_str()) == Some(index)
        })
        .map(|(_, record)| record)
        .collect()
}

impl CostNode {
    pub fn own_cost(&self) -> f64 {
        own_cost(self)
    }

    pub fn total_cost(&self) -> f64 {
        total_cost(self)
    }
}

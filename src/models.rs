//! Core data structures for bill-of-materials processing.
//!
//! Defines the flat upload record, the cost tree node, uploaded files,
//! comparison rows and the statistics reported after loading.

use crate::constants::{DEFAULT_DECIMALS, UNCHANGED_MARKER};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// One row of an upload describing a single bill-of-materials line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub quantity: u32,
    /// Unit price
    pub price: Option<f64>,
    /// Expected annual replacement multiplier
    pub failure_rate: Option<f64>,
    pub description: Option<String>,
    /// Name of the containing record within the same upload
    pub parent_name: Option<String>,
}

impl FlatRecord {
    pub fn new(name: impl Into<String>, item_type: impl Into<String>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            item_type: item_type.into(),
            quantity,
            price: None,
            failure_rate: None,
            description: None,
            parent_name: None,
        }
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_failure_rate(mut self, failure_rate: f64) -> Self {
        self.failure_rate = Some(failure_rate);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_parent(mut self, parent_name: impl Into<String>) -> Self {
        self.parent_name = Some(parent_name.into());
        self
    }

    /// Parent name, treating an empty string as no parent
    pub fn parent(&self) -> Option<&str> {
        self.parent_name.as_deref().filter(|name| !name.is_empty())
    }

    /// Whether this record's type is the configured product label
    pub fn is_product(&self, product_type: &str) -> bool {
        self.item_type == product_type
    }
}

/// One item positioned within a cost tree, owning its children by value
///
/// Numeric fields absent from the record default to zero and a missing
/// description to the empty string. Costs are never stored on the node;
/// see [`crate::cost`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostNode {
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub quantity: u32,
    pub price: f64,
    pub failure_rate: f64,
    pub description: String,
    /// Children in input order
    pub children: Vec<CostNode>,
}

impl CostNode {
    pub fn from_record(record: &FlatRecord) -> Self {
        Self {
            name: record.name.clone(),
            item_type: record.item_type.clone(),
            quantity: record.quantity,
            price: record.price.unwrap_or(0.0),
            failure_rate: record.failure_rate.unwrap_or(0.0),
            description: record.description.clone().unwrap_or_default(),
            children: Vec::new(),
        }
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Depth-first search for the first node with the given name
    pub fn find(&self, name: &str) -> Option<&CostNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    /// Number of nodes in this subtree, including this one
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(CostNode::node_count).sum::<usize>()
    }
}

/// The record list produced by reading one upload
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    /// Column heading used when this upload is compared
    pub label: String,
    /// Where the upload was read from, if anywhere
    pub source: Option<PathBuf>,
    pub records: Vec<FlatRecord>,
}

impl UploadedFile {
    pub fn new(label: impl Into<String>, records: Vec<FlatRecord>) -> Self {
        Self {
            label: label.into(),
            source: None,
            records,
        }
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// First record whose type marks it as the product
    pub fn product(&self, product_type: &str) -> Option<&FlatRecord> {
        self.records
            .iter()
            .find(|record| record.is_product(product_type))
    }
}

/// One record identity aligned across several uploads
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub name: String,
    pub item_type: String,
    pub parent_name: Option<String>,
    /// Matching record per upload index, `None` where the upload lacks it
    pub products_by_file: Vec<Option<FlatRecord>>,
}

impl ComparisonRow {
    pub fn record(&self, file_index: usize) -> Option<&FlatRecord> {
        self.products_by_file.get(file_index).and_then(Option::as_ref)
    }
}

/// Aligned rows plus per-upload product totals
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonReport {
    pub labels: Vec<String>,
    pub rows: Vec<ComparisonRow>,
    /// Product total cost per upload, 0 where an upload has no product
    pub totals: Vec<f64>,
}

impl ComparisonReport {
    pub fn file_count(&self) -> usize {
        self.labels.len()
    }

    /// Difference of the product totals, defined for exactly two uploads
    pub fn total_difference(&self) -> Option<Difference> {
        match self.totals.as_slice() {
            [first, second] => Some(Difference::between(*first, *second)),
            _ => None,
        }
    }
}

/// Direction of a cost change between two uploads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostTrend {
    Higher,
    Lower,
    Unchanged,
}

/// Signed cost change from a first upload to a second
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Difference {
    pub amount: f64,
}

impl Difference {
    /// `second - first`
    pub fn between(first: f64, second: f64) -> Self {
        Self {
            amount: second - first,
        }
    }

    /// Amount rounded to `decimals` places
    pub fn rounded(&self, decimals: usize) -> f64 {
        let scale = 10f64.powi(decimals as i32);
        (self.amount * scale).round() / scale
    }

    /// Direction of the change as displayed with `decimals` places, so
    /// summation noise below the last shown digit reads as unchanged
    pub fn trend_at(&self, decimals: usize) -> CostTrend {
        let amount = self.rounded(decimals);
        if amount > 0.0 {
            CostTrend::Higher
        } else if amount < 0.0 {
            CostTrend::Lower
        } else {
            CostTrend::Unchanged
        }
    }

    pub fn trend(&self) -> CostTrend {
        self.trend_at(DEFAULT_DECIMALS)
    }

    /// Render with an explicit sign, or the neutral marker when the
    /// rounded amount is zero
    pub fn format(&self, decimals: usize) -> String {
        let amount = self.rounded(decimals);
        match self.trend_at(decimals) {
            CostTrend::Higher => format!("+{:.*}", decimals, amount),
            CostTrend::Lower => format!("-{:.*}", decimals, amount.abs()),
            CostTrend::Unchanged => UNCHANGED_MARKER.to_string(),
        }
    }
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(DEFAULT_DECIMALS))
    }
}

/// Loading statistics
#[derive(Debug, Default)]
pub struct LoadStats {
    pub files_loaded: usize,
    pub files_failed: usize,
    pub total_records: usize,
    /// Path and reason of every upload that could not be read
    pub failures: Vec<(PathBuf, String)>,
    pub processing_time_ms: u128,
}

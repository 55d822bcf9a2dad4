//! Cross-upload comparison.
//!
//! Aligns records of several uploads by their `(name, type, parent)`
//! identity and computes each upload's product total with the flat-list
//! cost chase.

use crate::cost::{record_cost, subtree_cost};
use crate::error::{BomError, Result};
use crate::models::{ComparisonReport, ComparisonRow, Difference, FlatRecord, UploadedFile};
use std::collections::HashMap;
use tracing::debug;

/// Minimum number of uploads a comparison needs
pub const MIN_COMPARED_FILES: usize = 2;

type RowKey = (String, String, Option<String>);

/// Compare two or more uploads, totalling each upload's record of type
/// `product_type`
pub fn compare_uploads(files: &[&UploadedFile], product_type: &str) -> Result<ComparisonReport> {
    if files.len() < MIN_COMPARED_FILES {
        return Err(BomError::InsufficientFiles {
            required: MIN_COMPARED_FILES,
            found: files.len(),
        });
    }

    let rows = align_records(files);
    let totals: Vec<f64> = files
        .iter()
        .map(|file| product_total(file, product_type))
        .collect();
    let labels = files.iter().map(|file| file.label.clone()).collect();

    debug!(
        "Aligned {} uploads into {} comparison rows, totals {:?}",
        files.len(),
        rows.len(),
        totals
    );

    Ok(ComparisonReport {
        labels,
        rows,
        totals,
    })
}

/// One row per distinct `(name, type, parent)`, in first-seen order
///
/// A later record with the same identity in the same upload replaces the
/// earlier one in that upload's cell.
pub fn align_records(files: &[&UploadedFile]) -> Vec<ComparisonRow> {
    let mut rows: Vec<ComparisonRow> = Vec::new();
    let mut index_by_key: HashMap<RowKey, usize> = HashMap::new();

    for (file_index, file) in files.iter().enumerate() {
        for record in &file.records {
            let key = (
                record.name.clone(),
                record.item_type.clone(),
                record.parent().map(str::to_string),
            );
            let row_index = *index_by_key.entry(key).or_insert_with(|| {
                rows.push(ComparisonRow {
                    name: record.name.clone(),
                    item_type: record.item_type.clone(),
                    parent_name: record.parent().map(str::to_string),
                    products_by_file: vec![None; files.len()],
                });
                rows.len() - 1
            });
            rows[row_index].products_by_file[file_index] = Some(record.clone());
        }
    }

    rows
}

/// Total cost of the upload's product record, or 0 without one
pub fn product_total(file: &UploadedFile, product_type: &str) -> f64 {
    file.product(product_type)
        .map(|product| subtree_cost(&file.records, &product.name))
        .unwrap_or(0.0)
}

/// Item cost of a cell; `None` when the upload has no matching record
pub fn item_cost(record: Option<&FlatRecord>) -> Option<f64> {
    record.map(record_cost)
}

/// Change in item cost across a two-upload row; an absent record counts as 0
pub fn row_difference(row: &ComparisonRow) -> Option<Difference> {
    match row.products_by_file.as_slice() {
        [first, second] => Some(Difference::between(
            item_cost(first.as_ref()).unwrap_or(0.0),
            item_cost(second.as_ref()).unwrap_or(0.0),
        )),
        _ => None,
    }
}

//! The collection of uploaded bills of materials.
//!
//! An [`UploadSet`] is owned by the application flow and handed by
//! reference to whatever derives data from it. Adding an upload yields a
//! new set; earlier sets stay valid and unchanged, so every derived forest
//! or comparison is recomputed from an explicit input.

use crate::compare::compare_uploads;
use crate::error::Result;
use crate::models::{ComparisonReport, CostNode, UploadedFile};
use crate::tree::build_forest;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct UploadSet {
    files: Vec<Arc<UploadedFile>>,
}

impl UploadSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new set holding every current upload followed by `file`
    pub fn with_upload(&self, file: UploadedFile) -> Self {
        let mut files = self.files.clone();
        files.push(Arc::new(file));
        Self { files }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn files(&self) -> impl Iterator<Item = &UploadedFile> {
        self.files.iter().map(Arc::as_ref)
    }

    pub fn get(&self, index: usize) -> Option<&UploadedFile> {
        self.files.get(index).map(Arc::as_ref)
    }

    pub fn total_records(&self) -> usize {
        self.files().map(|file| file.records.len()).sum()
    }

    /// Forest of every upload, each built on its own, in upload order
    pub fn forest(&self) -> Vec<CostNode> {
        self.files()
            .flat_map(|file| build_forest(&file.records))
            .collect()
    }

    /// Align every upload for side-by-side comparison
    pub fn compare(&self, product_type: &str) -> Result<ComparisonReport> {
        let files: Vec<&UploadedFile> = self.files().collect();
        compare_uploads(&files, product_type)
    }
}

impl FromIterator<UploadedFile> for UploadSet {
    fn from_iter<I: IntoIterator<Item = UploadedFile>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().map(Arc::new).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PRODUCT_TYPE;
    use crate::models::FlatRecord;

    fn upload(label: &str, product: &str) -> UploadedFile {
        UploadedFile::new(
            label,
            vec![
                FlatRecord::new(product, "Product", 1),
                FlatRecord::new("Bolt", "Part", 2)
                    .with_price(1.0)
                    .with_failure_rate(1.0)
                    .with_parent(product),
            ],
        )
    }

    #[test]
    fn test_with_upload_leaves_previous_set_unchanged() {
        let empty = UploadSet::new();
        let one = empty.with_upload(upload("a", "A"));
        let two = one.with_upload(upload("b", "B"));

        assert!(empty.is_empty());
        assert_eq!(one.len(), 1);
        assert_eq!(two.len(), 2);
        assert_eq!(two.get(0), one.get(0));
        assert_eq!(two.get(1).map(|f| f.label.as_str()), Some("b"));
    }

    #[test]
    fn test_forest_concatenates_uploads() {
        let set: UploadSet = [upload("a", "A"), upload("b", "B")].into_iter().collect();
        let forest = set.forest();

        let roots: Vec<&str> = forest.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(roots, vec!["A", "B"]);
        assert_eq!(set.total_records(), 4);
    }

    #[test]
    fn test_compare_needs_two_uploads() {
        let set = UploadSet::new().with_upload(upload("a", "A"));
        assert!(set.compare(PRODUCT_TYPE).is_err());
    }
}

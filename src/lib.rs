//! BOM Processor Library
//!
//! Turns bill-of-materials CSV uploads, each a flat list of named and
//! parented line items, into trees of cost-bearing nodes and compares
//! products side by side.
//!
//! This library provides tools for:
//! - Reading uploads with header checks and forgiving field parsing
//! - Building a rooted forest from parent-name references
//! - Aggregating annualized cost (quantity x price x failure rate) over subtrees
//! - Aligning several uploads into comparison rows with per-upload totals
//! - Rendering trees and comparisons, and exporting comparisons to CSV or Parquet
//!
//! ```
//! use bom_processor::{FlatRecord, build_forest, total_cost};
//!
//! let records = vec![
//!     FlatRecord::new("Widget", "Product", 1),
//!     FlatRecord::new("Bolt", "Part", 4)
//!         .with_price(0.10)
//!         .with_failure_rate(2.0)
//!         .with_parent("Widget"),
//! ];
//! let forest = build_forest(&records);
//! assert!((total_cost(&forest[0]) - 0.80).abs() < 1e-9);
//! ```

pub mod cli;
pub mod commands;
pub mod compare;
pub mod config;
pub mod constants;
pub mod cost;
pub mod error;
pub mod export;
pub mod models;
pub mod processor;
pub mod reader;
pub mod report;
pub mod tree;
pub mod uploads;

pub use compare::compare_uploads;
pub use config::BomConfig;
pub use cost::{own_cost, subtree_cost, total_cost};
pub use error::{BomError, Result};
pub use models::{ComparisonReport, ComparisonRow, CostNode, FlatRecord, UploadedFile};
pub use processor::UploadProcessor;
pub use tree::build_forest;
pub use uploads::UploadSet;

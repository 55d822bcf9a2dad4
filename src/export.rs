//! Tabular export of comparisons.
//!
//! Flattens a [`ComparisonReport`] into a polars DataFrame, one row per
//! aligned record, with per-upload columns suffixed by the upload's
//! 1-based position, and writes it as CSV or Parquet.

use crate::compare::{item_cost, row_difference};
use crate::config::BomConfig;
use crate::error::{BomError, Result};
use crate::models::ComparisonReport;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::info;

/// Output format of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    Parquet,
}

impl ExportFormat {
    /// Infer the format from the file extension, defaulting to CSV
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("parquet") | Some("pq") => ExportFormat::Parquet,
            _ => ExportFormat::Csv,
        }
    }
}

/// Build the export table of a comparison
pub fn comparison_frame(report: &ComparisonReport) -> Result<DataFrame> {
    let rows = &report.rows;

    let mut columns = vec![
        Column::new(
            "name".into(),
            rows.iter().map(|r| r.name.clone()).collect::<Vec<_>>(),
        ),
        Column::new(
            "type".into(),
            rows.iter().map(|r| r.item_type.clone()).collect::<Vec<_>>(),
        ),
        Column::new(
            "parent".into(),
            rows.iter()
                .map(|r| r.parent_name.clone())
                .collect::<Vec<_>>(),
        ),
    ];

    for index in 0..report.file_count() {
        let suffix = index + 1;
        let records: Vec<_> = rows.iter().map(|row| row.record(index)).collect();

        columns.push(Column::new(
            format!("quantity_{suffix}").into(),
            records
                .iter()
                .map(|r| r.map(|r| r.quantity))
                .collect::<Vec<_>>(),
        ));
        columns.push(Column::new(
            format!("price_{suffix}").into(),
            records
                .iter()
                .map(|r| r.and_then(|r| r.price))
                .collect::<Vec<_>>(),
        ));
        columns.push(Column::new(
            format!("failure_rate_{suffix}").into(),
            records
                .iter()
                .map(|r| r.and_then(|r| r.failure_rate))
                .collect::<Vec<_>>(),
        ));
        columns.push(Column::new(
            format!("item_cost_{suffix}").into(),
            records.iter().map(|r| item_cost(*r)).collect::<Vec<_>>(),
        ));
        columns.push(Column::new(
            format!("description_{suffix}").into(),
            records
                .iter()
                .map(|r| r.and_then(|r| r.description.clone()))
                .collect::<Vec<_>>(),
        ));
    }

    if report.file_count() == 2 {
        columns.push(Column::new(
            "difference".into(),
            rows.iter()
                .map(|row| row_difference(row).map(|d| d.amount))
                .collect::<Vec<_>>(),
        ));
    }

    Ok(DataFrame::new(columns)?)
}

/// Write a comparison to `path`
pub fn export_comparison(
    report: &ComparisonReport,
    path: &Path,
    format: ExportFormat,
    config: &BomConfig,
) -> Result<()> {
    let mut df = comparison_frame(report)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;

    let written = match format {
        ExportFormat::Csv => CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df),
        ExportFormat::Parquet => ParquetWriter::new(&mut file)
            .with_compression(config.export_compression.to_polars_compression())
            .finish(&mut df)
            .map(|_| ()),
    };
    written.map_err(|e| BomError::Export {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    info!(
        "Exported {} comparison rows to {} ({:?})",
        df.height(),
        path.display(),
        format
    );
    Ok(())
}

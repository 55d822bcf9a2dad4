//! Command-line interface components.

use crate::export::ExportFormat;
use crate::report::ComparisonView;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bom")]
#[command(about = "Compute cost-per-year trees from bill-of-materials CSV files and compare products")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (default: <config dir>/bom_processor/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print results and warnings
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the cost tree of every product in the given uploads
    Tree {
        /// CSV files, directories or glob patterns, in upload order
        #[arg(required = true, value_name = "INPUT")]
        inputs: Vec<String>,

        /// Tree levels to expand below each product
        #[arg(short, long)]
        depth: Option<usize>,

        /// Keep upload order instead of sorting by cost
        #[arg(long)]
        input_order: bool,
    },

    /// Compare two or more uploads side by side
    Compare {
        /// CSV files, directories or glob patterns, in upload order
        #[arg(required = true, value_name = "INPUT")]
        inputs: Vec<String>,

        /// Comparison layout
        #[arg(long, value_enum, default_value_t = ComparisonView::Simple)]
        view: ComparisonView,

        /// Type label of the record totalled per upload (default: Product)
        #[arg(long, value_name = "TYPE")]
        product_type: Option<String>,

        /// Also write the complete comparison to this file
        #[arg(short, long, value_name = "FILE")]
        export: Option<PathBuf>,

        /// Export format (default: from the export file extension)
        #[arg(long, value_enum, requires = "export")]
        format: Option<ExportFormat>,

        /// Parquet compression algorithm (snappy, zstd, lz4, none)
        #[arg(long, requires = "export")]
        compression: Option<String>,
    },
}

impl Args {
    /// Log level implied by the verbosity flags
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}

/// Resolution of command-line inputs into upload paths
pub mod input_discovery {
    use crate::constants::UPLOAD_EXTENSION;
    use crate::error::BomError;
    use anyhow::{Context, Result};
    use std::path::{Path, PathBuf};
    use tracing::debug;

    /// Expand files, directories and glob patterns into upload paths
    ///
    /// Order follows the inputs; directory and glob matches are sorted so
    /// upload order is reproducible.
    pub fn resolve_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();

        for input in inputs {
            let path = Path::new(input);
            let found = if path.is_file() {
                vec![path.to_path_buf()]
            } else if path.is_dir() {
                discover_uploads(path)?
            } else {
                expand_pattern(input)?
            };

            debug!("Input '{}' resolved to {} uploads", input, found.len());
            paths.extend(found);
        }

        if paths.is_empty() {
            return Err(BomError::NoInputFiles {
                inputs: inputs.to_vec(),
            }
            .into());
        }

        Ok(paths)
    }

    /// Every CSV file below a directory
    pub fn discover_uploads(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in walkdir::WalkDir::new(dir) {
            let entry = entry.context("Failed to walk directory")?;
            if entry.file_type().is_file() && is_upload(entry.path()) {
                files.push(entry.into_path());
            }
        }

        files.sort();
        Ok(files)
    }

    fn expand_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in
            glob::glob(pattern).with_context(|| format!("Invalid input pattern: {pattern}"))?
        {
            let path = entry.context("Failed to read glob match")?;
            if path.is_file() {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    fn is_upload(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(UPLOAD_EXTENSION))
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compare_arguments() {
        let args = Args::parse_from([
            "bom",
            "compare",
            "old.csv",
            "new.csv",
            "--view",
            "complete",
            "--export",
            "out.parquet",
            "-v",
        ]);

        assert_eq!(args.log_level(), "debug");
        match args.command {
            Command::Compare {
                inputs,
                view,
                export,
                format,
                ..
            } => {
                assert_eq!(inputs, vec!["old.csv", "new.csv"]);
                assert_eq!(view, ComparisonView::Complete);
                assert_eq!(export, Some(PathBuf::from("out.parquet")));
                assert_eq!(format, None);
            }
            other => panic!("expected compare, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_tree_arguments() {
        let args = Args::parse_from(["bom", "tree", "boms/", "--depth", "2", "-q"]);

        assert_eq!(args.log_level(), "warn");
        assert!(matches!(
            args.command,
            Command::Tree {
                depth: Some(2),
                input_order: false,
                ..
            }
        ));
    }

    #[test]
    fn test_inputs_are_required() {
        assert!(Args::try_parse_from(["bom", "compare"]).is_err());
    }
}

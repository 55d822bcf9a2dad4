//! Command implementations for the `bom` binary.

use crate::cli::input_discovery::resolve_inputs;
use crate::cli::{Args, Command};
use crate::config::{BomConfig, CompressionAlgorithm};
use crate::export::{ExportFormat, export_comparison};
use crate::models::ComparisonReport;
use crate::processor::{UploadProcessor, print_load_notices, print_load_summary};
use crate::report::{ComparisonView, render_comparison, render_forest};
use crate::uploads::UploadSet;
use anyhow::{Context, Result, bail};
use colored::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Set up structured logging on stderr
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("bom_processor={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    debug!("Logging initialized at level: {}", log_level);
}

/// Run the parsed command
pub async fn run(args: Args) -> Result<()> {
    let mut config =
        BomConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if args.quiet {
        config = config.without_progress();
    }

    match args.command {
        Command::Tree {
            inputs,
            depth,
            input_order,
        } => {
            if let Some(depth) = depth {
                config = config.with_depth(depth);
            }
            if input_order {
                config = config.with_input_order();
            }
            run_tree(&inputs, &config, args.quiet).await
        }
        Command::Compare {
            inputs,
            view,
            product_type,
            export,
            format,
            compression,
        } => {
            if let Some(product_type) = product_type {
                config = config.with_product_type(product_type);
            }
            if let Some(compression) = compression {
                let compression: CompressionAlgorithm = compression.parse()?;
                config = config.with_export_compression(compression);
            }
            let export = export.map(|path| {
                let format = format.unwrap_or_else(|| ExportFormat::from_path(&path));
                (path, format)
            });
            run_compare(&inputs, view, export, &config, args.quiet).await
        }
    }
}

async fn load_uploads(inputs: &[String], config: &BomConfig, quiet: bool) -> Result<UploadSet> {
    let paths = resolve_inputs(inputs)?;
    let (uploads, stats) = UploadProcessor::new(config.clone())
        .load(&paths)
        .await
        .context("Failed to read uploads")?;

    print_load_notices(&stats);
    if !quiet {
        print_load_summary(&stats);
        println!();
    }

    if uploads.is_empty() {
        bail!("None of the {} uploads could be read", paths.len());
    }
    Ok(uploads)
}

async fn run_tree(inputs: &[String], config: &BomConfig, quiet: bool) -> Result<()> {
    let uploads = load_uploads(inputs, config, quiet).await?;
    let forest = uploads.forest();

    if !quiet {
        println!("{}", "Products".bright_green().bold());
    }
    print!("{}", render_forest(&forest, config));
    Ok(())
}

async fn run_compare(
    inputs: &[String],
    view: ComparisonView,
    export: Option<(PathBuf, ExportFormat)>,
    config: &BomConfig,
    quiet: bool,
) -> Result<()> {
    let uploads = load_uploads(inputs, config, quiet).await?;
    let report = uploads
        .compare(&config.product_type)
        .context("Cannot compare the loaded uploads")?;

    if !quiet {
        println!("{}", "Detailed Comparison".bright_green().bold());
    }
    print!("{}", render_comparison(&report, view, config));

    if let Some((path, format)) = export {
        write_export(&report, &path, format, config)?;
        if !quiet {
            println!(
                "\n  {} {}",
                "Exported to".bright_green(),
                path.display().to_string().bright_white()
            );
        }
    }
    Ok(())
}

fn write_export(
    report: &ComparisonReport,
    path: &Path,
    format: ExportFormat,
    config: &BomConfig,
) -> Result<()> {
    export_comparison(report, path, format, config)
        .with_context(|| format!("Failed to export comparison to {}", path.display()))
}

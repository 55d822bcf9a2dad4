//! Upload loading pipeline.
//!
//! Reads every discovered upload on the blocking pool with bounded
//! concurrency, keeps upload order, and collects the readable uploads
//! into an [`UploadSet`]. A malformed upload is reported and skipped;
//! earlier and later uploads stay usable.

use crate::config::BomConfig;
use crate::error::{BomError, Result};
use crate::models::{LoadStats, UploadedFile};
use crate::reader::read_upload;
use crate::uploads::UploadSet;

use colored::*;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::task;
use tracing::{debug, info, warn};

/// Loads bill-of-materials uploads into an [`UploadSet`]
pub struct UploadProcessor {
    config: BomConfig,
}

impl UploadProcessor {
    pub fn new(config: BomConfig) -> Self {
        Self { config }
    }

    /// Read every path, in order, appending each readable upload to `uploads`
    pub async fn load_into(
        &self,
        uploads: &UploadSet,
        paths: &[PathBuf],
    ) -> Result<(UploadSet, LoadStats)> {
        if paths.is_empty() {
            return Err(BomError::NoInputFiles { inputs: Vec::new() });
        }

        let start_time = Instant::now();
        let progress = self.progress_bar(paths.len());
        let concurrency = self.config.max_concurrent_files.max(1);

        debug!(
            "Reading {} uploads with concurrency {}",
            paths.len(),
            concurrency
        );

        let results: Vec<(PathBuf, Result<UploadedFile>)> = stream::iter(paths.iter().cloned())
            .map(|path| {
                let progress = progress.clone();
                async move {
                    let result = read_upload_blocking(&path).await;
                    progress.inc(1);
                    (path, result)
                }
            })
            .buffered(concurrency)
            .collect()
            .await;
        progress.finish_and_clear();

        let mut uploads = uploads.clone();
        let mut stats = LoadStats::default();

        for (path, result) in results {
            match result {
                Ok(file) => {
                    stats.files_loaded += 1;
                    stats.total_records += file.records.len();
                    uploads = uploads.with_upload(file);
                }
                Err(error) => {
                    warn!("Skipping upload {}: {}", path.display(), error);
                    stats.files_failed += 1;
                    stats.failures.push((path, error.to_string()));
                }
            }
        }

        stats.processing_time_ms = start_time.elapsed().as_millis();
        info!(
            "Loaded {} uploads ({} failed, {} records) in {}ms",
            stats.files_loaded, stats.files_failed, stats.total_records, stats.processing_time_ms
        );

        Ok((uploads, stats))
    }

    /// Read every path into a fresh [`UploadSet`]
    pub async fn load(&self, paths: &[PathBuf]) -> Result<(UploadSet, LoadStats)> {
        self.load_into(&UploadSet::new(), paths).await
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb.set_message("Reading uploads");
        pb
    }
}

async fn read_upload_blocking(path: &Path) -> Result<UploadedFile> {
    task::spawn_blocking({
        let path = path.to_path_buf();
        move || read_upload(&path)
    })
    .await
    .map_err(|e| BomError::InvalidFormat {
        path: path.to_path_buf(),
        reason: format!("Upload reader task failed: {}", e),
    })?
}

/// Print a notice for every skipped upload
pub fn print_load_notices(stats: &LoadStats) {
    for (path, reason) in &stats.failures {
        eprintln!(
            "{} {}: {}",
            "Skipped upload".bright_yellow().bold(),
            path.display(),
            reason
        );
    }
}

/// Print the loading summary
pub fn print_load_summary(stats: &LoadStats) {
    println!(
        "  {} {}",
        "Uploads loaded:".bright_cyan(),
        stats.files_loaded.to_string().bright_white()
    );
    if stats.files_failed > 0 {
        println!(
            "  {} {}",
            "Uploads failed:".bright_red(),
            stats.files_failed.to_string().bright_red().bold()
        );
    }
    println!(
        "  {} {}",
        "Total records:".bright_cyan(),
        stats.total_records.to_string().bright_white().bold()
    );
}

//! Error handling for bill-of-materials processing.
//!
//! Provides error types with context for upload reading, configuration
//! loading, comparison and export failures. Parsing anomalies inside a
//! well-formed upload are never errors; they are resolved by defaulting.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BomError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Upload not found at path: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Missing columns in upload {path}: {}", missing.join(", "))]
    MissingColumns { path: PathBuf, missing: Vec<String> },

    #[error("Invalid upload format in file: {path} - {reason}")]
    InvalidFormat { path: PathBuf, reason: String },

    #[error("No CSV uploads found for inputs: {}", inputs.join(", "))]
    NoInputFiles { inputs: Vec<String> },

    #[error("Comparison needs at least {required} uploads, found {found}")]
    InsufficientFiles { required: usize, found: usize },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Export failed for {path}: {reason}")]
    Export { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, BomError>;

//! Configuration management and validation.
//!
//! Provides the runtime configuration for loading uploads, rendering
//! cost views and exporting comparisons, with defaults, builder methods
//! and an optional TOML file.

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_CURRENCY_SYMBOL, DEFAULT_DECIMALS, PRODUCT_TYPE,
};
use crate::error::{BomError, Result};
use polars::prelude::ParquetCompression;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Supported compression algorithms for parquet exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionAlgorithm {
    /// Snappy compression - good balance of speed and compression
    Snappy,
    /// ZSTD compression - better compression ratio, slower
    Zstd,
    /// LZ4 compression - fastest, lower compression ratio
    Lz4,
    /// No compression
    Uncompressed,
}

impl CompressionAlgorithm {
    /// Convert to polars ParquetCompression type
    pub fn to_polars_compression(&self) -> ParquetCompression {
        match self {
            CompressionAlgorithm::Snappy => ParquetCompression::Snappy,
            CompressionAlgorithm::Zstd => ParquetCompression::Zstd(None),
            CompressionAlgorithm::Lz4 => ParquetCompression::Lz4Raw,
            CompressionAlgorithm::Uncompressed => ParquetCompression::Uncompressed,
        }
    }
}

impl std::str::FromStr for CompressionAlgorithm {
    type Err = BomError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "snappy" => Ok(Self::Snappy),
            "zstd" => Ok(Self::Zstd),
            "lz4" => Ok(Self::Lz4),
            "none" | "uncompressed" => Ok(Self::Uncompressed),
            other => Err(BomError::Configuration {
                message: format!("Unknown compression algorithm: {other}"),
            }),
        }
    }
}

/// Global configuration for BOM processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BomConfig {
    /// Maximum number of uploads read concurrently
    pub max_concurrent_files: usize,

    /// Type label of the record each upload is totalled from
    pub product_type: String,

    /// Currency symbol prefixed to displayed costs
    pub currency_symbol: String,

    /// Decimals shown for costs
    pub decimals: usize,

    /// Show children most expensive first (display only)
    pub sort_children_by_cost: bool,

    /// Show roots cheapest first (display only)
    pub sort_roots_by_cost: bool,

    /// Tree levels expanded below each root; `None` expands everything
    pub default_depth: Option<usize>,

    /// Compression for parquet exports
    pub export_compression: CompressionAlgorithm,

    /// Show a progress bar while reading uploads
    pub show_progress: bool,
}

impl Default for BomConfig {
    fn default() -> Self {
        Self {
            max_concurrent_files: num_cpus::get(),
            product_type: PRODUCT_TYPE.to_string(),
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            decimals: DEFAULT_DECIMALS,
            sort_children_by_cost: true,
            sort_roots_by_cost: true,
            default_depth: None,
            export_compression: CompressionAlgorithm::Snappy,
            show_progress: true,
        }
    }
}

impl BomConfig {
    /// Load configuration from an explicit file, else the user config
    /// directory, else defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = match explicit_path {
            Some(path) => {
                if !path.exists() {
                    return Err(BomError::Configuration {
                        message: format!("Config file not found: {}", path.display()),
                    });
                }
                Some(path.to_path_buf())
            }
            None => Self::default_path().filter(|path| path.exists()),
        };

        match path {
            Some(path) => Self::from_file(&path),
            None => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// `<config dir>/bom_processor/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Parse and validate a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents).map_err(|e| BomError::Configuration {
            message: format!("Invalid config file {}: {}", path.display(), e),
        })?;
        config.validate()?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_files == 0 {
            return Err(BomError::Configuration {
                message: "max_concurrent_files must be at least 1".to_string(),
            });
        }
        if self.product_type.trim().is_empty() {
            return Err(BomError::Configuration {
                message: "product_type must not be empty".to_string(),
            });
        }
        if self.decimals > 10 {
            return Err(BomError::Configuration {
                message: format!("decimals must be at most 10, got {}", self.decimals),
            });
        }
        Ok(())
    }

    /// Set maximum concurrent uploads read
    pub fn with_max_concurrent_files(mut self, max_files: usize) -> Self {
        self.max_concurrent_files = max_files;
        self
    }

    /// Set the type label that marks an upload's product record
    pub fn with_product_type(mut self, product_type: impl Into<String>) -> Self {
        self.product_type = product_type.into();
        self
    }

    /// Limit the expanded tree depth
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.default_depth = Some(depth);
        self
    }

    /// Keep children and roots in upload order
    pub fn with_input_order(mut self) -> Self {
        self.sort_children_by_cost = false;
        self.sort_roots_by_cost = false;
        self
    }

    /// Set parquet export compression
    pub fn with_export_compression(mut self, compression: CompressionAlgorithm) -> Self {
        self.export_compression = compression;
        self
    }

    /// Disable the loading progress bar
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Format a cost with the configured currency and decimals
    pub fn format_cost(&self, cost: f64) -> String {
        format!("{}{:.*}", self.currency_symbol, self.decimals, cost)
    }
}

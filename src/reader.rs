//! Upload reading and field parsing.
//!
//! Reads a bill-of-materials CSV with every column as text, checks the
//! header, strips embedded line breaks and turns each row into a
//! [`FlatRecord`]. Field anomalies are resolved by defaulting; only an
//! unreadable file or a missing column fails the upload.

use crate::constants::{PRICE_STRIP_CHARS, columns, missing_columns};
use crate::error::{BomError, Result};
use crate::models::{FlatRecord, UploadedFile};
use polars::prelude::*;
use regex::Regex;
use std::io::Cursor;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

static LEADING_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+").expect("valid integer pattern"));

static LEADING_FLOAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("valid float pattern")
});

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Read one upload from disk
pub fn read_upload(path: &Path) -> Result<UploadedFile> {
    if !path.exists() {
        return Err(BomError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = std::fs::read(path)?;
    let upload = parse_upload(bytes, path)?;

    debug!(
        "Read {} records from {} (label '{}')",
        upload.records.len(),
        path.display(),
        upload.label
    );

    Ok(upload.with_source(path))
}

/// Parse upload contents; `origin` names the upload in errors and labels
pub fn parse_upload(bytes: Vec<u8>, origin: &Path) -> Result<UploadedFile> {
    let bytes = if bytes.starts_with(UTF8_BOM) {
        bytes[UTF8_BOM.len()..].to_vec()
    } else {
        bytes
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(BomError::InvalidFormat {
            path: origin.to_path_buf(),
            reason: "upload is empty".to_string(),
        });
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .map_err(|e| BomError::InvalidFormat {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })?;

    let headers: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let missing = missing_columns(headers.iter().map(String::as_str));
    if !missing.is_empty() {
        return Err(BomError::MissingColumns {
            path: origin.to_path_buf(),
            missing,
        });
    }

    let extra: Vec<&String> = headers
        .iter()
        .filter(|name| !columns::REQUIRED.contains(&name.as_str()))
        .collect();
    if !extra.is_empty() {
        debug!("Ignoring extra columns in {}: {:?}", origin.display(), extra);
    }

    let records = records_from_frame(&df, origin)?;
    let label = upload_label(&records, origin);

    Ok(UploadedFile::new(label, records))
}

/// Text columns of an upload in canonical order
struct UploadColumns {
    name: StringChunked,
    item_type: StringChunked,
    quantity: StringChunked,
    price: StringChunked,
    failure_rate: StringChunked,
    description: StringChunked,
    parent: StringChunked,
}

impl UploadColumns {
    fn from_frame(df: &DataFrame) -> Result<Self> {
        Ok(Self {
            name: string_column(df, columns::NAME)?,
            item_type: string_column(df, columns::TYPE)?,
            quantity: string_column(df, columns::QUANTITY)?,
            price: string_column(df, columns::PRICE)?,
            failure_rate: string_column(df, columns::FAILURE_RATE)?,
            description: string_column(df, columns::DESCRIPTION)?,
            parent: string_column(df, columns::PARENT)?,
        })
    }

    fn row(&self, index: usize) -> [String; 7] {
        [
            &self.name,
            &self.item_type,
            &self.quantity,
            &self.price,
            &self.failure_rate,
            &self.description,
            &self.parent,
        ]
        .map(|column| clean_field(column.get(index).unwrap_or_default()))
    }
}

fn string_column(df: &DataFrame, name: &str) -> Result<StringChunked> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    Ok(series.str()?.clone())
}

fn records_from_frame(df: &DataFrame, origin: &Path) -> Result<Vec<FlatRecord>> {
    let columns = UploadColumns::from_frame(df)?;
    let mut records = Vec::with_capacity(df.height());

    for index in 0..df.height() {
        let row = columns.row(index);
        if row.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let [name, item_type, quantity, price, failure_rate, description, parent] = row;
        if name.is_empty() {
            warn!(
                "Skipping row {} without a name in {}",
                index + 1,
                origin.display()
            );
            continue;
        }

        records.push(FlatRecord {
            name,
            item_type,
            quantity: parse_quantity(&quantity),
            price: parse_price(&price),
            failure_rate: parse_failure_rate(&failure_rate),
            description: optional_text(description),
            parent_name: optional_text(parent),
        });
    }

    Ok(records)
}

/// Remove embedded line breaks from a field value
pub fn clean_field(value: &str) -> String {
    value.chars().filter(|c| *c != '\n' && *c != '\r').collect()
}

/// Leading integer of the field; anything else, or a negative count, is 0
pub fn parse_quantity(value: &str) -> u32 {
    LEADING_INTEGER
        .find(value.trim())
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .map(|quantity| quantity.clamp(0, u32::MAX as i64) as u32)
        .unwrap_or(0)
}

/// Unit price with currency symbols and thousands separators removed;
/// absent when nothing numeric remains
pub fn parse_price(value: &str) -> Option<f64> {
    let stripped: String = value
        .trim()
        .chars()
        .filter(|c| !PRICE_STRIP_CHARS.contains(c))
        .collect();
    leading_float(stripped.trim())
}

/// Annual failure rate; absent when nothing numeric is present, which
/// costs the same as a zero rate
pub fn parse_failure_rate(value: &str) -> Option<f64> {
    leading_float(value.trim())
}

fn leading_float(value: &str) -> Option<f64> {
    LEADING_FLOAT
        .find(value)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|number| number.is_finite() && *number >= 0.0)
}

fn optional_text(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

/// First record's description, else the file stem
fn upload_label(records: &[FlatRecord], origin: &Path) -> String {
    records
        .first()
        .and_then(|record| record.description.clone())
        .filter(|description| !description.trim().is_empty())
        .unwrap_or_else(|| {
            origin
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| origin.display().to_string())
        })
}

//! Application constants for the BOM processor
//!
//! Column labels of the upload format, the product type label, display
//! markers and default values used throughout the application.

// =============================================================================
// Upload Format
// =============================================================================

/// Column labels of an upload, case- and punctuation-sensitive
pub mod columns {
    pub const NAME: &str = "Name";
    pub const TYPE: &str = "Type";
    pub const QUANTITY: &str = "Quantity";
    pub const PRICE: &str = "Price ($)";
    pub const FAILURE_RATE: &str = "Failure rate (1/year)";
    pub const DESCRIPTION: &str = "Description";
    pub const PARENT: &str = "Parent";

    /// Every column an upload must carry, in canonical order
    pub const REQUIRED: &[&str] = &[
        NAME,
        TYPE,
        QUANTITY,
        PRICE,
        FAILURE_RATE,
        DESCRIPTION,
        PARENT,
    ];
}

/// File extension of uploads discovered inside directories
pub const UPLOAD_EXTENSION: &str = "csv";

/// Type label identifying the product record of an upload
pub const PRODUCT_TYPE: &str = "Product";

/// Characters removed from prices before parsing (currency and thousands separators)
pub const PRICE_STRIP_CHARS: &[char] = &['$', '€', '£', ','];

// =============================================================================
// Display
// =============================================================================

/// Placeholder shown where an upload has no matching record
pub const ABSENT_PLACEHOLDER: &str = "-";

/// Marker shown for a difference of exactly zero
pub const UNCHANGED_MARKER: &str = "=";

/// Marker for a node whose children are shown
pub const EXPANDED_MARKER: &str = "▼";

/// Marker for a node whose children are hidden
pub const COLLAPSED_MARKER: &str = "▶";

/// Indentation per tree level in the terminal view
pub const TREE_INDENT: usize = 2;

// =============================================================================
// Defaults
// =============================================================================

/// Number of decimals used for costs
pub const DEFAULT_DECIMALS: usize = 2;

/// Currency symbol prefixed to costs
pub const DEFAULT_CURRENCY_SYMBOL: &str = "$";

/// Name of the configuration file looked up in the user config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Directory name under the user config directory
pub const CONFIG_DIR_NAME: &str = "bom_processor";

/// Check whether a header row carries every required column
pub fn missing_columns<'a>(headers: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let present: Vec<&str> = headers.into_iter().collect();
    columns::REQUIRED
        .iter()
        .filter(|required| !present.contains(required))
        .map(|column| column.to_string())
        .collect()
}

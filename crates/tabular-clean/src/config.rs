//! Configuration types for ingestion, cleaning and serving.
//!
//! Cleaning options are tagged enums so every stage matches exhaustively.
//! Raw strings coming from a client are converted at the boundary through
//! [`CleaningRequest`], which rejects unknown values with
//! [`CleaningError::InvalidOption`].

use crate::error::CleaningError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Strategies
// ============================================================================

/// Strategy for filling missing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FillStrategy {
    /// Replace nulls in numeric columns with the column mean
    Mean,
    /// Replace nulls in numeric columns with the column median
    Median,
    /// Carry the last non-null value forward, in every column
    ForwardFill,
    /// Replace nulls in text columns with `""`
    EmptyString,
    /// Remove every row that contains a null
    Drop,
    /// Leave missing values alone
    #[default]
    None,
}

impl FillStrategy {
    /// All accepted strategies, in declaration order.
    pub const ALL: [FillStrategy; 6] = [
        Self::Mean,
        Self::Median,
        Self::ForwardFill,
        Self::EmptyString,
        Self::Drop,
        Self::None,
    ];

    /// Wire name of the strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Median => "median",
            Self::ForwardFill => "forward_fill",
            Self::EmptyString => "empty_string",
            Self::Drop => "drop",
            Self::None => "none",
        }
    }

    pub fn is_enabled(&self) -> bool {
        *self != Self::None
    }
}

impl fmt::Display for FillStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FillStrategy {
    type Err = CleaningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| CleaningError::invalid_option("fill_missing", s))
    }
}

/// Method used to rescale numeric columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScalingMethod {
    /// `(x - mean) / stdev` using the sample standard deviation
    Zscore,
    /// `(x - min) / (max - min)`
    Minmax,
    /// Leave numeric columns alone
    #[default]
    None,
}

impl ScalingMethod {
    pub const ALL: [ScalingMethod; 3] = [Self::Zscore, Self::Minmax, Self::None];

    /// Wire name of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zscore => "zscore",
            Self::Minmax => "minmax",
            Self::None => "none",
        }
    }

    pub fn is_enabled(&self) -> bool {
        *self != Self::None
    }
}

impl fmt::Display for ScalingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScalingMethod {
    type Err = CleaningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| CleaningError::invalid_option("standardize_data", s))
    }
}

// ============================================================================
// Cleaning options
// ============================================================================

/// Options controlling which cleaning stages run.
///
/// Every field defaults to "disabled", so `CleaningOptions::default()` leaves
/// a table untouched.
///
/// # Example
///
/// ```rust,ignore
/// use tabular_clean::config::{CleaningOptions, FillStrategy, ScalingMethod};
///
/// let options = CleaningOptions::builder()
///     .drop_column("internal_id")
///     .fill_missing(FillStrategy::Median)
///     .standardize_data(ScalingMethod::Minmax)
///     .remove_duplicates(true)
///     .build();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningOptions {
    /// Columns removed in the first stage. Unknown names are ignored.
    pub columns_to_drop: BTreeSet<String>,

    /// How missing values are filled.
    pub fill_missing: FillStrategy,

    /// Trim and collapse whitespace in text columns.
    pub clean_strings: bool,

    /// How numeric columns are rescaled.
    pub standardize_data: ScalingMethod,

    /// Keep only the first occurrence of each distinct row.
    pub remove_duplicates: bool,

    /// Remove rows with an IQR outlier in any numeric column.
    pub remove_outliers: bool,
}

impl CleaningOptions {
    /// Create a new options builder.
    pub fn builder() -> CleaningOptionsBuilder {
        CleaningOptionsBuilder::default()
    }

    /// True when no stage is enabled.
    pub fn is_noop(&self) -> bool {
        self.columns_to_drop.is_empty()
            && !self.fill_missing.is_enabled()
            && !self.clean_strings
            && !self.standardize_data.is_enabled()
            && !self.remove_duplicates
            && !self.remove_outliers
    }
}

/// Builder for [`CleaningOptions`] with fluent API.
#[derive(Debug, Default)]
pub struct CleaningOptionsBuilder {
    columns_to_drop: BTreeSet<String>,
    fill_missing: Option<FillStrategy>,
    clean_strings: Option<bool>,
    standardize_data: Option<ScalingMethod>,
    remove_duplicates: Option<bool>,
    remove_outliers: Option<bool>,
}

impl CleaningOptionsBuilder {
    /// Add a single column to drop.
    pub fn drop_column(mut self, name: impl Into<String>) -> Self {
        self.columns_to_drop.insert(name.into());
        self
    }

    /// Add several columns to drop.
    pub fn drop_columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns_to_drop.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn fill_missing(mut self, strategy: FillStrategy) -> Self {
        self.fill_missing = Some(strategy);
        self
    }

    pub fn clean_strings(mut self, enable: bool) -> Self {
        self.clean_strings = Some(enable);
        self
    }

    pub fn standardize_data(mut self, method: ScalingMethod) -> Self {
        self.standardize_data = Some(method);
        self
    }

    pub fn remove_duplicates(mut self, enable: bool) -> Self {
        self.remove_duplicates = Some(enable);
        self
    }

    pub fn remove_outliers(mut self, enable: bool) -> Self {
        self.remove_outliers = Some(enable);
        self
    }

    /// Build the options. Every combination is valid.
    pub fn build(self) -> CleaningOptions {
        CleaningOptions {
            columns_to_drop: self.columns_to_drop,
            fill_missing: self.fill_missing.unwrap_or_default(),
            clean_strings: self.clean_strings.unwrap_or(false),
            standardize_data: self.standardize_data.unwrap_or_default(),
            remove_duplicates: self.remove_duplicates.unwrap_or(false),
            remove_outliers: self.remove_outliers.unwrap_or(false),
        }
    }
}

/// A clean request as it arrives from a client, strategies still as strings.
///
/// `None` and the empty string both mean "disabled".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningRequest {
    pub columns_to_drop: Vec<String>,
    pub fill_missing: Option<String>,
    pub clean_strings: bool,
    pub standardize_data: Option<String>,
    pub remove_duplicates: bool,
    pub remove_outliers: bool,
}

impl CleaningRequest {
    /// Parse a request body. Missing fields take their defaults.
    pub fn from_json(body: &str) -> Result<Self, CleaningError> {
        Ok(serde_json::from_str(body)?)
    }
}

impl TryFrom<CleaningRequest> for CleaningOptions {
    type Error = CleaningError;

    fn try_from(request: CleaningRequest) -> Result<Self, Self::Error> {
        let fill_missing = match request.fill_missing.as_deref() {
            None | Some("") => FillStrategy::None,
            Some(raw) => raw.parse()?,
        };
        let standardize_data = match request.standardize_data.as_deref() {
            None | Some("") => ScalingMethod::None,
            Some(raw) => raw.parse()?,
        };

        Ok(CleaningOptions {
            columns_to_drop: request.columns_to_drop.into_iter().collect(),
            fill_missing,
            clean_strings: request.clean_strings,
            standardize_data,
            remove_duplicates: request.remove_duplicates,
            remove_outliers: request.remove_outliers,
        })
    }
}

// ============================================================================
// Ingestion
// ============================================================================

/// Tokens treated as missing when raw text is shaped into a table.
pub const DEFAULT_NULL_MARKERS: [&str; 12] = [
    "", "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None", "#N/A", "<NA>", "-nan",
];

/// Settings for turning raw text columns into a typed table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Raw tokens that mean "missing". Matched exactly, before trimming.
    pub null_markers: BTreeSet<String>,

    /// Whether columns made only of `true`/`false` become boolean columns.
    /// Default: true
    pub detect_booleans: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            null_markers: DEFAULT_NULL_MARKERS.iter().map(|s| s.to_string()).collect(),
            detect_booleans: true,
        }
    }
}

impl IngestConfig {
    /// Whether `token` is one of the configured null markers.
    pub fn is_null_marker(&self, token: &str) -> bool {
        self.null_markers.contains(token)
    }

    /// Replace the null marker set.
    pub fn with_null_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.null_markers = markers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_detect_booleans(mut self, detect: bool) -> Self {
        self.detect_booleans = detect;
        self
    }
}

// ============================================================================
// Serving
// ============================================================================

/// Settings for the dataset service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Rows returned by a preview when the caller does not ask for a count.
    /// Default: 5
    pub default_preview_rows: usize,

    /// Tables with more rows than this are previewed from a random sample.
    /// Default: 10000
    pub sample_threshold: usize,

    /// Seed for preview sampling, so previews are reproducible.
    /// Default: 42
    pub sample_seed: u64,

    /// How text columns are recognised during ingestion.
    pub ingest: IngestConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_preview_rows: 5,
            sample_threshold: 10_000,
            sample_seed: 42,
            ingest: IngestConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.default_preview_rows == 0 {
            return Err(ConfigValidationError::InvalidPreviewRows(
                self.default_preview_rows,
            ));
        }

        if self.sample_threshold == 0 {
            return Err(ConfigValidationError::InvalidSampleThreshold(
                self.sample_threshold,
            ));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid default preview rows: {0} (must be at least 1)")]
    InvalidPreviewRows(usize),

    #[error("Invalid sample threshold: {0} (must be at least 1)")]
    InvalidSampleThreshold(usize),
}

impl From<ConfigValidationError> for CleaningError {
    fn from(err: ConfigValidationError) -> Self {
        CleaningError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`ServiceConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct ServiceConfigBuilder {
    default_preview_rows: Option<usize>,
    sample_threshold: Option<usize>,
    sample_seed: Option<u64>,
    ingest: Option<IngestConfig>,
}

impl ServiceConfigBuilder {
    pub fn default_preview_rows(mut self, rows: usize) -> Self {
        self.default_preview_rows = Some(rows);
        self
    }

    /// Row count above which previews are sampled instead of taken from the head.
    pub fn sample_threshold(mut self, rows: usize) -> Self {
        self.sample_threshold = Some(rows);
        self
    }

    pub fn sample_seed(mut self, seed: u64) -> Self {
        self.sample_seed = Some(seed);
        self
    }

    pub fn ingest(mut self, ingest: IngestConfig) -> Self {
        self.ingest = Some(ingest);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `ServiceConfig` or an error if validation fails.
    pub fn build(self) -> Result<ServiceConfig, ConfigValidationError> {
        let config = ServiceConfig {
            default_preview_rows: self.default_preview_rows.unwrap_or(5),
            sample_threshold: self.sample_threshold.unwrap_or(10_000),
            sample_seed: self.sample_seed.unwrap_or(42),
            ingest: self.ingest.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}

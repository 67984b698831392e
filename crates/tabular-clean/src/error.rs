//! Error types for dataset analysis and cleaning.
//!
//! Errors are serializable so a serving layer can forward them to a client
//! as `{ "code": ..., "message": ... }` without extra mapping.
//!
//! An empty result (a table with zero rows or zero columns) is never an
//! error: every report is still well-formed in that case.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the cleaning library.
#[derive(Error, Debug)]
pub enum CleaningError {
    /// No dataset is registered under the given id.
    #[error("Dataset '{0}' not found")]
    NotFound(String),

    /// A cleaning option carried a value outside its allowed set.
    #[error("Invalid value '{value}' for option '{option}'")]
    InvalidOption { option: String, value: String },

    /// Raw input could not be shaped into a table.
    #[error("Invalid table: {0}")]
    InvalidTable(String),

    /// A dataset with the given id is already registered.
    #[error("Dataset '{0}' already exists")]
    AlreadyExists(String),

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Another error wrapped with a description of what was being done.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CleaningError>,
    },
}

impl CleaningError {
    /// Wrap the error with a description of the failed operation.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CleaningError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Shorthand for [`CleaningError::InvalidOption`].
    pub fn invalid_option(option: impl Into<String>, value: impl Into<String>) -> Self {
        CleaningError::InvalidOption {
            option: option.into(),
            value: value.into(),
        }
    }

    /// Stable error code for client-side handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::InvalidOption { .. } => "INVALID_OPTION",
            Self::InvalidTable(_) => "INVALID_TABLE",
            Self::AlreadyExists(_) => "ALREADY_EXISTS",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether the caller can fix the problem by changing its request.
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::NotFound(_)
            | Self::InvalidOption { .. }
            | Self::InvalidTable(_)
            | Self::AlreadyExists(_)
            | Self::InvalidConfig(_) => true,
            Self::WithContext { source, .. } => source.is_client_error(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for CleaningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CleaningError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for cleaning operations.
pub type Result<T> = std::result::Result<T, CleaningError>;

/// Adds operation context to fallible results.
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CleaningError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(CleaningError::NotFound("abc".to_string()).error_code(), "NOT_FOUND");
        assert_eq!(
            CleaningError::invalid_option("fill_missing", "average").error_code(),
            "INVALID_OPTION"
        );
        assert_eq!(
            CleaningError::AlreadyExists("abc".to_string()).error_code(),
            "ALREADY_EXISTS"
        );
    }

    #[test]
    fn test_is_client_error() {
        assert!(CleaningError::NotFound("abc".to_string()).is_client_error());
        assert!(CleaningError::invalid_option("x", "y").is_client_error());
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        assert!(!CleaningError::from(io).is_client_error());
    }

    #[test]
    fn test_error_serialization() {
        let error = CleaningError::invalid_option("standardize_data", "robust");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("INVALID_OPTION"));
        assert!(json.contains("robust"));
        assert!(json.contains("standardize_data"));
    }

    #[test]
    fn test_with_context() {
        let error = CleaningError::NotFound("abc".to_string()).with_context("While cleaning");
        assert!(error.to_string().contains("While cleaning"));
        assert_eq!(error.error_code(), "NOT_FOUND");
        assert!(error.is_client_error());
    }
}

//! Data quality analysis module.
//!
//! Computes basic statistics, missing-value and duplicate reports, the
//! composite quality score and the numeric correlation matrix.

mod analyzer;

pub use analyzer::DataQualityAnalyzer;

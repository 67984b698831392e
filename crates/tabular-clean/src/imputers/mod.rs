//! Imputation module for handling missing values.
//!
//! Provides the mean, median, forward-fill, empty-string and drop strategies.

mod statistical;

pub use statistical::{StatisticalImputer, fill_numeric_nulls, fill_string_nulls};

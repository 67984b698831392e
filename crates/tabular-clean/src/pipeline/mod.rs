//! Pipeline module.
//!
//! The ordered six-stage cleaning pipeline and its components.

mod builder;
mod executor;
pub mod outliers;
pub mod progress;
pub mod scaling;

pub use builder::{CleaningPipeline, CleaningPipelineBuilder};
pub use executor::{CleanOutcome, CleaningExecutor};
pub use outliers::{IqrBounds, OutlierHandler};
pub use progress::{ClosureProgressReporter, CleaningStage, ProgressReporter, ProgressUpdate};
pub use scaling::NumericScaler;

use crate::config::CleaningOptions;
use crate::error::Result;
use crate::table::Table;

/// Clean a table with the given options, without progress reporting.
pub fn clean(table: &Table, options: &CleaningOptions) -> Result<CleanOutcome> {
    CleaningExecutor::execute(table, options, |_| {})
}

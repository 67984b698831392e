//! Cleaning executor module.
//!
//! Runs the six cleaning stages in their fixed order. Each stage checks its
//! own precondition and either transforms the whole table or leaves it
//! unchanged; only stages that ran append to the operations log.

use crate::cleaner::{DataCleaner, clean_string_columns};
use crate::config::CleaningOptions;
use crate::error::Result;
use crate::imputers::StatisticalImputer;
use crate::pipeline::outliers::OutlierHandler;
use crate::pipeline::progress::{CleaningStage, ProgressUpdate};
use crate::pipeline::scaling::NumericScaler;
use crate::table::Table;
use tracing::{debug, info};

/// Output of a cleaning run.
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    pub table: Table,
    /// One entry per stage that ran, in execution order.
    pub operations: Vec<String>,
}

/// Executes the cleaning stages on a table.
pub struct CleaningExecutor;

impl CleaningExecutor {
    /// Run every enabled stage in order.
    ///
    /// `on_stage` is called as each enabled stage starts.
    pub fn execute<F>(table: &Table, options: &CleaningOptions, mut on_stage: F) -> Result<CleanOutcome>
    where
        F: FnMut(ProgressUpdate),
    {
        let mut operations = Vec::new();
        let mut table = table.clone();

        info!(
            "Cleaning {}x{} table",
            table.row_count(),
            table.column_count()
        );

        for stage in CleaningStage::ORDER {
            if !Self::is_enabled(stage, options) {
                continue;
            }
            on_stage(ProgressUpdate::started(stage));
            let logged_before = operations.len();

            table = match stage {
                CleaningStage::DropColumns => {
                    info!("Stage 1/6: Dropping columns...");
                    DataCleaner::drop_columns(table, &options.columns_to_drop, &mut operations)?
                }
                CleaningStage::FillMissing => {
                    info!("Stage 2/6: Filling missing values ({})...", options.fill_missing);
                    StatisticalImputer::fill_missing(table, options.fill_missing, &mut operations)?
                }
                CleaningStage::CleanStrings => {
                    info!("Stage 3/6: Cleaning string values...");
                    clean_string_columns(table, &mut operations)?
                }
                CleaningStage::Standardize => {
                    info!("Stage 4/6: Standardizing numeric data ({})...", options.standardize_data);
                    NumericScaler::standardize(table, options.standardize_data, &mut operations)?
                }
                CleaningStage::RemoveDuplicates => {
                    info!("Stage 5/6: Removing duplicate rows...");
                    DataCleaner::remove_duplicates(table, &mut operations)?
                }
                CleaningStage::RemoveOutliers => {
                    info!("Stage 6/6: Removing outliers...");
                    OutlierHandler::remove_outliers(table, &mut operations)?
                }
                CleaningStage::Complete => table,
            };

            if operations.len() == logged_before {
                debug!("{} skipped: precondition not met", stage.display_name());
            }
        }

        info!(
            "Cleaning completed: {} operation(s), {}x{} table",
            operations.len(),
            table.row_count(),
            table.column_count()
        );

        Ok(CleanOutcome { table, operations })
    }

    /// Whether the options request a stage at all.
    fn is_enabled(stage: CleaningStage, options: &CleaningOptions) -> bool {
        match stage {
            CleaningStage::DropColumns => !options.columns_to_drop.is_empty(),
            CleaningStage::FillMissing => options.fill_missing.is_enabled(),
            CleaningStage::CleanStrings => options.clean_strings,
            CleaningStage::Standardize => options.standardize_data.is_enabled(),
            CleaningStage::RemoveDuplicates => options.remove_duplicates,
            CleaningStage::RemoveOutliers => options.remove_outliers,
            CleaningStage::Complete => false,
        }
    }
}

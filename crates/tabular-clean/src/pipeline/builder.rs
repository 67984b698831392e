//! Cleaning pipeline and its builder.

use crate::config::CleaningOptions;
use crate::error::Result;
use crate::pipeline::executor::{CleanOutcome, CleaningExecutor};
use crate::pipeline::progress::{ClosureProgressReporter, ProgressReporter, ProgressUpdate};
use crate::table::Table;
use std::sync::Arc;
use tracing::error;

/// A configured cleaning pipeline.
///
/// # Example
///
/// ```rust,ignore
/// use tabular_clean::{CleaningOptions, CleaningPipeline, FillStrategy};
///
/// let outcome = CleaningPipeline::builder()
///     .options(
///         CleaningOptions::builder()
///             .fill_missing(FillStrategy::Mean)
///             .remove_duplicates(true)
///             .build(),
///     )
///     .on_progress(|update| println!("{}", update.message))
///     .build()
///     .run(&table)?;
///
/// for op in &outcome.operations {
///     println!("{op}");
/// }
/// ```
pub struct CleaningPipeline {
    options: CleaningOptions,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(CleaningPipeline: Send, Sync);

impl CleaningPipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> CleaningPipelineBuilder {
        CleaningPipelineBuilder::default()
    }

    /// A pipeline with the given options and no progress reporting.
    pub fn new(options: CleaningOptions) -> Self {
        Self {
            options,
            progress_reporter: None,
        }
    }

    pub fn options(&self) -> &CleaningOptions {
        &self.options
    }

    /// Clean a table. The input is never modified.
    pub fn run(&self, table: &Table) -> Result<CleanOutcome> {
        match CleaningExecutor::execute(table, &self.options, |update| self.report_progress(update)) {
            Ok(outcome) => {
                self.report_progress(ProgressUpdate::complete(format!(
                    "Cleaning completed with {} operation(s)",
                    outcome.operations.len()
                )));
                Ok(outcome)
            }
            Err(e) => {
                error!("Cleaning pipeline error: {}", e);
                Err(e)
            }
        }
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }
}

/// Builder for [`CleaningPipeline`].
#[derive(Default)]
pub struct CleaningPipelineBuilder {
    options: Option<CleaningOptions>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

impl CleaningPipelineBuilder {
    /// Set the cleaning options. Defaults to every stage disabled.
    pub fn options(mut self, options: CleaningOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Set a progress reporter.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Report progress through a closure.
    pub fn on_progress<F>(self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter(Arc::new(ClosureProgressReporter::new(callback)))
    }

    pub fn build(self) -> CleaningPipeline {
        CleaningPipeline {
            options: self.options.unwrap_or_default(),
            progress_reporter: self.progress_reporter,
        }
    }
}

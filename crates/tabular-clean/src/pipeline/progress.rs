//! Progress reporting for the cleaning pipeline.
//!
//! # Example
//!
//! ```rust,ignore
//! use tabular_clean::CleaningPipeline;
//!
//! let outcome = CleaningPipeline::builder()
//!     .options(options)
//!     .on_progress(|u| eprintln!("{:>3.0}% {}", u.progress * 100.0, u.stage.display_name()))
//!     .build()
//!     .run(&table)?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the cleaning pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningStage {
    /// Removing user-selected columns
    DropColumns,
    /// Filling or dropping missing values
    FillMissing,
    /// Trimming and collapsing whitespace in text columns
    CleanStrings,
    /// Rescaling numeric columns
    Standardize,
    /// Removing repeated rows
    RemoveDuplicates,
    /// Removing rows with IQR outliers
    RemoveOutliers,
    /// Pipeline completed
    Complete,
}

impl CleaningStage {
    /// The six working stages, in the order they run.
    pub const ORDER: [CleaningStage; 6] = [
        Self::DropColumns,
        Self::FillMissing,
        Self::CleanStrings,
        Self::Standardize,
        Self::RemoveDuplicates,
        Self::RemoveOutliers,
    ];

    /// Label shown to users.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::DropColumns => "Dropping Columns",
            Self::FillMissing => "Filling Missing Values",
            Self::CleanStrings => "Cleaning Strings",
            Self::Standardize => "Standardizing Numbers",
            Self::RemoveDuplicates => "Removing Duplicates",
            Self::RemoveOutliers => "Removing Outliers",
            Self::Complete => "Complete",
        }
    }

    /// Overall progress (0.0 - 1.0) at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match Self::ORDER.iter().position(|s| s == self) {
            Some(idx) => idx as f32 / Self::ORDER.len() as f32,
            None => 1.0,
        }
    }
}

/// A progress notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Stage that just started, or `Complete`
    pub stage: CleaningStage,

    /// Fraction of working stages already passed, in `[0, 1]`
    pub progress: f32,

    pub message: String,
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);

impl ProgressUpdate {
    /// Update sent when a stage starts.
    pub fn started(stage: CleaningStage) -> Self {
        Self {
            stage,
            progress: stage.base_progress().clamp(0.0, 1.0),
            message: stage.display_name().to_string(),
        }
    }

    /// Update sent once all stages have run.
    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: CleaningStage::Complete,
            progress: 1.0,
            message: message.into(),
        }
    }
}

/// Receives progress updates while a pipeline runs.
///
/// Implementations must be `Send + Sync` so a pipeline can run on a worker
/// thread while reporting to another.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// A [`ProgressReporter`] backed by a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

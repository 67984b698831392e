//! Tabular Dataset Cleaning Library
//!
//! Analysis and cleaning of in-memory tabular datasets, built on Polars.
//!
//! # Overview
//!
//! This library provides:
//!
//! - **Type Inference**: Raw text columns become numeric, boolean or text columns
//! - **Analysis**: Basic statistics, per-column statistics, missing values,
//!   duplicates, a composite quality score and a correlation matrix
//! - **Cleaning**: A fixed six-stage pipeline (drop columns, fill missing,
//!   clean strings, standardize, remove duplicates, remove outliers)
//! - **Registry**: Id-addressed storage with lineage-aware ids for cleaned outputs
//! - **Progress Reporting**: Per-stage updates through a reporter or closure
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tabular_clean::{CleaningOptions, DatasetService, FillStrategy, IngestConfig, io};
//!
//! let service = DatasetService::default();
//! let table = io::read_csv_path("sales.csv", &IngestConfig::default())?;
//! let upload = service.register_table("sales.csv", table)?;
//!
//! let report = service.analyze(&upload.file_id)?;
//! println!("Quality: {}", report.quality_score.overall_score);
//!
//! let options = CleaningOptions::builder()
//!     .fill_missing(FillStrategy::Median)
//!     .clean_strings(true)
//!     .remove_duplicates(true)
//!     .build();
//!
//! let result = service.clean(&upload.file_id, &options)?;
//! for op in &result.operations {
//!     println!("{op}");
//! }
//! let csv = service.download(&result.cleaned_file_id)?.csv;
//! ```
//!
//! # Pipeline Stages
//!
//! Stages always run in the same order regardless of how options were given.
//! A stage whose precondition does not hold (for example standardization on
//! a table without numeric columns) leaves the table unchanged and adds
//! nothing to the operations log:
//!
//! ```text
//! drop columns → fill missing → clean strings → standardize → dedup → outliers
//! ```
//!
//! Use [`CleaningPipeline`] directly to clean a [`Table`] without a registry:
//!
//! ```rust,ignore
//! use tabular_clean::{CleaningOptions, CleaningPipeline, ScalingMethod};
//!
//! let outcome = CleaningPipeline::builder()
//!     .options(CleaningOptions::builder().standardize_data(ScalingMethod::Minmax).build())
//!     .on_progress(|update| println!("[{:.0}%] {}", update.progress * 100.0, update.message))
//!     .build()
//!     .run(&table)?;
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod io;
pub mod pipeline;
pub mod profiler;
pub mod quality;
pub mod registry;
pub mod service;
pub mod table;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::DataCleaner;
pub use config::{
    CleaningOptions, CleaningOptionsBuilder, CleaningRequest, ConfigValidationError, FillStrategy,
    IngestConfig, ScalingMethod, ServiceConfig, ServiceConfigBuilder,
};
pub use error::{CleaningError, ResultExt};
pub use imputers::StatisticalImputer;
pub use pipeline::{
    CleanOutcome, CleaningExecutor, CleaningPipeline, CleaningPipelineBuilder, CleaningStage,
    ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
pub use profiler::{DataProfiler, RawColumn, RawTable, TypeInferrer};
pub use quality::DataQualityAnalyzer;
pub use registry::{DatasetInfo, DatasetRegistry};
pub use service::DatasetService;
pub use table::{Cell, ColumnKind, Table};
pub use types::{
    AnalysisReport, BasicStats, CleaningResult, ColumnMissing, ColumnStats, CorrelationMatrix,
    CsvExport, DuplicateReport, MissingValueReport, NumericSummary, Preview, QualityIssues,
    QualityScore, UploadResponse,
};

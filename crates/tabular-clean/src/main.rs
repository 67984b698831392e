//! CLI entry point for analyzing and cleaning CSV datasets.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabular_clean::{
    AnalysisReport, CleaningOptions, CleaningResult, CorrelationMatrix, DatasetService,
    FillStrategy, Preview, ScalingMethod, ServiceConfig, io,
};
use tracing::{error, info};

/// CLI-compatible fill strategy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFillStrategy {
    /// Replace numeric nulls with the column mean
    Mean,
    /// Replace numeric nulls with the column median
    Median,
    /// Carry the last present value forward
    ForwardFill,
    /// Replace text nulls with the empty string
    EmptyString,
    /// Drop every row containing a null
    Drop,
}

impl From<CliFillStrategy> for FillStrategy {
    fn from(cli: CliFillStrategy) -> Self {
        match cli {
            CliFillStrategy::Mean => FillStrategy::Mean,
            CliFillStrategy::Median => FillStrategy::Median,
            CliFillStrategy::ForwardFill => FillStrategy::ForwardFill,
            CliFillStrategy::EmptyString => FillStrategy::EmptyString,
            CliFillStrategy::Drop => FillStrategy::Drop,
        }
    }
}

/// CLI-compatible scaling method enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliScalingMethod {
    /// (x - mean) / sample standard deviation
    Zscore,
    /// (x - min) / (max - min)
    Minmax,
}

impl From<CliScalingMethod> for ScalingMethod {
    fn from(cli: CliScalingMethod) -> Self {
        match cli {
            CliScalingMethod::Zscore => ScalingMethod::Zscore,
            CliScalingMethod::Minmax => ScalingMethod::Minmax,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Analyze and clean tabular CSV datasets",
    long_about = "Profile CSV datasets and run them through a fixed cleaning pipeline.\n\n\
                  EXAMPLES:\n  \
                  # Data quality report\n  \
                  tabular-clean analyze -i data.csv\n\n  \
                  # Fill gaps with the median and drop duplicates\n  \
                  tabular-clean clean -i data.csv --fill median --remove-duplicates -o cleaned.csv\n\n  \
                  # Machine-readable output\n  \
                  tabular-clean --json correlate -i data.csv | jq .columns"
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    /// Output JSON to stdout instead of a human-readable summary
    ///
    /// Disables all logs so stdout only carries the JSON document.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the data quality report
    Analyze {
        /// Path to the CSV file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Show the first rows (or a sample of large files)
    Preview {
        /// Path to the CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Number of rows to show
        #[arg(short, long)]
        rows: Option<usize>,
    },

    /// Run the cleaning pipeline
    Clean {
        /// Path to the CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Column to drop (repeatable)
        #[arg(long = "drop", value_name = "COLUMN")]
        drop: Vec<String>,

        /// Strategy for missing values
        #[arg(long, value_enum)]
        fill: Option<CliFillStrategy>,

        /// Trim and collapse whitespace in text columns
        #[arg(long)]
        clean_strings: bool,

        /// Rescale numeric columns
        #[arg(long, value_enum)]
        standardize: Option<CliScalingMethod>,

        /// Keep only the first occurrence of each row
        #[arg(long)]
        remove_duplicates: bool,

        /// Remove rows with an IQR outlier in any numeric column
        #[arg(long)]
        remove_outliers: bool,

        /// Write the cleaned dataset to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the Pearson correlation matrix of numeric columns
    Correlate {
        /// Path to the CSV file
        #[arg(short, long)]
        input: PathBuf,
    },
}

/// Initialize the tracing subscriber for logging.
///
/// Logging stays off under `--json` so stdout carries only the document.
fn init_logging(level: &str, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.json);

    let service = DatasetService::new(ServiceConfig::default())?;

    match &args.command {
        Command::Analyze { input } => {
            let file_id = load(&service, input)?;
            let report = service.analyze(&file_id)?;
            emit(&report, args.json, print_analysis)
        }
        Command::Preview { input, rows } => {
            let file_id = load(&service, input)?;
            let preview = service.preview(&file_id, *rows)?;
            emit(&preview, args.json, print_preview)
        }
        Command::Clean {
            input,
            drop,
            fill,
            clean_strings,
            standardize,
            remove_duplicates,
            remove_outliers,
            output,
        } => {
            let file_id = load(&service, input)?;
            let mut options = CleaningOptions::builder()
                .drop_columns(drop.iter().cloned())
                .clean_strings(*clean_strings)
                .remove_duplicates(*remove_duplicates)
                .remove_outliers(*remove_outliers);
            if let Some(fill) = fill {
                options = options.fill_missing((*fill).into());
            }
            if let Some(method) = standardize {
                options = options.standardize_data((*method).into());
            }

            let result = service.clean(&file_id, &options.build()).map_err(|e| {
                error!("Cleaning failed: {}", e);
                anyhow!("Cleaning failed: {}", e)
            })?;

            if let Some(path) = output {
                let export = service.download(&result.cleaned_file_id)?;
                std::fs::write(path, export.csv)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!("Cleaned dataset written to: {}", path.display());
            }
            emit(&result, args.json, print_cleaning)
        }
        Command::Correlate { input } => {
            let file_id = load(&service, input)?;
            let matrix = service.correlation(&file_id)?;
            emit(&matrix, args.json, print_correlation)
        }
    }
}

/// Read a CSV file and register it with the service.
fn load(service: &DatasetService, input: &Path) -> Result<String> {
    if !input.exists() {
        return Err(anyhow!("Input file not found: {}", input.display()));
    }

    info!("Loading dataset from: {}", input.display());
    let table = io::read_csv_path(input, &service.config().ingest)?;
    let file_name = input
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let upload = service.register_table(file_name, table)?;
    info!(
        "Dataset loaded: {} rows x {} columns",
        upload.stats.rows, upload.stats.columns
    );
    Ok(upload.file_id)
}

/// Print either JSON or the human-readable rendering.
fn emit<T: Serialize>(value: &T, json: bool, human: fn(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        human(value);
    }
    Ok(())
}

// Human-readable output below uses `println!` on purpose: it is the
// command's result, not a log line.

fn print_analysis(report: &AnalysisReport) {
    let stats = &report.basic_stats;
    println!();
    println!("{}", "=".repeat(80));
    println!("DATA QUALITY REPORT");
    println!("{}", "=".repeat(80));
    println!(
        "Shape: {} rows x {} columns ({:.3} MB)",
        stats.rows, stats.columns, stats.memory_usage_mb
    );
    println!();

    println!(
        "{:<20} {:<10} {:<10} {:<10} {:<12}",
        "Column", "Type", "Non-null", "Missing", "Unique"
    );
    println!("{}", "-".repeat(66));
    for col in &report.column_stats {
        println!(
            "{:<20} {:<10} {:<10} {:<10} {:<12}",
            truncate_str(&col.name, 19),
            col.kind,
            col.non_null_count,
            col.null_count,
            col.unique_values
        );
    }
    println!();

    let missing = &report.missing_values;
    println!(
        "Missing values: {} of {} cells",
        missing.total_missing, missing.total_cells
    );
    for col in missing.affected_columns() {
        println!("  - {}: {} ({:.2}%)", col.name, col.count, col.percentage);
    }
    println!(
        "Duplicate rows: {} ({:.2}%)",
        report.duplicates.total_duplicates, report.duplicates.percentage
    );
    println!();

    let score = &report.quality_score;
    println!(
        "Quality score: {:.2} (completeness {:.2}, uniqueness {:.2})",
        score.overall_score, score.completeness, score.uniqueness
    );
    println!("{}", "=".repeat(80));
}

fn print_preview(preview: &Preview) {
    println!("{}", preview.columns.join(","));
    for row in &preview.data {
        let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
        println!("{}", cells.join(","));
    }
    let how = if preview.is_sampled { "sampled" } else { "first" };
    println!(
        "({} {} of {} rows)",
        preview.rows_shown, how, preview.total_rows
    );
}

fn print_cleaning(result: &CleaningResult) {
    println!();
    println!("{}", "=".repeat(80));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(80));
    println!(
        "Output: {} rows x {} columns",
        result.stats.rows, result.stats.columns
    );
    println!();

    if result.operations.is_empty() {
        println!("No operations applied");
    } else {
        println!("Operations:");
        for op in &result.operations {
            println!("  - {}", op);
        }
    }
    println!();
    println!(
        "Quality score: {:.2}",
        result.quality_score.overall_score
    );
    println!("Use --json for machine-readable output");
    println!("{}", "=".repeat(80));
}

fn print_correlation(matrix: &CorrelationMatrix) {
    if matrix.is_empty() {
        println!("No numeric columns to correlate");
        return;
    }

    print!("{:<16}", "");
    for name in &matrix.columns {
        print!(" {:>12}", truncate_str(name, 12));
    }
    println!();
    for (name, row) in matrix.columns.iter().zip(&matrix.values) {
        print!("{:<16}", truncate_str(name, 15));
        for value in row {
            match value {
                Some(v) => print!(" {:>12.4}", v),
                None => print!(" {:>12}", "-"),
            }
        }
        println!();
    }
}

/// Truncate a string to max length with ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

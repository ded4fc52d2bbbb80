//! CLI entry point for the study rater tool.
//!
//! Provides subcommands for scoring a drug/disease annotation workbook into a
//! ranked per-drug summary and for inspecting the workbook's sheets.

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use study_rater::analyzers::analyzer::analyze;
use study_rater::{
    loader::{DEFAULT_SHEETS, SheetSource, load_sheet, open_workbook},
    normalize::SynonymTable,
    output::{OutputFormat, SummaryReport, print_pretty, write_summaries},
};
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "study_rater")]
#[command(about = "Rank drugs by the evidence in a study annotation workbook", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every included study and write the ranked per-drug summary
    Score {
        /// Annotation workbook (xlsx, xls or ods)
        #[arg(value_name = "WORKBOOK")]
        workbook: String,

        /// File to write the summary to
        #[arg(short, long, default_value = "drug_scores.csv")]
        output: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,

        /// Sheet to load; repeat to load several (defaults to the five annotation batches)
        #[arg(short, long = "sheet", value_name = "NAME")]
        sheets: Vec<String>,

        /// JSON file of extra study type/association synonyms
        #[arg(long)]
        synonyms: Option<String>,

        /// Only write the N highest-scoring drugs (0 = all)
        #[arg(short = 'n', long, default_value_t = 0)]
        top: usize,
    },
    /// List the sheets of a workbook with their row and include counts
    ListSheets {
        /// Annotation workbook (xlsx, xls or ods)
        #[arg(value_name = "WORKBOOK")]
        workbook: String,

        /// Sheets the score command would load
        #[arg(short, long = "sheet", value_name = "NAME")]
        sheets: Vec<String>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/study_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("study_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Score {
            workbook,
            output,
            format,
            sheets,
            synonyms,
            top,
        } => {
            let sheets = sheet_list(sheets);
            let synonyms = match synonyms {
                Some(path) => SynonymTable::new().with_file(&path)?,
                None => SynonymTable::new(),
            };

            let mut source = open_workbook(&workbook)?;
            let analysis = analyze(&mut source, &sheets, &synonyms)?;

            let mut drugs = analysis.summaries;
            if top > 0 {
                drugs.truncate(top);
            }
            for summary in drugs.iter().take(5) {
                print_pretty(summary);
            }

            let report = SummaryReport {
                generated_at: Utc::now(),
                source: &workbook,
                sheets: &analysis.reports,
                drugs: &drugs,
            };
            write_summaries(&output, format, &report)?;
        }
        Commands::ListSheets { workbook, sheets } => {
            let sheets = sheet_list(sheets);
            let mut source = open_workbook(&workbook)?;

            let names = source.sheet_names();
            info!(total = names.len(), "Sheet list read");

            for name in &names {
                let configured = sheets.contains(name);
                match load_sheet(&mut source, name) {
                    Ok((_, report)) => info!(
                        sheet = %name,
                        configured,
                        rows = report.rows,
                        included = report.included,
                        "Sheet"
                    ),
                    Err(e) => info!(sheet = %name, configured, reason = %e, "Sheet not loadable"),
                }
            }

            let missing: Vec<_> = sheets.iter().filter(|s| !names.contains(s)).collect();
            if !missing.is_empty() {
                error!(?missing, "Configured sheets absent from workbook");
            }
        }
    }

    Ok(())
}

/// Falls back to the default annotation batches when no sheet was given.
fn sheet_list(sheets: Vec<String>) -> Vec<String> {
    if sheets.is_empty() {
        DEFAULT_SHEETS.iter().map(|s| s.to_string()).collect()
    } else {
        sheets
    }
}

//! Output formatting and persistence for ranked drug summaries.
//!
//! Supports a flat CSV table, a JSON report, and debug pretty-printing.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::{debug, info};

use crate::analyzers::types::{Association, DrugSummary, StudyType};
use crate::loader::SheetReport;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

/// JSON document written by [`OutputFormat::Json`].
#[derive(Debug, Serialize)]
pub struct SummaryReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub source: &'a str,
    pub sheets: &'a [SheetReport],
    pub drugs: &'a [DrugSummary],
}

/// Logs a drug summary using Rust's debug pretty-print format.
pub fn print_pretty(summary: &DrugSummary) {
    debug!("{:#?}", summary);
}

/// Column headers of the summary table.
pub fn summary_header() -> Vec<&'static str> {
    let mut header = vec!["drug_name"];
    header.extend(StudyType::ALL.iter().map(|t| t.column_name()));
    header.extend(Association::ALL.iter().map(|a| a.column_name()));
    header.extend(["number_studies", "overall_score", "disease"]);
    header
}

/// One summary flattened into table cells, in [`summary_header`] order.
pub fn summary_record(summary: &DrugSummary) -> Vec<String> {
    let mut record = vec![summary.drug_name.clone()];
    record.extend(
        StudyType::ALL
            .iter()
            .map(|&t| summary.study_type_count(t).to_string()),
    );
    record.extend(
        Association::ALL
            .iter()
            .map(|&a| summary.association_count(a).to_string()),
    );
    record.push(summary.number_studies.to_string());
    record.push(format_score(summary.overall_score));
    record.push(summary.disease_list());
    record
}

/// Renders a score the way the summary table shows it: shortest round-trip
/// digits, always with a decimal point (`-2.0`, `-0.3333333333333333`).
pub fn format_score(score: f64) -> String {
    format!("{score:?}")
}

/// Writes summaries as CSV with a header row.
pub fn write_csv<W: Write>(writer: W, summaries: &[DrugSummary]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    writer.write_record(summary_header())?;
    for summary in summaries {
        writer.write_record(summary_record(summary))?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes the report as pretty-printed JSON.
pub fn write_json<W: Write>(writer: W, report: &SummaryReport<'_>) -> Result<()> {
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

/// Creates (or truncates) `path` and writes the summaries in `format`.
pub fn write_summaries(
    path: &str,
    format: OutputFormat,
    report: &SummaryReport<'_>,
) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create output file '{path}'"))?;
    let mut writer = BufWriter::new(file);

    match format {
        OutputFormat::Csv => write_csv(&mut writer, report.drugs)?,
        OutputFormat::Json => write_json(&mut writer, report)?,
    }
    writer
        .flush()
        .with_context(|| format!("failed to write output file '{path}'"))?;

    info!(path, ?format, drugs = report.drugs.len(), "Summary written");
    Ok(())
}

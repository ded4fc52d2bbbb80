use crate::analyzers::aggregate::aggregate_records;
use crate::analyzers::rank::rank;
use crate::analyzers::score::score_study;
use crate::analyzers::types::{Association, DrugSummary, RawRow, Record, StudyType};
use crate::loader::{SheetReport, SheetSource, load_sheets};
use crate::normalize::{SynonymTable, clean_name};
use anyhow::Result;
use std::str::FromStr;
use tracing::{info, warn};

/// Result of one scoring run.
#[derive(Debug)]
pub struct Analysis {
    pub reports: Vec<SheetReport>,
    pub records: Vec<Record>,
    pub summaries: Vec<DrugSummary>,
}

/// Loads the named sheets, scores every included study, and returns the
/// ranked per-drug summaries.
#[tracing::instrument(skip(source, synonyms))]
pub fn analyze<S: SheetSource>(
    source: &mut S,
    sheets: &[String],
    synonyms: &SynonymTable,
) -> Result<Analysis> {
    let (rows, reports) = load_sheets(source, sheets)?;
    let records = build_records(&rows, synonyms);
    let summaries = rank(aggregate_records(&records));

    info!(
        records = records.len(),
        drugs = summaries.len(),
        "Scoring complete"
    );

    Ok(Analysis {
        reports,
        records,
        summaries,
    })
}

/// Cleans and scores raw rows, dropping those without a usable drug name.
pub fn build_records(rows: &[RawRow], synonyms: &SynonymTable) -> Vec<Record> {
    let records: Vec<Record> = rows
        .iter()
        .filter_map(|row| to_record(row, synonyms))
        .collect();

    let skipped = rows.len() - records.len();
    if skipped > 0 {
        warn!(skipped, "Rows without a drug name were skipped");
    }

    records
}

/// Turns one raw row into a scored [`Record`].
///
/// Returns `None` when the cleaned drug name is empty. Unrecognized study types
/// and associations are logged and counted as `other`.
pub fn to_record(row: &RawRow, synonyms: &SynonymTable) -> Option<Record> {
    let drug_name = clean_name(row.effective_drug_name().unwrap_or_default());
    if drug_name.is_empty() {
        return None;
    }

    let study_type: StudyType = classify(
        row.effective_study_type(),
        synonyms,
        "study_type",
        &row.sheet,
        &drug_name,
    );
    let association: Association = classify(
        row.association.as_deref(),
        synonyms,
        "association",
        &row.sheet,
        &drug_name,
    );

    Some(Record {
        disease: row.disease.clone().unwrap_or_default(),
        score: score_study(study_type, association),
        drug_name,
        study_type,
        association,
    })
}

fn classify<T>(
    value: Option<&str>,
    synonyms: &SynonymTable,
    field: &str,
    sheet: &str,
    drug_name: &str,
) -> T
where
    T: FromStr + OtherCategory,
{
    let Some(value) = value else {
        warn!(field, sheet, drug_name, "Missing value, counting as other");
        return T::OTHER;
    };

    let cleaned = synonyms.clean_value(value);
    cleaned.parse().unwrap_or_else(|_| {
        warn!(
            field,
            sheet,
            drug_name,
            raw = value,
            cleaned = %cleaned,
            "Unrecognized value, counting as other"
        );
        T::OTHER
    })
}

/// Categories with a catch-all variant.
trait OtherCategory {
    const OTHER: Self;
}

impl OtherCategory for StudyType {
    const OTHER: Self = StudyType::Other;
}

impl OtherCategory for Association {
    const OTHER: Self = Association::Other;
}

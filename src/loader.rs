//! Workbook loading: sheet access, header resolution, and include filtering.

use anyhow::{Context, Result, anyhow, bail};
use calamine::{Data, Range, Reader, Sheets, open_workbook_auto};
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use tracing::{debug, info};

use crate::analyzers::types::RawRow;
use crate::normalize::{normalize_header, relax_header};

/// Annotation batches expected in the combined workbook, in load order.
pub const DEFAULT_SHEETS: &[&str] = &[
    "First_Batch",
    "Second_Batch",
    "Third_Batch",
    "Tight_Samples",
    "Random_Sample",
];

const INCLUDE_COLUMN: &[&str] = &["exclude_include"];
const DRUG_NAME_COLUMN: &[&str] = &["non_cancer_drugs", "drug_name", "drug_names"];
const UPDATED_DRUG_NAME_COLUMN: &[&str] = &["updated_drug_name"];
const DISEASE_COLUMN: &[&str] = &["disease"];
const STUDY_TYPE_COLUMN: &[&str] = &["study_type"];
const STUDY_TYPE_NEW_COLUMN: &[&str] = &["study_type_new"];
const ASSOCIATION_COLUMN: &[&str] = &["association"];

/// Anything that can hand out named worksheets.
pub trait SheetSource {
    fn sheet_names(&self) -> Vec<String>;
    fn worksheet(&mut self, name: &str) -> Result<Range<Data>>;
}

impl<RS: Read + Seek> SheetSource for Sheets<RS> {
    fn sheet_names(&self) -> Vec<String> {
        <Self as Reader<RS>>::sheet_names(self)
    }

    fn worksheet(&mut self, name: &str) -> Result<Range<Data>> {
        Ok(self.worksheet_range(name)?)
    }
}

/// Opens an `xlsx`/`xls`/`ods` workbook from disk.
pub fn open_workbook(path: &str) -> Result<Sheets<BufReader<File>>> {
    open_workbook_auto(path).with_context(|| format!("failed to open workbook '{path}'"))
}

/// Workbook held entirely in memory, built from rows of text cells.
#[derive(Debug, Default, Clone)]
pub struct MemoryWorkbook {
    sheets: Vec<(String, Range<Data>)>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sheet; the first row is the header row and empty strings become
    /// empty cells.
    pub fn with_sheet(mut self, name: &str, rows: &[&[&str]]) -> Self {
        let height = rows.len() as u32;
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0) as u32;

        let range = if height == 0 || width == 0 {
            Range::empty()
        } else {
            let mut range = Range::new((0, 0), (height - 1, width - 1));
            for (r, row) in rows.iter().enumerate() {
                for (c, cell) in row.iter().enumerate() {
                    if !cell.is_empty() {
                        range.set_value((r as u32, c as u32), Data::String(cell.to_string()));
                    }
                }
            }
            range
        };

        self.sheets.push((name.to_string(), range));
        self
    }
}

impl SheetSource for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.clone()).collect()
    }

    fn worksheet(&mut self, name: &str) -> Result<Range<Data>> {
        self.sheets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, range)| range.clone())
            .ok_or_else(|| anyhow!("no sheet named '{name}'"))
    }
}

/// Row counts observed while loading one sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SheetReport {
    pub sheet: String,
    pub rows: usize,
    pub included: usize,
}

/// Column positions of the logical fields within one sheet.
#[derive(Debug, Clone, PartialEq)]
struct ColumnMap {
    include: usize,
    drug_name: usize,
    updated_drug_name: Option<usize>,
    disease: usize,
    study_type: usize,
    study_type_new: Option<usize>,
    association: usize,
}

impl ColumnMap {
    fn resolve(sheet: &str, headers: &[String]) -> Result<Self> {
        let required = |candidates: &[&str]| {
            find_column(headers, candidates).with_context(|| {
                format!(
                    "sheet '{sheet}' is missing a column named {} (found: {})",
                    candidates.join(" or "),
                    headers.join(", ")
                )
            })
        };

        Ok(ColumnMap {
            include: required(INCLUDE_COLUMN)?,
            drug_name: required(DRUG_NAME_COLUMN)?,
            updated_drug_name: find_column(headers, UPDATED_DRUG_NAME_COLUMN),
            disease: required(DISEASE_COLUMN)?,
            study_type: required(STUDY_TYPE_COLUMN)?,
            study_type_new: find_column(headers, STUDY_TYPE_NEW_COLUMN),
            association: required(ASSOCIATION_COLUMN)?,
        })
    }
}

/// Finds the first candidate among normalized headers, trying exact names
/// before relaxed ones.
fn find_column(headers: &[String], candidates: &[&str]) -> Option<usize> {
    candidates
        .iter()
        .find_map(|c| headers.iter().position(|h| h == c))
        .or_else(|| {
            candidates
                .iter()
                .find_map(|c| headers.iter().position(|h| relax_header(h) == *c))
        })
}

/// Text of a cell, `None` when it is empty or blank.
fn cell_text(row: &[Data], idx: usize) -> Option<String> {
    let text = match row.get(idx)? {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    };
    if text.is_empty() { None } else { Some(text) }
}

/// Case and surrounding whitespace are ignored on purpose, so ` Include `
/// tags a row the same as `include`.
fn is_included(flag: Option<&str>) -> bool {
    flag.is_some_and(|f| f.trim().eq_ignore_ascii_case("include"))
}

/// Reads one sheet and returns its include-tagged rows.
#[tracing::instrument(skip(source))]
pub fn load_sheet<S: SheetSource>(
    source: &mut S,
    sheet: &str,
) -> Result<(Vec<RawRow>, SheetReport)> {
    let range = source
        .worksheet(sheet)
        .with_context(|| format!("failed to read sheet '{sheet}'"))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header
            .iter()
            .map(|cell| normalize_header(&cell.to_string()))
            .collect(),
        None => bail!("sheet '{sheet}' has no header row"),
    };
    debug!(?headers, "Normalized headers");

    let columns = ColumnMap::resolve(sheet, &headers)?;

    let mut report = SheetReport {
        sheet: sheet.to_string(),
        ..Default::default()
    };
    let mut out = Vec::new();

    for row in rows {
        report.rows += 1;

        if !is_included(cell_text(row, columns.include).as_deref()) {
            continue;
        }
        report.included += 1;

        out.push(RawRow {
            sheet: sheet.to_string(),
            drug_name: cell_text(row, columns.drug_name),
            updated_drug_name: columns.updated_drug_name.and_then(|i| cell_text(row, i)),
            disease: cell_text(row, columns.disease),
            study_type: cell_text(row, columns.study_type),
            study_type_new: columns.study_type_new.and_then(|i| cell_text(row, i)),
            association: cell_text(row, columns.association),
        });
    }

    info!(rows = report.rows, included = report.included, "Sheet loaded");
    Ok((out, report))
}

/// Loads and concatenates the include-tagged rows of every named sheet.
///
/// # Errors
///
/// Fails if any sheet is absent from the workbook or lacks a required column.
#[tracing::instrument(skip(source))]
pub fn load_sheets<S: SheetSource>(
    source: &mut S,
    sheets: &[String],
) -> Result<(Vec<RawRow>, Vec<SheetReport>)> {
    let available = source.sheet_names();
    if let Some(missing) = sheets.iter().find(|s| !available.contains(s)) {
        bail!(
            "workbook has no sheet named '{missing}' (available: {})",
            available.join(", ")
        );
    }

    let mut all_rows = Vec::new();
    let mut reports = Vec::with_capacity(sheets.len());

    for sheet in sheets {
        let (rows, report) = load_sheet(source, sheet)?;
        all_rows.extend(rows);
        reports.push(report);
    }

    info!(
        sheets = reports.len(),
        included = all_rows.len(),
        "Workbook loaded"
    );
    Ok((all_rows, reports))
}

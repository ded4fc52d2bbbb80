use study_rater::analyzers::analyzer::analyze;
use study_rater::analyzers::types::{Association, StudyType};
use study_rater::loader::{DEFAULT_SHEETS, MemoryWorkbook};
use study_rater::normalize::SynonymTable;
use study_rater::output::write_csv;

const HEADER: &[&str] = &[
    "Exclude/Include",
    "Non-Cancer Drugs",
    "Updated Drug Name",
    "Disease",
    "Study Type",
    "Study_Type_New",
    "Association",
];

fn annotations() -> MemoryWorkbook {
    let mut wb = MemoryWorkbook::new()
        .with_sheet(
            "First_Batch",
            &[
                HEADER,
                &["include", "X", "", "glioma", "In Vivo", "", "Beneficial"],
                &["include", "X / X-ray", "", "glioma", "in vitro", "", "beneficial"],
                &["exclude", "X", "", "glioma", "clinical trial", "", "beneficial"],
            ],
        )
        .with_sheet(
            "Second_Batch",
            &[
                HEADER,
                &["include", "old x", "x", "melanoma", "in vitro", "Clinical Trial", "Detrimental"],
                &["include", "Metformin", "", "glioma", "In Vitro/In Vivo", "", "no effect"],
            ],
        );
    for sheet in &DEFAULT_SHEETS[2..] {
        wb = wb.with_sheet(sheet, &[HEADER]);
    }
    wb
}

#[test]
fn test_full_pipeline() {
    let mut wb = annotations();
    let sheets: Vec<String> = DEFAULT_SHEETS.iter().map(|s| s.to_string()).collect();

    let analysis = analyze(&mut wb, &sheets, &SynonymTable::new()).expect("analysis failed");

    assert_eq!(analysis.reports.len(), 5);
    assert_eq!(analysis.records.len(), 4);
    assert_eq!(analysis.summaries.len(), 2);

    let x = analysis
        .summaries
        .iter()
        .find(|s| s.drug_name == "x")
        .expect("drug x missing");
    assert_eq!(x.number_studies, 3);
    assert_eq!(x.overall_score, -2.0);
    assert_eq!(x.study_type_count(StudyType::InVivo), 1);
    assert_eq!(x.study_type_count(StudyType::InVitro), 1);
    assert_eq!(x.study_type_count(StudyType::ClinicalTrial), 1);
    assert_eq!(x.association_count(Association::Beneficial), 2);
    assert_eq!(x.association_count(Association::Detrimental), 1);
    assert_eq!(x.disease_list(), "glioma, melanoma");

    // metformin: in_vivo + no_effect = -2/3, still above x
    assert_eq!(analysis.summaries[0].drug_name, "metformin");
    assert_eq!(analysis.summaries[0].overall_score, -2.0 / 3.0);

    let mut buf = Vec::new();
    write_csv(&mut buf, &analysis.summaries).unwrap();
    let content = String::from_utf8(buf).unwrap();
    assert_eq!(content.lines().count(), 3);
    assert!(content.lines().nth(2).unwrap().starts_with("x,1,1,1,0,0,0,2,0,0,1,0,3,-2.0,"));
}

#[test]
fn test_missing_sheet_fails() {
    let mut wb = MemoryWorkbook::new().with_sheet("First_Batch", &[HEADER]);
    let sheets: Vec<String> = DEFAULT_SHEETS.iter().map(|s| s.to_string()).collect();

    let err = analyze(&mut wb, &sheets, &SynonymTable::new()).unwrap_err();
    assert!(err.to_string().contains("Second_Batch"));
}

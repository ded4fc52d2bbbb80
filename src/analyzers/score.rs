use crate::analyzers::types::{Association, StudyType};

/// Evidence weight of a study design before the outcome is applied.
///
/// | Study type             | Base |
/// |------------------------|------|
/// | clinical_trial         | 5    |
/// | clinical_observational | 3    |
/// | in_vivo                | 2    |
/// | clinical_case_report   | 2    |
/// | in_vitro               | 1    |
/// | other                  | 0    |
pub fn base_score(study_type: StudyType) -> f64 {
    match study_type {
        StudyType::InVivo => 2.0,
        StudyType::InVitro => 1.0,
        StudyType::ClinicalTrial => 5.0,
        StudyType::ClinicalObservational => 3.0,
        StudyType::ClinicalCaseReport => 2.0,
        StudyType::Other => 0.0,
    }
}

/// Scores one study: null and inconclusive results count against the drug at
/// a third of the base weight, detrimental results at full weight.
pub fn score_study(study_type: StudyType, association: Association) -> f64 {
    let base = base_score(study_type);
    match association {
        Association::Inconclusive | Association::NoEffect => -base / 3.0,
        Association::Detrimental => -base,
        Association::Beneficial | Association::Other => base,
    }
}

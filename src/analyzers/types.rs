//! Data types used by the scoring and aggregation pipeline.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Experimental methodology of a study.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyType {
    InVivo,
    InVitro,
    ClinicalTrial,
    ClinicalObservational,
    ClinicalCaseReport,
    Other,
}

impl StudyType {
    pub const ALL: [StudyType; 6] = [
        StudyType::InVivo,
        StudyType::InVitro,
        StudyType::ClinicalTrial,
        StudyType::ClinicalObservational,
        StudyType::ClinicalCaseReport,
        StudyType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StudyType::InVivo => "in_vivo",
            StudyType::InVitro => "in_vitro",
            StudyType::ClinicalTrial => "clinical_trial",
            StudyType::ClinicalObservational => "clinical_observational",
            StudyType::ClinicalCaseReport => "clinical_case_report",
            StudyType::Other => "other",
        }
    }

    /// Header used for this category in tabular output. `other` is qualified
    /// because associations have an `other` column too.
    pub fn column_name(&self) -> &'static str {
        match self {
            StudyType::Other => "other_study_type",
            _ => self.as_str(),
        }
    }
}

impl FromStr for StudyType {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StudyType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for StudyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome direction reported by a study.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Association {
    Beneficial,
    NoEffect,
    Inconclusive,
    Detrimental,
    Other,
}

impl Association {
    pub const ALL: [Association; 5] = [
        Association::Beneficial,
        Association::NoEffect,
        Association::Inconclusive,
        Association::Detrimental,
        Association::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Association::Beneficial => "beneficial",
            Association::NoEffect => "no_effect",
            Association::Inconclusive => "inconclusive",
            Association::Detrimental => "detrimental",
            Association::Other => "other",
        }
    }

    pub fn column_name(&self) -> &'static str {
        match self {
            Association::Other => "other_association",
            _ => self.as_str(),
        }
    }
}

impl FromStr for Association {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Association::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for Association {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cleaned value that matches no known category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category '{}'", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

/// An include-tagged spreadsheet row, before any cleaning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pub sheet: String,
    pub drug_name: Option<String>,
    pub updated_drug_name: Option<String>,
    pub disease: Option<String>,
    pub study_type: Option<String>,
    pub study_type_new: Option<String>,
    pub association: Option<String>,
}

impl RawRow {
    /// The curated drug name wins over the original annotation.
    pub fn effective_drug_name(&self) -> Option<&str> {
        self.updated_drug_name
            .as_deref()
            .or(self.drug_name.as_deref())
    }

    pub fn effective_study_type(&self) -> Option<&str> {
        self.study_type_new.as_deref().or(self.study_type.as_deref())
    }
}

/// One cleaned and scored study observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub drug_name: String,
    pub disease: String,
    pub study_type: StudyType,
    pub association: Association,
    pub score: f64,
}

/// Per-drug aggregate written to the ranked output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrugSummary {
    pub drug_name: String,
    pub study_types: BTreeMap<StudyType, usize>,
    pub associations: BTreeMap<Association, usize>,
    pub number_studies: usize,
    pub overall_score: f64,
    pub diseases: Vec<String>,
}

impl DrugSummary {
    /// Creates an empty summary with every category present and zeroed.
    pub fn new(drug_name: &str) -> Self {
        DrugSummary {
            drug_name: drug_name.to_string(),
            study_types: StudyType::ALL.into_iter().map(|t| (t, 0)).collect(),
            associations: Association::ALL.into_iter().map(|a| (a, 0)).collect(),
            number_studies: 0,
            overall_score: 0.0,
            diseases: Vec::new(),
        }
    }

    pub fn study_type_count(&self, study_type: StudyType) -> usize {
        self.study_types.get(&study_type).copied().unwrap_or(0)
    }

    pub fn association_count(&self, association: Association) -> usize {
        self.associations.get(&association).copied().unwrap_or(0)
    }

    /// Distinct diseases joined the way the summary table shows them.
    pub fn disease_list(&self) -> String {
        self.diseases.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_study_type_parses_every_variant() {
        for t in StudyType::ALL {
            assert_eq!(t.as_str().parse::<StudyType>(), Ok(t));
        }
        assert!("in_silico".parse::<StudyType>().is_err());
    }

    #[test]
    fn test_association_parses_every_variant() {
        for a in Association::ALL {
            assert_eq!(a.as_str().parse::<Association>(), Ok(a));
        }
        assert_eq!(
            "harmful".parse::<Association>(),
            Err(UnknownCategory("harmful".to_string()))
        );
    }

    #[test]
    fn test_column_names_are_unique() {
        let mut names: Vec<&str> = StudyType::ALL.iter().map(|t| t.column_name()).collect();
        names.extend(Association::ALL.iter().map(|a| a.column_name()));
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_new_summary_is_zero_filled() {
        let summary = DrugSummary::new("metformin");
        assert_eq!(summary.study_types.len(), StudyType::ALL.len());
        assert_eq!(summary.associations.len(), Association::ALL.len());
        assert!(summary.study_types.values().all(|&c| c == 0));
        assert_eq!(summary.disease_list(), "");
    }

    #[test]
    fn test_effective_values_prefer_updates() {
        let row = RawRow {
            drug_name: Some("Aspirin".into()),
            updated_drug_name: Some("acetylsalicylic acid".into()),
            study_type: Some("in vitro".into()),
            ..Default::default()
        };
        assert_eq!(row.effective_drug_name(), Some("acetylsalicylic acid"));
        assert_eq!(row.effective_study_type(), Some("in vitro"));
    }
}

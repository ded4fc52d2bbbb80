use crate::analyzers::types::{DrugSummary, Record};
use std::collections::HashMap;

/// Groups scored records by drug name into [`DrugSummary`] rows.
///
/// Summaries come back in first-seen drug order. Each one carries zero-filled
/// per-category counts, the number of studies, the overall score, and the
/// distinct non-empty diseases in first-seen order.
///
/// The overall score is built from a histogram of row scores: each distinct
/// score value (in first-seen order across all records) is multiplied by how
/// often the drug received it, and the products are summed in that order.
pub fn aggregate_records(records: &[Record]) -> Vec<DrugSummary> {
    let mut summaries: Vec<DrugSummary> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    let mut score_values: Vec<f64> = Vec::new();
    let mut score_counts: Vec<Vec<usize>> = Vec::new();

    for record in records {
        let slot = *index.entry(record.drug_name.as_str()).or_insert_with(|| {
            summaries.push(DrugSummary::new(&record.drug_name));
            score_counts.push(Vec::new());
            summaries.len() - 1
        });
        let summary = &mut summaries[slot];

        *summary.study_types.entry(record.study_type).or_default() += 1;
        *summary.associations.entry(record.association).or_default() += 1;

        let value = match score_values.iter().position(|&v| v == record.score) {
            Some(value) => value,
            None => {
                score_values.push(record.score);
                score_values.len() - 1
            }
        };
        let counts = &mut score_counts[slot];
        if counts.len() <= value {
            counts.resize(value + 1, 0);
        }
        counts[value] += 1;

        if !record.disease.is_empty() && !summary.diseases.contains(&record.disease) {
            summary.diseases.push(record.disease.clone());
        }
    }

    for (summary, counts) in summaries.iter_mut().zip(&score_counts) {
        summary.number_studies = summary.associations.values().sum();
        summary.overall_score = scaled_score(&score_values, counts);
    }

    summaries
}

/// Sums `value * count` over the score histogram, skipping absent values.
fn scaled_score(values: &[f64], counts: &[usize]) -> f64 {
    values
        .iter()
        .zip(counts)
        .filter(|&(_, &count)| count > 0)
        .fold(0.0, |total, (&value, &count)| total + value * count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::score::score_study;
    use crate::analyzers::types::{Association, StudyType};

    fn record(drug: &str, disease: &str, study_type: StudyType, association: Association) -> Record {
        Record {
            drug_name: drug.to_string(),
            disease: disease.to_string(),
            study_type,
            association,
            score: score_study(study_type, association),
        }
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate_records(&[]).is_empty());
    }

    #[test]
    fn test_aggregate_single_drug() {
        let records = vec![
            record("x", "glioma", StudyType::InVivo, Association::Beneficial),
            record("x", "glioma", StudyType::InVitro, Association::Beneficial),
            record("x", "melanoma", StudyType::ClinicalTrial, Association::Detrimental),
        ];

        let summaries = aggregate_records(&records);
        assert_eq!(summaries.len(), 1);

        let x = &summaries[0];
        assert_eq!(x.drug_name, "x");
        assert_eq!(x.number_studies, 3);
        assert_eq!(x.overall_score, -2.0);
        assert_eq!(x.study_type_count(StudyType::InVivo), 1);
        assert_eq!(x.study_type_count(StudyType::ClinicalObservational), 0);
        assert_eq!(x.association_count(Association::Beneficial), 2);
        assert_eq!(x.association_count(Association::Detrimental), 1);
        assert_eq!(x.disease_list(), "glioma, melanoma");
    }

    #[test]
    fn test_overall_score_scales_repeated_scores() {
        let records = vec![
            record("x", "glioma", StudyType::ClinicalTrial, Association::Detrimental),
            record("x", "glioma", StudyType::ClinicalTrial, Association::NoEffect),
            record("x", "glioma", StudyType::ClinicalTrial, Association::Detrimental),
        ];

        let summaries = aggregate_records(&records);
        let expected = -5.0 * 2.0 + (-5.0 / 3.0) * 1.0;
        assert_eq!(summaries[0].overall_score, expected);
        assert_eq!(summaries[0].overall_score.to_bits(), expected.to_bits());
    }

    #[test]
    fn test_overall_score_follows_global_score_order() {
        let records = vec![
            record("a", "d", StudyType::InVitro, Association::Inconclusive),
            record("b", "d", StudyType::ClinicalTrial, Association::Beneficial),
            record("b", "d", StudyType::InVitro, Association::Inconclusive),
            record("b", "d", StudyType::InVitro, Association::Inconclusive),
        ];

        let summaries = aggregate_records(&records);
        assert_eq!(summaries[0].overall_score, -1.0 / 3.0);
        // -1/3 was seen first overall, so it is summed before 5
        let expected = (-1.0 / 3.0) * 2.0 + 5.0 * 1.0;
        assert_eq!(summaries[1].overall_score, expected);
    }

    #[test]
    fn test_aggregate_counts_sum_to_total() {
        let records = vec![
            record("a", "d1", StudyType::InVivo, Association::NoEffect),
            record("b", "d1", StudyType::Other, Association::Other),
            record("a", "", StudyType::ClinicalCaseReport, Association::Inconclusive),
            record("a", "d2", StudyType::InVivo, Association::Beneficial),
            record("b", "d3", StudyType::ClinicalTrial, Association::Beneficial),
        ];

        let summaries = aggregate_records(&records);
        assert_eq!(summaries.len(), 2);

        for summary in &summaries {
            let rows = records
                .iter()
                .filter(|r| r.drug_name == summary.drug_name)
                .count();
            let study_sum: usize = summary.study_types.values().sum();
            let assoc_sum: usize = summary.associations.values().sum();
            assert_eq!(study_sum, rows);
            assert_eq!(assoc_sum, rows);
            assert_eq!(summary.number_studies, rows);
        }
    }

    #[test]
    fn test_aggregate_preserves_first_seen_order_and_skips_empty_disease() {
        let records = vec![
            record("b", "d1", StudyType::InVitro, Association::Beneficial),
            record("a", "", StudyType::InVitro, Association::Beneficial),
            record("b", "d1", StudyType::InVitro, Association::Beneficial),
        ];

        let summaries = aggregate_records(&records);
        let names: Vec<&str> = summaries.iter().map(|s| s.drug_name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(summaries[0].diseases, ["d1"]);
        assert!(summaries[1].diseases.is_empty());
    }
}

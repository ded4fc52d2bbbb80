use crate::analyzers::types::DrugSummary;

/// Orders summaries by overall score, highest first. Equal scores fall back to
/// drug name so the output is reproducible.
pub fn rank(mut summaries: Vec<DrugSummary>) -> Vec<DrugSummary> {
    summaries.sort_by(|a, b| {
        b.overall_score
            .total_cmp(&a.overall_score)
            .then_with(|| a.drug_name.cmp(&b.drug_name))
    });
    summaries
}

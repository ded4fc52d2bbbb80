//! Study scoring and per-drug aggregation.
//!
//! This module turns include-tagged spreadsheet rows into cleaned, scored
//! study records, groups them by drug, and ranks the resulting summaries by
//! their overall evidence score.

pub mod aggregate;
pub mod analyzer;
pub mod rank;
pub mod score;
pub mod types;

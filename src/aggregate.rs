//! Flattening pair records into the final result table.
//!
//! The table has a fixed column order matching the upstream pipeline's
//! output selection; failed units become explicit marker rows (or are
//! omitted, per [`FailurePolicy`]) so that no ambiguous numeric
//! placeholder is ever emitted.

use serde::{Deserialize, Serialize};

use crate::config::FailurePolicy;
use crate::result::{PairOutcome, PairRecord};

/// Column names of the flattened table, in output order.
///
/// The trailing `status` column is `"ok"` for completed units and the
/// failure reason for marker rows.
pub const COLUMNS: [&str; 15] = [
    "combination",
    "group",
    "outcome_feature",
    "mediator_feature",
    "acme_estimate",
    "ade_estimate",
    "total_estimate",
    "acme_p_value",
    "ade_p_value",
    "total_p_value",
    "treatment_outcome_corr",
    "treatment_outcome_corr_p",
    "outcome_mediator_corr",
    "outcome_mediator_corr_p",
    "status",
];

/// Marker used for the numeric cells of a failed unit's row.
const NA: &str = "NA";

/// One flattened output row.
///
/// Numeric fields are `None` on marker rows; serialization renders them as
/// nulls (JSON) or [`NA`] (delimited cells), never as a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    /// Drug-combination label.
    pub combination: String,
    /// Sample-group label.
    pub group: String,
    /// Outcome feature name.
    pub outcome_feature: String,
    /// Mediator feature name.
    pub mediator_feature: String,
    /// ACME point estimate.
    pub acme_estimate: Option<f64>,
    /// ADE point estimate.
    pub ade_estimate: Option<f64>,
    /// Total Effect point estimate.
    pub total_estimate: Option<f64>,
    /// ACME p-value.
    pub acme_p_value: Option<f64>,
    /// ADE p-value.
    pub ade_p_value: Option<f64>,
    /// Total Effect p-value.
    pub total_p_value: Option<f64>,
    /// Treatment-outcome rank correlation.
    pub treatment_outcome_corr: Option<f64>,
    /// Treatment-outcome correlation p-value.
    pub treatment_outcome_corr_p: Option<f64>,
    /// Outcome-mediator rank correlation.
    pub outcome_mediator_corr: Option<f64>,
    /// Outcome-mediator correlation p-value.
    pub outcome_mediator_corr_p: Option<f64>,
    /// `"ok"` or the failure reason.
    pub status: String,
}

impl ResultRow {
    /// Render the row as delimited-writer cells, in [`COLUMNS`] order.
    pub fn cells(&self) -> Vec<String> {
        let num = |v: &Option<f64>| match v {
            Some(x) => x.to_string(),
            None => NA.to_string(),
        };
        vec![
            self.combination.clone(),
            self.group.clone(),
            self.outcome_feature.clone(),
            self.mediator_feature.clone(),
            num(&self.acme_estimate),
            num(&self.ade_estimate),
            num(&self.total_estimate),
            num(&self.acme_p_value),
            num(&self.ade_p_value),
            num(&self.total_p_value),
            num(&self.treatment_outcome_corr),
            num(&self.treatment_outcome_corr_p),
            num(&self.outcome_mediator_corr),
            num(&self.outcome_mediator_corr_p),
            self.status.clone(),
        ]
    }
}

/// The final artifact: an ordered sequence of flattened rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    /// Rows in record order.
    pub rows: Vec<ResultRow>,
}

impl ResultTable {
    /// Column names, in output order.
    pub fn columns() -> &'static [&'static str] {
        &COLUMNS
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Flatten records into a [`ResultTable`], preserving record order.
pub fn aggregate(records: &[PairRecord], policy: FailurePolicy) -> ResultTable {
    let rows = records
        .iter()
        .filter_map(|record| flatten(record, policy))
        .collect();
    ResultTable { rows }
}

/// Flatten one record; `None` when the policy omits failed units.
fn flatten(record: &PairRecord, policy: FailurePolicy) -> Option<ResultRow> {
    match &record.outcome {
        PairOutcome::Completed {
            mediation,
            treatment_outcome,
            outcome_mediator,
            ..
        } => Some(ResultRow {
            combination: record.combination.clone(),
            group: record.group.clone(),
            outcome_feature: record.outcome_feature.clone(),
            mediator_feature: record.mediator_feature.clone(),
            acme_estimate: Some(mediation.acme.estimate),
            ade_estimate: Some(mediation.ade.estimate),
            total_estimate: Some(mediation.total.estimate),
            acme_p_value: Some(mediation.acme.p_value),
            ade_p_value: Some(mediation.ade.p_value),
            total_p_value: Some(mediation.total.p_value),
            treatment_outcome_corr: Some(treatment_outcome.rho),
            treatment_outcome_corr_p: Some(treatment_outcome.p_value),
            outcome_mediator_corr: Some(outcome_mediator.rho),
            outcome_mediator_corr_p: Some(outcome_mediator.p_value),
            status: "ok".to_string(),
        }),
        PairOutcome::Failed { reason, .. } => match policy {
            FailurePolicy::Omit => None,
            FailurePolicy::MarkerRow => Some(ResultRow {
                combination: record.combination.clone(),
                group: record.group.clone(),
                outcome_feature: record.outcome_feature.clone(),
                mediator_feature: record.mediator_feature.clone(),
                acme_estimate: None,
                ade_estimate: None,
                total_estimate: None,
                acme_p_value: None,
                ade_p_value: None,
                total_p_value: None,
                treatment_outcome_corr: None,
                treatment_outcome_corr_p: None,
                outcome_mediator_corr: None,
                outcome_mediator_corr_p: None,
                status: reason.clone(),
            }),
        },
    }
}

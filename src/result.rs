//! Result types for mediation runs.
//!
//! Everything here is immutable once produced: the estimator creates one
//! [`MediationResult`] per (pair, direction), the runner wraps it into a
//! [`PairRecord`] together with the association summaries, and the
//! aggregator flattens records into the output table.

use serde::{Deserialize, Serialize};

use crate::error::MediationError;
use crate::statistics::Correlation;

/// One simulated effect: point estimate, 95% confidence bound, p-value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectEstimate {
    /// Mean of the replicate-level effect draws.
    pub estimate: f64,
    /// 2.5% empirical quantile of the draws.
    pub ci_lower: f64,
    /// 97.5% empirical quantile of the draws.
    pub ci_upper: f64,
    /// Two-sided proportion-based p-value, `2 * min(P(<=0), P(>=0))`,
    /// clamped to 1.
    pub p_value: f64,
}

impl EffectEstimate {
    /// Whether zero lies outside the confidence bound.
    pub fn excludes_zero(&self) -> bool {
        self.ci_lower > 0.0 || self.ci_upper < 0.0
    }
}

/// The full mediation decomposition for one (pair, direction) unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediationResult {
    /// Average Causal Mediation Effect: the portion of the treatment
    /// effect transmitted through the mediator.
    pub acme: EffectEstimate,
    /// Average Direct Effect: the portion not transmitted through the
    /// mediator.
    pub ade: EffectEstimate,
    /// Total Effect. Its estimate is exactly `acme.estimate +
    /// ade.estimate`.
    pub total: EffectEstimate,
    /// Number of simulation replicates the summaries are based on.
    pub n_replicates: usize,
}

/// What happened to one (pair, direction) unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PairOutcome {
    /// Estimation succeeded.
    Completed {
        /// The mediation decomposition.
        mediation: MediationResult,
        /// Rank correlation between treatment and the outcome feature.
        treatment_outcome: Correlation,
        /// Rank correlation between treatment and the mediator feature.
        treatment_mediator: Correlation,
        /// Rank correlation between the outcome and mediator features.
        ///
        /// The reversed direction of the same pair reports the identical
        /// value under swapped labels; the duplication is intentional and
        /// preserved for downstream consumers.
        outcome_mediator: Correlation,
    },
    /// Estimation failed; the unit was skipped and recorded.
    Failed {
        /// Why the unit was skipped.
        error: MediationErrorKind,
        /// Human-readable reason, as produced by the error's `Display`.
        reason: String,
    },
}

impl PairOutcome {
    /// Whether the unit completed.
    pub fn is_completed(&self) -> bool {
        matches!(self, PairOutcome::Completed { .. })
    }
}

/// Serializable discriminant of [`MediationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediationErrorKind {
    /// Rank-deficient design matrix.
    SingularDesign,
    /// Too few usable rows.
    InsufficientData,
    /// Coefficient covariance not positive definite.
    SimulationDivergence,
}

impl From<&MediationError> for MediationErrorKind {
    fn from(err: &MediationError) -> Self {
        match err {
            MediationError::SingularDesign { .. } => Self::SingularDesign,
            MediationError::InsufficientData { .. } => Self::InsufficientData,
            MediationError::SimulationDivergence { .. } => Self::SimulationDivergence,
        }
    }
}

/// One output row: the analysis of a single (pair, direction) unit in its
/// drug-combination/sample-group context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairRecord {
    /// Drug-combination label.
    pub combination: String,
    /// Sample-group label.
    pub group: String,
    /// Feature analyzed as the outcome in this direction.
    pub outcome_feature: String,
    /// Feature analyzed as the mediator in this direction.
    pub mediator_feature: String,
    /// The unit's result or failure.
    pub outcome: PairOutcome,
}

//! Core data model: column roles, model specifications, and the per-pair
//! analysis dataset.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Dynamically-sized design matrix (rows = samples, columns = terms).
pub type Matrix = DMatrix<f64>;

/// Dynamically-sized column vector.
pub type Vector = DVector<f64>;

/// Role a column plays in the mediation model.
///
/// Columns are bound by role rather than by feature name: the runner maps
/// each feature of a pair onto `Outcome` or `Mediator` for one direction
/// and swaps them for the other, so a single model specification serves
/// every pair without renaming any data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Binary treatment indicator (drug exposure), coerced to {0, 1}.
    Treatment,
    /// Feature whose response to treatment is being decomposed.
    Outcome,
    /// Feature hypothesized to transmit part of the treatment effect.
    Mediator,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Treatment => write!(f, "treatment"),
            Role::Outcome => write!(f, "outcome"),
            Role::Mediator => write!(f, "mediator"),
        }
    }
}

/// A regression model specification: a response and an additive set of
/// predictors, all named by [`Role`].
///
/// Resolution to column data is an explicit lookup on the dataset at fit
/// time; there is no formula string and no textual substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    /// Response role.
    pub response: Role,
    /// Predictor roles, in design-matrix order (an intercept is always
    /// prepended by the fit and is not listed here).
    pub predictors: Vec<Role>,
}

impl ModelSpec {
    /// Mediator model: `mediator ~ treatment`.
    pub fn mediator_model() -> Self {
        Self {
            response: Role::Mediator,
            predictors: vec![Role::Treatment],
        }
    }

    /// Outcome model: `outcome ~ treatment + mediator`.
    pub fn outcome_model() -> Self {
        Self {
            response: Role::Outcome,
            predictors: vec![Role::Treatment, Role::Mediator],
        }
    }

    /// Minimum number of rows a fit of this spec requires: one per
    /// coefficient (predictors + intercept) plus one residual degree of
    /// freedom.
    pub fn min_samples(&self) -> usize {
        self.predictors.len() + 2
    }
}

/// The assembled dataset for one (pair, direction) unit of work.
///
/// Invariants established at construction: all three columns have equal
/// length, the treatment column contains only 0.0 and 1.0, and no value is
/// missing (NaN measurements are replaced with zero, matching the upstream
/// convention of the source pipeline).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisDataset {
    treatment: Vec<f64>,
    outcome: Vec<f64>,
    mediator: Vec<f64>,
}

impl AnalysisDataset {
    /// Assemble a dataset from raw columns.
    ///
    /// The treatment is boolean-coerced to {0, 1}; NaN feature values are
    /// replaced with 0.0.
    ///
    /// # Panics
    ///
    /// Panics if the column lengths differ.
    pub fn new(treatment: &[bool], outcome: &[f64], mediator: &[f64]) -> Self {
        assert_eq!(
            treatment.len(),
            outcome.len(),
            "treatment and outcome columns must have equal length"
        );
        assert_eq!(
            treatment.len(),
            mediator.len(),
            "treatment and mediator columns must have equal length"
        );

        let zero_fill = |xs: &[f64]| xs.iter().map(|x| if x.is_nan() { 0.0 } else { *x }).collect();

        Self {
            treatment: treatment.iter().map(|&t| if t { 1.0 } else { 0.0 }).collect(),
            outcome: zero_fill(outcome),
            mediator: zero_fill(mediator),
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.treatment.len()
    }

    /// Whether the dataset has no samples.
    pub fn is_empty(&self) -> bool {
        self.treatment.is_empty()
    }

    /// Column data for a role.
    pub fn column(&self, role: Role) -> &[f64] {
        match role {
            Role::Treatment => &self.treatment,
            Role::Outcome => &self.outcome,
            Role::Mediator => &self.mediator,
        }
    }

    /// Build the response vector for a spec.
    pub(crate) fn response_vector(&self, spec: &ModelSpec) -> Vector {
        Vector::from_column_slice(self.column(spec.response))
    }

    /// Build the design matrix for a spec: an intercept column of ones
    /// followed by the predictor columns in spec order.
    pub(crate) fn design_matrix(&self, spec: &ModelSpec) -> Matrix {
        let n = self.len();
        let p = spec.predictors.len() + 1;
        Matrix::from_fn(n, p, |i, j| {
            if j == 0 {
                1.0
            } else {
                self.column(spec.predictors[j - 1])[i]
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn treatment_is_coerced_to_indicator() {
        let data = AnalysisDataset::new(&[true, false, true], &[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]);
        assert_eq!(data.column(Role::Treatment), &[1.0, 0.0, 1.0]);
    }

    #[test]
    fn nan_values_are_zero_filled() {
        let data = AnalysisDataset::new(&[true, false], &[f64::NAN, 2.0], &[4.0, f64::NAN]);
        assert_eq!(data.column(Role::Outcome), &[0.0, 2.0]);
        assert_eq!(data.column(Role::Mediator), &[4.0, 0.0]);
    }

    #[test]
    fn design_matrix_prepends_intercept() {
        let data = AnalysisDataset::new(&[true, false], &[1.0, 2.0], &[3.0, 4.0]);
        let x = data.design_matrix(&ModelSpec::outcome_model());
        assert_eq!(x.nrows(), 2);
        assert_eq!(x.ncols(), 3);
        assert_eq!(x[(0, 0)], 1.0);
        assert_eq!(x[(0, 1)], 1.0); // treatment
        assert_eq!(x[(0, 2)], 3.0); // mediator
        assert_eq!(x[(1, 1)], 0.0);
    }

    #[test]
    fn min_samples_counts_intercept_and_residual_df() {
        assert_eq!(ModelSpec::mediator_model().min_samples(), 3);
        assert_eq!(ModelSpec::outcome_model().min_samples(), 4);
    }

    #[test]
    #[should_panic(expected = "equal length")]
    fn mismatched_columns_panic() {
        AnalysisDataset::new(&[true], &[1.0, 2.0], &[3.0]);
    }
}

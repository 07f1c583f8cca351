//! Ordinary least squares with full inference output.
//!
//! Fits a response on an intercept plus the predictors named by a
//! [`ModelSpec`], exposing the coefficient vector, its covariance matrix
//! `sigma^2 (X^T X)^-1`, and residual statistics. The solve goes through an
//! SVD so rank deficiency is detected reliably even when two predictors are
//! collinear only up to rounding.

use crate::error::MediationError;
use crate::types::{AnalysisDataset, Matrix, ModelSpec, Role, Vector};

/// An immutable fitted regression.
///
/// Owned exclusively by the estimation call that created it; the simulation
/// only ever reads the coefficient estimates, their covariance, and the
/// residual variance.
#[derive(Debug, Clone)]
pub struct RegressionFit {
    terms: Vec<String>,
    coefficients: Vector,
    covariance: Matrix,
    residual_variance: f64,
    df_residual: usize,
    n_samples: usize,
}

impl RegressionFit {
    /// Term names in design-matrix order: `"intercept"` first, then the
    /// predictor roles.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Coefficient estimates, aligned with [`terms`](Self::terms).
    pub fn coefficients(&self) -> &Vector {
        &self.coefficients
    }

    /// Coefficient estimate for a term name, if the term is in the model.
    pub fn coefficient(&self, term: &str) -> Option<f64> {
        self.term_index(term).map(|i| self.coefficients[i])
    }

    /// Index of a term in the coefficient vector.
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.terms.iter().position(|t| t == term)
    }

    /// Coefficient covariance matrix `sigma^2 (X^T X)^-1`.
    pub fn covariance(&self) -> &Matrix {
        &self.covariance
    }

    /// Residual variance estimate `RSS / (n - p)`.
    pub fn residual_variance(&self) -> f64 {
        self.residual_variance
    }

    /// Residual degrees of freedom `n - p`.
    pub fn df_residual(&self) -> usize {
        self.df_residual
    }

    /// Number of rows the fit used.
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }
}

/// Fit an OLS regression of `spec.response` on `spec.predictors`.
///
/// An intercept column is always prepended to the design matrix.
///
/// # Errors
///
/// - [`MediationError::InsufficientData`] when fewer than
///   `spec.min_samples()` rows are available.
/// - [`MediationError::SingularDesign`] when the design matrix is
///   rank-deficient (constant or perfectly collinear predictors), or when
///   the response is constant: a constant response leaves zero residual
///   variance and a collapsed coefficient covariance, so nothing can be
///   simulated from the fit.
pub fn fit(data: &AnalysisDataset, spec: &ModelSpec) -> Result<RegressionFit, MediationError> {
    let n = data.len();
    let required = spec.min_samples();
    if n < required {
        return Err(MediationError::InsufficientData {
            required,
            available: n,
        });
    }

    let response = data.column(spec.response);
    if response.iter().all(|&v| v == response[0]) {
        return Err(MediationError::SingularDesign {
            response: spec.response,
        });
    }

    let x = data.design_matrix(spec);
    let y = data.response_vector(spec);
    let p = x.ncols();

    let svd = x.clone().svd(true, true);

    // Relative rank tolerance in the style of LAPACK: largest singular
    // value scaled by the larger matrix dimension times machine epsilon.
    let sigma_max = svd.singular_values.max();
    let eps = sigma_max * n.max(p) as f64 * f64::EPSILON;
    if svd.rank(eps) < p {
        return Err(MediationError::SingularDesign {
            response: spec.response,
        });
    }

    let coefficients = svd
        .solve(&y, eps)
        .map_err(|_| MediationError::SingularDesign {
            response: spec.response,
        })?;

    let residuals = &y - &x * &coefficients;
    let df_residual = n - p;
    let residual_variance = residuals.norm_squared() / df_residual as f64;

    // (X^T X)^-1 = V S^-2 V^T from the same decomposition.
    let v_t = svd
        .v_t
        .as_ref()
        .expect("SVD was computed with singular vectors");
    let inv_s2 = Matrix::from_diagonal(&svd.singular_values.map(|s| 1.0 / (s * s)));
    let xtx_inv = v_t.transpose() * inv_s2 * v_t;
    let covariance = xtx_inv * residual_variance;

    let mut terms = Vec::with_capacity(p);
    terms.push("intercept".to_string());
    terms.extend(spec.predictors.iter().map(Role::to_string));

    Ok(RegressionFit {
        terms,
        coefficients,
        covariance,
        residual_variance,
        df_residual,
        n_samples: n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(treatment: &[bool], outcome: &[f64], mediator: &[f64]) -> AnalysisDataset {
        AnalysisDataset::new(treatment, outcome, mediator)
    }

    #[test]
    fn recovers_exact_linear_relationship() {
        // outcome = 2 + 3*treatment + 0.5*mediator, no noise
        let treatment = [false, false, false, true, true, true];
        let mediator = [1.0, 2.0, 4.0, 1.0, 3.0, 5.0];
        let outcome: Vec<f64> = treatment
            .iter()
            .zip(&mediator)
            .map(|(&t, &m)| 2.0 + 3.0 * f64::from(u8::from(t)) + 0.5 * m)
            .collect();
        let data = dataset(&treatment, &outcome, &mediator);

        let fit = fit(&data, &ModelSpec::outcome_model()).unwrap();
        assert!((fit.coefficient("intercept").unwrap() - 2.0).abs() < 1e-9);
        assert!((fit.coefficient("treatment").unwrap() - 3.0).abs() < 1e-9);
        assert!((fit.coefficient("mediator").unwrap() - 0.5).abs() < 1e-9);
        assert!(fit.residual_variance() < 1e-12);
        assert_eq!(fit.df_residual(), 3);
        assert_eq!(fit.n_samples(), 6);
    }

    #[test]
    fn constant_mediator_is_singular() {
        let treatment = [false, true, false, true, false];
        let mediator = [7.0; 5];
        let outcome = [1.0, 2.0, 3.0, 4.0, 5.0];
        let data = dataset(&treatment, &outcome, &mediator);

        let err = fit(&data, &ModelSpec::outcome_model()).unwrap_err();
        assert_eq!(
            err,
            MediationError::SingularDesign {
                response: Role::Outcome
            }
        );
    }

    #[test]
    fn constant_response_is_singular() {
        // mediator as response of the mediator model
        let treatment = [false, true, false, true, false];
        let mediator = [2.5; 5];
        let outcome = [1.0, 2.0, 3.0, 4.0, 5.0];
        let data = dataset(&treatment, &outcome, &mediator);

        let err = fit(&data, &ModelSpec::mediator_model()).unwrap_err();
        assert_eq!(
            err,
            MediationError::SingularDesign {
                response: Role::Mediator
            }
        );
    }

    #[test]
    fn collinear_treatment_and_mediator_is_singular() {
        let treatment = [false, true, false, true, false, true];
        // mediator is an affine map of treatment
        let mediator: Vec<f64> = treatment
            .iter()
            .map(|&t| 2.0 * f64::from(u8::from(t)) - 1.0)
            .collect();
        let outcome = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let data = dataset(&treatment, &outcome, &mediator);

        let err = fit(&data, &ModelSpec::outcome_model()).unwrap_err();
        assert!(matches!(err, MediationError::SingularDesign { .. }));
    }

    #[test]
    fn too_few_rows_is_insufficient_data() {
        let data = dataset(&[true, false, true], &[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]);
        let err = fit(&data, &ModelSpec::outcome_model()).unwrap_err();
        assert_eq!(
            err,
            MediationError::InsufficientData {
                required: 4,
                available: 3
            }
        );
    }

    #[test]
    fn covariance_is_symmetric_and_scaled_by_noise() {
        let treatment = [false, false, true, true, false, true, false, true];
        let mediator = [1.0, 2.0, 3.0, 4.0, 2.5, 1.5, 3.5, 0.5];
        let outcome = [1.1, 1.9, 5.2, 6.1, 2.4, 4.8, 3.2, 4.1];
        let data = dataset(&treatment, &outcome, &mediator);

        let fit = fit(&data, &ModelSpec::outcome_model()).unwrap();
        let cov = fit.covariance();
        assert_eq!(cov.nrows(), 3);
        assert_eq!(cov.ncols(), 3);
        for i in 0..3 {
            assert!(cov[(i, i)] > 0.0);
            for j in 0..3 {
                assert!((cov[(i, j)] - cov[(j, i)]).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn mediator_model_has_two_terms() {
        let treatment = [false, true, false, true];
        let mediator = [1.0, 3.0, 2.0, 4.0];
        let outcome = [0.0; 4];
        let data = dataset(&treatment, &outcome, &mediator);

        let fit = fit(&data, &ModelSpec::mediator_model()).unwrap();
        assert_eq!(fit.terms(), &["intercept".to_string(), "treatment".to_string()]);
        // intercept = mean of control arm, slope = arm difference
        assert!((fit.coefficient("intercept").unwrap() - 1.5).abs() < 1e-9);
        assert!((fit.coefficient("treatment").unwrap() - 2.0).abs() < 1e-9);
    }
}

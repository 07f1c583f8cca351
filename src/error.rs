//! Error types for mediation estimation.

use crate::types::Role;

/// Error returned when a single (pair, direction) estimation fails.
///
/// Estimation can fail for reasons tied to the shape of the analysis
/// dataset rather than to bugs. When it does, the affected unit of work is
/// skipped and recorded; the surrounding run continues. A failed unit must
/// never be turned into a partial numeric row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediationError {
    /// Design matrix is rank-deficient.
    ///
    /// Happens when a predictor column is constant across all samples
    /// (e.g. a mediator that never varies) or when two predictors are
    /// perfectly collinear (e.g. treatment and mediator identical up to
    /// an affine map). The normal equations have no unique solution, so
    /// no coefficient covariance exists to simulate from.
    SingularDesign {
        /// Response of the model whose design matrix was deficient.
        response: Role,
    },

    /// Fewer usable rows than the degrees-of-freedom requirement.
    ///
    /// A fit with `p` predictors needs at least `p + 2` rows so that at
    /// least one residual degree of freedom remains for the variance
    /// estimate. Raised before any fit is attempted.
    InsufficientData {
        /// Minimum number of rows the fit requires.
        required: usize,
        /// Number of rows actually available after group filtering.
        available: usize,
    },

    /// A fitted coefficient covariance matrix is not positive definite.
    ///
    /// Numerical edge case: the covariance passed the rank check but its
    /// Cholesky factorization failed, so multivariate-normal parameter
    /// draws are impossible.
    SimulationDivergence {
        /// Response of the model whose covariance could not be factored.
        response: Role,
    },
}

impl std::fmt::Display for MediationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SingularDesign { response } => {
                write!(f, "design matrix is rank-deficient in the {response} model")
            }
            Self::InsufficientData {
                required,
                available,
            } => write!(
                f,
                "insufficient data: {available} usable rows, {required} required"
            ),
            Self::SimulationDivergence { response } => write!(
                f,
                "coefficient covariance of the {response} model is not positive definite"
            ),
        }
    }
}

impl std::error::Error for MediationError {}

//! # mediate
//!
//! Causal mediation analysis between pairs of measured biological features
//! under a binary treatment (drug exposure).
//!
//! Given a treatment indicator and two numeric features, the crate fits an
//! outcome regression and a mediator regression, then estimates the Average
//! Causal Mediation Effect (ACME), Average Direct Effect (ADE), and Total
//! Effect via quasi-Bayesian Monte Carlo simulation (Imai, Keele & Tingley
//! 2010), producing point estimates, empirical confidence bounds, and
//! proportion-based p-values. Rank-correlation summaries accompany every
//! estimate as a simple association check.
//!
//! ## Quick Start
//!
//! ```ignore
//! use mediate::{
//!     aggregate, CohortTable, FeatureTable, MediationConfig, PairContext,
//!     PairwiseMediationRunner,
//! };
//!
//! let features = FeatureTable::new(sample_ids.clone())
//!     .with_column("bile_acid", bile_acid_values)
//!     .with_column("bifidobacterium", abundance_values);
//!
//! let cohort = CohortTable::new(sample_ids, group_labels)
//!     .with_exposure("statin", statin_exposed)
//!     .with_exposure("metformin", metformin_exposed)
//!     .with_combination("statin+metformin", "statin", "metformin");
//!
//! let context = PairContext::new(
//!     "Combination: statin, metformin",
//!     "statin+metformin",
//!     "T2D",
//!     vec!["bile_acid".into(), "bifidobacterium".into()],
//! );
//!
//! let config = MediationConfig::new().n_replicates(100).seed(7);
//! let runner = PairwiseMediationRunner::new(config.clone());
//! let records = runner.run(&features, &cohort, &context)?;
//! let table = aggregate(&records, config.failure_policy);
//! ```
//!
//! Runs are reproducible: the configured seed determines every simulation
//! draw, on the serial and the `parallel`-feature path alike.
//!
//! A single (pair, direction) unit can also be estimated directly with
//! [`MediationEstimator`] on an [`AnalysisDataset`].

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod error;
mod result;
mod runner;
mod tables;
mod types;

pub mod aggregate;
pub mod analysis;
pub mod output;
pub mod statistics;

pub use aggregate::{aggregate, ResultRow, ResultTable, COLUMNS};
pub use analysis::{MediationEstimator, RegressionFit};
pub use config::{FailurePolicy, MediationConfig};
pub use error::MediationError;
pub use result::{
    EffectEstimate, MediationErrorKind, MediationResult, PairOutcome, PairRecord,
};
pub use runner::{PairwiseMediationRunner, RunnerError};
pub use statistics::{spearman, Correlation};
pub use tables::{CohortTable, FeatureTable, PairContext};
pub use types::{AnalysisDataset, ModelSpec, Role};

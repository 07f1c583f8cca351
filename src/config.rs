//! Configuration for pairwise mediation runs.

use serde::{Deserialize, Serialize};

/// How failed (pair, direction) units appear in the aggregated table.
///
/// A failed unit must never surface as a partial numeric row; the only
/// choices are an explicit marker row or omission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// Emit a row carrying the unit's labels and the failure reason, with
    /// every numeric cell marked non-numeric. Default.
    MarkerRow,
    /// Leave failed units out of the table entirely.
    Omit,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        Self::MarkerRow
    }
}

/// Configuration options for a mediation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediationConfig {
    /// Number of simulation replicates per (pair, direction) unit.
    ///
    /// Default: 100. Each replicate draws one candidate coefficient vector
    /// per model, so the confidence bounds and p-values resolve to
    /// multiples of `1 / n_replicates`.
    pub n_replicates: usize,

    /// Base RNG seed.
    ///
    /// Every (pair, direction) unit and every replicate inside it derives
    /// its own counter-based seed from this value, so a run is reproducible
    /// bit for bit regardless of execution order. Default: 42.
    pub seed: u64,

    /// How failed units appear in the aggregated table.
    pub failure_policy: FailurePolicy,
}

impl Default for MediationConfig {
    fn default() -> Self {
        Self {
            n_replicates: 100,
            seed: 42,
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl MediationConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the replicate count.
    pub fn n_replicates(mut self, n: usize) -> Self {
        self.n_replicates = n;
        self
    }

    /// Set the base seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the failure policy.
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Check the configuration for values the run cannot work with.
    pub fn validate(&self) -> Result<(), String> {
        if self.n_replicates == 0 {
            return Err("n_replicates must be at least 1".to_string());
        }
        Ok(())
    }
}

//! Pairwise mediation runner.
//!
//! Drives the whole analysis for one eligibility context: join the feature
//! and cohort tables on sample identifier, restrict to the context's group,
//! then walk every unordered pair of eligible features and estimate the
//! mediation decomposition in both directions (each feature taken as the
//! mediator in turn), together with the rank-correlation summaries.
//!
//! Failures are isolated per (pair, direction) unit: a singular design or
//! an undersized dataset produces a failed record, never an aborted run.

use crate::analysis::MediationEstimator;
use crate::config::MediationConfig;
use crate::result::{MediationErrorKind, PairOutcome, PairRecord};
use crate::statistics::{counter_rng_seed, spearman};
use crate::tables::{CohortTable, FeatureTable, PairContext};
use crate::types::{AnalysisDataset, Role};

/// Input-shape problem that prevents a run from starting at all.
///
/// Distinct from [`crate::MediationError`]: estimation errors are recorded
/// per unit and the run continues, while a missing treatment column means
/// no unit could be built in the first place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerError {
    /// The context names a treatment column the cohort does not have.
    UnknownTreatment {
        /// The missing column name.
        column: String,
    },
}

impl std::fmt::Display for RunnerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownTreatment { column } => {
                write!(f, "cohort table has no exposure column named '{column}'")
            }
        }
    }
}

impl std::error::Error for RunnerError {}

/// Iterates eligible feature pairs and invokes the estimator on each.
#[derive(Debug, Clone, Default)]
pub struct PairwiseMediationRunner {
    config: MediationConfig,
}

impl PairwiseMediationRunner {
    /// Create a runner with the given configuration.
    pub fn new(config: MediationConfig) -> Self {
        Self { config }
    }

    /// The runner's configuration.
    pub fn config(&self) -> &MediationConfig {
        &self.config
    }

    /// Run the analysis for one eligibility context.
    ///
    /// Eligible features absent from the feature table are dropped before
    /// pair enumeration (the upstream eligibility list may name features
    /// that were not measured in this cohort). Pairs are enumerated as all
    /// i<j combinations of the remaining list, in list order; each pair
    /// yields two records, one per mediator direction.
    ///
    /// # Errors
    ///
    /// [`RunnerError::UnknownTreatment`] when the context's treatment
    /// column is not in the cohort table. Estimation failures do not
    /// surface here; they are recorded in the returned records.
    pub fn run(
        &self,
        features: &FeatureTable,
        cohort: &CohortTable,
        context: &PairContext,
    ) -> Result<Vec<PairRecord>, RunnerError> {
        let exposure = cohort
            .exposure(&context.treatment)
            .ok_or_else(|| RunnerError::UnknownTreatment {
                column: context.treatment.clone(),
            })?;

        let rows = cohort.group_rows(&context.group);
        let treatment: Vec<bool> = rows.iter().map(|&i| exposure[i]).collect();

        let eligible: Vec<&String> = context
            .features
            .iter()
            .filter(|name| {
                let present = features.has_feature(name);
                if !present {
                    log::debug!("feature '{name}' not in the feature table, dropped");
                }
                present
            })
            .collect();

        log::info!(
            "running mediation analysis for {} in group {}: {} eligible features, {} samples",
            context.combination,
            context.group,
            eligible.len(),
            treatment.len()
        );

        let mut records = Vec::new();
        let mut unit = 0u64;
        for i in 0..eligible.len() {
            for j in (i + 1)..eligible.len() {
                let name_a = eligible[i];
                let name_b = eligible[j];
                log::debug!("analyzing pair {name_a} / {name_b}");

                let values_a = self.gather(features, cohort, &rows, name_a);
                let values_b = self.gather(features, cohort, &rows, name_b);

                // Direction 1: A as outcome, B as mediator.
                records.push(self.run_unit(
                    context, name_a, name_b, &treatment, &values_a, &values_b, unit,
                ));
                unit += 1;

                // Direction 2: B as outcome, A as mediator.
                records.push(self.run_unit(
                    context, name_b, name_a, &treatment, &values_b, &values_a, unit,
                ));
                unit += 1;
            }
        }

        Ok(records)
    }

    /// Pull one feature's values for the selected cohort rows, aligned by
    /// sample identifier. Samples missing from the feature table come
    /// through as NaN and are zero-filled during dataset assembly.
    fn gather(
        &self,
        features: &FeatureTable,
        cohort: &CohortTable,
        rows: &[usize],
        feature: &str,
    ) -> Vec<f64> {
        rows.iter()
            .map(|&i| features.value(&cohort.sample_ids()[i], feature))
            .collect()
    }

    /// One (pair, direction) unit: estimate and summarize, or record the
    /// failure. At most one estimation is attempted; there is no retry.
    #[allow(clippy::too_many_arguments)]
    fn run_unit(
        &self,
        context: &PairContext,
        outcome_name: &str,
        mediator_name: &str,
        treatment: &[bool],
        outcome_values: &[f64],
        mediator_values: &[f64],
        unit: u64,
    ) -> PairRecord {
        let data = AnalysisDataset::new(treatment, outcome_values, mediator_values);

        let estimator = MediationEstimator::new(self.config.n_replicates)
            .with_seed(counter_rng_seed(self.config.seed, unit));

        let outcome = match estimator.estimate(&data) {
            Ok(mediation) => {
                let t = data.column(Role::Treatment);
                PairOutcome::Completed {
                    mediation,
                    treatment_outcome: spearman(t, data.column(Role::Outcome)),
                    treatment_mediator: spearman(t, data.column(Role::Mediator)),
                    outcome_mediator: spearman(
                        data.column(Role::Outcome),
                        data.column(Role::Mediator),
                    ),
                }
            }
            Err(err) => {
                log::debug!(
                    "pair {outcome_name} / {mediator_name} skipped: {err}"
                );
                PairOutcome::Failed {
                    error: MediationErrorKind::from(&err),
                    reason: err.to_string(),
                }
            }
        };

        PairRecord {
            combination: context.combination.clone(),
            group: context.group.clone(),
            outcome_feature: outcome_name.to_string(),
            mediator_feature: mediator_name.to_string(),
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MediationConfig;

    fn three_feature_setup() -> (FeatureTable, CohortTable, PairContext) {
        let ids: Vec<String> = (0..20).map(|i| format!("S{i}")).collect();
        let treated: Vec<bool> = (0..20).map(|i| i < 10).collect();

        // Features loosely tied to treatment, values fixed by index so the
        // test is deterministic without an RNG. Each feature gets its own
        // jitter sequence so no pair is exactly collinear.
        let f = |scale: f64, offset: f64, mult: usize, modulus: usize| -> Vec<f64> {
            (0..20)
                .map(|i: usize| {
                    let t = if i < 10 { 1.0 } else { 0.0 };
                    offset + scale * t + ((i * mult) % modulus) as f64 / modulus as f64
                })
                .collect()
        };

        let features = FeatureTable::new(ids.clone())
            .with_column("alpha", f(2.0, 1.0, 7, 13))
            .with_column("beta", f(1.5, 0.5, 5, 11))
            .with_column("gamma", f(0.5, 2.0, 3, 7));

        let cohort = CohortTable::new(ids, vec!["T2D".into(); 20]).with_exposure("combo", treated);

        let context = PairContext::new(
            "Combination: statin, metformin",
            "combo",
            "T2D",
            vec!["alpha".into(), "beta".into(), "gamma".into()],
        );

        (features, cohort, context)
    }

    #[test]
    fn enumerates_all_pairs_in_both_directions() {
        let (features, cohort, context) = three_feature_setup();
        let runner = PairwiseMediationRunner::new(MediationConfig::new().n_replicates(20));
        let records = runner.run(&features, &cohort, &context).unwrap();

        // 3 features -> 3 unordered pairs -> 6 directed records.
        assert_eq!(records.len(), 6);
        let directions: Vec<(&str, &str)> = records
            .iter()
            .map(|r| (r.outcome_feature.as_str(), r.mediator_feature.as_str()))
            .collect();
        assert_eq!(
            directions,
            vec![
                ("alpha", "beta"),
                ("beta", "alpha"),
                ("alpha", "gamma"),
                ("gamma", "alpha"),
                ("beta", "gamma"),
                ("gamma", "beta"),
            ]
        );
        assert!(records.iter().all(|r| r.outcome.is_completed()));
    }

    #[test]
    fn records_carry_context_labels() {
        let (features, cohort, context) = three_feature_setup();
        let runner = PairwiseMediationRunner::new(MediationConfig::new().n_replicates(10));
        let records = runner.run(&features, &cohort, &context).unwrap();
        assert!(records
            .iter()
            .all(|r| r.combination == "Combination: statin, metformin" && r.group == "T2D"));
    }

    #[test]
    fn missing_features_are_dropped_from_enumeration() {
        let (features, cohort, mut context) = three_feature_setup();
        context.features.push("unmeasured".into());
        let runner = PairwiseMediationRunner::new(MediationConfig::new().n_replicates(10));
        let records = runner.run(&features, &cohort, &context).unwrap();
        assert_eq!(records.len(), 6);
        assert!(records.iter().all(|r| r.outcome_feature != "unmeasured"));
    }

    #[test]
    fn unknown_treatment_column_is_an_input_error() {
        let (features, cohort, mut context) = three_feature_setup();
        context.treatment = "missing".into();
        let runner = PairwiseMediationRunner::new(MediationConfig::default());
        let err = runner.run(&features, &cohort, &context).unwrap_err();
        assert_eq!(
            err,
            RunnerError::UnknownTreatment {
                column: "missing".into()
            }
        );
    }

    #[test]
    fn group_filter_restricts_samples() {
        let ids: Vec<String> = (0..8).map(|i| format!("S{i}")).collect();
        let features = FeatureTable::new(ids.clone())
            .with_column("a", vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0])
            .with_column("b", vec![2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        // Only three samples in the requested group: too few rows, so both
        // directions must fail with InsufficientData, not abort.
        let groups = vec![
            "T2D".into(),
            "T2D".into(),
            "T2D".into(),
            "other".into(),
            "other".into(),
            "other".into(),
            "other".into(),
            "other".into(),
        ];
        let cohort = CohortTable::new(ids, groups)
            .with_exposure("combo", vec![true, false, true, false, true, false, true, false]);
        let context = PairContext::new("c", "combo", "T2D", vec!["a".into(), "b".into()]);

        let runner = PairwiseMediationRunner::new(MediationConfig::new().n_replicates(10));
        let records = runner.run(&features, &cohort, &context).unwrap();
        assert_eq!(records.len(), 2);
        for record in &records {
            match &record.outcome {
                PairOutcome::Failed { error, .. } => {
                    assert_eq!(*error, MediationErrorKind::InsufficientData);
                }
                PairOutcome::Completed { .. } => panic!("expected a failed unit"),
            }
        }
    }

    #[test]
    fn reversed_directions_report_identical_feature_correlation() {
        let (features, cohort, context) = three_feature_setup();
        let runner = PairwiseMediationRunner::new(MediationConfig::new().n_replicates(10));
        let records = runner.run(&features, &cohort, &context).unwrap();

        let corr = |r: &PairRecord| match &r.outcome {
            PairOutcome::Completed {
                outcome_mediator, ..
            } => *outcome_mediator,
            PairOutcome::Failed { .. } => panic!("expected completion"),
        };
        // records[0] is alpha/beta, records[1] is beta/alpha.
        assert_eq!(corr(&records[0]).rho.to_bits(), corr(&records[1]).rho.to_bits());
        assert_eq!(
            corr(&records[0]).p_value.to_bits(),
            corr(&records[1]).p_value.to_bits()
        );
    }
}

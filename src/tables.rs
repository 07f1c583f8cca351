//! In-memory input tables.
//!
//! The runner consumes three inputs, all indexed by sample identifier: a
//! numeric feature table, a cohort table with drug exposures and group
//! membership, and an eligibility context naming the features to pair up.
//! File parsing is a collaborator's job; these types only hold aligned
//! columns and answer lookups.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Sample-identifier-indexed numeric matrix, one column per measured
/// feature.
///
/// Missing measurements are represented as NaN; they are replaced with
/// zero only when a per-pair analysis dataset is assembled.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureTable {
    sample_ids: Vec<String>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    columns: HashMap<String, Vec<f64>>,
}

impl FeatureTable {
    /// Create an empty table over the given samples.
    pub fn new(sample_ids: Vec<String>) -> Self {
        let index = sample_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        Self {
            sample_ids,
            index,
            columns: HashMap::new(),
        }
    }

    /// Add a feature column.
    ///
    /// # Panics
    ///
    /// Panics if the column length does not match the sample count.
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        assert_eq!(
            values.len(),
            self.sample_ids.len(),
            "feature column length must match the sample count"
        );
        self.columns.insert(name.into(), values);
        self
    }

    /// Sample identifiers, in table order.
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Whether a feature column exists.
    pub fn has_feature(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// A feature's value for one sample; NaN when the sample is not in
    /// this table (it may still be in the cohort).
    pub fn value(&self, sample_id: &str, feature: &str) -> f64 {
        match (self.columns.get(feature), self.index.get(sample_id)) {
            (Some(column), Some(&i)) => column[i],
            _ => f64::NAN,
        }
    }
}

/// Sample-identifier-indexed treatment/group table: boolean drug-exposure
/// columns plus a group label per sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortTable {
    sample_ids: Vec<String>,
    groups: Vec<String>,
    exposures: HashMap<String, Vec<bool>>,
}

impl CohortTable {
    /// Create a cohort over the given samples and their group labels.
    ///
    /// # Panics
    ///
    /// Panics if the group column length does not match the sample count.
    pub fn new(sample_ids: Vec<String>, groups: Vec<String>) -> Self {
        assert_eq!(
            groups.len(),
            sample_ids.len(),
            "group column length must match the sample count"
        );
        Self {
            sample_ids,
            groups,
            exposures: HashMap::new(),
        }
    }

    /// Add a boolean drug-exposure column.
    ///
    /// # Panics
    ///
    /// Panics if the column length does not match the sample count.
    pub fn with_exposure(mut self, drug: impl Into<String>, exposed: Vec<bool>) -> Self {
        assert_eq!(
            exposed.len(),
            self.sample_ids.len(),
            "exposure column length must match the sample count"
        );
        self.exposures.insert(drug.into(), exposed);
        self
    }

    /// Derive a combination column: a sample counts as treated when it is
    /// exposed to both drugs.
    ///
    /// Returns `None` when either drug column is absent.
    pub fn combination(&self, drug_a: &str, drug_b: &str) -> Option<Vec<bool>> {
        let a = self.exposures.get(drug_a)?;
        let b = self.exposures.get(drug_b)?;
        Some(a.iter().zip(b).map(|(&x, &y)| x && y).collect())
    }

    /// Add a derived combination column under its own name.
    ///
    /// # Panics
    ///
    /// Panics if either source drug column is absent.
    pub fn with_combination(
        self,
        name: impl Into<String>,
        drug_a: &str,
        drug_b: &str,
    ) -> Self {
        let combined = self
            .combination(drug_a, drug_b)
            .expect("both drug columns must exist to derive a combination");
        self.with_exposure(name, combined)
    }

    /// Sample identifiers, in table order.
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// An exposure column by name.
    pub fn exposure(&self, drug: &str) -> Option<&[bool]> {
        self.exposures.get(drug).map(Vec::as_slice)
    }

    /// Row indices of the samples belonging to a group, in table order.
    pub fn group_rows(&self, group: &str) -> Vec<usize> {
        self.groups
            .iter()
            .enumerate()
            .filter(|(_, g)| g.as_str() == group)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Eligibility context for one drug-combination/sample-group analysis:
/// which treatment column to use, which group to keep, and which features
/// may be tested as outcome/mediator pairs.
///
/// Pair enumeration follows `features` order: all i<j combinations,
/// deterministic for a deterministic input list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairContext {
    /// Label identifying the drug combination in the output.
    pub combination: String,
    /// Name of the cohort exposure column holding the (possibly derived)
    /// treatment indicator.
    pub treatment: String,
    /// Sample group to restrict the analysis to.
    pub group: String,
    /// Eligible feature names, in enumeration order.
    pub features: Vec<String>,
}

impl PairContext {
    /// Create a context.
    pub fn new(
        combination: impl Into<String>,
        treatment: impl Into<String>,
        group: impl Into<String>,
        features: Vec<String>,
    ) -> Self {
        Self {
            combination: combination.into(),
            treatment: treatment.into(),
            group: group.into(),
            features,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("S{i}")).collect()
    }

    #[test]
    fn feature_lookup_by_sample_id() {
        let table = FeatureTable::new(ids(3)).with_column("glucose", vec![5.0, 6.0, 7.0]);
        assert_eq!(table.value("S1", "glucose"), 6.0);
        assert!(table.value("S9", "glucose").is_nan());
        assert!(table.value("S1", "unknown").is_nan());
        assert!(table.has_feature("glucose"));
    }

    #[test]
    fn combination_is_logical_and() {
        let cohort = CohortTable::new(ids(4), vec!["3".into(); 4])
            .with_exposure("statin", vec![true, true, false, false])
            .with_exposure("metformin", vec![true, false, true, false]);
        assert_eq!(
            cohort.combination("statin", "metformin").unwrap(),
            vec![true, false, false, false]
        );
        assert!(cohort.combination("statin", "aspirin").is_none());
    }

    #[test]
    fn with_combination_registers_a_column() {
        let cohort = CohortTable::new(ids(2), vec!["3".into(), "3".into()])
            .with_exposure("statin", vec![true, false])
            .with_exposure("aspirin", vec![true, true])
            .with_combination("statin+aspirin", "statin", "aspirin");
        assert_eq!(cohort.exposure("statin+aspirin").unwrap(), &[true, false]);
    }

    #[test]
    fn group_rows_preserve_table_order() {
        let cohort = CohortTable::new(
            ids(5),
            vec!["3".into(), "1".into(), "3".into(), "2".into(), "3".into()],
        );
        assert_eq!(cohort.group_rows("3"), vec![0, 2, 4]);
        assert_eq!(cohort.group_rows("1"), vec![1]);
        assert!(cohort.group_rows("9").is_empty());
    }

    #[test]
    #[should_panic(expected = "must match the sample count")]
    fn short_feature_column_panics() {
        FeatureTable::new(ids(3)).with_column("x", vec![1.0]);
    }
}

//! Random forest adapter: Implementation of Classifier over a JSON export.
//!
//! The export mirrors scikit-learn's `RandomForestClassifier` internals, one
//! entry per estimator taken from `estimator.tree_`:
//!
//! ```json
//! {
//!   "n_features": 15,
//!   "classes": [0, 1],
//!   "feature_names": ["treatment_delay_days", "bmi", "..."],
//!   "trees": [
//!     {
//!       "children_left":  [1, -1, -1],
//!       "children_right": [2, -1, -1],
//!       "feature":        [3, -2, -2],
//!       "threshold":      [54.5, -2.0, -2.0],
//!       "value":          [[40.0, 60.0], [30.0, 5.0], [10.0, 55.0]]
//!     }
//!   ]
//! }
//! ```
//!
//! Evaluation matches scikit-learn: a sample goes left when
//! `x[feature] <= threshold`, each leaf yields its normalized class
//! distribution, and the forest averages the distributions of all trees.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::FeatureVector;
use crate::ports::{Classifier, ModelError};

/// Marker scikit-learn uses for "no child" in `children_left`/`children_right`.
const TREE_LEAF: i64 = -1;

/// Upper bound on accepted estimators; larger exports are rejected as corrupt.
const MAX_TREES: usize = 10_000;

/// One decision tree in scikit-learn's parallel-array layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class counts (or fractions), one entry per class.
    pub value: Vec<Vec<f64>>,
}

/// Forest parameters exported from the training notebook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedForest {
    pub n_features: usize,
    pub classes: Vec<u8>,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub trees: Vec<ExportedTree>,
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Normalized class distribution at this leaf.
    Leaf { distribution: [f64; 2] },
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn from_export(index: usize, tree: &ExportedTree, n_features: usize) -> Result<Self, ModelError> {
        let invalid = |msg: String| ModelError::Invalid(format!("tree {index}: {msg}"));

        let n = tree.children_left.len();
        if n == 0 {
            return Err(invalid("no nodes".into()));
        }
        if tree.children_right.len() != n
            || tree.feature.len() != n
            || tree.threshold.len() != n
            || tree.value.len() != n
        {
            return Err(invalid("node array lengths differ".into()));
        }

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let left = tree.children_left[i];
            let right = tree.children_right[i];

            if left == TREE_LEAF || right == TREE_LEAF {
                if left != right {
                    return Err(invalid(format!("node {i} has a single child")));
                }
                let counts = &tree.value[i];
                if counts.len() != 2 {
                    return Err(invalid(format!(
                        "leaf {i} has {} class values, expected 2",
                        counts.len()
                    )));
                }
                let total: f64 = counts.iter().sum();
                if !total.is_finite() || total <= 0.0 || counts.iter().any(|c| *c < 0.0) {
                    return Err(invalid(format!("leaf {i} has invalid class values")));
                }
                nodes.push(Node::Leaf {
                    distribution: [counts[0] / total, counts[1] / total],
                });
                continue;
            }

            // scikit-learn always stores children after their parent, which
            // also rules out cycles.
            let child = |c: i64| -> Result<usize, ModelError> {
                usize::try_from(c)
                    .ok()
                    .filter(|&c| c > i && c < n)
                    .ok_or_else(|| invalid(format!("node {i} has out-of-order child {c}")))
            };
            let feature = usize::try_from(tree.feature[i])
                .ok()
                .filter(|&f| f < n_features)
                .ok_or_else(|| {
                    invalid(format!(
                        "node {i} splits on feature {} (model has {n_features})",
                        tree.feature[i]
                    ))
                })?;
            let threshold = tree.threshold[i];
            if !threshold.is_finite() {
                return Err(invalid(format!("node {i} has a non-finite threshold")));
            }

            nodes.push(Node::Split {
                feature,
                threshold,
                left: child(left)?,
                right: child(right)?,
            });
        }

        Ok(Self { nodes })
    }

    fn distribution(&self, x: &[f64]) -> [f64; 2] {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf { distribution } => return distribution,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x[feature] <= threshold { left } else { right };
                }
            }
        }
    }
}

/// Random forest binary classifier.
#[derive(Debug, Clone)]
pub struct RandomForestClassifier {
    n_features: usize,
    classes: [u8; 2],
    feature_names: Option<Vec<String>>,
    trees: Vec<Tree>,
}

impl RandomForestClassifier {
    /// Load a forest export from a JSON file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read, parsed, or fails validation.
    pub fn from_path(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path)?;
        let export: ExportedForest = serde_json::from_str(&content)?;
        let forest = Self::from_export(&export)?;

        tracing::info!(
            "Loaded random forest from {:?} (n_trees={}, n_features={})",
            path,
            forest.trees.len(),
            forest.n_features
        );

        Ok(forest)
    }

    /// Build a forest from already-parsed export parameters.
    ///
    /// # Errors
    /// Returns `ModelError::Invalid` if the export is inconsistent.
    pub fn from_export(export: &ExportedForest) -> Result<Self, ModelError> {
        if export.n_features == 0 {
            return Err(ModelError::Invalid("n_features must be positive".into()));
        }
        if export.trees.is_empty() || export.trees.len() > MAX_TREES {
            return Err(ModelError::Invalid(format!(
                "tree count {} outside [1, {MAX_TREES}]",
                export.trees.len()
            )));
        }
        let classes: [u8; 2] = export
            .classes
            .as_slice()
            .try_into()
            .map_err(|_| ModelError::Invalid("exactly two classes required".into()))?;
        if classes != [0, 1] {
            return Err(ModelError::Invalid(format!(
                "classes must be [0, 1], got {:?}",
                export.classes
            )));
        }
        if let Some(names) = &export.feature_names {
            if names.len() != export.n_features {
                return Err(ModelError::Invalid(format!(
                    "{} feature names for {} features",
                    names.len(),
                    export.n_features
                )));
            }
        }

        let trees = export
            .trees
            .iter()
            .enumerate()
            .map(|(i, t)| Tree::from_export(i, t, export.n_features))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            n_features: export.n_features,
            classes,
            feature_names: export.feature_names.clone(),
            trees,
        })
    }

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    fn check_len(&self, features: &FeatureVector) -> Result<(), ModelError> {
        if features.len() != self.n_features {
            return Err(ModelError::FeatureCount {
                expected: self.n_features,
                actual: features.len(),
            });
        }
        Ok(())
    }

    /// Per-class mean of the tree distributions, like `predict_proba` in
    /// scikit-learn.
    fn mean_distribution(&self, features: &FeatureVector) -> Result<[f64; 2], ModelError> {
        self.check_len(features)?;
        let x = features.values();
        let sum = self.trees.iter().fold([0.0, 0.0], |acc, t| {
            let d = t.distribution(x);
            [acc[0] + d[0], acc[1] + d[1]]
        });
        let n = self.trees.len() as f64;
        Ok([sum[0] / n, sum[1] / n])
    }
}

impl Classifier for RandomForestClassifier {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn predict(&self, features: &FeatureVector) -> Result<u8, ModelError> {
        let [p0, p1] = self.mean_distribution(features)?;
        // argmax over [p0, p1]; ties go to the first class
        Ok(if p1 > p0 {
            self.classes[1]
        } else {
            self.classes[0]
        })
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        Ok(self.mean_distribution(features)?[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{encode, FeatureSchema, PatientInput};
    use tempfile::tempdir;

    /// Stump splitting on one column: left leaf (30, 10), right leaf (5, 15).
    fn stump(feature: i64, threshold: f64) -> ExportedTree {
        ExportedTree {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![feature, -2, -2],
            threshold: vec![threshold, -2.0, -2.0],
            value: vec![vec![35.0, 25.0], vec![30.0, 10.0], vec![5.0, 15.0]],
        }
    }

    fn export(trees: Vec<ExportedTree>) -> ExportedForest {
        ExportedForest {
            n_features: 2,
            classes: vec![0, 1],
            feature_names: Some(vec!["age".into(), "bmi".into()]),
            trees,
        }
    }

    fn vector(age: u32, bmi: f64) -> FeatureVector {
        let schema = FeatureSchema::new(["age", "bmi"]).expect("schema");
        encode(
            &PatientInput {
                age,
                bmi,
                ..PatientInput::default()
            },
            &schema,
        )
    }

    #[test]
    fn test_single_tree_follows_sklearn_split_rule() {
        let forest = RandomForestClassifier::from_export(&export(vec![stump(0, 50.0)]))
            .expect("valid forest");

        // age == threshold goes left
        let left = forest.predict_proba(&vector(50, 22.5)).expect("predict");
        assert!((left - 0.25).abs() < 1e-12);
        assert_eq!(forest.predict(&vector(50, 22.5)).expect("predict"), 0);

        let right = forest.predict_proba(&vector(51, 22.5)).expect("predict");
        assert!((right - 0.75).abs() < 1e-12);
        assert_eq!(forest.predict(&vector(51, 22.5)).expect("predict"), 1);
    }

    fn leaf_only(negative: f64, positive: f64) -> ExportedTree {
        ExportedTree {
            children_left: vec![-1],
            children_right: vec![-1],
            feature: vec![-2],
            threshold: vec![-2.0],
            value: vec![vec![negative, positive]],
        }
    }

    #[test]
    fn test_predict_compares_averaged_class_columns() {
        // Averaged separately: p0 = 0.49999999999999994, p1 = 0.5.
        let forest = RandomForestClassifier::from_export(&export(vec![
            leaf_only(1.0, 1.0),
            leaf_only(2.0, 1.0),
            leaf_only(1.0, 2.0),
        ]))
        .expect("valid forest");

        let p1 = forest.predict_proba(&vector(40, 22.5)).expect("predict");
        assert_eq!(p1, 0.5);
        assert_eq!(forest.predict(&vector(40, 22.5)).expect("predict"), 1);
    }

    #[test]
    fn test_forest_averages_tree_distributions() {
        let forest =
            RandomForestClassifier::from_export(&export(vec![stump(0, 50.0), stump(1, 30.0)]))
                .expect("valid forest");
        assert_eq!(forest.n_trees(), 2);

        // tree 0 right (0.75), tree 1 left (0.25)
        let p = forest.predict_proba(&vector(60, 22.5)).expect("predict");
        assert!((p - 0.5).abs() < 1e-12);
        // exact tie resolves to class 0
        assert_eq!(forest.predict(&vector(60, 22.5)).expect("predict"), 0);
    }

    #[test]
    fn test_rejects_wrong_feature_count() {
        let forest = RandomForestClassifier::from_export(&export(vec![stump(0, 50.0)]))
            .expect("valid forest");
        let schema = FeatureSchema::new(["age"]).expect("schema");
        let v = encode(&PatientInput::default(), &schema);

        assert!(matches!(
            forest.predict_proba(&v),
            Err(ModelError::FeatureCount {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_rejects_malformed_exports() {
        let mut bad_feature = stump(0, 50.0);
        bad_feature.feature[0] = 7;
        assert!(RandomForestClassifier::from_export(&export(vec![bad_feature])).is_err());

        let mut backwards = stump(0, 50.0);
        backwards.children_left[0] = 0;
        assert!(RandomForestClassifier::from_export(&export(vec![backwards])).is_err());

        let mut one_child = stump(0, 50.0);
        one_child.children_right[1] = 2;
        assert!(RandomForestClassifier::from_export(&export(vec![one_child])).is_err());

        let mut short = stump(0, 50.0);
        short.threshold.pop();
        assert!(RandomForestClassifier::from_export(&export(vec![short])).is_err());

        assert!(RandomForestClassifier::from_export(&export(vec![])).is_err());

        let mut three_classes = export(vec![stump(0, 50.0)]);
        three_classes.classes = vec![0, 1, 2];
        assert!(RandomForestClassifier::from_export(&three_classes).is_err());
    }

    #[test]
    fn test_load_from_json_file() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("random_forest_model.json");
        let json = serde_json::to_string(&export(vec![stump(0, 50.0)])).expect("serialize");
        std::fs::write(&path, json).expect("write model");

        let forest = RandomForestClassifier::from_path(&path).expect("load forest");
        assert_eq!(forest.n_features(), 2);
        assert_eq!(
            forest.feature_names().map(<[String]>::len),
            Some(2)
        );

        std::fs::write(&path, "{not json").expect("write garbage");
        assert!(matches!(
            RandomForestClassifier::from_path(&path),
            Err(ModelError::Parse(_))
        ));
    }
}

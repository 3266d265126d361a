//! Probabilistic classifiers over binary symptom features.
//!
//! Models are exported from training as JSON, tagged by `kind`:
//!
//! - `logistic_regression`: linear scores, softmax (or sigmoid for one row)
//! - `bernoulli_nb`: Bernoulli naive Bayes over present/absent symptoms
//! - `random_forest`: averaged class distributions of decision tree leaves

use serde::Deserialize;
use thiserror::Error;

/// A trained model producing one probability per class.
pub trait Classifier: Send + Sync {
    /// Number of classes in the output distribution.
    fn n_classes(&self) -> usize;

    /// Expected feature vector length.
    fn n_features(&self) -> usize;

    /// Class probabilities for a single feature vector, indexed by class.
    fn predict_proba(&self, features: &[f64]) -> Vec<f64>;
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("classifier JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("classifier must have at least 2 classes, found {0}")]
    TooFewClasses(usize),

    #[error("malformed classifier: {0}")]
    Shape(String),
}

fn shape(msg: impl Into<String>) -> ModelError {
    ModelError::Shape(msg.into())
}

/// Any supported model, as stored in the classifier artifact.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierModel {
    LogisticRegression(LogisticRegression),
    BernoulliNb(BernoulliNb),
    RandomForest(RandomForest),
}

impl ClassifierModel {
    /// Parse and validate a classifier artifact.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ModelError> {
        let model: Self = serde_json::from_slice(bytes)?;
        model.validate()?;
        Ok(model)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::LogisticRegression(_) => "logistic_regression",
            Self::BernoulliNb(_) => "bernoulli_nb",
            Self::RandomForest(_) => "random_forest",
        }
    }

    /// Check internal shape consistency.
    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            Self::LogisticRegression(m) => m.validate(),
            Self::BernoulliNb(m) => m.validate(),
            Self::RandomForest(m) => m.validate(),
        }
    }

    fn inner(&self) -> &dyn Classifier {
        match self {
            Self::LogisticRegression(m) => m,
            Self::BernoulliNb(m) => m,
            Self::RandomForest(m) => m,
        }
    }
}

impl Classifier for ClassifierModel {
    fn n_classes(&self) -> usize {
        self.inner().n_classes()
    }

    fn n_features(&self) -> usize {
        self.inner().n_features()
    }

    fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        self.inner().predict_proba(features)
    }
}

// ── Logistic regression ──

/// Linear model: one coefficient row per class, or a single row for a
/// binary model where the row scores class 1.
#[derive(Debug, Clone, Deserialize)]
pub struct LogisticRegression {
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
}

impl LogisticRegression {
    fn validate(&self) -> Result<(), ModelError> {
        let Some(first) = self.coef.first() else {
            return Err(shape("logistic regression has no coefficient rows"));
        };
        if self.intercept.len() != self.coef.len() {
            return Err(shape(format!(
                "{} intercepts for {} coefficient rows",
                self.intercept.len(),
                self.coef.len()
            )));
        }
        if let Some((row, r)) = self
            .coef
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != first.len())
        {
            return Err(shape(format!(
                "coefficient row {row} has {} features, expected {}",
                r.len(),
                first.len()
            )));
        }
        Ok(())
    }
}

impl Classifier for LogisticRegression {
    fn n_classes(&self) -> usize {
        if self.coef.len() == 1 { 2 } else { self.coef.len() }
    }

    fn n_features(&self) -> usize {
        self.coef.first().map_or(0, |r| r.len())
    }

    fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        let scores: Vec<f64> = self
            .coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, b)| b + dot(row, features))
            .collect();

        if let [z] = scores.as_slice() {
            let p = sigmoid(*z);
            return vec![1.0 - p, p];
        }
        softmax(&scores)
    }
}

// ── Bernoulli naive Bayes ──

/// Naive Bayes over binary features, stored as log probabilities.
///
/// `feature_log_prob[c][j]` is `log P(symptom j present | class c)`.
#[derive(Debug, Clone, Deserialize)]
pub struct BernoulliNb {
    pub class_log_prior: Vec<f64>,
    pub feature_log_prob: Vec<Vec<f64>>,
}

impl BernoulliNb {
    fn validate(&self) -> Result<(), ModelError> {
        let n_classes = self.class_log_prior.len();
        if n_classes < 2 {
            return Err(ModelError::TooFewClasses(n_classes));
        }
        if self.feature_log_prob.len() != n_classes {
            return Err(shape(format!(
                "{} feature rows for {n_classes} classes",
                self.feature_log_prob.len()
            )));
        }
        let n_features = self.n_features();
        if self.feature_log_prob.iter().any(|r| r.len() != n_features) {
            return Err(shape("feature_log_prob rows differ in length"));
        }
        if self.feature_log_prob.iter().flatten().any(|&lp| lp.is_nan() || lp > 0.0) {
            return Err(shape("feature_log_prob holds a log probability above 0"));
        }
        Ok(())
    }
}

impl Classifier for BernoulliNb {
    fn n_classes(&self) -> usize {
        self.class_log_prior.len()
    }

    fn n_features(&self) -> usize {
        self.feature_log_prob.first().map_or(0, |r| r.len())
    }

    fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        let jll: Vec<f64> = self
            .class_log_prior
            .iter()
            .zip(&self.feature_log_prob)
            .map(|(prior, log_probs)| {
                let likelihood: f64 = log_probs
                    .iter()
                    .zip(features)
                    // A certain symptom has log_absent = -inf; never scale it by 0.
                    .map(|(&lp, &x)| if x > 0.0 { lp } else { (-lp.exp()).ln_1p() })
                    .sum();
                prior + likelihood
            })
            .collect();

        softmax(&jll)
    }
}

// ── Random forest ──

/// Ensemble of decision trees; probabilities are the mean of each tree's
/// normalized leaf distribution.
#[derive(Debug, Clone, Deserialize)]
pub struct RandomForest {
    pub n_classes: usize,
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

/// A decision tree as flat node arrays.
///
/// Node 0 is the root. A node is a leaf when `children_left` is `-1`.
/// Internal nodes go left when `features[feature] <= threshold`.
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights (counts or fractions).
    pub value: Vec<Vec<f64>>,
}

const LEAF: i64 = -1;

impl RandomForest {
    fn validate(&self) -> Result<(), ModelError> {
        if self.n_classes < 2 {
            return Err(ModelError::TooFewClasses(self.n_classes));
        }
        if self.trees.is_empty() {
            return Err(shape("random forest has no trees"));
        }
        for (t, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_classes, self.n_features)
                .map_err(|e| shape(format!("tree {t}: {e}")))?;
        }
        Ok(())
    }
}

impl DecisionTree {
    fn validate(&self, n_classes: usize, n_features: usize) -> Result<(), String> {
        let n = self.children_left.len();
        if n == 0 {
            return Err("no nodes".into());
        }
        if [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ]
        .iter()
        .any(|&len| len != n)
        {
            return Err("node arrays differ in length".into());
        }

        for node in 0..n {
            if self.value[node].len() != n_classes {
                return Err(format!(
                    "node {node} has {} class weights, expected {n_classes}",
                    self.value[node].len()
                ));
            }
            if self.value[node].iter().any(|w| !w.is_finite() || *w < 0.0) {
                return Err(format!("node {node} has a negative or non-finite class weight"));
            }
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF {
                continue;
            }
            // Children always follow their parent, so every walk terminates.
            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(format!("node {node} has invalid child {child}"));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(format!("node {node} splits on unknown feature {feature}"));
            }
        }
        Ok(())
    }

    fn leaf_for(&self, features: &[f64]) -> usize {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let x = features
                .get(self.feature[node] as usize)
                .copied()
                .unwrap_or(0.0);
            node = if x <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        node
    }
}

impl Classifier for RandomForest {
    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        let mut probs = vec![0.0; self.n_classes];
        for tree in &self.trees {
            let weights = &tree.value[tree.leaf_for(features)];
            let total: f64 = weights.iter().sum();
            if total > 0.0 {
                for (p, w) in probs.iter_mut().zip(weights) {
                    *p += w / total;
                }
            }
        }
        let n_trees = self.trees.len() as f64;
        for p in &mut probs {
            *p /= n_trees;
        }
        probs
    }
}

// ── Numeric helpers ──

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Softmax with max subtraction. All `-inf` scores give all zeros.
fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return vec![0.0; scores.len()];
    }
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_distribution(probs: &[f64]) {
        let sum: f64 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9, "probabilities sum to {sum}");
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn logistic_multinomial_softmax() {
        let model = ClassifierModel::from_json_slice(
            br#"{
                "kind": "logistic_regression",
                "coef": [[2.0, 0.0], [0.0, 2.0], [0.0, 0.0]],
                "intercept": [0.0, 0.0, 0.5]
            }"#,
        )
        .unwrap();
        assert_eq!(model.kind(), "logistic_regression");
        assert_eq!(model.n_classes(), 3);
        assert_eq!(model.n_features(), 2);

        let probs = model.predict_proba(&[1.0, 0.0]);
        assert_distribution(&probs);
        assert!(probs[0] > probs[1] && probs[0] > probs[2]);

        // No features: only the intercepts matter.
        let prior = model.predict_proba(&[0.0, 0.0]);
        assert!(prior[2] > prior[0]);
        assert!((prior[0] - prior[1]).abs() < 1e-12);
    }

    #[test]
    fn logistic_binary_uses_sigmoid() {
        let model = LogisticRegression {
            coef: vec![vec![3.0]],
            intercept: vec![0.0],
        };
        assert_eq!(model.n_classes(), 2);

        let at_zero = model.predict_proba(&[0.0]);
        assert!((at_zero[0] - 0.5).abs() < 1e-12);
        assert!((at_zero[1] - 0.5).abs() < 1e-12);

        let present = model.predict_proba(&[1.0]);
        assert_distribution(&present);
        assert!((present[1] - sigmoid(3.0)).abs() < 1e-12);
    }

    #[test]
    fn logistic_rejects_mismatched_intercepts() {
        let err = ClassifierModel::from_json_slice(
            br#"{"kind": "logistic_regression", "coef": [[1.0], [2.0]], "intercept": [0.0]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::Shape(_)), "{err}");
    }

    #[test]
    fn logistic_rejects_ragged_rows() {
        let err = ClassifierModel::from_json_slice(
            br#"{"kind": "logistic_regression", "coef": [[1.0, 2.0], [2.0]], "intercept": [0.0, 0.0]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("row 1"), "{err}");
    }

    #[test]
    fn bernoulli_nb_matches_hand_computation() {
        let p_present = [[0.8_f64, 0.1], [0.2, 0.6]];
        let prior = [0.5_f64, 0.5];
        let model = BernoulliNb {
            class_log_prior: prior.iter().map(|p| p.ln()).collect(),
            feature_log_prob: p_present
                .iter()
                .map(|row| row.iter().map(|p| p.ln()).collect())
                .collect(),
        };
        ClassifierModel::BernoulliNb(model.clone()).validate().unwrap();

        // x = [1, 0]: class 0 ∝ 0.5·0.8·0.9, class 1 ∝ 0.5·0.2·0.4
        let probs = model.predict_proba(&[1.0, 0.0]);
        let a = 0.5 * 0.8 * 0.9;
        let b = 0.5 * 0.2 * 0.4;
        assert!((probs[0] - a / (a + b)).abs() < 1e-9);
        assert!((probs[1] - b / (a + b)).abs() < 1e-9);
    }

    #[test]
    fn bernoulli_nb_rejects_single_class() {
        let err = ClassifierModel::from_json_slice(
            br#"{"kind": "bernoulli_nb", "class_log_prior": [0.0], "feature_log_prob": [[-0.5]]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::TooFewClasses(1)));
    }

    #[test]
    fn bernoulli_nb_rejects_positive_log_prob() {
        let err = ClassifierModel::from_json_slice(
            br#"{
                "kind": "bernoulli_nb",
                "class_log_prior": [-0.7, -0.7],
                "feature_log_prob": [[0.3], [-0.5]]
            }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::Shape(_)));
    }

    #[test]
    fn bernoulli_nb_certain_symptom_stays_finite() {
        let model = ClassifierModel::from_json_slice(
            br#"{
                "kind": "bernoulli_nb",
                "class_log_prior": [-0.6931, -0.6931],
                "feature_log_prob": [[0.0, -1.0, -1.0], [-0.5, -1.0, -1.0]]
            }"#,
        )
        .unwrap();

        let present = model.predict_proba(&[1.0, 0.0, 0.0]);
        assert_distribution(&present);
        assert!(present[0] > present[1]);

        // Class 0 always shows symptom 0, so its absence rules class 0 out.
        let absent = model.predict_proba(&[0.0, 1.0, 0.0]);
        assert_eq!(absent[0], 0.0);
        assert!((absent[1] - 1.0).abs() < 1e-12);
    }

    fn stump(split_feature: i64, left: [f64; 2], right: [f64; 2]) -> DecisionTree {
        DecisionTree {
            children_left: vec![1, LEAF, LEAF],
            children_right: vec![2, LEAF, LEAF],
            feature: vec![split_feature, -2, -2],
            threshold: vec![0.5, -2.0, -2.0],
            value: vec![vec![5.0, 5.0], left.to_vec(), right.to_vec()],
        }
    }

    #[test]
    fn random_forest_averages_leaf_distributions() {
        let forest = RandomForest {
            n_classes: 2,
            n_features: 2,
            trees: vec![stump(0, [4.0, 0.0], [1.0, 3.0]), stump(1, [2.0, 2.0], [0.0, 8.0])],
        };
        ClassifierModel::RandomForest(forest.clone()).validate().unwrap();

        // Tree 1 goes right → [0.25, 0.75]; tree 2 goes left → [0.5, 0.5].
        let probs = forest.predict_proba(&[1.0, 0.0]);
        assert!((probs[0] - 0.375).abs() < 1e-12);
        assert!((probs[1] - 0.625).abs() < 1e-12);
        assert_distribution(&probs);
    }

    #[test]
    fn random_forest_rejects_backward_child() {
        let mut tree = stump(0, [1.0, 0.0], [0.0, 1.0]);
        tree.children_right[0] = 0;
        let forest = ClassifierModel::RandomForest(RandomForest {
            n_classes: 2,
            n_features: 1,
            trees: vec![tree],
        });
        let err = forest.validate().unwrap_err();
        assert!(err.to_string().contains("invalid child"), "{err}");
    }

    #[test]
    fn random_forest_rejects_negative_leaf_weight() {
        let forest = ClassifierModel::RandomForest(RandomForest {
            n_classes: 2,
            n_features: 1,
            trees: vec![stump(0, [-1.0, 2.0], [0.0, 1.0])],
        });
        let err = forest.validate().unwrap_err();
        assert!(err.to_string().contains("node 1"), "{err}");

        let forest = ClassifierModel::RandomForest(RandomForest {
            n_classes: 2,
            n_features: 1,
            trees: vec![stump(0, [1.0, 0.0], [f64::NAN, 1.0])],
        });
        assert!(forest.validate().is_err());
    }

    #[test]
    fn random_forest_rejects_unknown_split_feature() {
        let forest = ClassifierModel::RandomForest(RandomForest {
            n_classes: 2,
            n_features: 1,
            trees: vec![stump(3, [1.0, 0.0], [0.0, 1.0])],
        });
        assert!(forest.validate().is_err());
    }

    #[test]
    fn parses_random_forest_json() {
        let model = ClassifierModel::from_json_slice(
            br#"{
                "kind": "random_forest",
                "n_classes": 2,
                "n_features": 1,
                "trees": [{
                    "children_left": [1, -1, -1],
                    "children_right": [2, -1, -1],
                    "feature": [0, -2, -2],
                    "threshold": [0.5, -2.0, -2.0],
                    "value": [[3.0, 3.0], [3.0, 0.0], [0.0, 3.0]]
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(model.predict_proba(&[0.0]), vec![1.0, 0.0]);
        assert_eq!(model.predict_proba(&[1.0]), vec![0.0, 1.0]);
    }

    #[test]
    fn unknown_kind_is_json_error() {
        let err = ClassifierModel::from_json_slice(br#"{"kind": "svm"}"#).unwrap_err();
        assert!(matches!(err, ModelError::Json(_)));
    }

    #[test]
    fn softmax_of_all_negative_infinity_is_zero() {
        assert_eq!(
            softmax(&[f64::NEG_INFINITY, f64::NEG_INFINITY]),
            vec![0.0, 0.0]
        );
    }
}

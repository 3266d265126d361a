//! Top-2 disease prediction from a symptom selection.

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::debug;
use triage_core::{PredictionEntry, PredictionResult, round_percent};

use crate::AiError;
use crate::bundle::ArtifactBundle;
use crate::loader::ArtifactLoader;

/// Answers prediction requests from whatever the loader currently holds.
///
/// Cheap to clone and safe to share across threads; each call works on an
/// immutable snapshot of the bundle.
#[derive(Clone)]
pub struct Predictor {
    loader: Arc<ArtifactLoader>,
}

impl Predictor {
    pub fn new(loader: Arc<ArtifactLoader>) -> Self {
        Self { loader }
    }

    pub fn loader(&self) -> &ArtifactLoader {
        &self.loader
    }

    /// Rank the two most probable diagnoses for the selected symptoms.
    ///
    /// Fails with [`AiError::NotLoaded`] until the loader has loaded.
    pub fn predict<S: AsRef<str>>(&self, selected: &[S]) -> Result<PredictionResult, AiError> {
        if !self.loader.is_loaded() {
            return Err(AiError::NotLoaded);
        }
        let bundle = self.loader.bundle().ok_or(AiError::NotLoaded)?;
        rank_top_two(&bundle, selected)
    }
}

/// Score a symptom selection against a bundle and return the top two classes.
///
/// Symptoms missing from the vocabulary are ignored. The two percentages are
/// rescaled to sum to 100 unless both raw probabilities are zero. Equal
/// probabilities keep class index order, which is not a stable contract
/// across retrained models.
pub fn rank_top_two<S: AsRef<str>>(
    bundle: &ArtifactBundle,
    selected: &[S],
) -> Result<PredictionResult, AiError> {
    let features = bundle.vocabulary().feature_vector(selected);
    let probs = bundle.classifier().predict_proba(&features);

    let expected = bundle.labels().len();
    if probs.len() != expected {
        return Err(AiError::Inference {
            expected,
            got: probs.len(),
        });
    }

    let mut order: Vec<usize> = (0..probs.len()).collect();
    order.sort_by(|&a, &b| probs[b].partial_cmp(&probs[a]).unwrap_or(Ordering::Equal));
    let (top, runner_up) = (order[0], order[1]);

    let mut p1 = probs[top] * 100.0;
    let mut p2 = probs[runner_up] * 100.0;
    let total = p1 + p2;
    if total > 0.0 {
        p1 = p1 / total * 100.0;
        p2 = p2 / total * 100.0;
    }

    let label = |idx: usize| {
        bundle
            .labels()
            .inverse_transform(idx)
            .map(str::to_string)
            .ok_or(AiError::Inference {
                expected,
                got: probs.len(),
            })
    };

    let result = PredictionResult {
        predictions: [
            PredictionEntry {
                disease: label(top)?,
                probability: round_percent(p1),
            },
            PredictionEntry {
                disease: label(runner_up)?,
                probability: round_percent(p2),
            },
        ],
    };
    debug!(
        matched = features.iter().filter(|&&x| x > 0.0).count(),
        top = %result.first().disease,
        total = result.total_percent(),
        "prediction ranked"
    );
    Ok(result)
}

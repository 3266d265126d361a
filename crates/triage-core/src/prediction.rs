//! Prediction result types returned by the predictor.

use serde::{Deserialize, Serialize};

/// One ranked diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionEntry {
    pub disease: String,
    /// Confidence in percent, rounded to 2 decimal places.
    pub probability: f64,
}

/// The top two diagnoses, most probable first.
///
/// Serializes as `{"predictions": [..]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predictions: [PredictionEntry; 2],
}

impl PredictionResult {
    pub fn first(&self) -> &PredictionEntry {
        &self.predictions[0]
    }

    pub fn second(&self) -> &PredictionEntry {
        &self.predictions[1]
    }

    /// Sum of both percentages: 100 (within rounding) or 0.
    pub fn total_percent(&self) -> f64 {
        self.predictions.iter().map(|p| p.probability).sum()
    }
}

/// Round a percentage to 2 decimal places, ties to even.
pub fn round_percent(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

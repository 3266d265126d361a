//! Symptom vocabulary and binary feature vectors.
//!
//! The vocabulary is the ordered list of symptom names the classifier was
//! trained on. A symptom's position in the list is its feature index, so the
//! order must match training exactly; nothing here can verify that.

use std::collections::HashMap;

use thiserror::Error;

/// Binary feature vector: one entry per vocabulary position, each 0.0 or 1.0.
pub type FeatureVector = Vec<f64>;

#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("vocabulary is empty")]
    Empty,

    #[error("duplicate symptom {symptom:?} at positions {first} and {second}")]
    Duplicate {
        symptom: String,
        first: usize,
        second: usize,
    },

    #[error("vocabulary JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Ordered, duplicate-free list of symptom names.
#[derive(Debug, Clone)]
pub struct SymptomVocabulary {
    symptoms: Vec<String>,
    index: HashMap<String, usize>,
}

impl SymptomVocabulary {
    /// Build a vocabulary, rejecting empty lists and repeated names.
    pub fn new(symptoms: Vec<String>) -> Result<Self, VocabularyError> {
        if symptoms.is_empty() {
            return Err(VocabularyError::Empty);
        }

        let mut index = HashMap::with_capacity(symptoms.len());
        for (pos, symptom) in symptoms.iter().enumerate() {
            if let Some(&first) = index.get(symptom) {
                return Err(VocabularyError::Duplicate {
                    symptom: symptom.clone(),
                    first,
                    second: pos,
                });
            }
            index.insert(symptom.clone(), pos);
        }

        Ok(Self { symptoms, index })
    }

    /// Parse a vocabulary from a JSON array of strings (`symptoms.json`).
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, VocabularyError> {
        let symptoms: Vec<String> = serde_json::from_slice(bytes)?;
        Self::new(symptoms)
    }

    pub fn len(&self) -> usize {
        self.symptoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty()
    }

    /// Feature index of a symptom, if known.
    pub fn index_of(&self, symptom: &str) -> Option<usize> {
        self.index.get(symptom).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.symptoms.iter().map(|s| s.as_str())
    }

    /// Encode a symptom selection as a binary feature vector.
    ///
    /// Unknown symptoms are ignored. Order and repetition in `selected` do
    /// not affect the result.
    pub fn feature_vector<S: AsRef<str>>(&self, selected: &[S]) -> FeatureVector {
        let mut features = vec![0.0; self.symptoms.len()];
        for symptom in selected {
            if let Some(idx) = self.index_of(symptom.as_ref()) {
                features[idx] = 1.0;
            }
        }
        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(names: &[&str]) -> SymptomVocabulary {
        SymptomVocabulary::new(names.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn feature_vector_marks_known_symptoms() {
        let v = vocab(&["fever", "cough", "rash"]);
        assert_eq!(
            v.feature_vector(&["fever", "rash", "unknownX"]),
            vec![1.0, 0.0, 1.0]
        );
    }

    #[test]
    fn unknown_only_gives_zero_vector() {
        let v = vocab(&["fever", "cough", "rash"]);
        assert_eq!(v.feature_vector(&["sneezing", ""]), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn empty_selection_gives_zero_vector() {
        let v = vocab(&["fever", "cough"]);
        let none: [&str; 0] = [];
        assert_eq!(v.feature_vector(&none), vec![0.0, 0.0]);
    }

    #[test]
    fn duplicates_and_order_are_irrelevant() {
        let v = vocab(&["fever", "cough", "rash"]);
        let a = v.feature_vector(&["rash", "fever"]);
        let b = v.feature_vector(&["fever", "fever", "rash", "rash", "fever"]);
        assert_eq!(a, b);
    }

    #[test]
    fn matching_is_exact() {
        let v = vocab(&["high_fever"]);
        assert_eq!(v.feature_vector(&["High_Fever", " high_fever"]), vec![0.0]);
    }

    #[test]
    fn index_follows_list_order() {
        let v = vocab(&["fever", "cough", "rash"]);
        assert_eq!(v.index_of("fever"), Some(0));
        assert_eq!(v.index_of("rash"), Some(2));
        assert_eq!(v.index_of("headache"), None);
        assert_eq!(v.iter().collect::<Vec<_>>(), ["fever", "cough", "rash"]);
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(
            SymptomVocabulary::new(vec![]),
            Err(VocabularyError::Empty)
        ));
    }

    #[test]
    fn rejects_duplicates() {
        let err = SymptomVocabulary::new(vec!["fever".into(), "cough".into(), "fever".into()])
            .unwrap_err();
        match err {
            VocabularyError::Duplicate {
                symptom,
                first,
                second,
            } => {
                assert_eq!(symptom, "fever");
                assert_eq!((first, second), (0, 2));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn parses_json_array() {
        let v = SymptomVocabulary::from_json_slice(br#"["fever", "joint_pain"]"#).unwrap();
        assert_eq!(v.len(), 2);
        assert_eq!(v.index_of("joint_pain"), Some(1));
    }

    #[test]
    fn rejects_non_array_json() {
        let err = SymptomVocabulary::from_json_slice(br#"{"fever": 0}"#).unwrap_err();
        assert!(matches!(err, VocabularyError::Json(_)));
    }
}

use triage_core::SymptomVocabulary;

use crate::AiError;
use crate::classifier::Classifier;
use crate::labels::LabelEncoder;

/// Everything inference needs, loaded together and never mutated.
pub struct ArtifactBundle {
    classifier: Box<dyn Classifier>,
    labels: LabelEncoder,
    vocabulary: SymptomVocabulary,
}

impl ArtifactBundle {
    /// Assemble a bundle, checking that the three artifacts agree.
    ///
    /// The classifier must take one feature per vocabulary entry and emit
    /// one probability per encoded label, with at least two classes.
    pub fn new(
        classifier: Box<dyn Classifier>,
        labels: LabelEncoder,
        vocabulary: SymptomVocabulary,
    ) -> Result<Self, AiError> {
        if classifier.n_classes() < 2 {
            return Err(AiError::load(
                "classifier",
                format!("expected at least 2 classes, found {}", classifier.n_classes()),
            ));
        }
        if classifier.n_classes() != labels.len() {
            return Err(AiError::load(
                "classifier",
                format!(
                    "classifier has {} classes but the label encoder has {}",
                    classifier.n_classes(),
                    labels.len()
                ),
            ));
        }
        if classifier.n_features() != vocabulary.len() {
            return Err(AiError::load(
                "classifier",
                format!(
                    "classifier expects {} features but the vocabulary has {} symptoms",
                    classifier.n_features(),
                    vocabulary.len()
                ),
            ));
        }

        Ok(Self {
            classifier,
            labels,
            vocabulary,
        })
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn labels(&self) -> &LabelEncoder {
        &self.labels
    }

    pub fn vocabulary(&self) -> &SymptomVocabulary {
        &self.vocabulary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::LogisticRegression;

    fn vocab(n: usize) -> SymptomVocabulary {
        SymptomVocabulary::new((0..n).map(|i| format!("s{i}")).collect()).unwrap()
    }

    fn labels(n: usize) -> LabelEncoder {
        LabelEncoder::new((0..n).map(|i| format!("d{i}")).collect()).unwrap()
    }

    fn model(classes: usize, features: usize) -> Box<dyn Classifier> {
        Box::new(LogisticRegression {
            coef: vec![vec![0.0; features]; classes],
            intercept: vec![0.0; classes],
        })
    }

    #[test]
    fn accepts_matching_artifacts() {
        let bundle = ArtifactBundle::new(model(3, 4), labels(3), vocab(4)).unwrap();
        assert_eq!(bundle.vocabulary().len(), 4);
        assert_eq!(bundle.labels().len(), 3);
        assert_eq!(bundle.classifier().n_classes(), 3);
    }

    #[test]
    fn rejects_feature_count_mismatch() {
        let err = ArtifactBundle::new(model(3, 5), labels(3), vocab(4))
            .err()
            .unwrap();
        assert!(err.to_string().contains("5 features"), "{err}");
    }

    #[test]
    fn rejects_class_count_mismatch() {
        let err = ArtifactBundle::new(model(3, 4), labels(2), vocab(4))
            .err()
            .unwrap();
        assert!(matches!(err, AiError::Load { .. }));
    }
}

pub mod artifact;
pub mod prediction;
pub mod vocabulary;

pub use artifact::{ArtifactNames, ReadinessState};
pub use prediction::{PredictionEntry, PredictionResult, round_percent};
pub use vocabulary::{FeatureVector, SymptomVocabulary, VocabularyError};

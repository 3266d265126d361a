//! Inference layer: artifact loading, readiness gating, and top-2 prediction.

mod bundle;
pub mod classifier;
mod error;
pub mod labels;
pub mod loader;
pub mod predictor;

pub use bundle::ArtifactBundle;
pub use classifier::{Classifier, ClassifierModel};
pub use error::AiError;
pub use labels::LabelEncoder;
pub use loader::{ArtifactLoader, LoaderStatus};
pub use predictor::{Predictor, rank_top_two};

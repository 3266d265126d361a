use thiserror::Error;
use triage_store::StoreError;

#[derive(Debug, Error)]
pub enum AiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to load {artifact}: {reason}")]
    Load { artifact: String, reason: String },

    #[error("model artifacts are not loaded")]
    NotLoaded,

    #[error("classifier returned {got} probabilities for {expected} classes")]
    Inference { expected: usize, got: usize },
}

impl AiError {
    pub(crate) fn load(artifact: &str, reason: impl ToString) -> Self {
        Self::Load {
            artifact: artifact.to_string(),
            reason: reason.to_string(),
        }
    }
}

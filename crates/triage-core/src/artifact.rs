//! Artifact naming and loader readiness.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CLASSIFIER_FILE: &str = "viral_disease_model.json";
pub const DEFAULT_LABEL_ENCODER_FILE: &str = "label_encoder.json";
pub const DEFAULT_VOCABULARY_FILE: &str = "symptoms.json";

/// File names of the three artifacts needed for inference.
///
/// Each name is resolved against the local artifact directory, and appended
/// to the remote base URL when the file has to be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNames {
    pub classifier: String,
    pub label_encoder: String,
    pub vocabulary: String,
}

impl Default for ArtifactNames {
    fn default() -> Self {
        Self {
            classifier: DEFAULT_CLASSIFIER_FILE.to_string(),
            label_encoder: DEFAULT_LABEL_ENCODER_FILE.to_string(),
            vocabulary: DEFAULT_VOCABULARY_FILE.to_string(),
        }
    }
}

impl ArtifactNames {
    /// All three names, in load order.
    pub fn all(&self) -> [&str; 3] {
        [&self.classifier, &self.label_encoder, &self.vocabulary]
    }
}

/// Where the loader is in its lifecycle.
///
/// `Unloaded → Loading → Loaded | Failed`. `Loaded` and `Failed` hold until
/// another load is requested, which moves back to `Loading`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessState {
    #[default]
    Unloaded,
    Loading,
    Loaded,
    Failed,
}

impl ReadinessState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unloaded => "unloaded",
            Self::Loading => "loading",
            Self::Loaded => "loaded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ReadinessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_names() {
        let names = ArtifactNames::default();
        assert_eq!(
            names.all(),
            ["viral_disease_model.json", "label_encoder.json", "symptoms.json"]
        );
    }

    #[test]
    fn readiness_defaults_to_unloaded() {
        assert_eq!(ReadinessState::default(), ReadinessState::Unloaded);
    }

    #[test]
    fn readiness_serializes_snake_case() {
        let json = serde_json::to_string(&ReadinessState::Loaded).unwrap();
        assert_eq!(json, r#""loaded""#);
        assert_eq!(ReadinessState::Failed.to_string(), "failed");
    }
}

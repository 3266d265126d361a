//! Label encoder: maps classifier class indices to disease names.
//!
//! Stored as `{"classes": [...]}` where position `i` is the label of class
//! `i` in the classifier's output.

use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LabelError {
    #[error("label encoder JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("label encoder has no classes")]
    Empty,

    #[error("duplicate class label {0:?}")]
    Duplicate(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Result<Self, LabelError> {
        let encoder = Self { classes };
        encoder.validate()?;
        Ok(encoder)
    }

    /// Parse and validate a label encoder artifact.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, LabelError> {
        let encoder: Self = serde_json::from_slice(bytes)?;
        encoder.validate()?;
        Ok(encoder)
    }

    fn validate(&self) -> Result<(), LabelError> {
        if self.classes.is_empty() {
            return Err(LabelError::Empty);
        }
        let mut seen = HashSet::with_capacity(self.classes.len());
        for label in &self.classes {
            if !seen.insert(label.as_str()) {
                return Err(LabelError::Duplicate(label.clone()));
            }
        }
        Ok(())
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Disease name for a class index.
    pub fn inverse_transform(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(|s| s.as_str())
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(|s| s.as_str())
    }
}

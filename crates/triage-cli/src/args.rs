//! Command-line arguments and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use triage_core::ArtifactNames;
use triage_core::artifact::{
    DEFAULT_CLASSIFIER_FILE, DEFAULT_LABEL_ENCODER_FILE, DEFAULT_VOCABULARY_FILE,
};
use triage_store::StoreConfig;

/// Top-2 disease prediction from observed symptoms.
#[derive(Parser, Debug)]
#[command(name = "triage", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub artifacts: ArtifactArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Where model artifacts come from.
#[derive(Args, Debug, Clone)]
pub struct ArtifactArgs {
    /// Local directory holding the model artifacts
    #[arg(long, env = "TRIAGE_ARTIFACT_DIR", default_value = "artifacts")]
    pub artifact_dir: PathBuf,

    /// Base URL of the remote artifact store (local-only when unset)
    #[arg(long, env = "TRIAGE_ARTIFACT_URL")]
    pub remote_url: Option<String>,

    /// Timeout for each artifact download, in seconds
    #[arg(
        long,
        env = "TRIAGE_FETCH_TIMEOUT_SECS",
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub fetch_timeout_secs: u64,

    /// Classifier artifact file name
    #[arg(long, default_value = DEFAULT_CLASSIFIER_FILE)]
    pub classifier_file: String,

    /// Label encoder artifact file name
    #[arg(long, default_value = DEFAULT_LABEL_ENCODER_FILE)]
    pub label_encoder_file: String,

    /// Symptom vocabulary artifact file name
    #[arg(long, default_value = DEFAULT_VOCABULARY_FILE)]
    pub vocabulary_file: String,
}

impl ArtifactArgs {
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            local_dir: self.artifact_dir.clone(),
            remote_base_url: self.remote_url.clone(),
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
        }
    }

    pub fn names(&self) -> ArtifactNames {
        ArtifactNames {
            classifier: self.classifier_file.clone(),
            label_encoder: self.label_encoder_file.clone(),
            vocabulary: self.vocabulary_file.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download any missing artifacts and print their local paths
    Fetch,

    /// Load the artifacts and report readiness as JSON
    Status,

    /// List the symptoms the model understands
    Symptoms,

    /// Predict the two most likely diseases for a set of symptoms
    Predict {
        /// Observed symptoms, as named in the vocabulary
        #[arg(required = true, num_args = 1..)]
        symptoms: Vec<String>,
    },

    /// Answer JSON-lines requests (`{"symptoms": [...]}`) from stdin
    Batch,
}

//! Artifact loader: the single owner of the loaded model state.
//!
//! Holds the readiness state machine and the [`ArtifactBundle`]. Loads are
//! serialized by an async guard; readers take a cheap `Arc` snapshot of the
//! bundle and never block a load for longer than a pointer copy.

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{error, info};
use triage_core::{ArtifactNames, ReadinessState, SymptomVocabulary};
use triage_store::ArtifactStore;

use crate::AiError;
use crate::bundle::ArtifactBundle;
use crate::classifier::{Classifier, ClassifierModel};
use crate::labels::LabelEncoder;

#[derive(Default)]
struct LoaderState {
    readiness: ReadinessState,
    bundle: Option<Arc<ArtifactBundle>>,
    loaded_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

/// Point-in-time view of the loader for status reporting.
#[derive(Debug, Clone, Serialize)]
pub struct LoaderStatus {
    pub readiness: ReadinessState,
    pub loaded: bool,
    pub symptoms: Option<usize>,
    pub classes: Option<usize>,
    pub loaded_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Loads the classifier, label encoder, and vocabulary exactly once per
/// request and guards every consumer against use before load.
pub struct ArtifactLoader {
    store: ArtifactStore,
    names: ArtifactNames,
    state: RwLock<LoaderState>,
    load_guard: Mutex<()>,
}

impl ArtifactLoader {
    pub fn new(store: ArtifactStore, names: ArtifactNames) -> Self {
        Self {
            store,
            names,
            state: RwLock::new(LoaderState::default()),
            load_guard: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn names(&self) -> &ArtifactNames {
        &self.names
    }

    /// Load all artifacts, replacing any previous state.
    ///
    /// Concurrent calls run one after another. On failure the state is
    /// `Failed` and the error is returned; calling `load` again retries.
    pub async fn load(&self) -> Result<(), AiError> {
        let _guard = self.load_guard.lock().await;
        self.load_locked().await
    }

    /// Load unless already loaded.
    ///
    /// A caller that waited on an in-flight load sees its result instead of
    /// starting a second one.
    pub async fn ensure_loaded(&self) -> Result<(), AiError> {
        if self.is_loaded() {
            return Ok(());
        }
        let _guard = self.load_guard.lock().await;
        if self.is_loaded() {
            return Ok(());
        }
        self.load_locked().await
    }

    /// Whether predictions can be served. Never panics.
    pub fn is_loaded(&self) -> bool {
        self.state
            .read()
            .map(|s| {
                s.readiness == ReadinessState::Loaded
                    && s.bundle.as_ref().is_some_and(|b| !b.vocabulary().is_empty())
            })
            .unwrap_or(false)
    }

    pub fn readiness(&self) -> ReadinessState {
        self.state
            .read()
            .map(|s| s.readiness)
            .unwrap_or(ReadinessState::Failed)
    }

    /// Shared handle to the loaded bundle, if loaded.
    pub fn bundle(&self) -> Option<Arc<ArtifactBundle>> {
        let state = self.state.read().ok()?;
        if state.readiness != ReadinessState::Loaded {
            return None;
        }
        state.bundle.clone()
    }

    pub fn status(&self) -> LoaderStatus {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let bundle = state.bundle.as_ref();
        LoaderStatus {
            readiness: state.readiness,
            loaded: state.readiness == ReadinessState::Loaded
                && bundle.is_some_and(|b| !b.vocabulary().is_empty()),
            symptoms: bundle.map(|b| b.vocabulary().len()),
            classes: bundle.map(|b| b.labels().len()),
            loaded_at: state.loaded_at,
            last_error: state.last_error.clone(),
        }
    }

    async fn load_locked(&self) -> Result<(), AiError> {
        self.update(|s| {
            s.readiness = ReadinessState::Loading;
            s.bundle = None;
            s.loaded_at = None;
            s.last_error = None;
        });

        info!(dir = %self.store.local_dir().display(), "loading model artifacts");
        match self.read_bundle().await {
            Ok(bundle) => {
                info!(
                    symptoms = bundle.vocabulary().len(),
                    classes = bundle.labels().len(),
                    "model artifacts loaded"
                );
                self.update(|s| {
                    s.readiness = ReadinessState::Loaded;
                    s.bundle = Some(Arc::new(bundle));
                    s.loaded_at = Some(Utc::now());
                });
                Ok(())
            }
            Err(e) => {
                let retriable = matches!(&e, AiError::Store(s) if s.is_retriable());
                error!(error = %e, retriable, "failed to load model artifacts");
                self.update(|s| {
                    s.readiness = ReadinessState::Failed;
                    s.last_error = Some(e.to_string());
                });
                Err(e)
            }
        }
    }

    async fn read_bundle(&self) -> Result<ArtifactBundle, AiError> {
        let names = &self.names;

        let classifier_path = self.store.ensure_local(&names.classifier).await?;
        let labels_path = self.store.ensure_local(&names.label_encoder).await?;
        let vocabulary_path = self.store.ensure_local(&names.vocabulary).await?;

        let classifier = ClassifierModel::from_json_slice(
            &read_artifact(&names.classifier, &classifier_path).await?,
        )
        .map_err(|e| AiError::load(&names.classifier, e))?;
        info!(
            kind = classifier.kind(),
            classes = classifier.n_classes(),
            path = %classifier_path.display(),
            "classifier deserialized"
        );

        let labels = LabelEncoder::from_json_slice(
            &read_artifact(&names.label_encoder, &labels_path).await?,
        )
        .map_err(|e| AiError::load(&names.label_encoder, e))?;

        let vocabulary = SymptomVocabulary::from_json_slice(
            &read_artifact(&names.vocabulary, &vocabulary_path).await?,
        )
        .map_err(|e| AiError::load(&names.vocabulary, e))?;

        ArtifactBundle::new(Box::new(classifier), labels, vocabulary).map_err(|e| match e {
            AiError::Load { reason, .. } => AiError::load(&names.classifier, reason),
            other => other,
        })
    }

    fn update(&self, f: impl FnOnce(&mut LoaderState)) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut state);
    }
}

async fn read_artifact(name: &str, path: &Path) -> Result<Vec<u8>, AiError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| AiError::load(name, format!("reading {}: {e}", path.display())))
}

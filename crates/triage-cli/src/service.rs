//! Service boundary: startup hook, status probe, and request handling.
//!
//! Core errors never abort the process here. They become `{"error": ...}`
//! payloads so callers always get a structured answer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};
use triage_ai::{AiError, ArtifactLoader, Predictor};
use triage_core::{PredictionResult, ReadinessState};

const SERVICE_NAME: &str = "triage";

/// Load artifacts once at startup. Failure is logged, not propagated.
pub async fn startup(loader: &ArtifactLoader) -> bool {
    match loader.ensure_loaded().await {
        Ok(()) => {
            info!("model artifacts loaded on startup");
            true
        }
        Err(e) => {
            warn!(error = %e, "failed to load model artifacts on startup; predictions unavailable");
            false
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SymptomRequest {
    pub symptoms: Vec<String>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Response {
    Prediction(PredictionResult),
    Error { error: String },
}

impl Response {
    fn error(msg: impl ToString) -> Self {
        Self::Error {
            error: msg.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// Answer one prediction request.
pub fn respond(predictor: &Predictor, symptoms: &[String]) -> Response {
    if symptoms.is_empty() {
        return Response::error("Symptoms array required");
    }
    match predictor.predict(symptoms) {
        Ok(result) => Response::Prediction(result),
        Err(AiError::NotLoaded) => Response::error(
            "model artifacts are not loaded; the service is not ready to predict",
        ),
        Err(e) => Response::error(e),
    }
}

/// Readiness probe payload.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub service: &'static str,
    pub status: &'static str,
    pub ready: bool,
    pub readiness: ReadinessState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symptoms: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn status_report(loader: &ArtifactLoader) -> StatusReport {
    let status = loader.status();
    StatusReport {
        service: SERVICE_NAME,
        status: "running",
        ready: status.loaded,
        readiness: status.readiness,
        symptoms: status.symptoms,
        classes: status.classes,
        loaded_at: status.loaded_at,
        error: status.last_error,
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct BatchStats {
    pub answered: usize,
    pub failed: usize,
}

/// Read JSON-lines requests and write one JSON response line for each.
///
/// Blank lines are skipped. Malformed lines get an error response and the
/// batch carries on.
pub async fn run_batch<R, W>(
    predictor: &Predictor,
    input: R,
    mut output: W,
) -> anyhow::Result<BatchStats>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut stats = BatchStats::default();
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<SymptomRequest>(line) {
            Ok(req) => respond(predictor, &req.symptoms),
            Err(e) => Response::error(format!("invalid request: {e}")),
        };
        if response.is_error() {
            stats.failed += 1;
        } else {
            stats.answered += 1;
        }

        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');
        output.write_all(&encoded).await?;
    }
    output.flush().await?;

    info!(answered = stats.answered, failed = stats.failed, "batch complete");
    Ok(stats)
}

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("artifact {name} not found at {path} and no remote artifact store is configured")]
    MissingArtifact { name: String, path: PathBuf },

    #[error("fetching {url} failed: {cause}")]
    RemoteFetch {
        url: String,
        status: Option<u16>,
        cause: String,
    },

    #[error("HTTP client error: {0}")]
    Client(#[source] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Whether a later attempt could succeed without a configuration change.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::RemoteFetch { .. } | Self::Io(_))
    }
}

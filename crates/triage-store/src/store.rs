//! Local artifact directory backed by an optional remote store.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};
use triage_core::ArtifactNames;

use crate::StoreError;
use crate::http::RemoteSource;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Where artifacts live and where to get them when they are missing.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub local_dir: PathBuf,
    /// Base URL of the remote artifact store. `None` means local-only.
    pub remote_base_url: Option<String>,
    pub fetch_timeout: Duration,
}

impl StoreConfig {
    pub fn local(local_dir: impl Into<PathBuf>) -> Self {
        Self {
            local_dir: local_dir.into(),
            remote_base_url: None,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_remote(mut self, base_url: impl Into<String>) -> Self {
        self.remote_base_url = Some(base_url.into());
        self
    }
}

/// Makes sure artifacts are present on local storage.
///
/// A file already in the local directory is always used as is. Missing files
/// are downloaded from the remote store when one is configured.
pub struct ArtifactStore {
    local_dir: PathBuf,
    remote: Option<RemoteSource>,
}

impl ArtifactStore {
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        let remote = config
            .remote_base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(|url| RemoteSource::new(url, config.fetch_timeout))
            .transpose()?;

        Ok(Self {
            local_dir: config.local_dir,
            remote,
        })
    }

    pub fn local_dir(&self) -> &Path {
        &self.local_dir
    }

    /// Remote base URL, if remote fetch is enabled.
    pub fn remote_base(&self) -> Option<&str> {
        self.remote.as_ref().map(|r| r.base_url())
    }

    /// Path an artifact is expected at locally.
    pub fn local_path(&self, name: &str) -> PathBuf {
        self.local_dir.join(name)
    }

    /// Ensure an artifact exists locally, fetching it if needed.
    ///
    /// Returns the local path. Fails with [`StoreError::MissingArtifact`]
    /// when the file is absent and no remote is configured, or
    /// [`StoreError::RemoteFetch`] when the download fails.
    pub async fn ensure_local(&self, name: &str) -> Result<PathBuf, StoreError> {
        let path = self.local_path(name);
        if tokio::fs::try_exists(&path).await? {
            debug!(artifact = name, path = %path.display(), "artifact present locally");
            return Ok(path);
        }

        let Some(remote) = &self.remote else {
            return Err(StoreError::MissingArtifact {
                name: name.to_string(),
                path,
            });
        };

        tokio::fs::create_dir_all(&self.local_dir).await?;
        remote.download(name, &path).await?;
        Ok(path)
    }

    /// Ensure all three artifacts exist locally, in load order.
    pub async fn ensure_all(&self, names: &ArtifactNames) -> Result<Vec<PathBuf>, StoreError> {
        let mut paths = Vec::with_capacity(3);
        for name in names.all() {
            paths.push(self.ensure_local(name).await?);
        }
        info!(dir = %self.local_dir.display(), "all artifacts present");
        Ok(paths)
    }
}

//! HTTP client for the remote artifact store.

use std::path::Path;
use std::time::Duration;

use futures::StreamExt;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::StoreError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Remote artifact store reachable over HTTP.
///
/// Artifacts live at `{base_url}/{name}`.
pub struct RemoteSource {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteSource {
    /// Create a client for the given base URL.
    ///
    /// Trailing slashes are trimmed. `timeout` bounds each whole download.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(timeout)
            .build()
            .map_err(StoreError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL an artifact is fetched from.
    pub fn url_for(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }

    /// Stream an artifact into `dest`.
    ///
    /// Bytes go to a temporary file in `dest`'s directory which is renamed
    /// into place only after the whole body has been written and synced. On
    /// any failure the temporary file is removed and `dest` is untouched.
    pub async fn download(&self, name: &str, dest: &Path) -> Result<u64, StoreError> {
        let url = self.url_for(name);
        let fetch_err = |status: Option<u16>, cause: String| StoreError::RemoteFetch {
            url: url.clone(),
            status,
            cause,
        };

        info!(url = %url, dest = %dest.display(), "fetching artifact");
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| fetch_err(e.status().map(|s| s.as_u16()), e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(url = %url, status = status.as_u16(), "artifact store returned an error");
            let cause = if body.is_empty() {
                format!("HTTP {status}")
            } else {
                format!("HTTP {status}: {}", body.trim())
            };
            return Err(fetch_err(Some(status.as_u16()), cause));
        }

        let dir = dest.parent().unwrap_or_else(|| Path::new("."));
        let tmp = NamedTempFile::new_in(dir)?;
        let mut file = tokio::fs::File::from_std(tmp.reopen()?);
        let mut written = 0u64;

        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| fetch_err(Some(status.as_u16()), e.to_string()))?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        file.flush().await?;
        file.sync_all().await?;
        drop(file);
        tmp.persist(dest).map_err(|e| StoreError::Io(e.error))?;

        info!(url = %url, bytes = written, "artifact stored");
        Ok(written)
    }
}

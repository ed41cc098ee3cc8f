//! Remote fetcher: Implementation of ArtifactFetcher over HTTP(S) and local files.

use std::io::Read;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

use crate::ports::{ArtifactError, ArtifactFetcher, RemoteRef};

/// Refuse bodies larger than this; model exports are a few MiB at most.
const MAX_ARTIFACT_BYTES: u64 = 512 * 1024 * 1024;

/// Fetches artifacts with a blocking HTTP client, or copies local mirrors.
///
/// A single attempt is made per call; failures surface immediately.
pub struct RemoteFetcher {
    client: Client,
}

impl RemoteFetcher {
    /// Create a fetcher whose HTTP requests time out after `timeout`.
    ///
    /// # Errors
    /// Returns `ArtifactError::Download` if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, ArtifactError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("medpredict/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ArtifactError::Download {
                remote: "<client>".into(),
                reason: e.to_string(),
            })?;
        Ok(Self { client })
    }

    fn fetch_http(&self, remote: &RemoteRef, url: &str) -> Result<Vec<u8>, ArtifactError> {
        let download_error = |reason: String| ArtifactError::Download {
            remote: remote.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| download_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(download_error(format!("HTTP {status}")));
        }

        // Drive answers unknown or quota-limited files with an HTML page.
        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("text/html"));
        if is_html {
            return Err(download_error(
                "server returned an HTML page instead of the artifact".into(),
            ));
        }

        let mut body = Vec::new();
        response
            .take(MAX_ARTIFACT_BYTES + 1)
            .read_to_end(&mut body)
            .map_err(|e| download_error(e.to_string()))?;
        if body.len() as u64 > MAX_ARTIFACT_BYTES {
            return Err(download_error(format!(
                "artifact exceeds {MAX_ARTIFACT_BYTES} bytes"
            )));
        }

        Ok(body)
    }
}

impl ArtifactFetcher for RemoteFetcher {
    fn fetch(&self, remote: &RemoteRef) -> Result<Vec<u8>, ArtifactError> {
        match remote {
            RemoteRef::File(path) => std::fs::read(path).map_err(|e| ArtifactError::Download {
                remote: remote.to_string(),
                reason: e.to_string(),
            }),
            RemoteRef::Http(_) | RemoteRef::GoogleDrive { .. } => {
                let url = remote.download_location();
                tracing::debug!("GET {}", url);
                self.fetch_http(remote, &url)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::artifacts::ArtifactResolver;
    use tempfile::tempdir;

    #[test]
    fn test_local_mirror_is_copied() {
        let temp = tempdir().expect("tempdir");
        let mirror = temp.path().join("mirror.json");
        std::fs::write(&mirror, b"[\"age\"]").expect("write mirror");
        let target = temp.path().join("model_features.json");

        let fetcher = RemoteFetcher::new(Duration::from_secs(5)).expect("client");
        let resolver = ArtifactResolver::new(fetcher);
        let remote = RemoteRef::parse(&format!("file://{}", mirror.display())).expect("remote");
        resolver.ensure_local(&target, &remote).expect("resolve");

        assert_eq!(std::fs::read(&target).expect("read"), b"[\"age\"]");
    }

    #[test]
    fn test_missing_local_mirror_is_download_error() {
        let temp = tempdir().expect("tempdir");
        let fetcher = RemoteFetcher::new(Duration::from_secs(5)).expect("client");
        let remote = RemoteRef::File(temp.path().join("absent.json"));

        assert!(matches!(
            fetcher.fetch(&remote),
            Err(ArtifactError::Download { .. })
        ));
    }
}

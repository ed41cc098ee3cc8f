//! Artifact resolution: make model artifacts available on local disk.
//!
//! An artifact that already exists locally is used as-is. A missing one is
//! fetched once, written to a `.part` file beside its target and renamed into
//! place, so a failed download never leaves a truncated artifact behind.

mod fetcher;

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::ports::{ArtifactError, ArtifactFetcher, RemoteRef};

pub use fetcher::RemoteFetcher;

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    target.with_file_name(name)
}

/// Resolves artifacts to local paths, downloading through `F` when absent.
pub struct ArtifactResolver<F: ArtifactFetcher> {
    fetcher: F,
}

impl<F: ArtifactFetcher> ArtifactResolver<F> {
    #[must_use]
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Return `path`, fetching it from `remote` first if it does not exist.
    ///
    /// Idempotent: an existing file is never re-fetched or modified.
    ///
    /// # Errors
    /// Returns `ArtifactError::Download` if the file is missing and the fetch fails.
    pub fn ensure_local(&self, path: &Path, remote: &RemoteRef) -> Result<PathBuf, ArtifactError> {
        self.ensure_local_checked(path, remote, None)
    }

    /// Like [`ensure_local`](Self::ensure_local), additionally requiring the
    /// downloaded bytes to hash to `expected_sha256` (hex, case-insensitive).
    ///
    /// Only fresh downloads are checked; an existing local file is trusted.
    ///
    /// # Errors
    /// Returns `ArtifactError::ChecksumMismatch` if the digest differs, in
    /// which case nothing is written.
    pub fn ensure_local_checked(
        &self,
        path: &Path,
        remote: &RemoteRef,
        expected_sha256: Option<&str>,
    ) -> Result<PathBuf, ArtifactError> {
        if path.exists() {
            tracing::debug!("Artifact present at {:?}, skipping download", path);
            return Ok(path.to_path_buf());
        }

        tracing::info!("Artifact missing at {:?}, fetching from {}", path, remote);
        let bytes = self.fetcher.fetch(remote)?;

        if let Some(expected) = expected_sha256 {
            let actual = sha256_hex(&bytes);
            if !actual.eq_ignore_ascii_case(expected.trim()) {
                return Err(ArtifactError::ChecksumMismatch {
                    remote: remote.to_string(),
                    expected: expected.trim().to_ascii_lowercase(),
                    actual,
                });
            }
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let partial = partial_path(path);
        if let Err(e) = fs::write(&partial, &bytes).and_then(|()| fs::rename(&partial, path)) {
            let _ = fs::remove_file(&partial);
            return Err(e.into());
        }

        tracing::info!("Stored artifact at {:?} ({} bytes)", path, bytes.len());
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    /// Serves fixed bytes (or fails) and counts calls.
    struct StubFetcher {
        body: Option<Vec<u8>>,
        calls: AtomicUsize,
    }

    impl StubFetcher {
        fn serving(body: &[u8]) -> Self {
            Self {
                body: Some(body.to_vec()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                body: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl ArtifactFetcher for StubFetcher {
        fn fetch(&self, remote: &RemoteRef) -> Result<Vec<u8>, ArtifactError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.body.clone().ok_or_else(|| ArtifactError::Download {
                remote: remote.to_string(),
                reason: "connection refused".into(),
            })
        }
    }

    fn remote() -> RemoteRef {
        RemoteRef::Http("https://models.example.org/model_features.json".into())
    }

    #[test]
    fn test_existing_file_is_not_fetched() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("model_features.json");
        fs::write(&path, b"[\"age\"]").expect("write");

        let resolver = ArtifactResolver::new(StubFetcher::failing());
        let resolved = resolver.ensure_local(&path, &remote()).expect("resolve");

        assert_eq!(resolved, path);
        assert_eq!(resolver.fetcher.calls.load(Ordering::SeqCst), 0);
        assert_eq!(fs::read(&path).expect("read"), b"[\"age\"]");
    }

    #[test]
    fn test_missing_file_is_fetched_once() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("model_features.json");

        let resolver = ArtifactResolver::new(StubFetcher::serving(b"[\"age\", \"bmi\"]"));
        resolver.ensure_local(&path, &remote()).expect("first resolve");
        resolver.ensure_local(&path, &remote()).expect("second resolve");

        assert_eq!(resolver.fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fs::read(&path).expect("read"), b"[\"age\", \"bmi\"]");
        assert!(!partial_path(&path).exists());
    }

    #[test]
    fn test_failed_fetch_is_download_error() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("random_forest_model.json");

        let resolver = ArtifactResolver::new(StubFetcher::failing());
        let err = resolver.ensure_local(&path, &remote()).expect_err("should fail");

        assert!(matches!(err, ArtifactError::Download { .. }));
        assert!(!path.exists());
        assert!(!partial_path(&path).exists());
    }

    #[test]
    fn test_checksum_mismatch_discards_download() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("random_forest_model.json");
        let body = b"{\"n_features\": 1}";

        let resolver = ArtifactResolver::new(StubFetcher::serving(body));
        let err = resolver
            .ensure_local_checked(&path, &remote(), Some("0".repeat(64).as_str()))
            .expect_err("should fail");
        assert!(matches!(err, ArtifactError::ChecksumMismatch { .. }));
        assert!(!path.exists());

        let digest = sha256_hex(body).to_ascii_uppercase();
        resolver
            .ensure_local_checked(&path, &remote(), Some(digest.as_str()))
            .expect("matching digest");
        assert!(path.exists());
    }

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("/data/model.json")),
            PathBuf::from("/data/model.json.part")
        );
    }
}

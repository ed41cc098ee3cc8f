//! Artifact fetcher port: Trait for retrieving model artifacts from a remote.

use std::fmt;
use std::path::PathBuf;

/// Errors raised while resolving an artifact.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Download of {remote} failed: {reason}")]
    Download { remote: String, reason: String },

    #[error("Checksum mismatch for {remote}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        remote: String,
        expected: String,
        actual: String,
    },

    #[error("Unsupported remote reference: {0}")]
    InvalidRemote(String),

    #[error("Artifact IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where an artifact can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteRef {
    /// Plain HTTP(S) URL
    Http(String),
    /// Google Drive file, fetched through the direct-download endpoint
    GoogleDrive { file_id: String },
    /// Local file (offline mirror)
    File(PathBuf),
}

const DRIVE_HOST: &str = "drive.google.com";

impl RemoteRef {
    /// Parse a remote reference.
    ///
    /// Drive share links (`/file/d/<id>/view`, `open?id=<id>`, `uc?id=<id>`)
    /// are recognized; other `http(s)` URLs are used verbatim; `file://` URLs
    /// and absolute or relative paths refer to local files.
    ///
    /// # Errors
    /// Returns `ArtifactError::InvalidRemote` for empty or unsupported references.
    pub fn parse(raw: &str) -> Result<Self, ArtifactError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ArtifactError::InvalidRemote("empty reference".into()));
        }

        if let Some(path) = raw.strip_prefix("file://") {
            return Ok(Self::File(PathBuf::from(path)));
        }

        let Some(rest) = raw
            .strip_prefix("https://")
            .or_else(|| raw.strip_prefix("http://"))
        else {
            if raw.contains("://") {
                return Err(ArtifactError::InvalidRemote(raw.to_string()));
            }
            return Ok(Self::File(PathBuf::from(raw)));
        };

        if rest.starts_with(DRIVE_HOST) {
            if let Some(file_id) = drive_file_id(rest) {
                return Ok(Self::GoogleDrive { file_id });
            }
        }

        Ok(Self::Http(raw.to_string()))
    }

    /// URL or path the fetcher should actually read.
    #[must_use]
    pub fn download_location(&self) -> String {
        match self {
            Self::Http(url) => url.clone(),
            Self::GoogleDrive { file_id } => {
                format!("https://{DRIVE_HOST}/uc?export=download&id={file_id}")
            }
            Self::File(path) => path.display().to_string(),
        }
    }
}

fn drive_file_id(rest: &str) -> Option<String> {
    let (path, query) = rest.split_once('?').unwrap_or((rest, ""));

    if let Some(after) = path.split_once("/file/d/").map(|(_, after)| after) {
        let id = after.split('/').next().unwrap_or("");
        return (!id.is_empty()).then(|| id.to_string());
    }

    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("id="))
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

impl fmt::Display for RemoteRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GoogleDrive { file_id } => write!(f, "gdrive:{file_id}"),
            other => f.write_str(&other.download_location()),
        }
    }
}

/// Trait for fetching an artifact's bytes.
pub trait ArtifactFetcher: Send + Sync {
    /// Fetch the full contents of `remote`.
    ///
    /// # Errors
    /// Returns `ArtifactError::Download` if the remote cannot be read.
    fn fetch(&self, remote: &RemoteRef) -> Result<Vec<u8>, ArtifactError>;
}

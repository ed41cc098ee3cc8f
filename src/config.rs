//! Runtime configuration from `MEDPREDICT_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::ports::RemoteRef;
use crate::MedPredictError;

pub const MODEL_PATH_ENV: &str = "MEDPREDICT_MODEL_PATH";
pub const FEATURES_PATH_ENV: &str = "MEDPREDICT_FEATURES_PATH";
pub const MODEL_URL_ENV: &str = "MEDPREDICT_MODEL_URL";
pub const FEATURES_URL_ENV: &str = "MEDPREDICT_FEATURES_URL";
pub const MODEL_SHA256_ENV: &str = "MEDPREDICT_MODEL_SHA256";
pub const FEATURES_SHA256_ENV: &str = "MEDPREDICT_FEATURES_SHA256";
pub const DOWNLOAD_TIMEOUT_ENV: &str = "MEDPREDICT_DOWNLOAD_TIMEOUT_SECS";

const DEFAULT_MODEL_PATH: &str = "random_forest_model.json";
const DEFAULT_FEATURES_PATH: &str = "model_features.json";
const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 60;

/// Location of one artifact and where to get it when it is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLocation {
    pub path: PathBuf,
    pub remote: Option<RemoteRef>,
    /// Expected SHA-256 (hex) of a freshly downloaded copy.
    pub sha256: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub model: ArtifactLocation,
    pub features: ArtifactLocation,
    pub download_timeout: Duration,
}

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Returns `MedPredictError::Configuration` for unparsable values.
    pub fn from_env() -> Result<Self, MedPredictError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    ///
    /// Blank values count as unset.
    ///
    /// # Errors
    /// Returns `MedPredictError::Configuration` for unparsable values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MedPredictError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let location = |path_key: &str,
                        default_path: &str,
                        url_key: &str,
                        sha_key: &str|
         -> Result<ArtifactLocation, MedPredictError> {
            let remote = get(url_key)
                .map(|raw| RemoteRef::parse(&raw))
                .transpose()
                .map_err(|e| MedPredictError::Configuration(format!("{url_key}: {e}")))?;

            let sha256 = get(sha_key).map(|s| s.trim().to_ascii_lowercase());
            if let Some(digest) = &sha256 {
                if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err(MedPredictError::Configuration(format!(
                        "{sha_key} must be 64 hex characters"
                    )));
                }
            }

            Ok(ArtifactLocation {
                path: PathBuf::from(get(path_key).unwrap_or_else(|| default_path.to_string())),
                remote,
                sha256,
            })
        };

        let download_timeout = match get(DOWNLOAD_TIMEOUT_ENV) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|&secs| secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| {
                    MedPredictError::Configuration(format!(
                        "{DOWNLOAD_TIMEOUT_ENV} must be a positive number of seconds, got {raw:?}"
                    ))
                })?,
            None => Duration::from_secs(DEFAULT_DOWNLOAD_TIMEOUT_SECS),
        };

        Ok(Self {
            model: location(
                MODEL_PATH_ENV,
                DEFAULT_MODEL_PATH,
                MODEL_URL_ENV,
                MODEL_SHA256_ENV,
            )?,
            features: location(
                FEATURES_PATH_ENV,
                DEFAULT_FEATURES_PATH,
                FEATURES_URL_ENV,
                FEATURES_SHA256_ENV,
            )?,
            download_timeout,
        })
    }
}

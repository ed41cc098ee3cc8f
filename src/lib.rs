//! # MedPredict
//!
//! Cancer survival prediction from clinical attributes.
//!
//! A patient form is encoded into the exact feature layout a pre-trained
//! random forest expects, the forest is evaluated, and the result is shown as
//! a binary survival outcome with a confidence percentage.
//!
//! ## Architecture
//!
//! Hexagonal layout:
//! - `domain`: Patient input, feature encoding, prediction records
//! - `ports`: Classifier and artifact-fetcher traits
//! - `adapters`: Random forest, artifact download, log sanitization
//! - `application`: Model context and prediction service
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{encode, FeatureSchema, FeatureVector, PatientInput, Prediction, SurvivalOutcome};

/// Result type for MedPredict operations
pub type Result<T> = std::result::Result<T, MedPredictError>;

/// Main error type for MedPredict
#[derive(Debug, thiserror::Error)]
pub enum MedPredictError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Artifact error: {0}")]
    Artifact(#[from] ports::ArtifactError),

    #[error("Model error: {0}")]
    Model(#[from] ports::ModelError),

    #[error("Invalid patient data: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<domain::FeatureError> for MedPredictError {
    fn from(e: domain::FeatureError) -> Self {
        Self::Configuration(e.to_string())
    }
}

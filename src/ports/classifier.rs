//! Classifier port: Trait for the model-serving layer.
//!
//! This trait abstracts the trained model format from the application logic.

use crate::domain::FeatureVector;

/// Errors raised while loading or evaluating a classifier.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Failed to read model: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse model: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid model: {0}")]
    Invalid(String),

    #[error("Feature count mismatch: model expects {expected}, got {actual}")]
    FeatureCount { expected: usize, actual: usize },
}

/// Trait for a binary classifier over an encoded feature vector.
///
/// Implementations are immutable after loading and shared across requests.
pub trait Classifier: Send + Sync {
    /// Number of input columns the model was trained on.
    fn n_features(&self) -> usize;

    /// Column names recorded at training time, when the export carries them.
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    /// Predict the class label (0 or 1).
    ///
    /// # Errors
    /// Returns `ModelError::FeatureCount` if the vector has the wrong length.
    fn predict(&self, features: &FeatureVector) -> Result<u8, ModelError>;

    /// Probability of class 1.
    ///
    /// # Errors
    /// Returns `ModelError::FeatureCount` if the vector has the wrong length.
    fn predict_proba(&self, features: &FeatureVector) -> Result<f64, ModelError>;
}

//! Ports layer: Trait definitions for external operations.
//!
//! These traits define the boundaries between the application and the
//! model-serving and artifact-download collaborators.

mod artifact_fetcher;
mod classifier;

pub use artifact_fetcher::{ArtifactError, ArtifactFetcher, RemoteRef};
pub use classifier::{Classifier, ModelError};

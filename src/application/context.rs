//! Model context: the immutable classifier + schema pair held for the
//! lifetime of the process.

use std::path::{Path, PathBuf};

use crate::adapters::artifacts::ArtifactResolver;
use crate::adapters::forest::RandomForestClassifier;
use crate::config::{AppConfig, ArtifactLocation};
use crate::domain::FeatureSchema;
use crate::ports::{ArtifactFetcher, Classifier};
use crate::MedPredictError;

/// Loaded model state. Built once, then only read.
pub struct ModelContext<C: Classifier> {
    classifier: C,
    schema: FeatureSchema,
}

impl<C: Classifier> ModelContext<C> {
    /// Pair a classifier with the schema its input vectors are encoded against.
    ///
    /// # Errors
    /// Returns `MedPredictError::Configuration` if the schema disagrees with
    /// the classifier's input width or recorded column names.
    pub fn new(classifier: C, schema: FeatureSchema) -> Result<Self, MedPredictError> {
        if classifier.n_features() != schema.len() {
            return Err(MedPredictError::Configuration(format!(
                "Feature schema has {} columns but the classifier expects {}",
                schema.len(),
                classifier.n_features()
            )));
        }
        if let Some(names) = classifier.feature_names() {
            if names != schema.columns() {
                return Err(MedPredictError::Configuration(
                    "Feature schema order differs from the classifier's training columns".into(),
                ));
            }
        }

        let unknown = schema.unknown_columns();
        if !unknown.is_empty() {
            tracing::warn!(
                "{} schema column(s) have no derivation and will always be 0: {:?}",
                unknown.len(),
                unknown
            );
        }

        Ok(Self { classifier, schema })
    }

    #[must_use]
    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    #[must_use]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }
}

impl ModelContext<RandomForestClassifier> {
    /// Resolve both artifacts (downloading if needed) and load them.
    ///
    /// # Errors
    /// Fails if an artifact is missing with no remote configured, if a
    /// download fails, or if either artifact is invalid.
    pub fn load<F: ArtifactFetcher>(
        config: &AppConfig,
        resolver: &ArtifactResolver<F>,
    ) -> Result<Self, MedPredictError> {
        let features_path = resolve(resolver, &config.features, "feature schema")?;
        let model_path = resolve(resolver, &config.model, "classifier")?;

        let schema = load_schema(&features_path)?;
        let classifier = RandomForestClassifier::from_path(&model_path)?;

        tracing::info!(
            "Model context ready ({} features, {} trees)",
            schema.len(),
            classifier.n_trees()
        );

        Self::new(classifier, schema)
    }
}

fn resolve<F: ArtifactFetcher>(
    resolver: &ArtifactResolver<F>,
    location: &ArtifactLocation,
    what: &str,
) -> Result<PathBuf, MedPredictError> {
    if location.path.exists() {
        return Ok(location.path.clone());
    }

    let Some(remote) = &location.remote else {
        return Err(MedPredictError::Configuration(format!(
            "The {what} is missing at {:?} and no download URL is configured",
            location.path
        )));
    };

    Ok(resolver.ensure_local_checked(&location.path, remote, location.sha256.as_deref())?)
}

/// Read an ordered feature schema (JSON array of column names).
///
/// # Errors
/// An empty or duplicated schema is a `Configuration` error.
pub fn load_schema(path: &Path) -> Result<FeatureSchema, MedPredictError> {
    let content = std::fs::read_to_string(path)?;
    let columns: Vec<String> = serde_json::from_str(&content)?;
    Ok(FeatureSchema::new(columns)?)
}

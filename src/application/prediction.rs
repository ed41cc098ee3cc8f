//! Prediction service: encode a patient, run the classifier, interpret.

use std::sync::Arc;

use crate::domain::{encode, PatientInput, Prediction, PredictionResult, SummaryMetrics};
use crate::ports::Classifier;
use crate::MedPredictError;

use super::ModelContext;

/// Service for running survival predictions against a loaded model.
pub struct PredictionService<C: Classifier> {
    context: Arc<ModelContext<C>>,
}

impl<C: Classifier> PredictionService<C> {
    #[must_use]
    pub fn new(context: Arc<ModelContext<C>>) -> Self {
        Self { context }
    }

    #[must_use]
    pub fn context(&self) -> &ModelContext<C> {
        &self.context
    }

    /// Run one prediction.
    ///
    /// The input is expected to be validated already by the form.
    ///
    /// # Errors
    /// Returns error if the classifier rejects the encoded vector.
    pub fn predict(&self, input: &PatientInput) -> Result<Prediction, MedPredictError> {
        let features = encode(input, self.context.schema());
        tracing::debug!("Encoded {} features", features.len());

        let classifier = self.context.classifier();
        let label = classifier.predict(&features)?;
        let probability = classifier.predict_proba(&features)?;

        let prediction = Prediction::new(
            PredictionResult::new(label, probability),
            SummaryMetrics::from_input(input),
        );

        tracing::info!(
            "Prediction complete: label={}, confidence={:.1}%",
            prediction.result.label,
            prediction.result.confidence_percent()
        );

        Ok(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CancerStage, FeatureSchema, FeatureVector, SurvivalOutcome};
    use crate::ports::ModelError;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    /// Returns fixed outputs and records the last vector it saw.
    struct FixedClassifier {
        n_features: usize,
        label: u8,
        probability: f64,
        seen: Mutex<Option<FeatureVector>>,
    }

    impl FixedClassifier {
        fn new(n_features: usize, label: u8, probability: f64) -> Self {
            Self {
                n_features,
                label,
                probability,
                seen: Mutex::new(None),
            }
        }
    }

    impl Classifier for FixedClassifier {
        fn n_features(&self) -> usize {
            self.n_features
        }

        fn predict(&self, features: &FeatureVector) -> Result<u8, ModelError> {
            *self.seen.lock().expect("lock") = Some(features.clone());
            Ok(self.label)
        }

        fn predict_proba(&self, _features: &FeatureVector) -> Result<f64, ModelError> {
            Ok(self.probability)
        }
    }

    fn service(label: u8, probability: f64, columns: &[&str]) -> PredictionService<FixedClassifier> {
        let schema = FeatureSchema::new(columns.iter().copied()).expect("schema");
        let classifier = FixedClassifier::new(schema.len(), label, probability);
        let ctx = ModelContext::new(classifier, schema).expect("context");
        PredictionService::new(Arc::new(ctx))
    }

    #[test]
    fn test_favorable_prediction() {
        let svc = service(1, 0.87, &["age", "bmi", "treatment_delay_days"]);
        let prediction = svc.predict(&PatientInput::default()).expect("predict");

        assert_eq!(prediction.outcome, SurvivalOutcome::Favorable);
        assert!((prediction.result.confidence_percent() - 87.0).abs() < 1e-9);
    }

    #[test]
    fn test_requires_care_reports_complement() {
        let svc = service(0, 0.3, &["age"]);
        let prediction = svc.predict(&PatientInput::default()).expect("predict");

        assert_eq!(prediction.outcome, SurvivalOutcome::RequiresCare);
        assert!((prediction.result.probability - 0.3).abs() < f64::EPSILON);
        assert!((prediction.result.confidence_percent() - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_metrics_and_vector_layout() {
        let svc = service(1, 0.6, &["cancer_stage_Stage III", "age", "unused_column"]);
        let input = PatientInput {
            age: 63,
            cancer_stage: CancerStage::StageIII,
            diagnosis_date: NaiveDate::from_ymd_opt(2022, 3, 10).expect("date"),
            treatment_end_date: NaiveDate::from_ymd_opt(2022, 3, 1).expect("date"),
            ..PatientInput::default()
        };

        let prediction = svc.predict(&input).expect("predict");
        assert_eq!(prediction.summary.treatment_delay_days, -9);
        assert_eq!(prediction.summary.age, 63);
        assert_eq!(prediction.summary.cancer_stage, CancerStage::StageIII);

        let seen = svc
            .context()
            .classifier()
            .seen
            .lock()
            .expect("lock")
            .clone()
            .expect("classifier was called");
        assert_eq!(seen.names(), ["cancer_stage_Stage III", "age", "unused_column"]);
        assert_eq!(seen.values(), [1.0, 63.0, 0.0]);
    }
}

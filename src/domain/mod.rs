//! Domain layer: Core business types and logic.
//!
//! Pure types with no I/O: patient input, feature encoding and the
//! prediction record.

mod features;
mod patient;
mod prediction;

pub use features::{encode, FeatureError, FeatureSchema, FeatureVector, DERIVED_FEATURES};
pub use patient::{
    Asthma, CancerStage, Gender, PatientInput, SmokingStatus, TreatmentType, AGE_RANGE,
    BMI_RANGE, CHOLESTEROL_RANGE,
};
pub use prediction::{Prediction, PredictionResult, SummaryMetrics, SurvivalOutcome};

//! Prediction result types.
//!
//! Represents the output of the survival classifier for one patient.

use serde::{Deserialize, Serialize};

use super::patient::{CancerStage, PatientInput};

/// Binary survival outcome as presented to clinicians.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurvivalOutcome {
    /// Class 1: favorable indicators for survival
    Favorable,
    /// Class 0: elevated risk factors
    RequiresCare,
}

impl SurvivalOutcome {
    #[must_use]
    pub fn from_label(label: u8) -> Self {
        if label == 1 {
            Self::Favorable
        } else {
            Self::RequiresCare
        }
    }

    #[must_use]
    pub fn headline(&self) -> &'static str {
        match self {
            Self::Favorable => "Positive Survival Prediction",
            Self::RequiresCare => "Requires Enhanced Care",
        }
    }

    /// Caption for the confidence figure.
    #[must_use]
    pub fn confidence_caption(&self) -> &'static str {
        match self {
            Self::Favorable => "Confidence Level",
            Self::RequiresCare => "Risk Assessment",
        }
    }

    #[must_use]
    pub fn interpretation(&self) -> &'static str {
        match self {
            Self::Favorable => {
                "Clinical Interpretation: Based on the analyzed parameters, the patient shows \
                 favorable indicators for survival outcomes. Continue monitoring and follow \
                 recommended treatment protocols."
            }
            Self::RequiresCare => {
                "Clinical Recommendation: The analysis indicates elevated risk factors. \
                 Consider additional interventions, closer monitoring, and multidisciplinary \
                 care approach."
            }
        }
    }

    /// RGB color for TUI display.
    #[must_use]
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Favorable => (16, 185, 129),    // Emerald (#10B981)
            Self::RequiresCare => (237, 137, 54), // Orange (#ED8936)
        }
    }
}

impl std::fmt::Display for SurvivalOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Favorable => write!(f, "FAVORABLE"),
            Self::RequiresCare => write!(f, "REQUIRES CARE"),
        }
    }
}

/// Raw classifier output (before interpretation).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Predicted class (0 or 1)
    pub label: u8,

    /// Probability of class 1 (0.0 to 1.0)
    pub probability: f64,

    /// Probability of the predicted class (0.0 to 1.0)
    pub confidence: f64,
}

impl PredictionResult {
    /// Combine the classifier's label with its class-1 probability.
    ///
    /// The label is taken as given; it is not re-derived from the probability.
    #[must_use]
    pub fn new(label: u8, probability: f64) -> Self {
        let confidence = if label == 1 {
            probability
        } else {
            1.0 - probability
        };

        Self {
            label,
            probability,
            confidence,
        }
    }

    #[must_use]
    pub fn confidence_percent(&self) -> f64 {
        self.confidence * 100.0
    }
}

/// Metrics echoed back alongside the prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub treatment_delay_days: i64,
    pub age: u32,
    pub cancer_stage: CancerStage,
}

impl SummaryMetrics {
    #[must_use]
    pub fn from_input(input: &PatientInput) -> Self {
        Self {
            treatment_delay_days: input.treatment_delay_days(),
            age: input.age,
            cancer_stage: input.cancer_stage,
        }
    }
}

/// Complete prediction record including metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Unique identifier
    pub id: String,

    pub outcome: SurvivalOutcome,

    pub result: PredictionResult,

    pub summary: SummaryMetrics,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Prediction {
    #[must_use]
    pub fn new(result: PredictionResult, summary: SummaryMetrics) -> Self {
        Self {
            id: uuid_v4(),
            outcome: SurvivalOutcome::from_label(result.label),
            result,
            summary,
            created_at: chrono::Utc::now(),
        }
    }
}

/// Random UUID v4 from a ChaCha20 CSPRNG seeded by the OS.
fn uuid_v4() -> String {
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let mut bytes: [u8; 16] = rng.gen();
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_follows_label() {
        let favorable = PredictionResult::new(1, 0.8);
        assert!((favorable.confidence - 0.8).abs() < f64::EPSILON);

        let care = PredictionResult::new(0, 0.3);
        assert!((care.confidence - 0.7).abs() < 1e-12);
        assert!((care.confidence_percent() - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_outcome_from_label() {
        assert_eq!(SurvivalOutcome::from_label(1), SurvivalOutcome::Favorable);
        assert_eq!(SurvivalOutcome::from_label(0), SurvivalOutcome::RequiresCare);
        assert_eq!(
            SurvivalOutcome::RequiresCare.confidence_caption(),
            "Risk Assessment"
        );
    }

    #[test]
    fn test_prediction_creation() {
        let input = PatientInput::default();
        let prediction = Prediction::new(
            PredictionResult::new(1, 0.91),
            SummaryMetrics::from_input(&input),
        );

        assert_eq!(prediction.outcome, SurvivalOutcome::Favorable);
        assert_eq!(prediction.summary.treatment_delay_days, 151);
        assert_eq!(prediction.summary.age, 40);
        assert_eq!(prediction.summary.cancer_stage, CancerStage::StageI);
    }

    #[test]
    fn test_uuid_generation() {
        let id1 = uuid_v4();
        let id2 = uuid_v4();
        assert_ne!(id1, id2);
        assert_eq!(id1.len(), 36);
        assert_eq!(&id1[14..15], "4");
    }
}

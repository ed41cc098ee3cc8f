//! Feature encoding: patient input to the classifier's column layout.
//!
//! The classifier was trained on a one-hot table that dropped some reference
//! categories (Never Smoked / Active Smoker, Chemotherapy / Surgery, and every
//! stage except III have no column of their own). The encoder reproduces that
//! table exactly; it must not be "completed".

use std::collections::{HashMap, HashSet};

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use super::patient::{Asthma, CancerStage, Gender, PatientInput, SmokingStatus, TreatmentType};

/// Errors raised when a feature schema cannot describe a valid vector.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeatureError {
    #[error("Feature schema is empty")]
    EmptySchema,

    #[error("Feature schema lists column {0:?} more than once")]
    DuplicateColumn(String),
}

/// Column names the encoder knows how to derive.
pub const DERIVED_FEATURES: [&str; 15] = [
    "treatment_delay_days",
    "bmi",
    "cholesterol_level",
    "age",
    "diagnosis_month",
    "treatment_month",
    "diagnosis_year",
    "treatment_year",
    "gender_Male",
    "asthma",
    "smoking_status_Passive Smoker",
    "smoking_status_Former Smoker",
    "treatment_type_Combination",
    "treatment_type_Radiation",
    "cancer_stage_Stage III",
];

/// Ordered list of column names the classifier was trained with.
///
/// Never empty and never contains the same column twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FeatureSchema {
    columns: Vec<String>,
}

impl FeatureSchema {
    /// Build a schema from an ordered column list.
    ///
    /// # Errors
    /// Returns `FeatureError::EmptySchema` for an empty list and
    /// `FeatureError::DuplicateColumn` if a name repeats.
    pub fn new<I, S>(columns: I) -> Result<Self, FeatureError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(FeatureError::EmptySchema);
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(FeatureError::DuplicateColumn(column.clone()));
            }
        }

        Ok(Self { columns })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// A constructed schema is never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Schema columns the encoder has no derivation for (they will be zero).
    #[must_use]
    pub fn unknown_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .map(String::as_str)
            .filter(|c| !DERIVED_FEATURES.contains(c))
            .collect()
    }
}

impl TryFrom<Vec<String>> for FeatureSchema {
    type Error = FeatureError;

    fn try_from(columns: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(columns)
    }
}

impl From<FeatureSchema> for Vec<String> {
    fn from(schema: FeatureSchema) -> Self {
        schema.columns
    }
}

/// Encoded features for one prediction, in schema order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    names: Vec<String>,
    values: Vec<f64>,
}

impl FeatureVector {
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Values in schema order, ready for the classifier.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

fn indicator(condition: bool) -> f64 {
    if condition {
        1.0
    } else {
        0.0
    }
}

/// Every derivable column for this input, keyed by column name.
fn derive_features(input: &PatientInput) -> HashMap<&'static str, f64> {
    let diagnosis = input.diagnosis_date;
    let treatment = input.treatment_end_date;

    HashMap::from([
        ("treatment_delay_days", input.treatment_delay_days() as f64),
        ("bmi", input.bmi),
        ("cholesterol_level", input.cholesterol),
        ("age", f64::from(input.age)),
        ("diagnosis_month", f64::from(diagnosis.month())),
        ("treatment_month", f64::from(treatment.month())),
        ("diagnosis_year", f64::from(diagnosis.year())),
        ("treatment_year", f64::from(treatment.year())),
        ("gender_Male", indicator(input.gender == Gender::Male)),
        ("asthma", indicator(input.asthma == Asthma::Yes)),
        (
            "smoking_status_Passive Smoker",
            indicator(input.smoking_status == SmokingStatus::PassiveSmoker),
        ),
        (
            "smoking_status_Former Smoker",
            indicator(input.smoking_status == SmokingStatus::FormerSmoker),
        ),
        (
            "treatment_type_Combination",
            indicator(input.treatment_type == TreatmentType::Combination),
        ),
        (
            "treatment_type_Radiation",
            indicator(input.treatment_type == TreatmentType::Radiation),
        ),
        (
            "cancer_stage_Stage III",
            indicator(input.cancer_stage == CancerStage::StageIII),
        ),
    ])
}

/// Encode a patient into the exact column set and order of `schema`.
///
/// Derived columns missing from the schema are dropped; schema columns with
/// no derivation are zero.
#[must_use]
pub fn encode(input: &PatientInput, schema: &FeatureSchema) -> FeatureVector {
    let derived = derive_features(input);

    let values = schema
        .columns()
        .iter()
        .map(|column| derived.get(column.as_str()).copied().unwrap_or(0.0))
        .collect();

    FeatureVector {
        names: schema.columns().to_vec(),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn full_schema() -> FeatureSchema {
        FeatureSchema::new(DERIVED_FEATURES).expect("valid schema")
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn test_schema_rejects_empty_and_duplicates() {
        assert_eq!(
            FeatureSchema::new(Vec::<String>::new()),
            Err(FeatureError::EmptySchema)
        );
        assert_eq!(
            FeatureSchema::new(["age", "bmi", "age"]),
            Err(FeatureError::DuplicateColumn("age".to_string()))
        );
    }

    #[test]
    fn test_schema_deserializes_through_validation() {
        let schema: FeatureSchema =
            serde_json::from_str(r#"["age", "bmi"]"#).expect("valid schema json");
        assert_eq!(schema.columns(), ["age", "bmi"]);

        assert!(serde_json::from_str::<FeatureSchema>("[]").is_err());
    }

    #[test]
    fn test_dates_derivation() {
        let input = PatientInput {
            diagnosis_date: date(2023, 1, 1),
            treatment_end_date: date(2023, 6, 1),
            ..PatientInput::default()
        };
        let v = encode(&input, &full_schema());

        assert_eq!(v.get("treatment_delay_days"), Some(151.0));
        assert_eq!(v.get("diagnosis_month"), Some(1.0));
        assert_eq!(v.get("treatment_month"), Some(6.0));
        assert_eq!(v.get("diagnosis_year"), Some(2023.0));
        assert_eq!(v.get("treatment_year"), Some(2023.0));
    }

    #[test]
    fn test_one_hot_indicators() {
        let input = PatientInput {
            gender: Gender::Male,
            asthma: Asthma::Yes,
            smoking_status: SmokingStatus::FormerSmoker,
            treatment_type: TreatmentType::Radiation,
            cancer_stage: CancerStage::StageIII,
            ..PatientInput::default()
        };
        let v = encode(&input, &full_schema());

        assert_eq!(v.get("gender_Male"), Some(1.0));
        assert_eq!(v.get("asthma"), Some(1.0));
        assert_eq!(v.get("smoking_status_Former Smoker"), Some(1.0));
        assert_eq!(v.get("smoking_status_Passive Smoker"), Some(0.0));
        assert_eq!(v.get("treatment_type_Radiation"), Some(1.0));
        assert_eq!(v.get("treatment_type_Combination"), Some(0.0));
        assert_eq!(v.get("cancer_stage_Stage III"), Some(1.0));
    }

    #[test]
    fn test_every_indicator_matches_its_definition() {
        let schema = full_schema();

        for &gender in Gender::ALL {
            for &asthma in Asthma::ALL {
                for &smoking in SmokingStatus::ALL {
                    for &treatment in TreatmentType::ALL {
                        for &stage in CancerStage::ALL {
                            let input = PatientInput {
                                gender,
                                asthma,
                                smoking_status: smoking,
                                treatment_type: treatment,
                                cancer_stage: stage,
                                ..PatientInput::default()
                            };
                            let v = encode(&input, &schema);

                            let expected = [
                                ("gender_Male", gender == Gender::Male),
                                ("asthma", asthma == Asthma::Yes),
                                (
                                    "smoking_status_Passive Smoker",
                                    smoking == SmokingStatus::PassiveSmoker,
                                ),
                                (
                                    "smoking_status_Former Smoker",
                                    smoking == SmokingStatus::FormerSmoker,
                                ),
                                (
                                    "treatment_type_Combination",
                                    treatment == TreatmentType::Combination,
                                ),
                                (
                                    "treatment_type_Radiation",
                                    treatment == TreatmentType::Radiation,
                                ),
                                ("cancer_stage_Stage III", stage == CancerStage::StageIII),
                            ];
                            for (column, set) in expected {
                                assert_eq!(
                                    v.get(column),
                                    Some(if set { 1.0 } else { 0.0 }),
                                    "{column} for {input:?}"
                                );
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_female_is_zero() {
        let input = PatientInput {
            gender: Gender::Female,
            ..PatientInput::default()
        };
        assert_eq!(encode(&input, &full_schema()).get("gender_Male"), Some(0.0));
    }

    #[test]
    fn test_reference_categories_collapse_to_zero() {
        let schema = full_schema();

        for smoking in [SmokingStatus::NeverSmoked, SmokingStatus::ActiveSmoker] {
            let v = encode(
                &PatientInput {
                    smoking_status: smoking,
                    ..PatientInput::default()
                },
                &schema,
            );
            assert_eq!(v.get("smoking_status_Passive Smoker"), Some(0.0));
            assert_eq!(v.get("smoking_status_Former Smoker"), Some(0.0));
        }

        for treatment in [TreatmentType::Chemotherapy, TreatmentType::Surgery] {
            let v = encode(
                &PatientInput {
                    treatment_type: treatment,
                    ..PatientInput::default()
                },
                &schema,
            );
            assert_eq!(v.get("treatment_type_Combination"), Some(0.0));
            assert_eq!(v.get("treatment_type_Radiation"), Some(0.0));
        }

        for stage in [CancerStage::StageI, CancerStage::StageII, CancerStage::StageIV] {
            let v = encode(
                &PatientInput {
                    cancer_stage: stage,
                    ..PatientInput::default()
                },
                &schema,
            );
            assert_eq!(v.get("cancer_stage_Stage III"), Some(0.0));
        }
    }

    #[test]
    fn test_minimal_schema_drops_other_fields() {
        let schema = FeatureSchema::new(["age", "bmi"]).expect("valid schema");
        let v = encode(&PatientInput::default(), &schema);

        assert_eq!(v.len(), 2);
        assert_eq!(v.names(), ["age", "bmi"]);
        assert_eq!(v.values(), [40.0, 22.5]);
        assert_eq!(v.get("treatment_delay_days"), None);
    }

    #[test]
    fn test_output_follows_schema_order_and_zero_fills() {
        let schema = FeatureSchema::new([
            "cancer_stage_Stage II",
            "cholesterol_level",
            "treatment_type_Surgery",
            "age",
        ])
        .expect("valid schema");
        let input = PatientInput {
            cancer_stage: CancerStage::StageII,
            treatment_type: TreatmentType::Surgery,
            ..PatientInput::default()
        };
        let v = encode(&input, &schema);

        let names: Vec<&str> = v.iter().map(|(n, _)| n).collect();
        assert_eq!(names, schema.columns());
        assert_eq!(v.values(), [0.0, 180.0, 0.0, 40.0]);
        assert_eq!(
            schema.unknown_columns(),
            ["cancer_stage_Stage II", "treatment_type_Surgery"]
        );
    }

    #[test]
    fn test_negative_delay_passes_through() {
        let input = PatientInput {
            diagnosis_date: date(2023, 6, 1),
            treatment_end_date: date(2023, 1, 1),
            ..PatientInput::default()
        };
        let v = encode(&input, &full_schema());
        assert_eq!(v.get("treatment_delay_days"), Some(-151.0));
    }

    #[test]
    fn test_encode_is_deterministic() {
        let input = PatientInput {
            smoking_status: SmokingStatus::PassiveSmoker,
            treatment_type: TreatmentType::Combination,
            ..PatientInput::default()
        };
        let schema = full_schema();
        assert_eq!(encode(&input, &schema), encode(&input, &schema));
        assert_eq!(encode(&input, &schema).len(), schema.len());
    }
}

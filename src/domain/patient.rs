//! Patient input types for cancer survival prediction.
//!
//! These mirror the clinical form one-to-one. Categorical answers are enums
//! whose labels are the exact strings the model's training data used.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Declares a form choice enum with its exact label strings.
macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every choice, in form order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The label shown on the form (and used by the training data).
            #[must_use]
            pub fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|c| c.label() == s)
                    .ok_or_else(|| format!("Unknown {} value: {s:?}", stringify!($name)))
            }
        }
    };
}

choice_enum! {
    /// Gender as recorded on the form.
    Gender { Male => "Male", Female => "Female" }
}

choice_enum! {
    /// Smoking history.
    SmokingStatus {
        NeverSmoked => "Never Smoked",
        PassiveSmoker => "Passive Smoker",
        FormerSmoker => "Former Smoker",
        ActiveSmoker => "Active Smoker",
    }
}

choice_enum! {
    /// Asthma history.
    Asthma { No => "No", Yes => "Yes" }
}

choice_enum! {
    CancerStage {
        StageI => "Stage I",
        StageII => "Stage II",
        StageIII => "Stage III",
        StageIV => "Stage IV",
    }
}

choice_enum! {
    TreatmentType {
        Chemotherapy => "Chemotherapy",
        Radiation => "Radiation",
        Surgery => "Surgery",
        Combination => "Combination",
    }
}

/// Accepted age range in years.
pub const AGE_RANGE: (u32, u32) = (1, 120);
/// Accepted BMI range.
pub const BMI_RANGE: (f64, f64) = (10.0, 50.0);
/// Accepted total cholesterol range in mg/dL.
pub const CHOLESTEROL_RANGE: (f64, f64) = (100.0, 300.0);

/// Raw patient data collected by the form for one prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientInput {
    pub gender: Gender,

    /// Age in years (1-120)
    pub age: u32,

    /// Body mass index (10.0-50.0)
    pub bmi: f64,

    /// Total cholesterol in mg/dL (100.0-300.0)
    pub cholesterol: f64,

    pub smoking_status: SmokingStatus,

    pub asthma: Asthma,

    pub diagnosis_date: NaiveDate,

    /// May precede `diagnosis_date`; the encoder passes the negative delay through.
    pub treatment_end_date: NaiveDate,

    pub cancer_stage: CancerStage,

    pub treatment_type: TreatmentType,
}

impl Default for PatientInput {
    fn default() -> Self {
        Self {
            gender: Gender::Male,
            age: 40,
            bmi: 22.5,
            cholesterol: 180.0,
            smoking_status: SmokingStatus::NeverSmoked,
            asthma: Asthma::No,
            diagnosis_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
            treatment_end_date: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap_or_default(),
            cancer_stage: CancerStage::StageI,
            treatment_type: TreatmentType::Chemotherapy,
        }
    }
}

impl PatientInput {
    /// Whole days between diagnosis and end of treatment (negative if reversed).
    #[must_use]
    pub fn treatment_delay_days(&self) -> i64 {
        (self.treatment_end_date - self.diagnosis_date).num_days()
    }

    /// Validate numeric fields against the form's accepted ranges.
    ///
    /// Dates are not cross-checked.
    ///
    /// # Errors
    /// Returns every violation found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !(AGE_RANGE.0..=AGE_RANGE.1).contains(&self.age) {
            errors.push(format!(
                "Age {} out of range [{}, {}]",
                self.age, AGE_RANGE.0, AGE_RANGE.1
            ));
        }
        if !(BMI_RANGE.0..=BMI_RANGE.1).contains(&self.bmi) {
            errors.push(format!(
                "BMI {} out of range [{}, {}]",
                self.bmi, BMI_RANGE.0, BMI_RANGE.1
            ));
        }
        if !(CHOLESTEROL_RANGE.0..=CHOLESTEROL_RANGE.1).contains(&self.cholesterol) {
            errors.push(format!(
                "Cholesterol {} out of range [{}, {}]",
                self.cholesterol, CHOLESTEROL_RANGE.0, CHOLESTEROL_RANGE.1
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

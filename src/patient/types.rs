use serde::{Deserialize, Serialize};

/// Clinical and lifestyle snapshot consumed by the calculators.
///
/// Every field is optional. Zero-valued numbers and blank strings count as
/// "not recorded"; use the `known_*` accessors rather than the raw fields.
/// `previous_ivf_cycles` is the exception: `Some(0)` means a first attempt
/// was explicitly recorded.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PatientFactors {
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub bmi: Option<f64>,
    /// Height in centimetres, used to derive BMI when `bmi` is missing
    #[serde(default)]
    pub height_cm: Option<f64>,
    /// Weight in kilograms, used to derive BMI when `bmi` is missing
    #[serde(default)]
    pub weight_kg: Option<f64>,
    /// Anti-Müllerian Hormone (ng/mL)
    #[serde(default)]
    pub amh_level: Option<f64>,
    /// Follicle-Stimulating Hormone (mIU/mL)
    #[serde(default)]
    pub fsh_level: Option<f64>,
    #[serde(default)]
    pub previous_ivf_cycles: Option<u32>,
    #[serde(default)]
    pub partner_age: Option<u32>,
    #[serde(default)]
    pub diagnosis: Option<String>,
    /// Free text, e.g. "non-smoker, exercises 3x/week"
    #[serde(default)]
    pub lifestyle_factors: Option<String>,
}

impl PatientFactors {
    pub fn known_age(&self) -> Option<u32> {
        self.age.filter(|&a| a > 0)
    }

    /// Recorded BMI, or one derived from height and weight.
    pub fn known_bmi(&self) -> Option<f64> {
        nonzero(self.bmi).or_else(|| self.derived_bmi())
    }

    pub fn known_amh(&self) -> Option<f64> {
        nonzero(self.amh_level)
    }

    pub fn known_fsh(&self) -> Option<f64> {
        nonzero(self.fsh_level)
    }

    pub fn known_partner_age(&self) -> Option<u32> {
        self.partner_age.filter(|&a| a > 0)
    }

    /// Prior cycle count, only when at least one cycle was recorded.
    pub fn known_previous_cycles(&self) -> Option<u32> {
        self.previous_ivf_cycles.filter(|&c| c > 0)
    }

    pub fn has_diagnosis(&self) -> bool {
        non_blank(self.diagnosis.as_deref()).is_some()
    }

    pub fn lifestyle(&self) -> Option<&str> {
        non_blank(self.lifestyle_factors.as_deref())
    }

    /// Lowercased lifestyle text for keyword matching.
    pub fn lifestyle_lower(&self) -> Option<String> {
        self.lifestyle().map(str::to_lowercase)
    }

    fn derived_bmi(&self) -> Option<f64> {
        let height_m = nonzero(self.height_cm)? / 100.0;
        let weight = nonzero(self.weight_kg)?;
        if height_m > 0.0 {
            Some(weight / (height_m * height_m))
        } else {
            None
        }
    }
}

/// Most recent wellness-log values, used only for model features.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WellnessSnapshot {
    /// Self-reported stress, 1 (low) to 5 (high)
    #[serde(default)]
    pub stress_level: Option<u32>,
    #[serde(default)]
    pub sleep_hours: Option<f64>,
    #[serde(default)]
    pub exercise_minutes: Option<u32>,
}

/// On-disk patient document.
///
/// Example YAML:
/// ```yaml
/// patient:
///   age: 34
///   amh_level: 2.4
///   lifestyle_factors: "non-smoker, regular exercise"
/// wellness:
///   stress_level: 2
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PatientRecord {
    #[serde(default)]
    pub patient: PatientFactors,
    #[serde(default)]
    pub wellness: Option<WellnessSnapshot>,
}

fn nonzero(value: Option<f64>) -> Option<f64> {
    value.filter(|&v| v != 0.0)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_values_are_unknown() {
        let factors = PatientFactors {
            age: Some(0),
            bmi: Some(0.0),
            amh_level: Some(0.0),
            fsh_level: Some(0.0),
            partner_age: Some(0),
            previous_ivf_cycles: Some(0),
            ..Default::default()
        };
        assert_eq!(factors.known_age(), None);
        assert_eq!(factors.known_bmi(), None);
        assert_eq!(factors.known_amh(), None);
        assert_eq!(factors.known_fsh(), None);
        assert_eq!(factors.known_partner_age(), None);
        assert_eq!(factors.known_previous_cycles(), None);
        // Still recorded, just zero
        assert_eq!(factors.previous_ivf_cycles, Some(0));
    }

    #[test]
    fn test_blank_strings_are_unknown() {
        let factors = PatientFactors {
            diagnosis: Some("   ".to_string()),
            lifestyle_factors: Some(String::new()),
            ..Default::default()
        };
        assert!(!factors.has_diagnosis());
        assert!(factors.lifestyle().is_none());
    }

    #[test]
    fn test_bmi_derived_from_height_and_weight() {
        let factors = PatientFactors {
            height_cm: Some(170.0),
            weight_kg: Some(65.0),
            ..Default::default()
        };
        let bmi = factors.known_bmi().unwrap();
        assert!((bmi - 22.49).abs() < 0.01);
    }

    #[test]
    fn test_recorded_bmi_wins_over_derived() {
        let factors = PatientFactors {
            bmi: Some(31.0),
            height_cm: Some(170.0),
            weight_kg: Some(65.0),
            ..Default::default()
        };
        assert_eq!(factors.known_bmi(), Some(31.0));
    }

    #[test]
    fn test_bmi_not_derived_without_height() {
        let factors = PatientFactors {
            height_cm: Some(0.0),
            weight_kg: Some(65.0),
            ..Default::default()
        };
        assert_eq!(factors.known_bmi(), None);
    }

    #[test]
    fn test_lifestyle_lower() {
        let factors = PatientFactors {
            lifestyle_factors: Some("Non-Smoker, High STRESS".to_string()),
            ..Default::default()
        };
        assert_eq!(
            factors.lifestyle_lower().as_deref(),
            Some("non-smoker, high stress")
        );
    }

    #[test]
    fn test_record_parse_yaml() {
        let yaml = r#"
patient:
  age: 34
  amh_level: 2.4
  previous_ivf_cycles: 0
wellness:
  stress_level: 2
"#;
        let record: PatientRecord = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(record.patient.age, Some(34));
        assert_eq!(record.patient.amh_level, Some(2.4));
        assert_eq!(record.patient.previous_ivf_cycles, Some(0));
        assert!(record.patient.bmi.is_none());
        assert_eq!(record.wellness.unwrap().stress_level, Some(2));
    }

    #[test]
    fn test_record_rejects_unknown_fields() {
        let yaml = r#"
patient:
  agee: 34
"#;
        let result: Result<PatientRecord, _> = serde_saphyr::from_str(yaml);
        assert!(result.is_err());
    }
}

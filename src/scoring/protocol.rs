use serde::Serialize;
use std::fmt;

use crate::patient::PatientFactors;

const DEFAULT_AGE: u32 = 35;
const DEFAULT_AMH: f64 = 1.5;
const DEFAULT_BMI: f64 = 24.0;
const PERSONALIZATION_FIELDS: usize = 7;

const BASE_OPTIMIZATIONS: [&str; 4] = [
    "Maintain optimal weight and nutrition",
    "Consider acupuncture for improved outcomes",
    "Ensure adequate sleep (7-9 hours nightly)",
    "Take prescribed supplements consistently",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Protocol {
    #[serde(rename = "Standard Long Protocol")]
    StandardLong,
    #[serde(rename = "High-Dose Short Protocol")]
    HighDoseShort,
    #[serde(rename = "Antagonist Protocol")]
    Antagonist,
    #[serde(rename = "Mini-IVF or Natural Cycle")]
    MiniIvf,
    /// Placeholder when no patient data exists
    #[serde(rename = "Standard Protocol")]
    Standard,
}

impl Protocol {
    /// Select a protocol; the first matching rule wins.
    pub fn select(age: u32, amh: f64) -> Self {
        if age <= 35 && amh >= 2.0 {
            Protocol::StandardLong
        } else if age <= 35 && amh < 1.0 {
            Protocol::HighDoseShort
        } else if age > 35 && amh >= 1.5 {
            Protocol::Antagonist
        } else {
            Protocol::MiniIvf
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Protocol::StandardLong => "Standard Long Protocol",
            Protocol::HighDoseShort => "High-Dose Short Protocol",
            Protocol::Antagonist => "Antagonist Protocol",
            Protocol::MiniIvf => "Mini-IVF or Natural Cycle",
            Protocol::Standard => "Standard Protocol",
        }
    }

    pub fn stimulation_days(&self) -> &'static str {
        match self {
            Protocol::StandardLong => "10-12 days",
            Protocol::HighDoseShort => "8-10 days",
            Protocol::Antagonist => "9-11 days",
            Protocol::MiniIvf => "5-8 days",
            Protocol::Standard => "",
        }
    }

    pub fn expected_response(&self) -> Option<ExpectedResponse> {
        match self {
            Protocol::StandardLong => Some(ExpectedResponse::Good),
            Protocol::HighDoseShort => Some(ExpectedResponse::Moderate),
            Protocol::Antagonist => Some(ExpectedResponse::GoodToModerate),
            Protocol::MiniIvf => Some(ExpectedResponse::LowToModerate),
            Protocol::Standard => None,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExpectedResponse {
    Good,
    Moderate,
    #[serde(rename = "Good to Moderate")]
    GoodToModerate,
    #[serde(rename = "Low to Moderate")]
    LowToModerate,
}

impl fmt::Display for ExpectedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExpectedResponse::Good => "Good",
            ExpectedResponse::Moderate => "Moderate",
            ExpectedResponse::GoodToModerate => "Good to Moderate",
            ExpectedResponse::LowToModerate => "Low to Moderate",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimingPlan {
    pub cycle_start: String,
    pub stimulation_duration: String,
    pub monitoring_frequency: String,
    pub trigger_timing: String,
}

impl TimingPlan {
    fn for_protocol(protocol: Protocol) -> Self {
        Self {
            cycle_start: "Day 2-3 of menstrual cycle".to_string(),
            stimulation_duration: protocol.stimulation_days().to_string(),
            monitoring_frequency: "Every 2-3 days after day 5".to_string(),
            trigger_timing: "When 2-3 follicles reach 17-18mm".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtocolPlan {
    #[serde(rename = "protocol_name")]
    pub protocol: Protocol,
    pub expected_response: Option<ExpectedResponse>,
    pub medication_suggestions: Vec<String>,
    pub timing_recommendations: Option<TimingPlan>,
    pub success_optimization: Vec<String>,
    /// Share of the seven personalization inputs that were recorded, 0-100
    pub personalization_score: f64,
}

impl ProtocolPlan {
    pub fn empty() -> Self {
        Self {
            protocol: Protocol::Standard,
            expected_response: None,
            medication_suggestions: Vec::new(),
            timing_recommendations: None,
            success_optimization: Vec::new(),
            personalization_score: 0.0,
        }
    }
}

/// Pick a stimulation protocol and supporting advice for a patient.
///
/// Missing age, AMH and BMI fall back to 35, 1.5 and 24.
pub fn recommend_protocol(factors: Option<&PatientFactors>) -> ProtocolPlan {
    let Some(patient) = factors else {
        return ProtocolPlan::empty();
    };

    let age = patient.known_age().unwrap_or(DEFAULT_AGE);
    let amh = patient.known_amh().unwrap_or(DEFAULT_AMH);
    let bmi = patient.known_bmi().unwrap_or(DEFAULT_BMI);

    let protocol = Protocol::select(age, amh);

    ProtocolPlan {
        protocol,
        expected_response: protocol.expected_response(),
        medication_suggestions: medications(age, amh, bmi),
        timing_recommendations: Some(TimingPlan::for_protocol(protocol)),
        success_optimization: optimizations(patient, age),
        personalization_score: personalization_score(patient),
    }
}

fn medications(age: u32, amh: f64, bmi: f64) -> Vec<String> {
    let mut out = Vec::new();
    if amh < 1.0 {
        out.push("Higher dose FSH (300-450 IU)".to_string());
        out.push("Consider adding LH supplementation".to_string());
    } else {
        out.push("Standard dose FSH (150-225 IU)".to_string());
    }
    if age > 38 {
        out.push("Consider growth hormone supplementation".to_string());
    }
    if bmi >= 30.0 {
        out.push("Adjusted dosing for BMI".to_string());
    }
    out
}

fn optimizations(patient: &PatientFactors, age: u32) -> Vec<String> {
    let mut out = Vec::new();
    if patient
        .lifestyle_lower()
        .is_some_and(|lifestyle| lifestyle.contains("stress"))
    {
        out.push("Implement stress reduction techniques".to_string());
    }
    out.extend(BASE_OPTIMIZATIONS.iter().map(|s| s.to_string()));
    if age > 35 {
        out.push("Discuss PGT-A testing for embryo selection".to_string());
    }
    out
}

/// Percentage of the seven personalization inputs that were recorded.
///
/// A recorded zero for previous cycles counts; other zeros do not.
pub fn personalization_score(patient: &PatientFactors) -> f64 {
    let recorded = [
        patient.known_age().is_some(),
        patient.known_amh().is_some(),
        patient.known_bmi().is_some(),
        patient.known_fsh().is_some(),
        patient.previous_ivf_cycles.is_some(),
        patient.has_diagnosis(),
        patient.lifestyle().is_some(),
    ]
    .iter()
    .filter(|&&present| present)
    .count();

    (recorded as f64 / PERSONALIZATION_FIELDS as f64 * 100.0).min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(age: Option<u32>, amh: Option<f64>, bmi: Option<f64>) -> PatientFactors {
        PatientFactors {
            age,
            amh_level: amh,
            bmi,
            ..Default::default()
        }
    }

    #[test]
    fn test_no_patient_is_empty() {
        let plan = recommend_protocol(None);
        assert_eq!(plan, ProtocolPlan::empty());
        assert_eq!(plan.protocol.name(), "Standard Protocol");
        assert!(plan.timing_recommendations.is_none());
    }

    #[test]
    fn test_young_good_reserve() {
        let plan = recommend_protocol(Some(&sample(Some(30), Some(2.5), None)));
        assert_eq!(plan.protocol, Protocol::StandardLong);
        assert_eq!(plan.protocol.name(), "Standard Long Protocol");
        assert_eq!(plan.expected_response, Some(ExpectedResponse::Good));
        assert_eq!(plan.medication_suggestions, vec!["Standard dose FSH (150-225 IU)"]);
        assert_eq!(
            plan.timing_recommendations.unwrap().stimulation_duration,
            "10-12 days"
        );
    }

    #[test]
    fn test_young_low_reserve() {
        let plan = recommend_protocol(Some(&sample(Some(32), Some(0.6), None)));
        assert_eq!(plan.protocol, Protocol::HighDoseShort);
        assert_eq!(plan.expected_response, Some(ExpectedResponse::Moderate));
        assert_eq!(
            plan.medication_suggestions,
            vec![
                "Higher dose FSH (300-450 IU)",
                "Consider adding LH supplementation"
            ]
        );
    }

    #[test]
    fn test_young_middle_reserve_falls_through() {
        // age<=35 but 1.0 <= amh < 2.0 matches neither young rule
        let plan = recommend_protocol(Some(&sample(Some(34), Some(1.6), None)));
        assert_eq!(plan.protocol, Protocol::MiniIvf);
    }

    #[test]
    fn test_older_good_reserve() {
        let plan = recommend_protocol(Some(&sample(Some(37), Some(1.5), None)));
        assert_eq!(plan.protocol, Protocol::Antagonist);
        assert_eq!(plan.expected_response, Some(ExpectedResponse::GoodToModerate));
        assert_eq!(
            plan.timing_recommendations.unwrap().stimulation_duration,
            "9-11 days"
        );
    }

    #[test]
    fn test_older_low_reserve() {
        let plan = recommend_protocol(Some(&sample(Some(38), Some(0.8), None)));
        assert_eq!(plan.protocol, Protocol::MiniIvf);
        assert_eq!(plan.protocol.name(), "Mini-IVF or Natural Cycle");
        assert_eq!(plan.expected_response, Some(ExpectedResponse::LowToModerate));
        // Age 38 is not above 38
        assert_eq!(
            plan.medication_suggestions,
            vec![
                "Higher dose FSH (300-450 IU)",
                "Consider adding LH supplementation"
            ]
        );

        let plan = recommend_protocol(Some(&sample(Some(39), Some(0.8), Some(31.0))));
        assert_eq!(
            plan.medication_suggestions,
            vec![
                "Higher dose FSH (300-450 IU)",
                "Consider adding LH supplementation",
                "Consider growth hormone supplementation",
                "Adjusted dosing for BMI"
            ]
        );
    }

    #[test]
    fn test_defaults_when_missing() {
        // age 35, amh 1.5, bmi 24: no young rule, not older
        let plan = recommend_protocol(Some(&PatientFactors::default()));
        assert_eq!(plan.protocol, Protocol::MiniIvf);
        assert_eq!(plan.medication_suggestions, vec!["Standard dose FSH (150-225 IU)"]);
        assert_eq!(plan.personalization_score, 0.0);
    }

    #[test]
    fn test_timing_constants() {
        let plan = recommend_protocol(Some(&sample(Some(30), Some(2.5), None)));
        let timing = plan.timing_recommendations.unwrap();
        assert_eq!(timing.cycle_start, "Day 2-3 of menstrual cycle");
        assert_eq!(timing.monitoring_frequency, "Every 2-3 days after day 5");
        assert_eq!(timing.trigger_timing, "When 2-3 follicles reach 17-18mm");
    }

    #[test]
    fn test_optimizations_order() {
        let patient = PatientFactors {
            age: Some(40),
            lifestyle_factors: Some("High STRESS job".to_string()),
            ..Default::default()
        };
        let plan = recommend_protocol(Some(&patient));
        assert_eq!(plan.success_optimization.len(), 6);
        assert_eq!(plan.success_optimization[0], "Implement stress reduction techniques");
        assert_eq!(plan.success_optimization[1], "Maintain optimal weight and nutrition");
        assert_eq!(
            plan.success_optimization[5],
            "Discuss PGT-A testing for embryo selection"
        );
    }

    #[test]
    fn test_optimizations_base_only() {
        let plan = recommend_protocol(Some(&sample(Some(30), None, None)));
        assert_eq!(plan.success_optimization, BASE_OPTIMIZATIONS.to_vec());
    }

    #[test]
    fn test_personalization_full() {
        let patient = PatientFactors {
            age: Some(33),
            bmi: Some(22.0),
            amh_level: Some(2.1),
            fsh_level: Some(6.5),
            previous_ivf_cycles: Some(0),
            diagnosis: Some("Unexplained infertility".to_string()),
            lifestyle_factors: Some("active".to_string()),
            ..Default::default()
        };
        assert_eq!(personalization_score(&patient), 100.0);
    }

    #[test]
    fn test_personalization_partial() {
        let patient = PatientFactors {
            age: Some(33),
            previous_ivf_cycles: Some(0),
            ..Default::default()
        };
        let score = personalization_score(&patient);
        assert!((score - 200.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_personalization_ignores_partner_age() {
        let patient = PatientFactors {
            partner_age: Some(40),
            ..Default::default()
        };
        assert_eq!(personalization_score(&patient), 0.0);
    }

    #[test]
    fn test_repeatable() {
        let patient = sample(Some(36), Some(1.7), Some(29.0));
        assert_eq!(
            recommend_protocol(Some(&patient)),
            recommend_protocol(Some(&patient))
        );
    }
}

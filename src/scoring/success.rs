use serde::{Serialize, Serializer};

use super::factors::{first_match, round1, Band, FactorImpact, Threshold};
use crate::patient::PatientFactors;

pub const BASE_SUCCESS_RATE: f64 = 35.0;
pub const MIN_SUCCESS_RATE: f64 = 5.0;
pub const MAX_SUCCESS_RATE: f64 = 85.0;
const BASE_CONFIDENCE: u32 = 60;
const CONFIDENCE_PER_DATA_POINT: u32 = 7;
const MAX_CONFIDENCE: u32 = 95;
const FIRST_ATTEMPT_BONUS: i32 = 3;

const AGE_BANDS: [Band; 5] = [
    Band::new(Threshold::AtMost(30.0), 15, "Age ≤30"),
    Band::new(Threshold::AtMost(35.0), 5, "Age 31-35"),
    Band::new(Threshold::AtMost(37.0), -5, "Age 36-37"),
    Band::new(Threshold::AtMost(40.0), -15, "Age 38-40"),
    Band::new(Threshold::Any, -25, "Age >40"),
];

// Below 18.5 and 30+ share a band; 24.9..30 is borderline
const BMI_BANDS: [Band; 4] = [
    Band::new(Threshold::Between(18.5, 24.9), 5, "Healthy BMI"),
    Band::new(Threshold::Below(18.5), -10, "BMI outside healthy range"),
    Band::new(Threshold::AtLeast(30.0), -10, "BMI outside healthy range"),
    Band::new(Threshold::Any, -3, "Borderline BMI"),
];

const AMH_BANDS: [Band; 3] = [
    Band::new(Threshold::AtLeast(2.0), 8, "Good AMH level"),
    Band::new(Threshold::AtLeast(1.0), 2, "Adequate AMH level"),
    Band::new(Threshold::Any, -12, "Low AMH level"),
];

const PREVIOUS_CYCLE_BANDS: [Band; 2] = [
    Band::new(Threshold::Exactly(1.0), -5, "1 previous cycle"),
    Band::new(Threshold::AtLeast(2.0), -10, "Multiple previous cycles"),
];

const PARTNER_AGE_BANDS: [Band; 3] = [
    Band::new(Threshold::AtMost(35.0), 3, "Partner age ≤35"),
    Band::new(Threshold::AtLeast(45.0), -5, "Partner age ≥45"),
    Band::silent(Threshold::Any, 0),
];

/// Qualitative reading of a success rate.
/// Serializes as its full description text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outlook {
    Excellent,
    Good,
    Moderate,
    Challenging,
}

impl Outlook {
    pub fn from_rate(rate: f64) -> Self {
        if rate >= 60.0 {
            Outlook::Excellent
        } else if rate >= 45.0 {
            Outlook::Good
        } else if rate >= 30.0 {
            Outlook::Moderate
        } else {
            Outlook::Challenging
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Outlook::Excellent => "Excellent prospects - above average success rate",
            Outlook::Good => "Good prospects - average to above-average success rate",
            Outlook::Moderate => "Moderate prospects - consider optimization strategies",
            Outlook::Challenging => {
                "Challenging case - discuss alternative approaches with your doctor"
            }
        }
    }
}

impl Serialize for Outlook {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.description())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessPrediction {
    /// Percentage in [5, 85]
    pub success_rate: f64,
    /// Percentage in [60, 95]
    pub confidence: u32,
    pub factors: Vec<FactorImpact>,
    pub recommendations: Vec<String>,
    /// `None` only for the empty result
    pub interpretation: Option<Outlook>,
}

impl SuccessPrediction {
    /// Result returned when there is no patient to score.
    pub fn empty() -> Self {
        Self {
            success_rate: 0.0,
            confidence: 0,
            factors: Vec::new(),
            recommendations: Vec::new(),
            interpretation: None,
        }
    }
}

/// Estimate IVF success probability from base rate plus per-factor bands.
pub fn compute_success(factors: Option<&PatientFactors>) -> SuccessPrediction {
    let Some(patient) = factors else {
        return SuccessPrediction::empty();
    };

    let mut tally = Tally::default();

    if let Some(age) = patient.known_age() {
        tally.apply(&AGE_BANDS, f64::from(age));
    }
    if let Some(bmi) = patient.known_bmi() {
        tally.apply(&BMI_BANDS, bmi);
    }
    if let Some(amh) = patient.known_amh() {
        tally.apply(&AMH_BANDS, amh);
    }
    match patient.known_previous_cycles() {
        Some(cycles) => tally.apply(&PREVIOUS_CYCLE_BANDS, f64::from(cycles)),
        None => tally.record("First IVF attempt", FIRST_ATTEMPT_BONUS),
    }
    if let Some(partner_age) = patient.known_partner_age() {
        tally.apply(&PARTNER_AGE_BANDS, f64::from(partner_age));
    }

    let rate = (BASE_SUCCESS_RATE + f64::from(tally.adjustment))
        .clamp(MIN_SUCCESS_RATE, MAX_SUCCESS_RATE);

    SuccessPrediction {
        success_rate: round1(rate),
        confidence: confidence(patient),
        factors: tally.impacts,
        recommendations: recommendations(patient),
        interpretation: Some(Outlook::from_rate(rate)),
    }
}

#[derive(Default)]
struct Tally {
    adjustment: i32,
    impacts: Vec<FactorImpact>,
}

impl Tally {
    fn apply(&mut self, bands: &[Band], value: f64) {
        if let Some(band) = first_match(bands, value) {
            self.adjustment += band.delta;
            if let Some(label) = band.label {
                self.impacts.push(FactorImpact::new(label, band.delta));
            }
        }
    }

    fn record(&mut self, label: &str, delta: i32) {
        self.adjustment += delta;
        self.impacts.push(FactorImpact::new(label, delta));
    }
}

fn confidence(patient: &PatientFactors) -> u32 {
    let data_points = [
        patient.known_age().is_some(),
        patient.known_bmi().is_some(),
        patient.known_amh().is_some(),
        patient.known_fsh().is_some(),
        patient.known_partner_age().is_some(),
    ]
    .iter()
    .filter(|&&present| present)
    .count() as u32;

    (BASE_CONFIDENCE + data_points * CONFIDENCE_PER_DATA_POINT).min(MAX_CONFIDENCE)
}

fn recommendations(patient: &PatientFactors) -> Vec<String> {
    let mut out = Vec::new();
    if patient.known_age().is_some_and(|age| age > 35) {
        out.push("Consider genetic testing of embryos (PGT-A)".to_string());
    }
    if patient
        .known_bmi()
        .is_some_and(|bmi| !(18.5..25.0).contains(&bmi))
    {
        out.push("Optimize weight through nutrition and exercise".to_string());
    }
    if patient.known_amh().is_some_and(|amh| amh < 1.0) {
        out.push("Discuss aggressive stimulation protocols with your doctor".to_string());
    }
    if patient.lifestyle().is_none() {
        out.push("Optimize lifestyle: quit smoking, limit alcohol, manage stress".to_string());
    }
    out
}

use serde::Serialize;
use std::fmt;

use super::factors::{first_match, round1, Band, Threshold};
use crate::patient::PatientFactors;

const BASE_QUALITY: f64 = 65.0;
const MIN_QUALITY: f64 = 10.0;
const MAX_QUALITY: f64 = 95.0;
const MAX_DEVELOPMENT: f64 = 90.0;
const MAX_IMPLANTATION: f64 = 85.0;

const AGE_BANDS: [Band; 5] = [
    Band::silent(Threshold::AtMost(30.0), 20),
    Band::silent(Threshold::AtMost(35.0), 10),
    Band::silent(Threshold::AtMost(38.0), 0),
    Band::silent(Threshold::AtMost(42.0), -15),
    Band::silent(Threshold::Any, -30),
];

const AMH_BANDS: [Band; 3] = [
    Band::silent(Threshold::AtLeast(2.0), 10),
    Band::silent(Threshold::AtLeast(1.0), 5),
    Band::silent(Threshold::Any, -10),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EmbryoGrade {
    A,
    B,
    C,
    D,
}

impl EmbryoGrade {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            EmbryoGrade::A
        } else if score >= 65.0 {
            EmbryoGrade::B
        } else if score >= 45.0 {
            EmbryoGrade::C
        } else {
            EmbryoGrade::D
        }
    }

    pub fn quality(&self) -> &'static str {
        match self {
            EmbryoGrade::A => "Excellent",
            EmbryoGrade::B => "Good",
            EmbryoGrade::C => "Fair",
            EmbryoGrade::D => "Poor",
        }
    }
}

impl fmt::Display for EmbryoGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            EmbryoGrade::A => "A",
            EmbryoGrade::B => "B",
            EmbryoGrade::C => "C",
            EmbryoGrade::D => "D",
        };
        write!(f, "{} ({})", letter, self.quality())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbryoQuality {
    /// Score in [10, 95]
    pub quality_score: f64,
    /// `None` only for the empty result
    pub grade: Option<EmbryoGrade>,
    pub development_probability: f64,
    pub implantation_potential: f64,
    pub factors: Vec<String>,
}

impl EmbryoQuality {
    pub fn empty() -> Self {
        Self {
            quality_score: 0.0,
            grade: None,
            development_probability: 0.0,
            implantation_potential: 0.0,
            factors: Vec::new(),
        }
    }
}

/// Heuristic embryo-quality estimate from age, AMH and lifestyle keywords.
pub fn compute_embryo_quality(factors: Option<&PatientFactors>) -> EmbryoQuality {
    let Some(patient) = factors else {
        return EmbryoQuality::empty();
    };

    let mut adjustment = 0;
    if let Some(band) = patient
        .known_age()
        .and_then(|age| first_match(&AGE_BANDS, f64::from(age)))
    {
        adjustment += band.delta;
    }
    if let Some(band) = patient
        .known_amh()
        .and_then(|amh| first_match(&AMH_BANDS, amh))
    {
        adjustment += band.delta;
    }
    if let Some(lifestyle) = patient.lifestyle_lower() {
        adjustment += lifestyle_adjustment(&lifestyle);
    }

    let score = (BASE_QUALITY + f64::from(adjustment)).clamp(MIN_QUALITY, MAX_QUALITY);

    EmbryoQuality {
        quality_score: round1(score),
        grade: Some(EmbryoGrade::from_score(score)),
        development_probability: round1((score * 0.9).min(MAX_DEVELOPMENT)),
        implantation_potential: round1((score * 0.8).min(MAX_IMPLANTATION)),
        factors: describe(patient),
    }
}

// Checks are independent; "no smoking" earns both the bonus and the penalty.
fn lifestyle_adjustment(lifestyle: &str) -> i32 {
    let mut adjustment = 0;
    if lifestyle.contains("non-smoker") || lifestyle.contains("no smoking") {
        adjustment += 5;
    }
    if lifestyle.contains("exercise") || lifestyle.contains("active") {
        adjustment += 3;
    }
    if lifestyle.contains("smoking") {
        adjustment -= 15;
    }
    adjustment
}

fn describe(patient: &PatientFactors) -> Vec<String> {
    const MISSING: &str = "Not provided";
    vec![
        format!(
            "Age factor: {}",
            patient
                .known_age()
                .map_or_else(|| MISSING.to_string(), |a| a.to_string())
        ),
        format!(
            "AMH level: {}",
            patient
                .known_amh()
                .map_or_else(|| MISSING.to_string(), |a| format!("{:?}", a))
        ),
        format!("Lifestyle: {}", patient.lifestyle().unwrap_or(MISSING)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(age: Option<u32>, amh: Option<f64>, lifestyle: Option<&str>) -> PatientFactors {
        PatientFactors {
            age,
            amh_level: amh,
            lifestyle_factors: lifestyle.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_patient_is_empty() {
        let result = compute_embryo_quality(None);
        assert_eq!(result, EmbryoQuality::empty());
        assert!(result.grade.is_none());
    }

    #[test]
    fn test_no_data_uses_base() {
        let result = compute_embryo_quality(Some(&PatientFactors::default()));
        assert_eq!(result.quality_score, 65.0);
        assert_eq!(result.grade, Some(EmbryoGrade::B));
        assert_eq!(result.development_probability, 58.5);
        assert_eq!(result.implantation_potential, 52.0);
        assert_eq!(
            result.factors,
            vec![
                "Age factor: Not provided",
                "AMH level: Not provided",
                "Lifestyle: Not provided"
            ]
        );
    }

    #[test]
    fn test_age_bands() {
        let cases = [
            (30, 85.0),
            (31, 75.0),
            (35, 75.0),
            (36, 65.0),
            (38, 65.0),
            (39, 50.0),
            (42, 50.0),
            (43, 35.0),
        ];
        for (age, expected) in cases {
            let result = compute_embryo_quality(Some(&sample(Some(age), None, None)));
            assert_eq!(result.quality_score, expected, "age {}", age);
        }
    }

    #[test]
    fn test_amh_bands() {
        for (amh, expected) in [(2.0, 75.0), (1.0, 70.0), (0.9, 55.0)] {
            let result = compute_embryo_quality(Some(&sample(None, Some(amh), None)));
            assert_eq!(result.quality_score, expected, "amh {}", amh);
        }
    }

    #[test]
    fn test_lifestyle_keywords_independent() {
        assert_eq!(lifestyle_adjustment("non-smoker"), 5);
        assert_eq!(lifestyle_adjustment("daily exercise"), 3);
        assert_eq!(lifestyle_adjustment("very active"), 3);
        assert_eq!(lifestyle_adjustment("smoking 10/day"), -15);
        // Bonus and penalty both fire
        assert_eq!(lifestyle_adjustment("no smoking"), -10);
        assert_eq!(lifestyle_adjustment("non-smoker, quit smoking, exercise"), -7);
        assert_eq!(lifestyle_adjustment("vegetarian"), 0);
    }

    #[test]
    fn test_lifestyle_case_insensitive() {
        let result = compute_embryo_quality(Some(&sample(None, None, Some("Non-Smoker, EXERCISE"))));
        assert_eq!(result.quality_score, 73.0);
    }

    #[test]
    fn test_score_clamped() {
        let best = compute_embryo_quality(Some(&sample(
            Some(25),
            Some(4.0),
            Some("non-smoker, exercise"),
        )));
        // 65 + 20 + 10 + 5 + 3 = 103
        assert_eq!(best.quality_score, 95.0);
        assert_eq!(best.development_probability, 85.5);
        assert_eq!(best.implantation_potential, 76.0);

        let worst = compute_embryo_quality(Some(&sample(Some(45), Some(0.3), Some("smoking"))));
        // 65 - 30 - 10 - 15 = 10
        assert_eq!(worst.quality_score, 10.0);
        assert_eq!(worst.grade, Some(EmbryoGrade::D));
    }

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(EmbryoGrade::from_score(80.0), EmbryoGrade::A);
        assert_eq!(EmbryoGrade::from_score(79.9), EmbryoGrade::B);
        assert_eq!(EmbryoGrade::from_score(65.0), EmbryoGrade::B);
        assert_eq!(EmbryoGrade::from_score(64.9), EmbryoGrade::C);
        assert_eq!(EmbryoGrade::from_score(45.0), EmbryoGrade::C);
        assert_eq!(EmbryoGrade::from_score(44.9), EmbryoGrade::D);
    }

    #[test]
    fn test_grade_display() {
        assert_eq!(EmbryoGrade::A.to_string(), "A (Excellent)");
        assert_eq!(EmbryoGrade::D.to_string(), "D (Poor)");
    }

    #[test]
    fn test_factor_descriptions() {
        let result = compute_embryo_quality(Some(&sample(Some(33), Some(1.8), Some("active"))));
        assert_eq!(
            result.factors,
            vec!["Age factor: 33", "AMH level: 1.8", "Lifestyle: active"]
        );
    }

    #[test]
    fn test_whole_amh_keeps_decimal() {
        let result = compute_embryo_quality(Some(&sample(None, Some(2.0), None)));
        assert_eq!(result.factors[1], "AMH level: 2.0");
    }

    #[test]
    fn test_repeatable() {
        let patient = sample(Some(37), Some(1.2), Some("stress, no smoking"));
        assert_eq!(
            compute_embryo_quality(Some(&patient)),
            compute_embryo_quality(Some(&patient))
        );
    }
}

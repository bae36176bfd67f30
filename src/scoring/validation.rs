use crate::patient::{PatientFactors, WellnessSnapshot};

const MAX_AGE: u32 = 120;
const MAX_BMI: f64 = 100.0;
const MAX_AMH: f64 = 50.0;
const MAX_FSH: f64 = 200.0;
const MAX_CYCLES: u32 = 50;
const MAX_HEIGHT_CM: f64 = 300.0;
const MAX_WEIGHT_KG: f64 = 500.0;
const MAX_SLEEP_HOURS: f64 = 24.0;
const MAX_EXERCISE_MINUTES: u32 = 24 * 60;

/// Validate patient input before scoring.
/// Returns all validation errors at once (not just the first).
pub fn validate_factors(
    patient: &PatientFactors,
    wellness: Option<&WellnessSnapshot>,
) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    check_max(&mut errors, "patient.age", patient.age, MAX_AGE);
    check_max(&mut errors, "patient.partner_age", patient.partner_age, MAX_AGE);
    check_max(
        &mut errors,
        "patient.previous_ivf_cycles",
        patient.previous_ivf_cycles,
        MAX_CYCLES,
    );
    check_range(&mut errors, "patient.bmi", patient.bmi, MAX_BMI);
    check_range(&mut errors, "patient.amh_level", patient.amh_level, MAX_AMH);
    check_range(&mut errors, "patient.fsh_level", patient.fsh_level, MAX_FSH);
    let before_body = errors.len();
    check_range(&mut errors, "patient.height_cm", patient.height_cm, MAX_HEIGHT_CM);
    check_range(&mut errors, "patient.weight_kg", patient.weight_kg, MAX_WEIGHT_KG);

    // BMI derived from height and weight feeds scoring too
    let body_ok = errors.len() == before_body;
    if body_ok && patient.bmi.filter(|&b| b > 0.0).is_none() {
        check_range(
            &mut errors,
            "patient.bmi (from height and weight)",
            patient.known_bmi(),
            MAX_BMI,
        );
    }

    if let Some(wellness) = wellness {
        if let Some(stress) = wellness.stress_level {
            if !(1..=5).contains(&stress) {
                errors.push("wellness.stress_level: must be between 1 and 5".to_string());
            }
        }
        check_range(
            &mut errors,
            "wellness.sleep_hours",
            wellness.sleep_hours,
            MAX_SLEEP_HOURS,
        );
        check_max(
            &mut errors,
            "wellness.exercise_minutes",
            wellness.exercise_minutes,
            MAX_EXERCISE_MINUTES,
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_max(errors: &mut Vec<String>, field: &str, value: Option<u32>, max: u32) {
    if let Some(v) = value {
        if v > max {
            errors.push(format!("{}: {} exceeds maximum of {}", field, v, max));
        }
    }
}

fn check_range(errors: &mut Vec<String>, field: &str, value: Option<f64>, max: f64) {
    if let Some(v) = value {
        if !v.is_finite() || v < 0.0 {
            errors.push(format!("{}: must be a non-negative number, got {}", field, v));
        } else if v > max {
            errors.push(format!("{}: {} exceeds maximum of {}", field, v, max));
        }
    }
}

//! Feature preparation for the trained IVF success classifier.
//!
//! The classifier itself is trained and served elsewhere; this module reads
//! its metadata and produces feature vectors in the order it expects.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::patient::{PatientFactors, WellnessSnapshot};
use crate::scoring::factors::round1;

/// Default metadata file name written by the training step
pub const METADATA_FILE: &str = "ivf_model_metadata.json";

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ModelMetadata {
    pub feature_order: Vec<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub accuracy: Option<f64>,
}

/// Load classifier metadata from JSON
///
/// # Errors
///
/// Returns an error if the file is missing (the training step has not run),
/// unreadable, or not valid metadata JSON.
pub fn load_metadata(path: &Path) -> Result<ModelMetadata> {
    if !path.exists() {
        anyhow::bail!(
            "Model metadata not found at {}. Run the training step first.",
            path.display()
        );
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read model metadata at {}", path.display()))?;

    let meta: ModelMetadata = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse model metadata in {}", path.display()))?;

    tracing::debug!(
        path = %path.display(),
        features = meta.feature_order.len(),
        "loaded model metadata"
    );
    Ok(meta)
}

/// Classifier inputs with fallbacks applied for anything not recorded.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModelFeatures {
    pub age: f64,
    pub bmi: f64,
    pub amh: f64,
    pub fsh: f64,
    pub previous_ivf: f64,
    pub stress: f64,
    pub sleep_hours: f64,
    pub exercise_min: f64,
}

impl Default for ModelFeatures {
    fn default() -> Self {
        Self {
            age: 30.0,
            bmi: 22.5,
            amh: 2.5,
            fsh: 6.0,
            previous_ivf: 0.0,
            stress: 3.0,
            sleep_hours: 7.0,
            exercise_min: 30.0,
        }
    }
}

impl ModelFeatures {
    pub fn from_record(patient: &PatientFactors, wellness: Option<&WellnessSnapshot>) -> Self {
        let defaults = Self::default();
        let wellness = wellness.cloned().unwrap_or_default();

        Self {
            age: patient.known_age().map_or(defaults.age, f64::from),
            bmi: patient.known_bmi().unwrap_or(defaults.bmi),
            amh: patient.known_amh().unwrap_or(defaults.amh),
            fsh: patient.known_fsh().unwrap_or(defaults.fsh),
            previous_ivf: patient
                .previous_ivf_cycles
                .map_or(defaults.previous_ivf, f64::from),
            stress: wellness.stress_level.map_or(defaults.stress, f64::from),
            sleep_hours: wellness.sleep_hours.unwrap_or(defaults.sleep_hours),
            exercise_min: wellness
                .exercise_minutes
                .map_or(defaults.exercise_min, f64::from),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            "age" => Some(self.age),
            "bmi" => Some(self.bmi),
            "amh" => Some(self.amh),
            "fsh" => Some(self.fsh),
            "previous_ivf" => Some(self.previous_ivf),
            "stress" => Some(self.stress),
            "sleep_hours" => Some(self.sleep_hours),
            "exercise_min" => Some(self.exercise_min),
            _ => None,
        }
    }

    /// Feature values in the classifier's order; unknown names become 0.0.
    pub fn vector(&self, meta: &ModelMetadata) -> Vec<f64> {
        meta.feature_order
            .iter()
            .map(|name| {
                self.get(name).unwrap_or_else(|| {
                    tracing::warn!(feature = %name, "unknown model feature, using 0.0");
                    0.0
                })
            })
            .collect()
    }
}

/// Reading of a classifier success probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionOutcome {
    pub probability: f64,
    pub likely: bool,
}

impl PredictionOutcome {
    pub fn from_probability(probability: f64) -> Self {
        let probability = probability.clamp(0.0, 1.0);
        Self {
            probability,
            likely: probability >= 0.5,
        }
    }

    /// Probability as a percentage rounded to one decimal.
    pub fn percentage(&self) -> f64 {
        round1(self.probability * 100.0)
    }

    pub fn text(&self) -> &'static str {
        if self.likely {
            "Success Likely"
        } else {
            "Success Unlikely"
        }
    }
}

mod types;

pub use types::{PatientFactors, PatientRecord, WellnessSnapshot};

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Load a patient record from a YAML or JSON file
///
/// Files ending in `.json` are parsed as JSON; anything else as YAML.
///
/// # Errors
///
/// Returns an error if:
/// - The file does not exist or cannot be read
/// - The content cannot be parsed into a `PatientRecord`
pub fn load_patient(path: &Path) -> Result<PatientRecord> {
    if !path.exists() {
        anyhow::bail!("Patient file not found at {}", path.display());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read patient file at {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let record: PatientRecord = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse patient file: invalid JSON in {}", path.display()))?
    } else {
        serde_saphyr::from_str(&content)
            .with_context(|| format!("Failed to parse patient file: invalid YAML in {}", path.display()))?
    };

    tracing::debug!(path = %path.display(), "loaded patient record");
    Ok(record)
}

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::io::IsTerminal;

use crate::config::ColorChoice;
use crate::model::{ModelFeatures, ModelMetadata, PredictionOutcome};
use crate::scoring::{EmbryoQuality, FactorImpact, ProtocolPlan, SuccessPrediction};

const NO_DATA: &str = "No patient data available.";

/// Decide whether to colorize output.
/// `Auto` enables color only when stdout is a TTY.
pub fn should_use_colors(choice: ColorChoice) -> bool {
    match choice {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::stdout().is_terminal(),
    }
}

/// Format a percentage with one decimal ("38.0%")
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

fn heading(text: &str, use_colors: bool) -> String {
    if use_colors {
        text.bold().underline().to_string()
    } else {
        text.to_string()
    }
}

fn format_factor(factor: &FactorImpact, use_colors: bool) -> String {
    let impact = factor.impact_label();
    let impact = if !use_colors {
        impact
    } else if factor.positive {
        impact.green().to_string()
    } else {
        impact.red().to_string()
    };
    format!("    {:<28} {}", factor.label, impact)
}

fn format_list(title: &str, items: &[String]) -> Vec<String> {
    if items.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![format!("  {}:", title)];
    lines.extend(items.iter().map(|item| format!("    - {}", item)));
    lines
}

/// Format a success estimate as an indented block
pub fn format_success(prediction: &SuccessPrediction, use_colors: bool) -> String {
    let mut lines = vec![heading("IVF success estimate", use_colors)];

    let Some(outlook) = prediction.interpretation else {
        lines.push(format!("  {}", NO_DATA));
        return lines.join("\n");
    };

    let rate = format_percent(prediction.success_rate);
    let rate = if use_colors { rate.bold().to_string() } else { rate };
    lines.push(format!(
        "  Success rate: {} (confidence {}%)",
        rate, prediction.confidence
    ));
    lines.push(format!("  Outlook: {}", outlook.description()));

    if !prediction.factors.is_empty() {
        lines.push("  Factors:".to_string());
        lines.extend(
            prediction
                .factors
                .iter()
                .map(|factor| format_factor(factor, use_colors)),
        );
    }
    lines.extend(format_list("Recommendations", &prediction.recommendations));

    lines.join("\n")
}

/// Format an embryo-quality estimate as an indented block
pub fn format_embryo(quality: &EmbryoQuality, use_colors: bool) -> String {
    let mut lines = vec![heading("Embryo quality", use_colors)];

    let Some(grade) = quality.grade else {
        lines.push(format!("  {}", NO_DATA));
        return lines.join("\n");
    };

    let grade = if use_colors {
        grade.bold().to_string()
    } else {
        grade.to_string()
    };
    lines.push(format!(
        "  Score: {:.1}  Grade: {}",
        quality.quality_score, grade
    ));
    lines.push(format!(
        "  Development probability: {}",
        format_percent(quality.development_probability)
    ));
    lines.push(format!(
        "  Implantation potential: {}",
        format_percent(quality.implantation_potential)
    ));
    lines.extend(format_list("Based on", &quality.factors));

    lines.join("\n")
}

/// Format a protocol recommendation as an indented block
pub fn format_protocol(plan: &ProtocolPlan, use_colors: bool) -> String {
    let mut lines = vec![heading("Treatment protocol", use_colors)];

    let name = plan.protocol.name();
    let name = if use_colors {
        name.bold().to_string()
    } else {
        name.to_string()
    };
    lines.push(format!("  Protocol: {}", name));

    let Some(response) = plan.expected_response else {
        lines.push(format!("  {}", NO_DATA));
        return lines.join("\n");
    };

    lines.push(format!("  Expected response: {}", response));
    lines.push(format!(
        "  Personalization: {:.0}%",
        plan.personalization_score
    ));
    lines.extend(format_list("Medications", &plan.medication_suggestions));

    if let Some(timing) = &plan.timing_recommendations {
        lines.push("  Timing:".to_string());
        lines.push(format!("    Cycle start: {}", timing.cycle_start));
        lines.push(format!("    Stimulation: {}", timing.stimulation_duration));
        lines.push(format!("    Monitoring: {}", timing.monitoring_frequency));
        lines.push(format!("    Trigger: {}", timing.trigger_timing));
    }
    lines.extend(format_list("Optimization", &plan.success_optimization));

    lines.join("\n")
}

/// Format model features as "name = value" lines in classifier order
pub fn format_features(
    meta: &ModelMetadata,
    features: &ModelFeatures,
    outcome: Option<&PredictionOutcome>,
) -> String {
    let mut lines = vec![format!(
        "Model: {}",
        meta.model.as_deref().unwrap_or("(unnamed)")
    )];
    if let Some(accuracy) = meta.accuracy {
        lines.push(format!("Accuracy: {}", format_percent(accuracy * 100.0)));
    }
    for (name, value) in meta.feature_order.iter().zip(features.vector(meta)) {
        lines.push(format!("  {:<14} {}", name, value));
    }
    if let Some(outcome) = outcome {
        lines.push(format!(
            "Prediction: {} ({})",
            outcome.text(),
            format_percent(outcome.percentage())
        ));
    }
    lines.join("\n")
}

/// Everything computed in a single run, for JSON output
#[derive(Debug, Default, Serialize)]
pub struct Report<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_prediction: Option<&'a SuccessPrediction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embryo_quality: Option<&'a EmbryoQuality>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<&'a ProtocolPlan>,
}

pub fn format_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize report as JSON")
}

/// Threshold test for a single band. Bounds are inclusive unless named otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    Below(f64),
    AtMost(f64),
    AtLeast(f64),
    Exactly(f64),
    Between(f64, f64), // Inclusive range: low..=high
    Any,
}

impl Threshold {
    pub fn matches(&self, value: f64) -> bool {
        match self {
            Threshold::Below(n) => value < *n,
            Threshold::AtMost(n) => value <= *n,
            Threshold::AtLeast(n) => value >= *n,
            Threshold::Exactly(n) => value == *n,
            Threshold::Between(low, high) => value >= *low && value <= *high,
            Threshold::Any => true,
        }
    }
}

/// A point adjustment applied when `when` matches.
///
/// Bands with no label contribute their delta without producing a factor entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub when: Threshold,
    pub delta: i32,
    pub label: Option<&'static str>,
}

impl Band {
    pub const fn new(when: Threshold, delta: i32, label: &'static str) -> Self {
        Self {
            when,
            delta,
            label: Some(label),
        }
    }

    pub const fn silent(when: Threshold, delta: i32) -> Self {
        Self {
            when,
            delta,
            label: None,
        }
    }
}

/// First band matching `value`, in table order.
pub fn first_match(bands: &[Band], value: f64) -> Option<&Band> {
    bands.iter().find(|band| band.when.matches(value))
}

/// Signed percentage adjustment recorded against a named factor.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FactorImpact {
    pub label: String,
    pub impact: i32,
    pub positive: bool,
}

impl FactorImpact {
    pub fn new(label: &str, impact: i32) -> Self {
        Self {
            label: label.to_string(),
            impact,
            positive: impact > 0,
        }
    }

    /// e.g. "+15%", "-5%"
    pub fn impact_label(&self) -> String {
        format!("{:+}%", self.impact)
    }
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

use serde::{Deserialize, Serialize};

/// Triage level attached to an advisory payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
        }
    }
}

/// Advisory health summary attached to a case.
///
/// Non-authoritative: nothing in here is validated against the model output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AIAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,

    #[serde(default)]
    pub conditions: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<Urgency>,

    #[serde(default)]
    pub suggestions: Vec<String>,

    #[serde(default)]
    pub remedies: Vec<String>,

    #[serde(default)]
    pub flags: Vec<String>,

    /// 0.0..=1.0 when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl AIAnalysis {
    /// Fixed payload returned alongside every successful upstream reply.
    pub fn baseline() -> Self {
        Self {
            diagnosis: Some("Possible mild condition (auto-detected)".to_string()),
            urgency: Some(Urgency::Low),
            remedies: vec![
                "Drink warm fluids".to_string(),
                "Get rest".to_string(),
                "Stay hydrated".to_string(),
            ],
            suggestions: vec![
                "Consult a doctor if symptoms worsen or last over 3 days.".to_string(),
            ],
            ..Self::default()
        }
    }

    /// Payload returned when the upstream call failed: no findings at all.
    pub fn degraded() -> Self {
        Self {
            diagnosis: Some("unknown".to_string()),
            ..Self::default()
        }
    }

    /// True when the payload carries nothing worth attaching to a case.
    pub fn is_empty(&self) -> bool {
        let diagnosis_known = self
            .diagnosis
            .as_deref()
            .map(str::trim)
            .is_some_and(|d| !d.is_empty() && !d.eq_ignore_ascii_case("unknown"));

        !diagnosis_known
            && self.conditions.is_empty()
            && self.urgency.is_none()
            && self.suggestions.is_empty()
            && self.remedies.is_empty()
            && self.flags.is_empty()
            && self.confidence.is_none()
    }
}

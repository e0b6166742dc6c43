use serde::{Deserialize, Serialize};

/// Fixed values asserted on every record of this deployment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeploymentProfile {
    pub state_code: String,
    pub accommodation: String,
    pub provider_name: String,
    pub provider_tax_id: String,
}

/// How the admission character is inferred from the diária lines.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyPolicy {
    /// Any parsed UTI diária makes the stay urgent.
    UtiPresence,
    /// Urgent only when the earliest UTI diária precedes the earliest ward
    /// diária, or when there are UTI diárias and no ward diárias at all.
    UtiBeforeWard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    pub profile: DeploymentProfile,
    /// Characters scanned after a date anchor before falling back to lines.
    pub date_window_chars: usize,
    /// Lines scanned (anchor line included) by the line-oriented fallback.
    pub date_fallback_lines: usize,
    pub urgency_policy: UrgencyPolicy,
}

impl Default for DeploymentProfile {
    fn default() -> Self {
        Self {
            state_code: "SC".to_string(),
            accommodation: "APARTAMENTO".to_string(),
            provider_name: "UNIMED FLORIANOPOLIS".to_string(),
            provider_tax_id: "77.658.611/0001-08".to_string(),
        }
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            profile: DeploymentProfile::default(),
            date_window_chars: 100,
            date_fallback_lines: 5,
            urgency_policy: UrgencyPolicy::UtiPresence,
        }
    }
}

impl std::str::FromStr for UrgencyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "uti_presence" => Ok(UrgencyPolicy::UtiPresence),
            "uti_before_ward" => Ok(UrgencyPolicy::UtiBeforeWard),
            other => Err(format!("unknown urgency policy: {other}")),
        }
    }
}

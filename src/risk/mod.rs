//! Risk labels returned by the prediction service and the badge style each
//! one is shown with.

use serde::Serialize;

/// Categorical risk classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLabel {
    Baixo,
    Moderado,
    Alto,
    Critico,
    Unrecognized,
}

impl RiskLabel {
    /// Exact, case-sensitive match. Anything else is `Unrecognized`.
    pub fn parse(label: &str) -> Self {
        match label {
            "BAIXO" => RiskLabel::Baixo,
            "MODERADO" => RiskLabel::Moderado,
            "ALTO" => RiskLabel::Alto,
            "CRÍTICO" => RiskLabel::Critico,
            _ => RiskLabel::Unrecognized,
        }
    }

    pub fn style(self) -> RiskStyle {
        match self {
            RiskLabel::Baixo => RiskStyle::Low,
            RiskLabel::Moderado => RiskStyle::Moderate,
            RiskLabel::Alto => RiskStyle::High,
            RiskLabel::Critico => RiskStyle::Critical,
            RiskLabel::Unrecognized => RiskStyle::Neutral,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskStyle {
    Low,
    Moderate,
    High,
    Critical,
    Neutral,
}

/// Badge style for a label. Total over every string.
pub fn style_for(label: &str) -> RiskStyle {
    RiskLabel::parse(label).style()
}

/// Same as [`style_for`], with a missing label mapping to the neutral style
pub fn style_for_opt(label: Option<&str>) -> RiskStyle {
    label.map(style_for).unwrap_or(RiskStyle::Neutral)
}

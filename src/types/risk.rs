use serde::Serialize;

/// Overall risk classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Safe,   // 0..=20
    Review, // 21..=50
    Danger, // 51..=100
}

impl RiskLevel {
    /// Total over the score domain; the only place the bands are defined
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=20 => RiskLevel::Safe,
            21..=50 => RiskLevel::Review,
            _ => RiskLevel::Danger,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// One weighted contribution to the risk score
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskFactor {
    pub name: String,
    pub description: String,
    pub weight: u32,
}

impl RiskFactor {
    pub fn new(name: impl Into<String>, description: impl Into<String>, weight: u32) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            weight,
        }
    }
}

/// Scam-pattern check, reported whether or not it fired
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heuristic {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub severity: Severity,
    pub triggered: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskAnalysis {
    pub score: u8,
    pub level: RiskLevel,
    pub factors: Vec<RiskFactor>,
    pub heuristics: Vec<Heuristic>,
}

impl RiskAnalysis {
    pub fn triggered_heuristics(&self) -> impl Iterator<Item = &Heuristic> {
        self.heuristics.iter().filter(|h| h.triggered)
    }
}

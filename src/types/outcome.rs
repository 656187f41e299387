use chrono::{DateTime, Utc};
use serde::Serialize;

use super::instruction::{CpiNode, DecodedInstruction};
use super::risk::RiskAnalysis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningKind {
    Info,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    #[serde(rename = "type")]
    pub kind: WarningKind,
    pub title: String,
    pub description: String,
}

impl Warning {
    pub fn new(kind: WarningKind, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
        }
    }
}

/// How a finished simulation should be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    /// Failed because chain state moved on since the transaction was built
    Stale,
    Failed,
}

impl OutcomeStatus {
    pub fn is_stale(&self) -> bool {
        matches!(self, OutcomeStatus::Stale)
    }
}

/// Account state as reported by the simulator after execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSnapshot {
    pub lamports: u64,
    pub owner: String,
    pub data_len: usize,
    pub executable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountChange {
    pub pubkey: String,
    pub label: Option<String>,
    pub after: AccountSnapshot,
    pub is_closed: bool,
}

/// Complete analysis result, returned whole
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationOutcome {
    pub success: bool,
    pub status: OutcomeStatus,
    pub logs: Vec<String>,
    pub compute_units_used: u64,
    pub error: Option<String>,
    pub accounts: Vec<AccountChange>,
    pub instructions: Vec<DecodedInstruction>,
    pub cpi_tree: Vec<CpiNode>,
    pub risk_analysis: RiskAnalysis,
    pub human_summary: String,
    pub warnings: Vec<Warning>,
    /// Hex sha256 of the raw transaction bytes
    pub fingerprint: String,
    pub analyzed_at: DateTime<Utc>,
}

impl SimulationOutcome {
    pub fn is_stale(&self) -> bool {
        self.status.is_stale()
    }
}

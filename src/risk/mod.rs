use std::sync::Arc;
use tracing::debug;

use crate::classifier::compute_budget::group_thousands;
use crate::cpi::invoked_programs;
use crate::registry::ProgramRegistry;
use crate::types::{
    DecodedInstruction, Heuristic, InstructionKind, RiskAnalysis, RiskFactor, RiskLevel, Severity,
};

const LAMPORTS_PER_SOL: u64 = 1_000_000_000;
const LARGE_TRANSFER_LAMPORTS: u64 = 5 * LAMPORTS_PER_SOL;
// 0.0001 SOL
const LAMPORTS_PER_DISPLAY_UNIT: u64 = 100_000;
const HIGH_COMPUTE_UNITS: u64 = 400_000;
const MAX_SCORE: u32 = 100;

/// Signals shared by the weighted factors and the heuristic checklist
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RiskContext {
    pub unknown_instructions: usize,
    pub approvals: usize,
    pub unlimited_approval: bool,
    pub closures: usize,
    pub authority_changes: usize,
    /// Instructions other than compute-limit and priority-fee settings
    pub non_budget_instructions: usize,
    /// Some `Program <id> invoke` log line names an unregistered program
    pub unknown_in_logs: bool,
    pub large_transfers: Vec<u64>,
    pub compute_units: u64,
}

impl RiskContext {
    pub fn new(
        instructions: &[DecodedInstruction],
        logs: &[String],
        compute_units: u64,
        registry: &ProgramRegistry,
    ) -> Self {
        let count = |predicate: fn(&InstructionKind) -> bool| {
            instructions.iter().filter(|ix| predicate(&ix.kind)).count()
        };

        Self {
            unknown_instructions: instructions.iter().filter(|ix| !ix.is_known).count(),
            approvals: count(InstructionKind::is_approval),
            unlimited_approval: instructions
                .iter()
                .any(|ix| ix.kind.is_unlimited_approval()),
            closures: count(|kind| matches!(kind, InstructionKind::CloseAccount)),
            authority_changes: count(|kind| matches!(kind, InstructionKind::SetAuthority)),
            non_budget_instructions: count(|kind| !kind.is_budget_setting()),
            unknown_in_logs: invoked_programs(logs).any(|program| !registry.contains_str(program)),
            large_transfers: instructions
                .iter()
                .filter_map(|ix| ix.kind.sol_lamports())
                .filter(|&lamports| is_large_transfer(lamports))
                .collect(),
            compute_units,
        }
    }
}

/// Threshold applied to the amount as displayed, rounded to 4 decimals
fn is_large_transfer(lamports: u64) -> bool {
    let shown = lamports.saturating_add(LAMPORTS_PER_DISPLAY_UNIT / 2) / LAMPORTS_PER_DISPLAY_UNIT;
    shown > LARGE_TRANSFER_LAMPORTS / LAMPORTS_PER_DISPLAY_UNIT
}

struct HeuristicRule {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    severity: Severity,
    triggered: fn(&RiskContext) -> bool,
}

/// Reported in this order, all six every time
const HEURISTICS: [HeuristicRule; 6] = [
    HeuristicRule {
        id: "unlimited_approval",
        name: "Unlimited Token Approval",
        description: "Approving a delegate to spend all of your tokens is a phishing pattern",
        severity: Severity::High,
        triggered: |ctx| ctx.unlimited_approval,
    },
    HeuristicRule {
        id: "nft_authority_change",
        name: "NFT Authority Change",
        description: "Changing NFT mint or update authority can transfer ownership of your NFT",
        severity: Severity::High,
        triggered: |ctx| ctx.authority_changes > 0,
    },
    HeuristicRule {
        id: "close_account_drain",
        name: "Account Closure Drain",
        description: "Closing token accounts drains their lamport balance to a destination",
        severity: Severity::High,
        triggered: |ctx| ctx.closures > 0,
    },
    HeuristicRule {
        id: "unknown_delegate",
        name: "Delegate Set to Unknown Address",
        description: "Delegating to an unknown address may allow theft of your tokens",
        severity: Severity::High,
        triggered: |ctx| ctx.approvals > 0,
    },
    HeuristicRule {
        id: "instruction_chaining",
        name: "Multiple Instructions Chaining",
        description: "Complex multi-instruction transactions can hide malicious actions",
        severity: Severity::Medium,
        triggered: |ctx| ctx.non_budget_instructions > 4,
    },
    HeuristicRule {
        id: "unknown_cpi",
        name: "Unknown CPI Target",
        description: "An unknown program is invoked via Cross Program Invocation",
        severity: Severity::Medium,
        triggered: |ctx| ctx.unknown_in_logs || ctx.unknown_instructions > 0,
    },
];

/// Evaluate the full checklist, never filtering by outcome
pub fn evaluate_heuristics(ctx: &RiskContext) -> Vec<Heuristic> {
    HEURISTICS
        .iter()
        .map(|rule| Heuristic {
            id: rule.id,
            name: rule.name,
            description: rule.description,
            severity: rule.severity,
            triggered: (rule.triggered)(ctx),
        })
        .collect()
}

/// Weighted factors in evaluation order
pub fn weighted_factors(ctx: &RiskContext) -> Vec<RiskFactor> {
    let mut factors = Vec::new();

    // Unverified programs at the top level
    if ctx.unknown_instructions > 0 {
        factors.push(RiskFactor::new(
            "Unknown Program(s)",
            format!("{} instruction(s) use unverified programs", ctx.unknown_instructions),
            (ctx.unknown_instructions as u32).saturating_mul(15).min(30),
        ));
    }

    // Spending approvals
    if ctx.approvals > 0 {
        factors.push(RiskFactor::new(
            "Token Approval Detected",
            format!("{} token spending approval(s) in this transaction", ctx.approvals),
            if ctx.approvals >= 2 { 25 } else { 15 },
        ));
    }

    if ctx.closures > 0 {
        factors.push(RiskFactor::new(
            "Account Closure",
            format!("{} account(s) will be closed and SOL drained", ctx.closures),
            20,
        ));
    }

    if ctx.authority_changes > 0 {
        factors.push(RiskFactor::new(
            "Authority Change",
            "Token or mint authority is being changed",
            25,
        ));
    }

    if ctx.non_budget_instructions > 5 {
        factors.push(RiskFactor::new(
            "Multiple Instructions",
            format!(
                "{} instructions chained, verify each one",
                ctx.non_budget_instructions
            ),
            10,
        ));
    }

    if ctx.compute_units > HIGH_COMPUTE_UNITS {
        factors.push(RiskFactor::new(
            "High Compute Usage",
            format!(
                "{} CUs, complex execution chain",
                group_thousands(ctx.compute_units)
            ),
            10,
        ));
    }

    // One factor per large transfer
    for lamports in &ctx.large_transfers {
        factors.push(RiskFactor::new(
            "Large SOL Transfer",
            format!(
                "Transferring {:.4} SOL, verify recipient",
                *lamports as f64 / LAMPORTS_PER_SOL as f64
            ),
            15,
        ));
    }

    // CPI-only unknowns are not counted twice
    if ctx.unknown_in_logs && ctx.unknown_instructions == 0 {
        factors.push(RiskFactor::new(
            "Unknown CPI Program",
            "An unverified program is invoked during execution",
            10,
        ));
    }

    factors
}

/// Clamp of the raw weighted sum to [0, 100]
pub fn clamp_score(factors: &[RiskFactor]) -> u8 {
    let raw = factors
        .iter()
        .fold(0u32, |sum, factor| sum.saturating_add(factor.weight));
    raw.min(MAX_SCORE) as u8
}

impl RiskAnalysis {
    /// Analysis for a transaction that already landed: nothing scored, the
    /// checklist reported with every entry untriggered
    pub fn suppressed() -> Self {
        Self {
            score: 0,
            level: RiskLevel::Safe,
            factors: Vec::new(),
            heuristics: HEURISTICS
                .iter()
                .map(|rule| Heuristic {
                    id: rule.id,
                    name: rule.name,
                    description: rule.description,
                    severity: rule.severity,
                    triggered: false,
                })
                .collect(),
        }
    }
}

/// Risk scorer - weighs decoded instructions and execution logs
#[derive(Debug, Clone)]
pub struct RiskScorer {
    registry: Arc<ProgramRegistry>,
}

impl RiskScorer {
    pub fn new(registry: Arc<ProgramRegistry>) -> Self {
        Self { registry }
    }

    pub fn analyze(
        &self,
        instructions: &[DecodedInstruction],
        logs: &[String],
        compute_units: u64,
    ) -> RiskAnalysis {
        let ctx = RiskContext::new(instructions, logs, compute_units, &self.registry);
        let factors = weighted_factors(&ctx);
        let score = clamp_score(&factors);
        let level = RiskLevel::from_score(score);

        debug!(
            "Risk score {} ({:?}) from {} factor(s)",
            score,
            level,
            factors.len()
        );

        RiskAnalysis {
            score,
            level,
            factors,
            heuristics: evaluate_heuristics(&ctx),
        }
    }
}

use crate::stale::{is_stale_error, STALE_ACCOUNTS_SUMMARY, STALE_POOL_SUMMARY};
use crate::types::{DecodedInstruction, InstructionKind, OutcomeStatus, RiskAnalysis, Warning, WarningKind};

const GENERIC_FAILURE_SUMMARY: &str = "Simulation failed against current chain state. If this is a historical transaction, on-chain conditions may have changed since it landed.";

const DEFAULT_SUMMARY: &str = "This transaction interacts with Solana programs. Check the Instructions tab for full details.";

const DEX_LOG_KEYWORDS: [&str; 6] = ["swap", "raydium", "whirlpool", "orca", "jupiter", "amm"];
const DEX_PROGRAM_KEYWORDS: [&str; 4] = ["raydium", "whirlpool", "orca", "jupiter"];

/// Action phrase per instruction category, in sentence order
const ACTION_PHRASES: [(fn(&InstructionKind) -> bool, &str); 9] = [
    (|kind| matches!(kind, InstructionKind::SolTransfer { .. }), "transfer SOL"),
    (|kind| matches!(kind, InstructionKind::TokenTransfer { .. }), "transfer tokens"),
    (
        |kind| matches!(kind, InstructionKind::TokenApprove { .. }),
        "grant token spending permission to a delegate",
    ),
    (
        |kind| matches!(kind, InstructionKind::CloseAccount),
        "close token accounts and drain their balance",
    ),
    (
        |kind| matches!(kind, InstructionKind::CreateAccount { .. } | InstructionKind::CreateAta),
        "create new accounts",
    ),
    (
        |kind| matches!(kind, InstructionKind::SetAuthority),
        "change authority over a token or NFT",
    ),
    (|kind| matches!(kind, InstructionKind::MintTokens { .. }), "mint new tokens"),
    (|kind| matches!(kind, InstructionKind::BurnTokens { .. }), "burn tokens permanently"),
    (
        |kind| matches!(kind, InstructionKind::Unknown),
        "interact with one or more unverified programs",
    ),
];

/// Used only when no instruction produced a phrase
const LOG_PHRASES: [(&[&str], &str); 8] = [
    (&["swap"], "perform a token swap"),
    (&["transfer"], "transfer tokens or assets"),
    (&["mint"], "mint tokens"),
    (&["burn"], "burn tokens"),
    (&["stake"], "interact with staking"),
    (&["nft", "metadata"], "interact with an NFT"),
    (&["liquidity", "pool"], "interact with a liquidity pool"),
    (&["borrow", "repay"], "interact with a lending protocol"),
];

/// One-sentence description of what the transaction does, or why it failed
pub fn summary(instructions: &[DecodedInstruction], logs: &[String], error: Option<&str>) -> String {
    match error {
        Some(_) => failure_summary(instructions, logs, error),
        None => success_summary(instructions, logs),
    }
}

pub fn failure_summary(
    instructions: &[DecodedInstruction],
    logs: &[String],
    error: Option<&str>,
) -> String {
    if is_stale_error(error) {
        return STALE_ACCOUNTS_SUMMARY.to_string();
    }

    if looks_like_swap(instructions, logs) {
        return STALE_POOL_SUMMARY.to_string();
    }

    GENERIC_FAILURE_SUMMARY.to_string()
}

pub fn success_summary(instructions: &[DecodedInstruction], logs: &[String]) -> String {
    let mut phrases: Vec<&str> = ACTION_PHRASES
        .iter()
        .filter(|(applies, _)| instructions.iter().any(|ix| applies(&ix.kind)))
        .map(|(_, phrase)| *phrase)
        .collect();

    if phrases.is_empty() && !logs.is_empty() {
        let text = log_text(logs);
        phrases = LOG_PHRASES
            .iter()
            .filter(|(keywords, _)| keywords.iter().any(|keyword| text.contains(keyword)))
            .map(|(_, phrase)| *phrase)
            .collect();
    }

    if phrases.is_empty() {
        return DEFAULT_SUMMARY.to_string();
    }

    format!("This transaction will {}.", join_phrases(&phrases))
}

/// `a`, `a, and b`, `a, b, and c`
pub fn join_phrases(phrases: &[&str]) -> String {
    match phrases {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{}, and {}", init.join(", "), last),
    }
}

/// One warning per risky category present, then one for the score band.
/// Nothing is reported for a stale outcome.
pub fn warnings(
    instructions: &[DecodedInstruction],
    analysis: &RiskAnalysis,
    status: OutcomeStatus,
) -> Vec<Warning> {
    if status.is_stale() {
        return Vec::new();
    }

    let any = |predicate: fn(&DecodedInstruction) -> bool| instructions.iter().any(predicate);
    let mut warnings = Vec::new();

    if any(|ix| !ix.is_known) {
        warnings.push(Warning::new(
            WarningKind::Warning,
            "Unknown Program Interaction",
            "One or more instructions involve programs not in the verified registry.",
        ));
    }

    if any(|ix| ix.kind.is_approval()) {
        warnings.push(Warning::new(
            WarningKind::Warning,
            "Token Approval Detected",
            "This transaction grants spending permission to a delegate address.",
        ));
    }

    if any(|ix| matches!(ix.kind, InstructionKind::CloseAccount)) {
        warnings.push(Warning::new(
            WarningKind::Danger,
            "Account Closure Detected",
            "An account will be closed and its balance transferred out.",
        ));
    }

    if any(|ix| matches!(ix.kind, InstructionKind::SetAuthority)) {
        warnings.push(Warning::new(
            WarningKind::Danger,
            "Authority Change Detected",
            "Token or NFT authority is being modified in this transaction.",
        ));
    }

    if analysis.score > 50 {
        warnings.push(Warning::new(
            WarningKind::Danger,
            "High Risk Transaction",
            format!(
                "Risk score {}/100: review every instruction carefully before signing.",
                analysis.score
            ),
        ));
    } else if analysis.score > 20 {
        warnings.push(Warning::new(
            WarningKind::Warning,
            "Review Recommended",
            format!(
                "Risk score {}/100: some aspects of this transaction need attention.",
                analysis.score
            ),
        ));
    }

    warnings
}

fn log_text(logs: &[String]) -> String {
    logs.join(" ").to_lowercase()
}

fn looks_like_swap(instructions: &[DecodedInstruction], logs: &[String]) -> bool {
    let text = log_text(logs);
    if DEX_LOG_KEYWORDS.iter().any(|keyword| text.contains(keyword)) {
        return true;
    }

    instructions.iter().any(|ix| {
        let program = ix.program_name.to_lowercase();
        ix.description.to_lowercase().contains("swap")
            || DEX_PROGRAM_KEYWORDS.iter().any(|keyword| program.contains(keyword))
    })
}

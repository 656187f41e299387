use crate::types::OutcomeStatus;

/// Error fragments that mean "the accounts moved on", matched bare or quoted
const STALE_ERROR_MARKERS: [&str; 3] = ["IllegalOwner", "AccountNotFound", "InvalidAccountData"];

/// Summary for a failure caused by account drift
pub const STALE_ACCOUNTS_SUMMARY: &str = "Simulation failed because one or more accounts have changed state since this transaction landed on-chain. This is expected for historical transactions.";

/// Summary for a failed swap against pool state that has since moved
pub const STALE_POOL_SUMMARY: &str = "This appears to be a DEX swap. Simulation failed likely due to stale pool state. The transaction may have succeeded on-chain at the time it was submitted.";

pub fn is_stale_error(error: Option<&str>) -> bool {
    error.map_or(false, |error| {
        STALE_ERROR_MARKERS.iter().any(|marker| error.contains(marker))
    })
}

/// Only the two stale phrasings count, nothing else in a summary does
pub fn is_stale_summary(summary: &str) -> bool {
    summary == STALE_ACCOUNTS_SUMMARY || summary == STALE_POOL_SUMMARY
}

/// Read a finished simulation. Anything outside the allow-list stays `Failed`.
pub fn classify(error: Option<&str>, summary: &str) -> OutcomeStatus {
    match error {
        None => OutcomeStatus::Success,
        Some(_) if is_stale_error(error) || is_stale_summary(summary) => OutcomeStatus::Stale,
        Some(_) => OutcomeStatus::Failed,
    }
}

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::{TransactionError, VersionedTransaction};
use std::future::Future;

use crate::error::Result;
use crate::types::AccountSnapshot;

/// What the simulator reports about one execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    pub logs: Vec<String>,
    /// Transaction error rendered as text, `None` on success
    pub error: Option<String>,
    pub compute_units_consumed: u64,
    pub accounts: Vec<(Pubkey, AccountSnapshot)>,
}

impl ExecutionReport {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// A transaction that already landed, with its recorded execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedTransaction {
    pub slot: u64,
    pub raw_transaction: Vec<u8>,
    pub report: ExecutionReport,
}

/// Source of chain data for the analysis pipeline.
///
/// Each call is one-shot; retries and backoff are the implementor's concern.
pub trait SimulationProvider: Send + Sync {
    /// Execute the transaction against current chain state without landing it
    fn simulate(
        &self,
        transaction: &VersionedTransaction,
        addresses: &[Pubkey],
    ) -> impl Future<Output = Result<ExecutionReport>> + Send;

    /// Full address list stored in an address lookup table
    fn resolve_address_table(
        &self,
        table: &Pubkey,
    ) -> impl Future<Output = Result<Vec<Pubkey>>> + Send;

    fn get_confirmed_transaction(
        &self,
        signature: &Signature,
    ) -> impl Future<Output = Result<ConfirmedTransaction>> + Send;
}

/// Render a transaction error the way RPC clients show it: unit variants as a
/// bare name (`AccountNotFound`), everything else as compact JSON
/// (`{"InstructionError":[0,"IllegalOwner"]}`).
pub fn render_transaction_error(err: &TransactionError) -> String {
    match serde_json::to_value(err) {
        Ok(serde_json::Value::String(name)) => name,
        Ok(value) => value.to_string(),
        Err(_) => err.to_string(),
    }
}

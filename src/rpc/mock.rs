use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::{Transaction, VersionedTransaction};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Result, SimLensError};

use super::provider::{ConfirmedTransaction, ExecutionReport, SimulationProvider};

/// In-memory provider for pipeline tests
#[derive(Debug, Default)]
pub struct MockProvider {
    pub report: ExecutionReport,
    pub tables: HashMap<Pubkey, Vec<Pubkey>>,
    pub confirmed: Option<ConfirmedTransaction>,
    pub unreachable: bool,
    pub simulate_calls: AtomicUsize,
}

impl MockProvider {
    pub fn with_report(report: ExecutionReport) -> Self {
        Self {
            report,
            ..Default::default()
        }
    }

    pub fn with_logs(logs: &[&str]) -> Self {
        Self::with_report(ExecutionReport {
            logs: logs.iter().map(|line| line.to_string()).collect(),
            ..Default::default()
        })
    }

    pub fn failing(error: &str, logs: &[&str]) -> Self {
        Self::with_report(ExecutionReport {
            logs: logs.iter().map(|line| line.to_string()).collect(),
            error: Some(error.to_string()),
            ..Default::default()
        })
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Default::default()
        }
    }

    pub fn simulations(&self) -> usize {
        self.simulate_calls.load(Ordering::SeqCst)
    }

    fn connection_refused() -> SimLensError {
        SimLensError::Transport(ClientError::from(ClientErrorKind::Custom(
            "connection refused".to_string(),
        )))
    }
}

impl SimulationProvider for MockProvider {
    async fn simulate(
        &self,
        _transaction: &VersionedTransaction,
        _addresses: &[Pubkey],
    ) -> Result<ExecutionReport> {
        self.simulate_calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable {
            return Err(Self::connection_refused());
        }
        Ok(self.report.clone())
    }

    async fn resolve_address_table(&self, table: &Pubkey) -> Result<Vec<Pubkey>> {
        if self.unreachable {
            return Err(Self::connection_refused());
        }
        self.tables
            .get(table)
            .cloned()
            .ok_or_else(|| SimLensError::address_table(format!("table {} not found", table)))
    }

    async fn get_confirmed_transaction(&self, _signature: &Signature) -> Result<ConfirmedTransaction> {
        if self.unreachable {
            return Err(Self::connection_refused());
        }
        self.confirmed
            .clone()
            .ok_or_else(|| SimLensError::invalid_request("transaction not found"))
    }
}

/// Unsigned legacy transaction paying from `payer`
pub fn legacy_transaction(instructions: &[Instruction], payer: &Pubkey) -> VersionedTransaction {
    let mut message = Message::new(instructions, Some(payer));
    message.recent_blockhash = Hash::new_unique();
    VersionedTransaction::from(Transaction::new_unsigned(message))
}

pub fn wire_bytes(transaction: &VersionedTransaction) -> Vec<u8> {
    bincode::serialize(transaction).expect("serialize transaction")
}

pub fn encode(transaction: &VersionedTransaction) -> String {
    base64::encode(wire_bytes(transaction))
}

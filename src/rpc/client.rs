use solana_account_decoder::{UiAccount, UiAccountEncoding};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{
    RpcSimulateTransactionAccountsConfig, RpcSimulateTransactionConfig, RpcTransactionConfig,
};
use solana_sdk::account::Account;
use solana_sdk::address_lookup_table::state::AddressLookupTable;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::VersionedTransaction;
use solana_transaction_status::option_serializer::OptionSerializer;
use solana_transaction_status::{EncodedTransaction, TransactionBinaryEncoding, UiTransactionEncoding};
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::{Result, SimLensError};
use crate::types::AccountSnapshot;

use super::provider::{render_transaction_error, ConfirmedTransaction, ExecutionReport, SimulationProvider};

/// Simulation provider backed by a Solana JSON-RPC endpoint
pub struct RpcSimulationProvider {
    client: RpcClient,
    commitment: CommitmentConfig,
    max_account_states: usize,
}

impl RpcSimulationProvider {
    pub fn new(
        endpoint: impl Into<String>,
        commitment: CommitmentConfig,
        timeout: Duration,
        max_account_states: usize,
    ) -> Self {
        let client = RpcClient::new_with_timeout_and_commitment(endpoint.into(), timeout, commitment);

        Self {
            client,
            commitment,
            max_account_states,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.rpc.endpoint.clone(),
            config.commitment(),
            config.request_timeout(),
            config.rpc.max_account_states,
        )
    }

    pub fn endpoint(&self) -> String {
        self.client.url()
    }
}

impl SimulationProvider for RpcSimulationProvider {
    async fn simulate(
        &self,
        transaction: &VersionedTransaction,
        addresses: &[Pubkey],
    ) -> Result<ExecutionReport> {
        let requested: Vec<Pubkey> = addresses
            .iter()
            .take(self.max_account_states)
            .copied()
            .collect();

        let accounts = (!requested.is_empty()).then(|| RpcSimulateTransactionAccountsConfig {
            encoding: Some(UiAccountEncoding::Base64),
            addresses: requested.iter().map(Pubkey::to_string).collect(),
        });

        let config = RpcSimulateTransactionConfig {
            sig_verify: false,
            replace_recent_blockhash: true,
            commitment: Some(self.commitment),
            encoding: Some(UiTransactionEncoding::Base64),
            accounts,
            ..RpcSimulateTransactionConfig::default()
        };

        let response = self
            .client
            .simulate_transaction_with_config(transaction, config)
            .await?;
        let value = response.value;

        debug!(
            "Simulation at slot {}: err={:?}, units={:?}",
            response.context.slot, value.err, value.units_consumed
        );

        let accounts = value
            .accounts
            .unwrap_or_default()
            .into_iter()
            .zip(requested)
            .filter_map(|(account, key)| account.map(|ui| (key, snapshot(&ui))))
            .collect();

        Ok(ExecutionReport {
            logs: value.logs.unwrap_or_default(),
            error: value.err.as_ref().map(render_transaction_error),
            compute_units_consumed: value.units_consumed.unwrap_or(0),
            accounts,
        })
    }

    async fn resolve_address_table(&self, table: &Pubkey) -> Result<Vec<Pubkey>> {
        let account = self.client.get_account(table).await?;

        let lookup_table = AddressLookupTable::deserialize(&account.data)
            .map_err(|e| SimLensError::address_table(format!("{}: {}", table, e)))?;

        debug!("Resolved lookup table {} ({} addresses)", table, lookup_table.addresses.len());
        Ok(lookup_table.addresses.to_vec())
    }

    async fn get_confirmed_transaction(&self, signature: &Signature) -> Result<ConfirmedTransaction> {
        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::Base64),
            commitment: Some(self.commitment),
            max_supported_transaction_version: Some(0),
        };

        let confirmed = self
            .client
            .get_transaction_with_config(signature, config)
            .await?;

        let raw_transaction = encoded_transaction_bytes(&confirmed.transaction.transaction)?;

        let report = match confirmed.transaction.meta {
            Some(meta) => ExecutionReport {
                logs: match meta.log_messages {
                    OptionSerializer::Some(logs) => logs,
                    _ => Vec::new(),
                },
                error: meta.err.as_ref().map(render_transaction_error),
                compute_units_consumed: match meta.compute_units_consumed {
                    OptionSerializer::Some(units) => units,
                    _ => 0,
                },
                accounts: Vec::new(),
            },
            None => ExecutionReport::default(),
        };

        Ok(ConfirmedTransaction {
            slot: confirmed.slot,
            raw_transaction,
            report,
        })
    }
}

fn snapshot(account: &UiAccount) -> AccountSnapshot {
    AccountSnapshot {
        lamports: account.lamports,
        owner: account.owner.clone(),
        data_len: account
            .decode::<Account>()
            .map(|decoded| decoded.data.len())
            .unwrap_or(0),
        executable: account.executable,
    }
}

/// Wire bytes of a transaction returned in binary encoding
fn encoded_transaction_bytes(encoded: &EncodedTransaction) -> Result<Vec<u8>> {
    match encoded {
        EncodedTransaction::Binary(blob, TransactionBinaryEncoding::Base64) => base64::decode(blob)
            .map_err(|e| SimLensError::decode(format!("Invalid base64 transaction: {}", e))),
        EncodedTransaction::Binary(blob, TransactionBinaryEncoding::Base58)
        | EncodedTransaction::LegacyBinary(blob) => bs58::decode(blob)
            .into_vec()
            .map_err(|e| SimLensError::decode(format!("Invalid base58 transaction: {}", e))),
        _ => Err(SimLensError::decode(
            "Unsupported transaction encoding - expected binary",
        )),
    }
}

use futures::future::join_all;
use serde::Serialize;
use solana_sdk::message::v0::MessageAddressTableLookup;
use solana_sdk::message::VersionedMessage;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::{Transaction, VersionedTransaction};
use tracing::{debug, warn};

use crate::error::{Result, SimLensError};
use crate::rpc::SimulationProvider;
use crate::types::RawInstruction;

/// Anything shorter cannot hold a signature count, header and one key
const MIN_TRANSACTION_BYTES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    Versioned,
    Legacy,
}

#[derive(Debug, Clone)]
pub struct DecodedTransaction {
    /// Static keys followed by any addresses loaded from lookup tables
    pub account_keys: Vec<Pubkey>,
    pub instructions: Vec<RawInstruction>,
    pub format: WireFormat,
    pub transaction: VersionedTransaction,
}

impl DecodedTransaction {
    pub fn uses_lookup_tables(&self) -> bool {
        self.transaction
            .message
            .address_table_lookups()
            .map_or(false, |lookups| !lookups.is_empty())
    }
}

/// Strip whitespace and base64-decode a serialized transaction
pub fn decode_base64(input: &str) -> Result<Vec<u8>> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = base64::decode(&compact)
        .map_err(|e| SimLensError::decode(format!("Invalid base64: {}", e)))?;

    if bytes.len() < MIN_TRANSACTION_BYTES {
        return Err(SimLensError::decode(format!(
            "Transaction too short: {} bytes",
            bytes.len()
        )));
    }

    Ok(bytes)
}

/// Parse wire bytes, trying the versioned layout before the legacy one
pub fn decode_wire(bytes: &[u8]) -> Result<(VersionedTransaction, WireFormat)> {
    match bincode::deserialize::<VersionedTransaction>(bytes) {
        Ok(transaction) => {
            let format = match transaction.message {
                VersionedMessage::Legacy(_) => WireFormat::Legacy,
                VersionedMessage::V0(_) => WireFormat::Versioned,
            };
            Ok((transaction, format))
        }
        Err(versioned_err) => {
            debug!("Versioned parse failed ({}), trying legacy layout", versioned_err);
            let legacy: Transaction = bincode::deserialize(bytes).map_err(|legacy_err| {
                SimLensError::decode(format!(
                    "Not a versioned ({}) or legacy ({}) transaction",
                    versioned_err, legacy_err
                ))
            })?;
            Ok((VersionedTransaction::from(legacy), WireFormat::Legacy))
        }
    }
}

/// Turns transaction bytes into instructions with fully resolved account keys
pub struct TransactionDecoder<'a, P> {
    provider: &'a P,
}

impl<'a, P: SimulationProvider> TransactionDecoder<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    pub async fn decode(&self, input: &str) -> Result<DecodedTransaction> {
        let bytes = decode_base64(input)?;
        self.decode_bytes(&bytes).await
    }

    pub async fn decode_bytes(&self, bytes: &[u8]) -> Result<DecodedTransaction> {
        let (transaction, format) = decode_wire(bytes)?;
        let account_keys = self.account_keys(&transaction.message).await;
        let instructions = raw_instructions(&transaction.message, &account_keys);

        debug!(
            "Decoded {:?} transaction: {} keys, {} instructions",
            format,
            account_keys.len(),
            instructions.len()
        );

        Ok(DecodedTransaction {
            account_keys,
            instructions,
            format,
            transaction,
        })
    }

    async fn account_keys(&self, message: &VersionedMessage) -> Vec<Pubkey> {
        let mut keys = message.static_account_keys().to_vec();

        let lookups = match message.address_table_lookups() {
            Some(lookups) if !lookups.is_empty() => lookups,
            _ => return keys,
        };

        match self.load_addresses(lookups).await {
            Ok(loaded) => keys.extend(loaded),
            Err(e) => warn!("Address table resolution failed, using static keys only: {}", e),
        }

        keys
    }

    /// Writable addresses of every table in lookup order, then read-only ones
    async fn load_addresses(&self, lookups: &[MessageAddressTableLookup]) -> Result<Vec<Pubkey>> {
        let tables = join_all(
            lookups
                .iter()
                .map(|lookup| self.provider.resolve_address_table(&lookup.account_key)),
        )
        .await;

        let mut writable = Vec::new();
        let mut readonly = Vec::new();

        for (lookup, table) in lookups.iter().zip(tables) {
            let addresses = table?;
            writable.extend(select(&addresses, &lookup.writable_indexes, &lookup.account_key)?);
            readonly.extend(select(&addresses, &lookup.readonly_indexes, &lookup.account_key)?);
        }

        writable.extend(readonly);
        Ok(writable)
    }
}

fn select(addresses: &[Pubkey], indexes: &[u8], table: &Pubkey) -> Result<Vec<Pubkey>> {
    indexes
        .iter()
        .map(|&index| {
            addresses.get(index as usize).copied().ok_or_else(|| {
                SimLensError::address_table(format!(
                    "index {} out of range for table {} ({} entries)",
                    index,
                    table,
                    addresses.len()
                ))
            })
        })
        .collect()
}

/// Out-of-range indexes resolve to the default key
fn raw_instructions(message: &VersionedMessage, keys: &[Pubkey]) -> Vec<RawInstruction> {
    let key_at = |index: u8| keys.get(index as usize).copied().unwrap_or_default();

    message
        .instructions()
        .iter()
        .map(|ix| {
            RawInstruction::new(
                key_at(ix.program_id_index),
                ix.accounts.iter().map(|&index| key_at(index)).collect(),
                ix.data.clone(),
            )
        })
        .collect()
}

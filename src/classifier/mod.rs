pub mod associated_token;
pub mod compute_budget;
pub mod system;
pub mod token;

use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tracing::debug;

use crate::error::InstructionDecodeError;
use crate::registry::{
    ProgramRegistry, ASSOCIATED_TOKEN_PROGRAM_ID, COMPUTE_BUDGET_PROGRAM_ID, SYSTEM_PROGRAM_ID,
    TOKEN_2022_PROGRAM_ID, TOKEN_PROGRAM_ID,
};
use crate::types::{DecodedInstruction, InstructionKind, RawInstruction};

/// Semantic type plus one-line description produced by a program decoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub kind: InstructionKind,
    pub description: String,
}

impl Decoded {
    pub fn new(kind: InstructionKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
        }
    }
}

/// Programs with a dedicated decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramKind {
    System,
    /// SPL Token and Token-2022 share the base instruction layout
    Token,
    AssociatedToken,
    ComputeBudget,
    Other,
}

impl ProgramKind {
    pub fn of(program_id: &Pubkey) -> Self {
        if *program_id == SYSTEM_PROGRAM_ID {
            ProgramKind::System
        } else if *program_id == TOKEN_PROGRAM_ID || *program_id == TOKEN_2022_PROGRAM_ID {
            ProgramKind::Token
        } else if *program_id == ASSOCIATED_TOKEN_PROGRAM_ID {
            ProgramKind::AssociatedToken
        } else if *program_id == COMPUTE_BUDGET_PROGRAM_ID {
            ProgramKind::ComputeBudget
        } else {
            ProgramKind::Other
        }
    }
}

/// Run a fallible decoder, degrading to its generic description on error.
/// The error stays local to the one instruction.
fn decode_or<F, G>(ix: &RawInstruction, decoder: F, fallback: G) -> Decoded
where
    F: FnOnce(&RawInstruction) -> Result<Decoded, InstructionDecodeError>,
    G: FnOnce() -> Decoded,
{
    decoder(ix).unwrap_or_else(|e| {
        debug!("Could not decode instruction for {}: {}", ix.program_id, e);
        fallback()
    })
}

/// Turns raw instructions into [`DecodedInstruction`]s
#[derive(Debug, Clone)]
pub struct InstructionClassifier {
    registry: Arc<ProgramRegistry>,
}

impl InstructionClassifier {
    pub fn new(registry: Arc<ProgramRegistry>) -> Self {
        Self { registry }
    }

    /// Classify every instruction, preserving order and index
    pub fn classify_all(&self, instructions: &[RawInstruction]) -> Vec<DecodedInstruction> {
        instructions
            .iter()
            .enumerate()
            .map(|(index, ix)| self.classify(index, ix))
            .collect()
    }

    pub fn classify(&self, index: usize, ix: &RawInstruction) -> DecodedInstruction {
        let info = self.registry.lookup(&ix.program_id);

        let decoded = match ProgramKind::of(&ix.program_id) {
            ProgramKind::System => decode_or(ix, system::decode, system::fallback),
            ProgramKind::Token => decode_or(ix, token::decode, token::fallback),
            ProgramKind::AssociatedToken => {
                decode_or(ix, associated_token::decode, associated_token::fallback)
            }
            ProgramKind::ComputeBudget => {
                decode_or(ix, compute_budget::decode, compute_budget::fallback)
            }
            ProgramKind::Other => generic(ix),
        };

        DecodedInstruction {
            index,
            program_id: ix.program_id.to_string(),
            program_name: info.name,
            kind: decoded.kind,
            description: decoded.description,
            accounts: ix.accounts.iter().map(Pubkey::to_string).collect(),
            data: base64::encode(&ix.data),
            is_known: info.verified,
        }
    }
}

/// Fallback for programs without a dedicated decoder, registered or not
fn generic(ix: &RawInstruction) -> Decoded {
    Decoded::new(
        InstructionKind::Unknown,
        format!(
            "Interact with unknown program {}",
            short_key(&ix.program_id.to_string())
        ),
    )
}

/// `TokenkegQfeZ...` -> `Toke...Q5DA`
pub fn short_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return key.to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

pub(crate) fn account_at(ix: &RawInstruction, position: usize) -> Result<Pubkey, InstructionDecodeError> {
    ix.accounts
        .get(position)
        .copied()
        .ok_or(InstructionDecodeError::MissingAccount(position))
}

fn read_array<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N], InstructionDecodeError> {
    data.get(offset..offset + N)
        .and_then(|bytes| <[u8; N]>::try_from(bytes).ok())
        .ok_or(InstructionDecodeError::Truncated {
            needed: offset + N,
            actual: data.len(),
        })
}

pub(crate) fn read_u32(data: &[u8], offset: usize) -> Result<u32, InstructionDecodeError> {
    read_array::<4>(data, offset).map(u32::from_le_bytes)
}

pub(crate) fn read_u64(data: &[u8], offset: usize) -> Result<u64, InstructionDecodeError> {
    read_array::<8>(data, offset).map(u64::from_le_bytes)
}

pub(crate) fn read_pubkey(data: &[u8], offset: usize) -> Result<Pubkey, InstructionDecodeError> {
    read_array::<32>(data, offset).map(Pubkey::new_from_array)
}

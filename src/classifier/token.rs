use tracing::debug;

use crate::error::InstructionDecodeError;
use crate::types::{InstructionKind, RawInstruction};

use super::{account_at, read_pubkey, read_u64, short_key, Decoded};

// Instruction discriminators (shared by SPL Token and Token-2022)
const INITIALIZE_MINT: u8 = 0;
const INITIALIZE_ACCOUNT: u8 = 1;
const TRANSFER: u8 = 3;
const APPROVE: u8 = 4;
const REVOKE: u8 = 5;
const SET_AUTHORITY: u8 = 6;
const MINT_TO: u8 = 7;
const BURN: u8 = 8;
const CLOSE_ACCOUNT: u8 = 9;
const TRANSFER_CHECKED: u8 = 12;
const APPROVE_CHECKED: u8 = 13;
const MINT_TO_CHECKED: u8 = 14;
const BURN_CHECKED: u8 = 15;

/// Decode an SPL Token or Token-2022 instruction
pub fn decode(ix: &RawInstruction) -> Result<Decoded, InstructionDecodeError> {
    let data = &ix.data;
    let discriminator = *data.first().ok_or(InstructionDecodeError::Empty)?;

    match discriminator {
        TRANSFER | TRANSFER_CHECKED => {
            // transfer: [source, destination, authority]
            // transferChecked: [source, mint, destination, authority] + decimals
            let amount = read_u64(data, 1)?;
            let (source, destination) = if discriminator == TRANSFER {
                (account_at(ix, 0)?, account_at(ix, 1)?)
            } else {
                (account_at(ix, 0)?, account_at(ix, 2)?)
            };
            Ok(Decoded::new(
                InstructionKind::TokenTransfer { amount },
                format!(
                    "Transfer {} token units from {} to {}",
                    amount,
                    short_key(&source.to_string()),
                    short_key(&destination.to_string())
                ),
            ))
        }
        APPROVE | APPROVE_CHECKED => {
            let amount = read_u64(data, 1)?;
            let delegate = if discriminator == APPROVE {
                account_at(ix, 1)?
            } else {
                account_at(ix, 2)?
            };
            let shown = if amount == u64::MAX {
                "unlimited".to_string()
            } else {
                amount.to_string()
            };
            Ok(Decoded::new(
                InstructionKind::TokenApprove { amount },
                format!(
                    "Approve delegate {} to spend {} tokens",
                    short_key(&delegate.to_string()),
                    shown
                ),
            ))
        }
        REVOKE => Ok(Decoded::new(
            InstructionKind::TokenRevoke,
            "Revoke token delegation (safe)",
        )),
        CLOSE_ACCOUNT => {
            let destination = account_at(ix, 1)?;
            Ok(Decoded::new(
                InstructionKind::CloseAccount,
                format!(
                    "Close token account, drain balance to {}",
                    short_key(&destination.to_string())
                ),
            ))
        }
        MINT_TO | MINT_TO_CHECKED => {
            let amount = read_u64(data, 1)?;
            let destination = account_at(ix, 1)?;
            Ok(Decoded::new(
                InstructionKind::MintTokens { amount },
                format!(
                    "Mint {} tokens to {}",
                    amount,
                    short_key(&destination.to_string())
                ),
            ))
        }
        BURN | BURN_CHECKED => {
            let amount = read_u64(data, 1)?;
            Ok(Decoded::new(
                InstructionKind::BurnTokens { amount },
                "Burn token supply permanently",
            ))
        }
        SET_AUTHORITY => {
            // authority_type(1) + COption<Pubkey>: tag(1) [+ key(32)]
            let authority_type = *data.get(1).ok_or(InstructionDecodeError::Truncated {
                needed: 3,
                actual: data.len(),
            })?;
            let new_authority = match data.get(2) {
                Some(0) => "none".to_string(),
                Some(1) => short_key(&read_pubkey(data, 3)?.to_string()),
                Some(tag) => {
                    return Err(InstructionDecodeError::Malformed(format!(
                        "invalid option tag {}",
                        tag
                    )))
                }
                None => {
                    return Err(InstructionDecodeError::Truncated {
                        needed: 3,
                        actual: data.len(),
                    })
                }
            };
            account_at(ix, 0)?;
            Ok(Decoded::new(
                InstructionKind::SetAuthority,
                format!(
                    "Change token authority type {} to {}",
                    authority_type_name(authority_type),
                    new_authority
                ),
            ))
        }
        INITIALIZE_MINT => {
            // decimals(1) + mint_authority(32) + COption<Pubkey> tag
            if data.len() < 35 {
                return Err(InstructionDecodeError::Truncated {
                    needed: 35,
                    actual: data.len(),
                });
            }
            Ok(Decoded::new(InstructionKind::InitializeMint, "Create new token mint"))
        }
        INITIALIZE_ACCOUNT => Ok(Decoded::new(
            InstructionKind::InitializeTokenAccount,
            "Create new token account",
        )),
        other => {
            debug!("Unhandled token instruction: {}", other);
            Ok(Decoded::new(InstructionKind::TokenOther, "Token program instruction"))
        }
    }
}

pub fn fallback() -> Decoded {
    Decoded::new(InstructionKind::TokenOther, "Could not decode token instruction")
}

fn authority_type_name(authority_type: u8) -> String {
    match authority_type {
        0 => "MintTokens".to_string(),
        1 => "FreezeAccount".to_string(),
        2 => "AccountOwner".to_string(),
        3 => "CloseAccount".to_string(),
        other => other.to_string(),
    }
}

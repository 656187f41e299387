use solana_sdk::system_instruction::SystemInstruction;
use tracing::debug;

use crate::error::InstructionDecodeError;
use crate::types::{InstructionKind, RawInstruction};

use super::{account_at, short_key, Decoded};

const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

/// Decode a System program instruction (bincode layout, 4-byte LE discriminator)
pub fn decode(ix: &RawInstruction) -> Result<Decoded, InstructionDecodeError> {
    let instruction: SystemInstruction = bincode::deserialize(&ix.data)
        .map_err(|e| InstructionDecodeError::Malformed(e.to_string()))?;

    debug!("System instruction: {:?}", instruction);

    Ok(match instruction {
        SystemInstruction::Transfer { lamports } => {
            let from = account_at(ix, 0)?;
            let to = account_at(ix, 1)?;
            Decoded::new(
                InstructionKind::SolTransfer { lamports },
                format!(
                    "Transfer {:.4} SOL from {} to {}",
                    lamports as f64 / LAMPORTS_PER_SOL,
                    short_key(&from.to_string()),
                    short_key(&to.to_string())
                ),
            )
        }
        SystemInstruction::CreateAccount {
            lamports,
            space,
            owner,
        } => {
            let new_account = account_at(ix, 1)?;
            Decoded::new(
                InstructionKind::CreateAccount { lamports, space },
                format!(
                    "Create new account {} owned by {}",
                    short_key(&new_account.to_string()),
                    short_key(&owner.to_string())
                ),
            )
        }
        SystemInstruction::CreateAccountWithSeed { .. } => Decoded::new(
            InstructionKind::CreateAccountWithSeed,
            "Create account derived from seed",
        ),
        SystemInstruction::Assign { owner } => Decoded::new(
            InstructionKind::Assign,
            format!("Assign account to program {}", short_key(&owner.to_string())),
        ),
        SystemInstruction::Allocate { space } => Decoded::new(
            InstructionKind::Allocate { space },
            "Allocate space for account data",
        ),
        other => {
            let name = variant_name(&other);
            let description = format!("System: {}", name);
            Decoded::new(InstructionKind::SystemOther(name), description)
        }
    })
}

/// Used when the data is not a valid system instruction at all
pub fn fallback() -> Decoded {
    Decoded::new(InstructionKind::SystemUnknown, "Unknown system instruction")
}

/// Variant name from the derived Debug output, e.g. `AdvanceNonceAccount`
fn variant_name(instruction: &SystemInstruction) -> String {
    let rendered = format!("{:?}", instruction);
    rendered
        .split(|c: char| !c.is_alphanumeric())
        .next()
        .unwrap_or("Unknown")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::pubkey::Pubkey;
    use solana_sdk::system_instruction;

    fn raw(ix: solana_sdk::instruction::Instruction) -> RawInstruction {
        RawInstruction::new(
            ix.program_id,
            ix.accounts.iter().map(|meta| meta.pubkey).collect(),
            ix.data,
        )
    }

    #[test]
    fn test_decode_transfer() {
        let from = Pubkey::new_unique();
        let to = Pubkey::new_unique();
        let decoded = decode(&raw(system_instruction::transfer(&from, &to, 1_500_000_000))).unwrap();

        assert_eq!(decoded.kind, InstructionKind::SolTransfer { lamports: 1_500_000_000 });
        assert!(decoded.description.starts_with("Transfer 1.5000 SOL from "));
        assert!(decoded.description.contains(&short_key(&to.to_string())));
    }

    #[test]
    fn test_decode_create_account() {
        let payer = Pubkey::new_unique();
        let new_account = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let decoded = decode(&raw(system_instruction::create_account(
            &payer,
            &new_account,
            2_039_280,
            165,
            &owner,
        )))
        .unwrap();

        assert_eq!(decoded.kind.label(), "Create Account");
        assert!(decoded.description.contains(&short_key(&new_account.to_string())));
        assert!(decoded.description.contains(&short_key(&owner.to_string())));
    }

    #[test]
    fn test_decode_assign_and_allocate() {
        let account = Pubkey::new_unique();
        let owner = Pubkey::new_unique();

        let assign = decode(&raw(system_instruction::assign(&account, &owner))).unwrap();
        assert_eq!(assign.kind, InstructionKind::Assign);

        let allocate = decode(&raw(system_instruction::allocate(&account, 128))).unwrap();
        assert_eq!(allocate.kind, InstructionKind::Allocate { space: 128 });
        assert_eq!(allocate.description, "Allocate space for account data");
    }

    #[test]
    fn test_other_variant_gets_generic_description() {
        let nonce = Pubkey::new_unique();
        let authority = Pubkey::new_unique();
        let decoded = decode(&raw(system_instruction::advance_nonce_account(&nonce, &authority))).unwrap();

        assert_eq!(decoded.kind.label(), "AdvanceNonceAccount");
        assert_eq!(decoded.description, "System: AdvanceNonceAccount");
    }

    #[test]
    fn test_garbage_is_an_error() {
        let ix = RawInstruction::new(Pubkey::default(), vec![], vec![0xff, 0xff, 0xff, 0xff, 1]);
        assert!(decode(&ix).is_err());

        let empty = RawInstruction::new(Pubkey::default(), vec![], vec![]);
        assert!(decode(&empty).is_err());
    }

    #[test]
    fn test_transfer_missing_accounts_is_an_error() {
        let data = bincode::serialize(&SystemInstruction::Transfer { lamports: 5 }).unwrap();
        let ix = RawInstruction::new(Pubkey::default(), vec![Pubkey::new_unique()], data);
        assert_eq!(decode(&ix), Err(InstructionDecodeError::MissingAccount(1)));
    }
}

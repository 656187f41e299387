use crate::error::InstructionDecodeError;
use crate::types::{InstructionKind, RawInstruction};

use super::Decoded;

const CREATE_IDEMPOTENT: u8 = 1;

pub fn decode(ix: &RawInstruction) -> Result<Decoded, InstructionDecodeError> {
    // Legacy clients send `Create` with no data at all
    Ok(match ix.data.first() {
        None => Decoded::new(
            InstructionKind::CreateAta,
            "Create Associated Token Account for wallet",
        ),
        Some(&CREATE_IDEMPOTENT) => Decoded::new(
            InstructionKind::CreateAtaIdempotent,
            "Create ATA if it does not exist",
        ),
        Some(_) => fallback(),
    })
}

pub fn fallback() -> Decoded {
    Decoded::new(InstructionKind::AssociatedTokenOther, "ATA program call")
}

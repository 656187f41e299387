use crate::error::InstructionDecodeError;
use crate::types::{InstructionKind, RawInstruction};

use super::{read_u32, read_u64, Decoded};

const SET_COMPUTE_UNIT_LIMIT: u8 = 2;
const SET_COMPUTE_UNIT_PRICE: u8 = 3;

pub fn decode(ix: &RawInstruction) -> Result<Decoded, InstructionDecodeError> {
    let discriminator = *ix.data.first().ok_or(InstructionDecodeError::Empty)?;

    match discriminator {
        SET_COMPUTE_UNIT_LIMIT => {
            let units = read_u32(&ix.data, 1)?;
            Ok(Decoded::new(
                InstructionKind::SetComputeLimit { units },
                format!("Request {} compute units", group_thousands(u64::from(units))),
            ))
        }
        SET_COMPUTE_UNIT_PRICE => {
            let micro_lamports = read_u64(&ix.data, 1)?;
            Ok(Decoded::new(
                InstructionKind::SetPriorityFee { micro_lamports },
                format!("Priority fee: {} microLamports/CU", micro_lamports),
            ))
        }
        _ => Ok(fallback()),
    }
}

pub fn fallback() -> Decoded {
    Decoded::new(InstructionKind::ComputeBudgetOther, "Modify compute budget")
}

/// 1400000 -> "1,400,000"
pub(crate) fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::COMPUTE_BUDGET_PROGRAM_ID;

    fn ix(data: Vec<u8>) -> RawInstruction {
        RawInstruction::new(COMPUTE_BUDGET_PROGRAM_ID, vec![], data)
    }

    #[test]
    fn test_compute_limit() {
        let mut data = vec![SET_COMPUTE_UNIT_LIMIT];
        data.extend_from_slice(&1_400_000u32.to_le_bytes());
        let decoded = decode(&ix(data)).unwrap();
        assert_eq!(decoded.kind, InstructionKind::SetComputeLimit { units: 1_400_000 });
        assert_eq!(decoded.description, "Request 1,400,000 compute units");
    }

    #[test]
    fn test_priority_fee() {
        let mut data = vec![SET_COMPUTE_UNIT_PRICE];
        data.extend_from_slice(&25_000u64.to_le_bytes());
        let decoded = decode(&ix(data)).unwrap();
        assert_eq!(decoded.kind, InstructionKind::SetPriorityFee { micro_lamports: 25_000 });
        assert_eq!(decoded.description, "Priority fee: 25000 microLamports/CU");
    }

    #[test]
    fn test_other_discriminators() {
        let decoded = decode(&ix(vec![1, 0, 0, 0, 0])).unwrap();
        assert_eq!(decoded.kind, InstructionKind::ComputeBudgetOther);
        assert_eq!(decoded.description, "Modify compute budget");
    }

    #[test]
    fn test_truncated_is_error() {
        assert!(decode(&ix(vec![])).is_err());
        assert!(decode(&ix(vec![SET_COMPUTE_UNIT_LIMIT, 1, 2])).is_err());
        assert!(decode(&ix(vec![SET_COMPUTE_UNIT_PRICE, 1, 2, 3, 4])).is_err());
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(200_000), "200,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }
}

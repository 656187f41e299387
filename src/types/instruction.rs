use serde::{Serialize, Serializer};
use solana_sdk::pubkey::Pubkey;

/// Instruction as it appears in the transaction, with indexes resolved to keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInstruction {
    pub program_id: Pubkey,
    pub accounts: Vec<Pubkey>,
    pub data: Vec<u8>,
}

impl RawInstruction {
    pub fn new(program_id: Pubkey, accounts: Vec<Pubkey>, data: Vec<u8>) -> Self {
        Self {
            program_id,
            accounts,
            data,
        }
    }
}

/// Semantic instruction type.
///
/// Serializes as its display label (`"SOL Transfer"`, `"Token Approve"`, ...)
/// while keeping decoded numeric fields available to the risk engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstructionKind {
    // System program
    SolTransfer { lamports: u64 },
    CreateAccount { lamports: u64, space: u64 },
    CreateAccountWithSeed,
    Assign,
    Allocate { space: u64 },
    SystemOther(String),
    SystemUnknown,

    // SPL Token / Token-2022
    TokenTransfer { amount: u64 },
    TokenApprove { amount: u64 },
    TokenRevoke,
    CloseAccount,
    MintTokens { amount: u64 },
    BurnTokens { amount: u64 },
    SetAuthority,
    InitializeMint,
    InitializeTokenAccount,
    TokenOther,

    // Associated token account program
    CreateAta,
    CreateAtaIdempotent,
    AssociatedTokenOther,

    // Compute budget program
    SetComputeLimit { units: u32 },
    SetPriorityFee { micro_lamports: u64 },
    ComputeBudgetOther,

    /// Any program without a dedicated decoder
    Unknown,
}

impl InstructionKind {
    pub fn label(&self) -> &str {
        match self {
            InstructionKind::SolTransfer { .. } => "SOL Transfer",
            InstructionKind::CreateAccount { .. } => "Create Account",
            InstructionKind::CreateAccountWithSeed => "Create Account (with seed)",
            InstructionKind::Assign => "Assign",
            InstructionKind::Allocate { .. } => "Allocate",
            InstructionKind::SystemOther(name) => name,
            InstructionKind::SystemUnknown => "System Instruction",
            InstructionKind::TokenTransfer { .. } => "Token Transfer",
            InstructionKind::TokenApprove { .. } => "Token Approve",
            InstructionKind::TokenRevoke => "Token Revoke",
            InstructionKind::CloseAccount => "Close Account",
            InstructionKind::MintTokens { .. } => "Mint Tokens",
            InstructionKind::BurnTokens { .. } => "Burn Tokens",
            InstructionKind::SetAuthority => "Set Authority",
            InstructionKind::InitializeMint => "Initialize Mint",
            InstructionKind::InitializeTokenAccount => "Initialize Token Account",
            InstructionKind::TokenOther => "SPL Token Instruction",
            InstructionKind::CreateAta => "Create ATA",
            InstructionKind::CreateAtaIdempotent => "Create ATA (idempotent)",
            InstructionKind::AssociatedTokenOther => "Associated Token Instruction",
            InstructionKind::SetComputeLimit { .. } => "Set Compute Limit",
            InstructionKind::SetPriorityFee { .. } => "Set Priority Fee",
            InstructionKind::ComputeBudgetOther => "Compute Budget",
            InstructionKind::Unknown => "Unknown Instruction",
        }
    }

    /// Compute limit and priority fee requests carry no user-visible action
    pub fn is_budget_setting(&self) -> bool {
        matches!(
            self,
            InstructionKind::SetComputeLimit { .. } | InstructionKind::SetPriorityFee { .. }
        )
    }

    pub fn is_approval(&self) -> bool {
        matches!(self, InstructionKind::TokenApprove { .. })
    }

    pub fn is_unlimited_approval(&self) -> bool {
        matches!(self, InstructionKind::TokenApprove { amount } if *amount == u64::MAX)
    }

    pub fn sol_lamports(&self) -> Option<u64> {
        match self {
            InstructionKind::SolTransfer { lamports } => Some(*lamports),
            _ => None,
        }
    }
}

impl Serialize for InstructionKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

/// One instruction after classification. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedInstruction {
    pub index: usize,
    pub program_id: String,
    pub program_name: String,
    #[serde(rename = "type")]
    pub kind: InstructionKind,
    pub description: String,
    pub accounts: Vec<String>,
    /// Raw instruction data, base64
    pub data: String,
    pub is_known: bool,
}

/// Node of the cross-program invocation forest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CpiNode {
    pub program_id: String,
    pub program_name: String,
    pub depth: usize,
    pub children: Vec<CpiNode>,
}

impl CpiNode {
    /// Total number of nodes in this subtree, including self
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(CpiNode::size).sum::<usize>()
    }
}

use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::str::FromStr;

use crate::config::ProgramEntry;
use crate::error::{Result, SimLensError};

pub const SYSTEM_PROGRAM_ID: Pubkey = pubkey!("11111111111111111111111111111111");
pub const TOKEN_PROGRAM_ID: Pubkey = pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");
pub const TOKEN_2022_PROGRAM_ID: Pubkey = pubkey!("TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb");
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey =
    pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJe1kfs");
pub const COMPUTE_BUDGET_PROGRAM_ID: Pubkey =
    pubkey!("ComputeBudget111111111111111111111111111111");

const UNKNOWN_PROGRAM_NAME: &str = "Unknown Program";

/// Static description of an on-chain program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramInfo {
    pub program_id: Pubkey,
    pub name: String,
    pub verified: bool,
    pub tag: Option<String>,
    pub description: Option<String>,
}

impl ProgramInfo {
    pub fn new(program_id: Pubkey, name: impl Into<String>) -> Self {
        Self {
            program_id,
            name: name.into(),
            verified: true,
            tag: None,
            description: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn unverified(mut self) -> Self {
        self.verified = false;
        self
    }

    /// Descriptor synthesized for ids missing from the registry
    pub fn unknown(program_id: Pubkey) -> Self {
        Self {
            program_id,
            name: UNKNOWN_PROGRAM_NAME.to_string(),
            verified: false,
            tag: None,
            description: Some("This program is not in the known registry.".to_string()),
        }
    }
}

impl TryFrom<&ProgramEntry> for ProgramInfo {
    type Error = SimLensError;

    fn try_from(entry: &ProgramEntry) -> Result<Self> {
        let program_id = Pubkey::from_str(&entry.program_id).map_err(|_| {
            SimLensError::config(format!("Invalid program id: {}", entry.program_id))
        })?;

        Ok(Self {
            program_id,
            name: entry.name.clone(),
            verified: entry.verified,
            tag: entry.tag.clone(),
            description: entry.description.clone(),
        })
    }
}

/// Lookup from program id to display metadata.
///
/// Decode and risk logic only ever ask two questions of the registry: "what is
/// this program called and is it verified" ([`ProgramRegistry::lookup`]) and
/// "has anyone described this program at all" ([`ProgramRegistry::contains`]).
/// New programs can therefore be added without touching either.
#[derive(Debug, Clone)]
pub struct ProgramRegistry {
    programs: HashMap<Pubkey, ProgramInfo>,
}

impl ProgramRegistry {
    /// Empty registry, every lookup synthesizes an unknown descriptor
    pub fn empty() -> Self {
        Self {
            programs: HashMap::new(),
        }
    }

    pub fn register(&mut self, info: ProgramInfo) {
        self.programs.insert(info.program_id, info);
    }

    pub fn with_program(mut self, info: ProgramInfo) -> Self {
        self.register(info);
        self
    }

    /// Built-in registry extended with configured entries
    pub fn with_entries(entries: &[ProgramEntry]) -> Result<Self> {
        let mut registry = Self::default();
        for entry in entries {
            registry.register(ProgramInfo::try_from(entry)?);
        }
        Ok(registry)
    }

    pub fn lookup(&self, program_id: &Pubkey) -> ProgramInfo {
        self.programs
            .get(program_id)
            .cloned()
            .unwrap_or_else(|| ProgramInfo::unknown(*program_id))
    }

    pub fn name_of(&self, program_id: &Pubkey) -> &str {
        self.programs
            .get(program_id)
            .map(|info| info.name.as_str())
            .unwrap_or(UNKNOWN_PROGRAM_NAME)
    }

    /// Same as [`name_of`](Self::name_of) for ids taken from log text
    pub fn name_of_str(&self, program_id: &str) -> &str {
        Pubkey::from_str(program_id)
            .ok()
            .and_then(|key| self.programs.get(&key))
            .map(|info| info.name.as_str())
            .unwrap_or(UNKNOWN_PROGRAM_NAME)
    }

    pub fn contains(&self, program_id: &Pubkey) -> bool {
        self.programs.contains_key(program_id)
    }

    /// Same as [`contains`](Self::contains) for ids taken from log text
    pub fn contains_str(&self, program_id: &str) -> bool {
        Pubkey::from_str(program_id)
            .map(|key| self.contains(&key))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

impl Default for ProgramRegistry {
    fn default() -> Self {
        let builtins = [
            ProgramInfo::new(SYSTEM_PROGRAM_ID, "System Program")
                .with_tag("Native")
                .with_description("Core Solana system program for SOL transfers and account creation"),
            ProgramInfo::new(TOKEN_PROGRAM_ID, "SPL Token Program")
                .with_tag("SPL")
                .with_description("Standard token program for fungible and non-fungible tokens"),
            ProgramInfo::new(TOKEN_2022_PROGRAM_ID, "Token-2022 Program")
                .with_tag("SPL")
                .with_description("Next-gen token program with extensions"),
            ProgramInfo::new(ASSOCIATED_TOKEN_PROGRAM_ID, "Associated Token Program")
                .with_tag("SPL")
                .with_description("Creates associated token accounts"),
            ProgramInfo::new(
                pubkey!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s"),
                "Metaplex Token Metadata",
            )
            .with_tag("Metaplex")
            .with_description("NFT metadata standard by Metaplex"),
            ProgramInfo::new(pubkey!("JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4"), "Jupiter v6")
                .with_tag("Jupiter")
                .with_description("Aggregated DEX swap router"),
            ProgramInfo::new(
                pubkey!("675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8"),
                "Raydium AMM",
            )
            .with_tag("Raydium")
            .with_description("Raydium automated market maker"),
            ProgramInfo::new(
                pubkey!("whirLbMiicVdio4qvUfM5KAg6Ct8VwpYzGff3uctyCc"),
                "Orca Whirlpool",
            )
            .with_tag("Orca")
            .with_description("Concentrated liquidity AMM"),
            ProgramInfo::new(
                pubkey!("So11111111111111111111111111111111111111112"),
                "Wrapped SOL Mint",
            )
            .with_tag("Native")
            .with_description("Wrapped SOL token mint"),
            ProgramInfo::new(COMPUTE_BUDGET_PROGRAM_ID, "Compute Budget Program")
                .with_tag("Native")
                .with_description("Sets compute unit limits and priority fees"),
            ProgramInfo::new(pubkey!("Vote111111111111111111111111111111111111111"), "Vote Program")
                .with_tag("Native"),
            ProgramInfo::new(pubkey!("Stake11111111111111111111111111111111111111"), "Stake Program")
                .with_tag("Native"),
            ProgramInfo::new(
                pubkey!("AddressLookupTab1e1111111111111111111111111"),
                "Address Lookup Table Program",
            )
            .with_tag("Native"),
            ProgramInfo::new(pubkey!("MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr"), "Memo Program")
                .with_tag("SPL"),
        ];

        let mut registry = Self::empty();
        for info in builtins {
            registry.register(info);
        }
        registry
    }
}

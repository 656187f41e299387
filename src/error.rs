use thiserror::Error;

/// All possible errors in the SimLens system
#[derive(Debug, Error)]
pub enum SimLensError {
    #[error("Could not decode transaction: {0}")]
    Decode(String),

    #[error("RPC error: {0}")]
    Transport(#[from] solana_client::client_error::ClientError),

    #[error("Address table resolution failed: {0}")]
    AddressTable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration load error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("Signature parse error: {0}")]
    SignatureParse(#[from] solana_sdk::signature::ParseSignatureError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SimLensError>;

impl SimLensError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn address_table(msg: impl Into<String>) -> Self {
        Self::AddressTable(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// RPC failures that abort a request before any outcome is built.
    /// Lookup-table errors are absorbed by the decoder and do not count.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Failure to decode a single instruction.
///
/// Never escapes the classifier: the offending instruction is downgraded to a
/// generic description and the rest of the batch is unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstructionDecodeError {
    #[error("instruction data is empty")]
    Empty,

    #[error("instruction data too short: need {needed} bytes, got {actual}")]
    Truncated { needed: usize, actual: usize },

    #[error("missing account at position {0}")]
    MissingAccount(usize),

    #[error("malformed instruction data: {0}")]
    Malformed(String),
}

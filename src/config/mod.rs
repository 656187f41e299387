use serde::{Deserialize, Serialize};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Result, SimLensError};

/// Solana network type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Devnet,
}

impl Network {
    pub fn default_endpoint(&self) -> String {
        match self {
            Network::Mainnet => "https://api.mainnet-beta.solana.com".to_string(),
            Network::Devnet => "https://api.devnet.solana.com".to_string(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet-beta",
            Network::Devnet => "devnet",
        }
    }
}

/// SimLens configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub network: Network,
    pub rpc: RpcConfig,
    pub api: ApiConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    pub endpoint: String,
    pub commitment: String,
    pub request_timeout_ms: u64,
    /// Upper bound on account states requested per simulation
    pub max_account_states: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub rest_port: u16,
}

/// Programs added to the built-in registry at startup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub extra_programs: Vec<ProgramEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramEntry {
    pub program_id: String,
    pub name: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Config {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.rpc.endpoint.trim().is_empty() {
            return Err(SimLensError::config("RPC endpoint required"));
        }

        if CommitmentConfig::from_str(&self.rpc.commitment).is_err() {
            return Err(SimLensError::config(format!(
                "Unknown commitment level: {}",
                self.rpc.commitment
            )));
        }

        if self.rpc.request_timeout_ms == 0 {
            return Err(SimLensError::config("Request timeout must be > 0"));
        }

        for entry in &self.registry.extra_programs {
            if Pubkey::from_str(&entry.program_id).is_err() {
                return Err(SimLensError::config(format!(
                    "Invalid program id in registry: {}",
                    entry.program_id
                )));
            }
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc.request_timeout_ms)
    }

    /// Commitment level used for simulation and lookups
    pub fn commitment(&self) -> CommitmentConfig {
        CommitmentConfig::from_str(&self.rpc.commitment).unwrap_or_else(|_| CommitmentConfig::confirmed())
    }

    /// Layer network defaults, an optional `simlens.toml`, and `SIMLENS_*`
    /// environment variables (nested keys separated by `__`).
    pub fn load(network: Network) -> Result<Self> {
        let defaults = Self::for_network(network);

        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&defaults)?)
            .add_source(config::File::with_name("simlens").required(false))
            .add_source(config::Environment::with_prefix("SIMLENS").separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::devnet()
    }
}

impl Config {
    /// Create devnet configuration (safer for testing)
    pub fn devnet() -> Self {
        Self::for_network(Network::Devnet)
    }

    /// Create mainnet configuration (production)
    pub fn mainnet() -> Self {
        Self::for_network(Network::Mainnet)
    }

    /// Create custom configuration with a specific endpoint
    pub fn custom(network: Network, endpoint: impl Into<String>) -> Self {
        let mut config = Self::for_network(network);
        config.rpc.endpoint = endpoint.into();
        config
    }

    fn for_network(network: Network) -> Self {
        Self {
            network,
            rpc: RpcConfig {
                endpoint: network.default_endpoint(),
                commitment: "confirmed".to_string(),
                request_timeout_ms: 15_000,
                max_account_states: 64,
            },
            api: ApiConfig { rest_port: 8081 },
            registry: RegistryConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.network, Network::Devnet);
    }

    #[test]
    fn test_mainnet_config() {
        let config = Config::mainnet();
        assert!(config.validate().is_ok());
        assert_eq!(config.network, Network::Mainnet);
        assert_eq!(config.rpc.endpoint, "https://api.mainnet-beta.solana.com");
    }

    #[test]
    fn test_custom_config() {
        let config = Config::custom(Network::Devnet, "https://custom.rpc");
        assert!(config.validate().is_ok());
        assert_eq!(config.rpc.endpoint, "https://custom.rpc");
    }

    #[test]
    fn test_empty_endpoint() {
        let mut config = Config::default();
        config.rpc.endpoint.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_commitment() {
        let mut config = Config::default();
        config.rpc.commitment = "eventually".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_registry_entry() {
        let mut config = Config::default();
        config.registry.extra_programs.push(ProgramEntry {
            program_id: "not-a-key".to_string(),
            name: "Broken".to_string(),
            verified: true,
            tag: None,
            description: None,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_commitment_parsing() {
        let config = Config::mainnet();
        assert_eq!(config.commitment(), CommitmentConfig::confirmed());
    }

    #[test]
    fn test_load_layers_defaults() {
        let config = Config::load(Network::Mainnet).unwrap();
        assert!(!config.rpc.endpoint.is_empty());
        assert!(config.rpc.max_account_states > 0);
    }
}

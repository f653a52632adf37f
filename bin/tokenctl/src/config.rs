use ::config::{TokenAddresses, TokenAddressesBuilder};
use alloy_primitives::Address;
use binding::filterer::DEFAULT_CHUNK_SIZE;
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

/// Top-level tokenctl configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// L2 RPC endpoint url
    pub rpc_url: String,

    /// Token addresses that differ from the predeploys
    #[serde(default)]
    pub tokens: TokenOverrides,

    /// Blocks per `eth_getLogs` request
    #[serde(default = "default_log_chunk_size")]
    pub log_chunk_size: u64,

    /// Poll interval of live watches in milliseconds
    #[serde(default)]
    pub poll_interval_ms: Option<u64>,
}

/// Per-token address overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenOverrides {
    pub fiat_token: Option<Address>,
    pub governance_token: Option<Address>,
    pub wnative_token: Option<Address>,
}

const fn default_log_chunk_size() -> u64 {
    DEFAULT_CHUNK_SIZE
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> eyre::Result<Self> {
        let config: Self = toml::from_str(contents)?;

        if config.log_chunk_size == 0 {
            eyre::bail!("log_chunk_size must be positive");
        }

        Ok(config)
    }

    /// Token addresses with overrides applied.
    pub fn token_addresses(&self) -> TokenAddresses {
        let mut builder = TokenAddressesBuilder::predeploys();

        if let Some(address) = self.tokens.fiat_token {
            builder = builder.fiat_token(address);
        }
        if let Some(address) = self.tokens.governance_token {
            builder = builder.governance_token(address);
        }
        if let Some(address) = self.tokens.wnative_token {
            builder = builder.wnative_token(address);
        }

        builder.build()
    }

    pub fn poll_interval(&self) -> Option<Duration> {
        self.poll_interval_ms.map(Duration::from_millis)
    }
}

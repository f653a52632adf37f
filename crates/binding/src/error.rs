use alloy_primitives::{TxHash, B256};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BindingError {
    /// Embedded ABI JSON failed to parse
    #[error("Invalid ABI for {contract}: {source}")]
    Abi {
        contract: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Embedded bytecode is not valid hex
    #[error("Invalid bytecode for {contract}: {source}")]
    Bytecode {
        contract: &'static str,
        #[source]
        source: alloy_primitives::hex::FromHexError,
    },

    #[error("No deployment bytecode for {0}")]
    MissingBytecode(&'static str),

    /// ABI decoding of a call result or a log failed
    #[error("ABI decoding error: {0}")]
    Decode(#[from] alloy_sol_types::Error),

    /// Log topic does not belong to the requested event
    #[error("Log is not a {event} event (topic0: {topic:?})")]
    EventSignatureMismatch {
        event: &'static str,
        topic: Option<B256>,
    },

    /// Call or transaction failure from the bound contract
    #[error("Contract error: {0}")]
    Contract(#[from] alloy_contract::Error),

    #[error("RPC error: {0}")]
    Rpc(#[from] alloy_transport::TransportError),

    #[error("Contract creation reverted: {tx_hash}")]
    DeployReverted { tx_hash: TxHash },

    #[error("Receipt for {tx_hash} has no contract address")]
    MissingContractAddress { tx_hash: TxHash },

    #[error("Invalid block range: from {start} to {end}")]
    InvalidBlockRange { start: u64, end: u64 },
}

pub type Result<T> = std::result::Result<T, BindingError>;

//! JSON-RPC providers for the token bindings.

use alloy_network::EthereumWallet;
use alloy_primitives::Address;
use alloy_provider::{Provider, ProviderBuilder};
use alloy_signer_local::PrivateKeySigner;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Error parsing or validating URLs
    #[error("Invalid RPC URL: {0}")]
    InvalidUrl(String),

    /// Error with private key
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),
}

/// Parse a hex private key into a local signer.
pub fn parse_signer(private_key: &str) -> Result<PrivateKeySigner, ClientError> {
    private_key
        .parse()
        .map_err(|e| ClientError::InvalidPrivateKey(format!("{e}")))
}

/// Address controlled by `private_key`.
pub fn signer_address(private_key: &str) -> Result<Address, ClientError> {
    Ok(parse_signer(private_key)?.address())
}

/// Read-only HTTP provider.
pub fn create_provider(rpc_url: &str) -> Result<impl Provider + Clone, ClientError> {
    let url = rpc_url
        .parse()
        .map_err(|e| ClientError::InvalidUrl(format!("{e}")))?;
    debug!(url = rpc_url, "Connecting read-only provider");

    Ok(ProviderBuilder::new().connect_http(url))
}

/// HTTP provider that fills and signs transactions with `private_key`.
pub fn create_wallet_provider(
    rpc_url: &str,
    private_key: &str,
) -> Result<impl Provider + Clone, ClientError> {
    let url = rpc_url
        .parse()
        .map_err(|e| ClientError::InvalidUrl(format!("{e}")))?;
    let signer = parse_signer(private_key)?;
    debug!(url = rpc_url, from = %signer.address(), "Connecting wallet provider");

    let wallet = EthereumWallet::from(signer);

    Ok(ProviderBuilder::new().wallet(wallet).connect_http(url))
}

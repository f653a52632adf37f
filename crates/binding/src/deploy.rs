use crate::{
    error::{BindingError, Result},
    metadata::ContractMetadata,
};
use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, TxHash};
use alloy_provider::Provider;
use alloy_rpc_types_eth::{TransactionReceipt, TransactionRequest};
use tracing::{debug, info};

/// Outcome of a contract-creation transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deployment {
    /// Address of the created contract
    pub address: Address,
    /// Creation transaction hash
    pub tx_hash: TxHash,
    /// Block the creation was included in
    pub block_number: Option<u64>,
}

/// Deploy `metadata`'s bytecode with the given ABI-encoded constructor
/// arguments and wait for the receipt.
pub async fn deploy<P>(
    provider: &P,
    metadata: &ContractMetadata,
    constructor_args: &[u8],
) -> Result<Deployment>
where
    P: Provider,
{
    let code = metadata.deploy_code(constructor_args)?;

    debug!(
        contract = metadata.name(),
        code_size = code.len(),
        "Submitting contract creation"
    );

    let tx = TransactionRequest::default().with_deploy_code(code);
    let tx_hash = *provider.send_transaction(tx).await?.tx_hash();

    info!(contract = metadata.name(), tx_hash = %tx_hash, "Creation transaction sent");

    let receipt = wait_for_receipt(provider, tx_hash).await?;

    if !receipt.status() {
        return Err(BindingError::DeployReverted { tx_hash });
    }

    let address = receipt
        .contract_address
        .ok_or(BindingError::MissingContractAddress { tx_hash })?;

    info!(
        contract = metadata.name(),
        address = %address,
        tx_hash = %tx_hash,
        "Contract deployed"
    );

    Ok(Deployment {
        address,
        tx_hash,
        block_number: receipt.block_number,
    })
}

/// Poll `eth_getTransactionReceipt` at the provider's poll interval until the
/// transaction is included.
async fn wait_for_receipt<P>(provider: &P, tx_hash: TxHash) -> Result<TransactionReceipt>
where
    P: Provider,
{
    let interval = provider.client().poll_interval();

    loop {
        if let Some(receipt) = provider.get_transaction_receipt(tx_hash).await? {
            return Ok(receipt);
        }

        debug!(tx_hash = %tx_hash, "Receipt not available yet");
        tokio::time::sleep(interval).await;
    }
}

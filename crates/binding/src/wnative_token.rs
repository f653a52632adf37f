//! WNativeToken bindings.
//!
//! WETH9-style wrapper around the chain's native token: `deposit` wraps the
//! attached value, `withdraw` unwraps, and a bare value transfer hits the
//! payable fallback which deposits.

use crate::{
    deploy::{deploy, Deployment},
    error::Result,
    filterer::{event_methods, Filterer},
    metadata::ContractMetadata,
};
use alloy_network::{Ethereum, TransactionBuilder};
use alloy_primitives::{Address, Bytes, U256};
use alloy_provider::{PendingTransactionBuilder, Provider};
use alloy_rpc_types_eth::TransactionRequest;
use alloy_sol_types::sol;
use tracing::debug;
use WNativeToken::{Approval, Deposit, Transfer, WNativeTokenInstance, Withdrawal};

sol!(
    #[allow(missing_docs)]
    #[sol(rpc, all_derives)]
    WNativeToken,
    "artifacts/WNativeToken.json"
);

pub static WNATIVE_TOKEN_METADATA: ContractMetadata = ContractMetadata::new(
    "WNativeToken",
    include_str!("../artifacts/WNativeToken.json"),
    include_str!("../artifacts/WNativeToken.bin"),
);

/// Bound WNativeToken contract.
#[derive(Debug, Clone)]
pub struct WrappedNativeToken<P> {
    instance: WNativeTokenInstance<P>,
    filterer: Filterer<P>,
}

impl<P> WrappedNativeToken<P>
where
    P: Provider + Clone + 'static,
{
    pub fn new(address: Address, provider: P) -> Self {
        Self {
            instance: WNativeToken::new(address, provider.clone()),
            filterer: Filterer::new(address, provider),
        }
    }

    pub async fn deploy(provider: P) -> Result<(Deployment, Self)> {
        let deployment = deploy(&provider, &WNATIVE_TOKEN_METADATA, &[]).await?;
        Ok((deployment, Self::new(deployment.address, provider)))
    }

    pub const fn address(&self) -> Address {
        self.filterer.address()
    }

    /// Read-only and state-changing contract methods.
    pub const fn instance(&self) -> &WNativeTokenInstance<P> {
        &self.instance
    }

    pub const fn filterer(&self) -> &Filterer<P> {
        &self.filterer
    }

    /// Call the payable fallback with raw `calldata`, attaching `value`.
    ///
    /// The fallback ignores its input and deposits `value` for the sender.
    pub async fn fallback(
        &self,
        calldata: Bytes,
        value: U256,
    ) -> Result<PendingTransactionBuilder<Ethereum>> {
        debug!(
            address = %self.address(),
            value = %value,
            calldata_len = calldata.len(),
            "Sending raw transaction"
        );

        let tx = TransactionRequest::default()
            .with_to(self.address())
            .with_value(value)
            .with_input(calldata);

        Ok(self.instance.provider().send_transaction(tx).await?)
    }

    /// Plain value transfer with empty calldata, which wraps `value`.
    pub async fn send_value(&self, value: U256) -> Result<PendingTransactionBuilder<Ethereum>> {
        self.fallback(Bytes::new(), value).await
    }

    event_methods! {
        Approval => filter_approval, watch_approval, parse_approval(src: Address, guy: Address);
        Deposit => filter_deposit, watch_deposit, parse_deposit(dst: Address);
        Transfer => filter_transfer, watch_transfer, parse_transfer(src: Address, dst: Address);
        Withdrawal => filter_withdrawal, watch_withdrawal, parse_withdrawal(src: Address);
    }
}

//! Kevin governance token bindings.
//!
//! Ownable ERC-20 ("Kevin Token", symbol `Kevin`) where the owner mints and any
//! holder can burn.

use crate::{
    deploy::{deploy, Deployment},
    error::Result,
    filterer::{event_methods, Filterer},
    metadata::ContractMetadata,
};
use alloy_primitives::Address;
use alloy_provider::Provider;
use alloy_sol_types::sol;
use Kevin::{Approval, KevinInstance, OwnershipTransferred, Transfer};

sol!(
    #[allow(missing_docs)]
    #[sol(rpc, all_derives)]
    Kevin,
    "artifacts/Kevin.json"
);

pub static KEVIN_METADATA: ContractMetadata = ContractMetadata::new(
    "Kevin",
    include_str!("../artifacts/Kevin.json"),
    include_str!("../artifacts/Kevin.bin"),
);

/// Bound Kevin token contract.
#[derive(Debug, Clone)]
pub struct KevinToken<P> {
    instance: KevinInstance<P>,
    filterer: Filterer<P>,
}

impl<P> KevinToken<P>
where
    P: Provider + Clone + 'static,
{
    pub fn new(address: Address, provider: P) -> Self {
        Self {
            instance: Kevin::new(address, provider.clone()),
            filterer: Filterer::new(address, provider),
        }
    }

    /// Deploy a new token owned by the sending account.
    pub async fn deploy(provider: P) -> Result<(Deployment, Self)> {
        let deployment = deploy(&provider, &KEVIN_METADATA, &[]).await?;
        Ok((deployment, Self::new(deployment.address, provider)))
    }

    pub const fn address(&self) -> Address {
        self.filterer.address()
    }

    /// Read-only and state-changing contract methods.
    pub const fn instance(&self) -> &KevinInstance<P> {
        &self.instance
    }

    pub const fn filterer(&self) -> &Filterer<P> {
        &self.filterer
    }

    event_methods! {
        Approval => filter_approval, watch_approval, parse_approval(owner: Address, spender: Address);
        OwnershipTransferred => filter_ownership_transferred, watch_ownership_transferred, parse_ownership_transferred(previous_owner: Address, new_owner: Address);
        Transfer => filter_transfer, watch_transfer, parse_transfer(from: Address, to: Address);
    }
}

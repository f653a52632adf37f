//! FiatTokenV2_2 bindings.
//!
//! ERC-20 fiat token with configured minters, a blacklist, pausing, EIP-2612
//! permits and EIP-3009 transfer authorizations. The overloaded authorization
//! and permit functions (packed `bytes signature` vs split `v, r, s`) are
//! numbered `_0` and `_1` in ABI order.

use crate::{
    deploy::{deploy, Deployment},
    error::Result,
    filterer::{event_methods, Filterer},
    metadata::ContractMetadata,
};
use alloy_primitives::{Address, B256};
use alloy_provider::Provider;
use alloy_sol_types::sol;
use FiatTokenV22::{
    Approval, AuthorizationCanceled, AuthorizationUsed, Blacklisted, BlacklisterChanged, Burn,
    FiatTokenV22Instance, MasterMinterChanged, Mint, MinterConfigured, MinterRemoved,
    OwnershipTransferred, Pause, PauserChanged, RescuerChanged, Transfer, UnBlacklisted, Unpause,
};

sol!(
    #[allow(missing_docs, clippy::too_many_arguments)]
    #[sol(rpc, all_derives)]
    FiatTokenV22,
    "artifacts/FiatTokenV2_2.json"
);

pub static FIAT_TOKEN_METADATA: ContractMetadata = ContractMetadata::new(
    "FiatTokenV2_2",
    include_str!("../artifacts/FiatTokenV2_2.json"),
    include_str!("../artifacts/FiatTokenV2_2.bin"),
);

/// Bound FiatTokenV2_2 contract.
///
/// Calls and transactions go through [`FiatToken::instance`]; events are
/// filtered, watched and parsed on the facade itself.
#[derive(Debug, Clone)]
pub struct FiatToken<P> {
    instance: FiatTokenV22Instance<P>,
    filterer: Filterer<P>,
}

impl<P> FiatToken<P>
where
    P: Provider + Clone + 'static,
{
    pub fn new(address: Address, provider: P) -> Self {
        Self {
            instance: FiatTokenV22::new(address, provider.clone()),
            filterer: Filterer::new(address, provider),
        }
    }

    /// Deploy a new, uninitialized implementation contract.
    ///
    /// The token is unusable until `initialize` (and the `initializeV2*`
    /// upgrades) have been sent.
    pub async fn deploy(provider: P) -> Result<(Deployment, Self)> {
        let deployment = deploy(&provider, &FIAT_TOKEN_METADATA, &[]).await?;
        Ok((deployment, Self::new(deployment.address, provider)))
    }

    pub const fn address(&self) -> Address {
        self.filterer.address()
    }

    /// Read-only and state-changing contract methods.
    pub const fn instance(&self) -> &FiatTokenV22Instance<P> {
        &self.instance
    }

    pub const fn filterer(&self) -> &Filterer<P> {
        &self.filterer
    }

    event_methods! {
        Approval => filter_approval, watch_approval, parse_approval(owner: Address, spender: Address);
        AuthorizationCanceled => filter_authorization_canceled, watch_authorization_canceled, parse_authorization_canceled(authorizer: Address, nonce: B256);
        AuthorizationUsed => filter_authorization_used, watch_authorization_used, parse_authorization_used(authorizer: Address, nonce: B256);
        Blacklisted => filter_blacklisted, watch_blacklisted, parse_blacklisted(account: Address);
        BlacklisterChanged => filter_blacklister_changed, watch_blacklister_changed, parse_blacklister_changed(new_blacklister: Address);
        Burn => filter_burn, watch_burn, parse_burn(burner: Address);
        MasterMinterChanged => filter_master_minter_changed, watch_master_minter_changed, parse_master_minter_changed(new_master_minter: Address);
        Mint => filter_mint, watch_mint, parse_mint(minter: Address, to: Address);
        MinterConfigured => filter_minter_configured, watch_minter_configured, parse_minter_configured(minter: Address);
        MinterRemoved => filter_minter_removed, watch_minter_removed, parse_minter_removed(old_minter: Address);
        OwnershipTransferred => filter_ownership_transferred, watch_ownership_transferred, parse_ownership_transferred();
        Pause => filter_pause, watch_pause, parse_pause();
        PauserChanged => filter_pauser_changed, watch_pauser_changed, parse_pauser_changed(new_address: Address);
        RescuerChanged => filter_rescuer_changed, watch_rescuer_changed, parse_rescuer_changed(new_rescuer: Address);
        Transfer => filter_transfer, watch_transfer, parse_transfer(from: Address, to: Address);
        UnBlacklisted => filter_un_blacklisted, watch_un_blacklisted, parse_un_blacklisted(account: Address);
        Unpause => filter_unpause, watch_unpause, parse_unpause();
    }
}

//! Token address set used by the bindings.

use crate::predeploy;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Addresses of the bound token contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAddresses {
    /// FiatTokenV2_2 proxy
    pub fiat_token: Address,
    /// Kevin governance token
    pub governance_token: Address,
    /// WNativeToken
    pub wnative_token: Address,
}

impl Default for TokenAddresses {
    fn default() -> Self {
        Self::predeploys()
    }
}

impl TokenAddresses {
    /// Genesis predeploy addresses.
    pub const fn predeploys() -> Self {
        Self {
            fiat_token: predeploy::FIAT_TOKEN,
            governance_token: predeploy::GOVERNANCE_TOKEN,
            wnative_token: predeploy::WNATIVE_TOKEN,
        }
    }
}

/// Builder for token address sets on chains with non-standard deployments.
#[derive(Debug, Clone)]
pub struct TokenAddressesBuilder {
    addresses: TokenAddresses,
}

impl Default for TokenAddressesBuilder {
    fn default() -> Self {
        Self::predeploys()
    }
}

impl TokenAddressesBuilder {
    /// Start with predeploy defaults.
    pub const fn predeploys() -> Self {
        Self {
            addresses: TokenAddresses::predeploys(),
        }
    }

    pub const fn fiat_token(mut self, address: Address) -> Self {
        self.addresses.fiat_token = address;
        self
    }

    pub const fn governance_token(mut self, address: Address) -> Self {
        self.addresses.governance_token = address;
        self
    }

    pub const fn wnative_token(mut self, address: Address) -> Self {
        self.addresses.wnative_token = address;
        self
    }

    pub const fn build(self) -> TokenAddresses {
        self.addresses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_predeploy_defaults() {
        let addresses = TokenAddresses::default();
        assert_eq!(
            addresses.wnative_token,
            address!("0x4200000000000000000000000000000000000006")
        );
        assert_eq!(
            addresses.governance_token,
            address!("0x4200000000000000000000000000000000000042")
        );
        assert_eq!(
            addresses.fiat_token,
            address!("0x4200000000000000000000000000000000000778")
        );
    }

    #[test]
    fn test_builder_overrides() {
        let custom = address!("1111111111111111111111111111111111111111");

        let addresses = TokenAddressesBuilder::predeploys()
            .governance_token(custom)
            .build();

        assert_eq!(addresses.governance_token, custom);
        assert_eq!(addresses.fiat_token, predeploy::FIAT_TOKEN);
    }

    #[test]
    fn test_toml_round_trip() {
        let addresses = TokenAddressesBuilder::default()
            .wnative_token(address!("2222222222222222222222222222222222222222"))
            .build();

        let encoded = toml::to_string(&addresses).unwrap();
        let decoded: TokenAddresses = toml::from_str(&encoded).unwrap();
        assert_eq!(decoded, addresses);
    }
}

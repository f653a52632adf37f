//! Predeploy addresses from the L2 genesis layout.

use alloy_primitives::{address, Address};

/// Wrapped native token (WTON).
pub const WNATIVE_TOKEN: Address = address!("0x4200000000000000000000000000000000000006");

/// Governance token.
pub const GOVERNANCE_TOKEN: Address = address!("0x4200000000000000000000000000000000000042");

/// Bridge allowed to mint and burn the fiat token.
pub const L2_USDC_BRIDGE: Address = address!("0x4200000000000000000000000000000000000775");

/// Minter administrator of the fiat token.
pub const MASTER_MINTER: Address = address!("0x4200000000000000000000000000000000000777");

/// FiatTokenV2_2 proxy.
pub const FIAT_TOKEN: Address = address!("0x4200000000000000000000000000000000000778");

/// Predeploys by contract name.
pub const PREDEPLOYS: [(&str, Address); 5] = [
    ("WTON", WNATIVE_TOKEN),
    ("GovernanceToken", GOVERNANCE_TOKEN),
    ("L2UsdcBridge", L2_USDC_BRIDGE),
    ("MasterMinter", MASTER_MINTER),
    ("FiatTokenV2_2", FIAT_TOKEN),
];

/// Look up a predeploy address by contract name.
pub fn predeploy(name: &str) -> Option<Address> {
    PREDEPLOYS
        .iter()
        .find(|(predeploy, _)| *predeploy == name)
        .map(|(_, address)| *address)
}

/// Whether the predeploy at `address` sits behind a proxy.
///
/// Only the wrapped native token, the governance token and the master minter
/// are placed directly.
pub fn is_proxied(address: Address) -> bool {
    address != WNATIVE_TOKEN && address != GOVERNANCE_TOKEN && address != MASTER_MINTER
}

//! Address configuration for the L2 token contracts.
//!
//! This crate provides:
//! - Predeploy addresses of the token contracts and their administrators
//! - The token address set used by the bindings, with overrides

pub mod predeploy;
pub mod tokens;

pub use predeploy::{is_proxied, predeploy};
pub use tokens::{TokenAddresses, TokenAddressesBuilder};

//! Typed bindings for the L2 token contracts.
//!
//! This crate binds three contracts from their compiler artifacts:
//! - FiatTokenV2_2 (fiat-backed ERC20 with minters, blacklist and pausing)
//! - Kevin (ownable governance token)
//! - WNativeToken (wrapped native token)
//!
//! Calls and transactions are generated with alloy's `sol!` macro from the
//! embedded ABI JSON. Each contract also gets a facade with typed event
//! filtering on top of the generic [`Filterer`].

pub mod deploy;
pub mod error;
pub mod fiat_token;
pub mod filterer;
pub mod iterator;
pub mod kevin;
pub mod metadata;
pub mod subscription;
pub mod wnative_token;

pub use deploy::{deploy, Deployment};
pub use error::{BindingError, Result};
pub use fiat_token::{FiatToken, FIAT_TOKEN_METADATA};
pub use filterer::{FilterOpts, Filterer, WatchOpts};
pub use iterator::LogIterator;
pub use kevin::{KevinToken, KEVIN_METADATA};
pub use metadata::{AbiSignatures, ContractMetadata};
pub use subscription::Subscription;
pub use wnative_token::{WrappedNativeToken, WNATIVE_TOKEN_METADATA};

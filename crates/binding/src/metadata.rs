//! Compiler output embedded for each bound contract.
//!
//! The ABI JSON and the creation bytecode are copied verbatim from the
//! compiler artifacts under `artifacts/` and never mutated.

use crate::error::{BindingError, Result};
use alloy_json_abi::JsonAbi;
use alloy_primitives::{hex, Bytes, Selector, B256};
use std::sync::OnceLock;

/// ABI and deployment bytecode of a single contract.
#[derive(Debug)]
pub struct ContractMetadata {
    name: &'static str,
    abi_json: &'static str,
    bin: &'static str,
    abi: OnceLock<JsonAbi>,
}

/// Canonical signatures of a contract with their on-chain identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbiSignatures {
    /// `name(types)` with its 4-byte selector, sorted by signature
    pub functions: Vec<(String, Selector)>,
    /// `Name(types)` with its topic hash, sorted by signature
    pub events: Vec<(String, B256)>,
}

impl ContractMetadata {
    pub const fn new(name: &'static str, abi_json: &'static str, bin: &'static str) -> Self {
        Self {
            name,
            abi_json,
            bin,
            abi: OnceLock::new(),
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Raw ABI JSON as emitted by the compiler.
    pub const fn abi_json(&self) -> &'static str {
        self.abi_json
    }

    /// Parsed ABI. The JSON is parsed on first use and cached.
    pub fn abi(&self) -> Result<&JsonAbi> {
        if let Some(abi) = self.abi.get() {
            return Ok(abi);
        }

        let parsed: JsonAbi =
            serde_json::from_str(self.abi_json).map_err(|source| BindingError::Abi {
                contract: self.name,
                source,
            })?;

        Ok(self.abi.get_or_init(|| parsed))
    }

    /// Creation bytecode.
    pub fn bytecode(&self) -> Result<Bytes> {
        let bin = self.bin.trim();
        if bin.is_empty() || bin == "0x" {
            return Err(BindingError::MissingBytecode(self.name));
        }

        hex::decode(bin)
            .map(Bytes::from)
            .map_err(|source| BindingError::Bytecode {
                contract: self.name,
                source,
            })
    }

    /// Contract-creation payload: bytecode followed by the ABI-encoded
    /// constructor arguments.
    pub fn deploy_code(&self, constructor_args: &[u8]) -> Result<Bytes> {
        let mut code = self.bytecode()?.to_vec();
        code.extend_from_slice(constructor_args);
        Ok(code.into())
    }

    /// Function selectors and event topics computed from the ABI JSON.
    pub fn signatures(&self) -> Result<AbiSignatures> {
        let abi = self.abi()?;

        let mut functions: Vec<(String, Selector)> = abi
            .functions()
            .map(|f| (f.signature(), f.selector()))
            .collect();
        functions.sort();

        let mut events: Vec<(String, B256)> = abi
            .events()
            .map(|e| (e.signature(), e.selector()))
            .collect();
        events.sort();

        Ok(AbiSignatures { functions, events })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABI: &str = r#"[
        {"type":"function","name":"withdraw","inputs":[{"name":"wad","type":"uint256"}],"outputs":[],"stateMutability":"nonpayable"},
        {"type":"event","name":"Deposit","inputs":[{"name":"dst","type":"address","indexed":true},{"name":"wad","type":"uint256","indexed":false}],"anonymous":false}
    ]"#;

    #[test]
    fn test_abi_is_cached() {
        let metadata = ContractMetadata::new("Test", ABI, "0x6080");
        let first = metadata.abi().unwrap() as *const JsonAbi;
        let second = metadata.abi().unwrap() as *const JsonAbi;
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_abi() {
        let metadata = ContractMetadata::new("Broken", "[{", "0x6080");
        let err = metadata.abi().unwrap_err();
        assert!(matches!(err, BindingError::Abi { contract: "Broken", .. }));
    }

    #[test]
    fn test_missing_bytecode() {
        let metadata = ContractMetadata::new("Interface", ABI, "0x");
        assert!(matches!(
            metadata.bytecode(),
            Err(BindingError::MissingBytecode("Interface"))
        ));
    }

    #[test]
    fn test_invalid_bytecode() {
        let metadata = ContractMetadata::new("Test", ABI, "0x60zz");
        assert!(matches!(
            metadata.bytecode(),
            Err(BindingError::Bytecode { .. })
        ));
    }

    #[test]
    fn test_deploy_code_appends_args() {
        let metadata = ContractMetadata::new("Test", ABI, "0x6080\n");
        let code = metadata.deploy_code(&[0xaa, 0xbb]).unwrap();
        assert_eq!(code.as_ref(), &[0x60, 0x80, 0xaa, 0xbb]);
    }

    #[test]
    fn test_signatures() {
        let metadata = ContractMetadata::new("Test", ABI, "0x6080");
        let signatures = metadata.signatures().unwrap();

        assert_eq!(signatures.functions.len(), 1);
        assert_eq!(signatures.functions[0].0, "withdraw(uint256)");
        assert_eq!(signatures.functions[0].1, Selector::from([0x2e, 0x1a, 0x7d, 0x4d]));

        assert_eq!(signatures.events.len(), 1);
        assert_eq!(signatures.events[0].0, "Deposit(address,uint256)");
        assert_eq!(
            signatures.events[0].1,
            alloy_primitives::keccak256("Deposit(address,uint256)")
        );
    }
}

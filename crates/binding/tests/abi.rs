//! Selector and topic fidelity of the generated bindings against the embedded
//! compiler ABI.

use alloy_primitives::{hex, keccak256, Selector, B256};
use binding::{
    fiat_token::FiatTokenV22::{FiatTokenV22Calls, FiatTokenV22Events},
    kevin::Kevin::{KevinCalls, KevinEvents},
    wnative_token::WNativeToken::{WNativeTokenCalls, WNativeTokenEvents},
    ContractMetadata, FIAT_TOKEN_METADATA, KEVIN_METADATA, WNATIVE_TOKEN_METADATA,
};
use std::collections::BTreeSet;

fn abi_selectors(metadata: &ContractMetadata) -> BTreeSet<Selector> {
    metadata
        .signatures()
        .unwrap()
        .functions
        .into_iter()
        .map(|(_, selector)| selector)
        .collect()
}

fn abi_topics(metadata: &ContractMetadata) -> BTreeSet<B256> {
    metadata
        .signatures()
        .unwrap()
        .events
        .into_iter()
        .map(|(_, topic)| topic)
        .collect()
}

fn generated<T, const N: usize>(selectors: &[[u8; N]]) -> BTreeSet<T>
where
    T: From<[u8; N]> + Ord,
{
    selectors.iter().copied().map(T::from).collect()
}

#[test]
fn test_fiat_token_selectors_match_abi() {
    assert_eq!(
        generated::<Selector, 4>(FiatTokenV22Calls::SELECTORS),
        abi_selectors(&FIAT_TOKEN_METADATA)
    );
    assert_eq!(
        generated::<B256, 32>(FiatTokenV22Events::SELECTORS),
        abi_topics(&FIAT_TOKEN_METADATA)
    );
}

#[test]
fn test_kevin_selectors_match_abi() {
    assert_eq!(
        generated::<Selector, 4>(KevinCalls::SELECTORS),
        abi_selectors(&KEVIN_METADATA)
    );
    assert_eq!(
        generated::<B256, 32>(KevinEvents::SELECTORS),
        abi_topics(&KEVIN_METADATA)
    );
}

#[test]
fn test_wnative_token_selectors_match_abi() {
    assert_eq!(
        generated::<Selector, 4>(WNativeTokenCalls::SELECTORS),
        abi_selectors(&WNATIVE_TOKEN_METADATA)
    );
    assert_eq!(
        generated::<B256, 32>(WNativeTokenEvents::SELECTORS),
        abi_topics(&WNATIVE_TOKEN_METADATA)
    );
}

#[test]
fn test_selectors_are_hash_of_canonical_signature() {
    for metadata in [&FIAT_TOKEN_METADATA, &KEVIN_METADATA, &WNATIVE_TOKEN_METADATA] {
        let signatures = metadata.signatures().unwrap();

        for (signature, selector) in &signatures.functions {
            let hash = keccak256(signature.as_bytes());
            assert_eq!(&hash[..4], selector.as_slice(), "{}", signature);
        }
        for (signature, topic) in &signatures.events {
            assert_eq!(keccak256(signature.as_bytes()), *topic, "{}", signature);
        }
    }
}

#[test]
fn test_well_known_identifiers() {
    let signatures = KEVIN_METADATA.signatures().unwrap();

    let transfer = signatures
        .functions
        .iter()
        .find(|(sig, _)| sig == "transfer(address,uint256)")
        .unwrap();
    assert_eq!(transfer.1, Selector::from(hex!("a9059cbb")));

    let transfer_event = signatures
        .events
        .iter()
        .find(|(sig, _)| sig == "Transfer(address,address,uint256)")
        .unwrap();
    assert_eq!(
        transfer_event.1,
        B256::from(hex!(
            "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        ))
    );

    let deposit = WNATIVE_TOKEN_METADATA
        .signatures()
        .unwrap()
        .events
        .into_iter()
        .find(|(sig, _)| sig == "Deposit(address,uint256)")
        .unwrap();
    assert_eq!(
        deposit.1,
        B256::from(hex!(
            "e1fffcc4923d04b559f4d29a8bfc6cda04eb5b0d3c460751c2402c5c5cc9109c"
        ))
    );
}

#[test]
fn test_fiat_token_overloads_have_distinct_selectors() {
    let signatures = FIAT_TOKEN_METADATA.signatures().unwrap();

    for name in [
        "permit(",
        "cancelAuthorization(",
        "transferWithAuthorization(",
        "receiveWithAuthorization(",
    ] {
        let selectors: BTreeSet<Selector> = signatures
            .functions
            .iter()
            .filter(|(sig, _)| sig.starts_with(name))
            .map(|(_, selector)| *selector)
            .collect();
        assert_eq!(selectors.len(), 2, "{}", name);
    }
}

#[test]
fn test_embedded_bytecode() {
    for metadata in [&FIAT_TOKEN_METADATA, &KEVIN_METADATA, &WNATIVE_TOKEN_METADATA] {
        let code = metadata.bytecode().unwrap();
        // PUSH1 <free memory pointer> PUSH1 0x40 MSTORE
        assert_eq!(code[0], 0x60, "{}", metadata.name());
        assert_eq!(&code[2..5], &hex!("604052"), "{}", metadata.name());
    }
}

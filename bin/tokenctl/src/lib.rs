//! Token operations behind the `tokenctl` command line.

pub mod config;

use ::config::TokenAddresses;
use alloy_network::Ethereum;
use alloy_primitives::{
    utils::{format_units, parse_units, ParseUnits},
    Address, TxHash, U256,
};
use alloy_provider::{PendingTransactionBuilder, Provider};
use alloy_rpc_types_eth::Log;
use binding::{
    ContractMetadata, Deployment, FiatToken, FilterOpts, KevinToken, Subscription, WatchOpts,
    WrappedNativeToken, FIAT_TOKEN_METADATA, KEVIN_METADATA, WNATIVE_TOKEN_METADATA,
};
use clap::ValueEnum;
use std::{fmt, future::Future};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Events buffered between the binding feed and the relay.
const WATCH_BUFFER: usize = 64;

/// Bound token contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Contract {
    /// FiatTokenV2_2
    FiatToken,
    /// Kevin governance token
    Kevin,
    /// WNativeToken
    WnativeToken,
}

impl Contract {
    pub const fn metadata(self) -> &'static ContractMetadata {
        match self {
            Self::FiatToken => &FIAT_TOKEN_METADATA,
            Self::Kevin => &KEVIN_METADATA,
            Self::WnativeToken => &WNATIVE_TOKEN_METADATA,
        }
    }

    pub const fn address(self, tokens: &TokenAddresses) -> Address {
        match self {
            Self::FiatToken => tokens.fiat_token,
            Self::Kevin => tokens.governance_token,
            Self::WnativeToken => tokens.wnative_token,
        }
    }
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.metadata().name())
    }
}

/// Selector and topic listing of a contract, one entry per line.
pub fn signature_lines(metadata: &ContractMetadata) -> eyre::Result<Vec<String>> {
    let signatures = metadata.signatures()?;

    let functions = signatures
        .functions
        .iter()
        .map(|(signature, selector)| format!("function {selector} {signature}"));
    let events = signatures
        .events
        .iter()
        .map(|(signature, topic)| format!("event    {topic} {signature}"));

    Ok(functions.chain(events).collect())
}

/// Parse a decimal token amount into base units.
pub fn parse_amount(amount: &str, decimals: u8) -> eyre::Result<U256> {
    match parse_units(amount, decimals)? {
        ParseUnits::U256(value) => Ok(value),
        ParseUnits::I256(_) => eyre::bail!("amount must not be negative: {amount}"),
    }
}

/// Format base units as a decimal token amount.
pub fn format_amount(amount: U256, decimals: u8) -> eyre::Result<String> {
    Ok(format_units(amount, decimals)?)
}

/// ERC20 metadata and supply of a token.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: U256,
    /// Contract specific fields
    pub details: Vec<(&'static str, String)>,
}

pub async fn token_info<P>(
    contract: Contract,
    address: Address,
    provider: P,
) -> eyre::Result<TokenInfo>
where
    P: Provider + Clone + 'static,
{
    debug!(contract = %contract, address = %address, "Reading token info");

    let info = match contract {
        Contract::FiatToken => {
            let token = FiatToken::new(address, provider);
            let instance = token.instance();
            TokenInfo {
                name: instance.name().call().await?,
                symbol: instance.symbol().call().await?,
                decimals: instance.decimals().call().await?,
                total_supply: instance.totalSupply().call().await?,
                details: vec![
                    ("paused", instance.paused().call().await?.to_string()),
                    ("currency", instance.currency().call().await?),
                    ("version", instance.version().call().await?),
                    ("master minter", instance.masterMinter().call().await?.to_string()),
                    ("owner", instance.owner().call().await?.to_string()),
                ],
            }
        }
        Contract::Kevin => {
            let token = KevinToken::new(address, provider);
            let instance = token.instance();
            TokenInfo {
                name: instance.name().call().await?,
                symbol: instance.symbol().call().await?,
                decimals: instance.decimals().call().await?,
                total_supply: instance.totalSupply().call().await?,
                details: vec![("owner", instance.owner().call().await?.to_string())],
            }
        }
        Contract::WnativeToken => {
            let token = WrappedNativeToken::new(address, provider);
            let instance = token.instance();
            TokenInfo {
                name: instance.name().call().await?,
                symbol: instance.symbol().call().await?,
                decimals: instance.decimals().call().await?,
                total_supply: instance.totalSupply().call().await?,
                details: Vec::new(),
            }
        }
    };

    Ok(info)
}

pub async fn decimals<P>(contract: Contract, address: Address, provider: P) -> eyre::Result<u8>
where
    P: Provider + Clone + 'static,
{
    let decimals = match contract {
        Contract::FiatToken => FiatToken::new(address, provider).instance().decimals().call().await?,
        Contract::Kevin => KevinToken::new(address, provider).instance().decimals().call().await?,
        Contract::WnativeToken => {
            WrappedNativeToken::new(address, provider)
                .instance()
                .decimals()
                .call()
                .await?
        }
    };

    Ok(decimals)
}

pub async fn balance_of<P>(
    contract: Contract,
    address: Address,
    provider: P,
    holder: Address,
) -> eyre::Result<U256>
where
    P: Provider + Clone + 'static,
{
    let balance = match contract {
        Contract::FiatToken => {
            FiatToken::new(address, provider)
                .instance()
                .balanceOf(holder)
                .call()
                .await?
        }
        Contract::Kevin => {
            KevinToken::new(address, provider)
                .instance()
                .balanceOf(holder)
                .call()
                .await?
        }
        Contract::WnativeToken => {
            WrappedNativeToken::new(address, provider)
                .instance()
                .balanceOf(holder)
                .call()
                .await?
        }
    };

    Ok(balance)
}

/// Wait for `pending` to be mined, failing on revert.
async fn confirm(pending: PendingTransactionBuilder<Ethereum>) -> eyre::Result<TxHash> {
    let tx_hash = *pending.tx_hash();
    debug!(tx_hash = %tx_hash, "Waiting for receipt");

    let receipt = pending.get_receipt().await?;
    if !receipt.status() {
        eyre::bail!("Transaction {tx_hash} reverted");
    }

    info!(tx_hash = %tx_hash, block = ?receipt.block_number, "Transaction confirmed");
    Ok(tx_hash)
}

pub async fn transfer<P>(
    contract: Contract,
    address: Address,
    provider: P,
    to: Address,
    amount: U256,
) -> eyre::Result<TxHash>
where
    P: Provider + Clone + 'static,
{
    info!(contract = %contract, to = %to, amount = %amount, "Sending transfer");

    let pending = match contract {
        Contract::FiatToken => {
            FiatToken::new(address, provider)
                .instance()
                .transfer(to, amount)
                .send()
                .await?
        }
        Contract::Kevin => {
            KevinToken::new(address, provider)
                .instance()
                .transfer(to, amount)
                .send()
                .await?
        }
        Contract::WnativeToken => {
            WrappedNativeToken::new(address, provider)
                .instance()
                .transfer(to, amount)
                .send()
                .await?
        }
    };

    confirm(pending).await
}

/// Wrap `amount` of the native token.
pub async fn wrap<P>(address: Address, provider: P, amount: U256) -> eyre::Result<TxHash>
where
    P: Provider + Clone + 'static,
{
    info!(amount = %amount, "Wrapping native token");

    let pending = WrappedNativeToken::new(address, provider)
        .instance()
        .deposit()
        .value(amount)
        .send()
        .await?;

    confirm(pending).await
}

/// Unwrap `amount` back into the native token.
pub async fn unwrap<P>(address: Address, provider: P, amount: U256) -> eyre::Result<TxHash>
where
    P: Provider + Clone + 'static,
{
    info!(amount = %amount, "Unwrapping native token");

    let pending = WrappedNativeToken::new(address, provider)
        .instance()
        .withdraw(amount)
        .send()
        .await?;

    confirm(pending).await
}

/// Mint `amount` to `to`. The sender must be a configured minter (fiat
/// token) or the owner (Kevin).
pub async fn mint<P>(
    contract: Contract,
    address: Address,
    provider: P,
    to: Address,
    amount: U256,
) -> eyre::Result<TxHash>
where
    P: Provider + Clone + 'static,
{
    info!(contract = %contract, to = %to, amount = %amount, "Minting");

    let pending = match contract {
        Contract::FiatToken => {
            FiatToken::new(address, provider)
                .instance()
                .mint(to, amount)
                .send()
                .await?
        }
        Contract::Kevin => {
            KevinToken::new(address, provider)
                .instance()
                .mint(to, amount)
                .send()
                .await?
        }
        Contract::WnativeToken => eyre::bail!("{contract} has no mint, use wrap"),
    };

    confirm(pending).await
}

pub async fn deploy<P>(contract: Contract, provider: P) -> eyre::Result<Deployment>
where
    P: Provider + Clone + 'static,
{
    let deployment = match contract {
        Contract::FiatToken => FiatToken::deploy(provider).await?.0,
        Contract::Kevin => KevinToken::deploy(provider).await?.0,
        Contract::WnativeToken => WrappedNativeToken::deploy(provider).await?.0,
    };

    Ok(deployment)
}

/// A `Transfer` event of any bound token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub block_number: Option<u64>,
    pub tx_hash: Option<TxHash>,
}

impl TransferRecord {
    pub fn new(from: Address, to: Address, value: U256, log: &Log) -> Self {
        Self {
            from,
            to,
            value,
            block_number: log.block_number,
            tx_hash: log.transaction_hash,
        }
    }
}

/// Historical `Transfer` events matching the sender and recipient rules.
pub async fn transfers<P>(
    contract: Contract,
    address: Address,
    provider: P,
    opts: &FilterOpts,
    from: &[Address],
    to: &[Address],
) -> eyre::Result<Vec<TransferRecord>>
where
    P: Provider + Clone + 'static,
{
    let records = match contract {
        Contract::FiatToken => FiatToken::new(address, provider)
            .filter_transfer(opts, from, to)
            .await?
            .collect()
            .await?
            .into_iter()
            .map(|(event, log)| TransferRecord::new(event.from, event.to, event.value, &log))
            .collect(),
        Contract::Kevin => KevinToken::new(address, provider)
            .filter_transfer(opts, from, to)
            .await?
            .collect()
            .await?
            .into_iter()
            .map(|(event, log)| TransferRecord::new(event.from, event.to, event.value, &log))
            .collect(),
        Contract::WnativeToken => WrappedNativeToken::new(address, provider)
            .filter_transfer(opts, from, to)
            .await?
            .collect()
            .await?
            .into_iter()
            .map(|(event, log)| TransferRecord::new(event.src, event.dst, event.wad, &log))
            .collect(),
    };

    Ok(records)
}

/// Push live `Transfer` events into `sink` until the feed stops or `sink` is
/// closed.
pub async fn watch_transfers<P>(
    contract: Contract,
    address: Address,
    provider: P,
    opts: &WatchOpts,
    sink: mpsc::Sender<TransferRecord>,
) -> eyre::Result<()>
where
    P: Provider + Clone + 'static,
{
    info!(contract = %contract, address = %address, "Watching transfers");

    match contract {
        Contract::FiatToken => {
            let (tx, rx) = mpsc::channel(WATCH_BUFFER);
            let sub = FiatToken::new(address, provider)
                .watch_transfer(opts, tx, &[], &[])
                .await?;
            relay(rx, sub, sink, |event, log| {
                TransferRecord::new(event.from, event.to, event.value, log)
            })
            .await
        }
        Contract::Kevin => {
            let (tx, rx) = mpsc::channel(WATCH_BUFFER);
            let sub = KevinToken::new(address, provider)
                .watch_transfer(opts, tx, &[], &[])
                .await?;
            relay(rx, sub, sink, |event, log| {
                TransferRecord::new(event.from, event.to, event.value, log)
            })
            .await
        }
        Contract::WnativeToken => {
            let (tx, rx) = mpsc::channel(WATCH_BUFFER);
            let sub = WrappedNativeToken::new(address, provider)
                .watch_transfer(opts, tx, &[], &[])
                .await?;
            relay(rx, sub, sink, |event, log| {
                TransferRecord::new(event.src, event.dst, event.wad, log)
            })
            .await
        }
    }
}

/// Hand every record relayed by `watch` to `emit` until the watch ends or
/// `stop` resolves.
///
/// Records still queued in `records` when the watch ends are emitted before
/// its result is returned.
pub async fn drive_watch<W, S>(
    watch: W,
    mut records: mpsc::Receiver<TransferRecord>,
    stop: S,
    mut emit: impl FnMut(&TransferRecord),
) -> eyre::Result<()>
where
    W: Future<Output = eyre::Result<()>>,
    S: Future,
{
    tokio::pin!(watch);
    tokio::pin!(stop);

    loop {
        tokio::select! {
            result = &mut watch => {
                while let Ok(record) = records.try_recv() {
                    emit(&record);
                }
                return result;
            }
            Some(record) = records.recv() => emit(&record),
            _ = &mut stop => {
                info!("Stopping watch");
                return Ok(());
            }
        }
    }
}

async fn relay<E>(
    mut events: mpsc::Receiver<(E, Log)>,
    mut sub: Subscription,
    sink: mpsc::Sender<TransferRecord>,
    record: fn(E, &Log) -> TransferRecord,
) -> eyre::Result<()> {
    loop {
        tokio::select! {
            biased;
            err = sub.err() => {
                return match err {
                    Some(err) => Err(err.into()),
                    None => Ok(()),
                };
            }
            event = events.recv() => {
                let Some((event, log)) = event else {
                    return Ok(());
                };
                if sink.send(record(event, &log)).await.is_err() {
                    debug!("Transfer sink closed");
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{b256, B256};

    #[test]
    fn test_contract_addresses() {
        let tokens = TokenAddresses::predeploys();
        assert_eq!(Contract::FiatToken.address(&tokens), tokens.fiat_token);
        assert_eq!(Contract::Kevin.address(&tokens), tokens.governance_token);
        assert_eq!(Contract::WnativeToken.address(&tokens), tokens.wnative_token);
    }

    #[test]
    fn test_contract_names() {
        assert_eq!(Contract::FiatToken.to_string(), "FiatTokenV2_2");
        assert_eq!(Contract::WnativeToken.to_string(), "WNativeToken");
        assert_eq!(
            Contract::from_str("wnative-token", false),
            Ok(Contract::WnativeToken)
        );
    }

    #[test]
    fn test_signature_lines() {
        let lines = signature_lines(Contract::Kevin.metadata()).unwrap();

        assert!(lines.iter().any(|line| {
            line.contains("0xa9059cbb") && line.ends_with("transfer(address,uint256)")
        }));
        assert!(lines.iter().any(|line| {
            line.starts_with("event") && line.ends_with("Transfer(address,address,uint256)")
        }));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1.5", 6).unwrap(), U256::from(1_500_000));
        assert_eq!(
            parse_amount("2", 18).unwrap(),
            U256::from(2_000_000_000_000_000_000u128)
        );
        assert!(parse_amount("abc", 6).is_err());
    }

    #[test]
    fn test_parse_amount_rejects_negative() {
        let err = parse_amount("-1.5", 6).unwrap_err();
        assert!(err.to_string().contains("must not be negative"));
        assert!(parse_amount("-1", 18).is_err());
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(U256::from(1_500_000), 6).unwrap(), "1.500000");
    }

    #[test]
    fn test_transfer_record_from_log() {
        let tx_hash: B256 =
            b256!("0x1111111111111111111111111111111111111111111111111111111111111111");
        let log = Log {
            block_number: Some(42),
            transaction_hash: Some(tx_hash),
            ..Default::default()
        };

        let record =
            TransferRecord::new(Address::ZERO, Address::repeat_byte(1), U256::from(5), &log);
        assert_eq!(record.block_number, Some(42));
        assert_eq!(record.tx_hash, Some(tx_hash));
    }

    fn record(value: u64) -> TransferRecord {
        TransferRecord::new(
            Address::ZERO,
            Address::repeat_byte(1),
            U256::from(value),
            &Log::default(),
        )
    }

    #[tokio::test]
    async fn test_drive_watch_emits_records_queued_at_end() {
        let (tx, rx) = mpsc::channel(8);
        let watch = async move {
            for value in 1..=3 {
                tx.send(record(value)).await?;
            }
            Ok::<_, eyre::Report>(())
        };

        let mut seen = Vec::new();
        drive_watch(watch, rx, std::future::pending::<()>(), |record| {
            seen.push(record.value)
        })
        .await
        .unwrap();

        assert_eq!(seen, vec![U256::from(1), U256::from(2), U256::from(3)]);
    }

    #[tokio::test]
    async fn test_drive_watch_returns_watch_error_after_draining() {
        let (tx, rx) = mpsc::channel(8);
        let watch = async move {
            tx.send(record(7)).await?;
            Err::<(), _>(eyre::eyre!("feed failed"))
        };

        let mut seen = Vec::new();
        let err = drive_watch(watch, rx, std::future::pending::<()>(), |record| {
            seen.push(record.value)
        })
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "feed failed");
        assert_eq!(seen, vec![U256::from(7)]);
    }

    #[tokio::test]
    async fn test_drive_watch_stops_on_signal() {
        let (_tx, rx) = mpsc::channel(8);
        let watch = std::future::pending::<eyre::Result<()>>();

        let mut count = 0;
        drive_watch(watch, rx, std::future::ready(()), |_| count += 1)
            .await
            .unwrap();

        assert_eq!(count, 0);
    }
}

//! Generic log filtering for a bound contract.
//!
//! Indexed-parameter rules follow the usual topic semantics: an empty rule is
//! a wildcard, a non-empty rule matches any of its values, and rules in
//! different positions must all match.

use crate::{
    error::{BindingError, Result},
    iterator::LogIterator,
    subscription::{self, Subscription},
};
use alloy_primitives::{Address, B256};
use alloy_provider::Provider;
use alloy_rpc_types_eth::{Filter, Log, Topic};
use alloy_sol_types::SolEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_retry::{strategy::ExponentialBackoff, Retry};
use tracing::{debug, warn};

/// Blocks per `eth_getLogs` request.
pub const DEFAULT_CHUNK_SIZE: u64 = 9_500;

/// Block range of a historical query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOpts {
    /// First block to scan
    pub start: u64,
    /// Last block to scan, `None` for the latest block at query time
    pub end: Option<u64>,
    /// Blocks per request
    pub chunk_size: u64,
}

impl Default for FilterOpts {
    fn default() -> Self {
        Self::new(0)
    }
}

impl FilterOpts {
    pub const fn new(start: u64) -> Self {
        Self {
            start,
            end: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub const fn with_end(mut self, end: u64) -> Self {
        self.end = Some(end);
        self
    }

    pub const fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}

/// Options of a live subscription.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchOpts {
    /// First block to report, `None` for new blocks only
    pub start: Option<u64>,
    /// Override of the provider's poll interval
    pub poll_interval: Option<Duration>,
}

/// Values that can be matched in an indexed event position.
pub trait ToTopic {
    fn to_topic(&self) -> B256;
}

impl ToTopic for Address {
    fn to_topic(&self) -> B256 {
        self.into_word()
    }
}

impl ToTopic for B256 {
    fn to_topic(&self) -> B256 {
        *self
    }
}

/// Build a topic rule matching any of `items`.
pub fn rule<T: ToTopic>(items: &[T]) -> Topic {
    items
        .iter()
        .map(ToTopic::to_topic)
        .collect::<Vec<B256>>()
        .into()
}

/// Decode `log` as `E`, checking the event topic first.
pub(crate) fn decode_log<E: SolEvent>(log: &Log) -> Result<E> {
    let topic = log.inner.data.topics().first().copied();
    if topic != Some(E::SIGNATURE_HASH) {
        return Err(BindingError::EventSignatureMismatch {
            event: E::SIGNATURE,
            topic,
        });
    }

    Ok(E::decode_log_data(&log.inner.data)?)
}

/// Log filterer bound to a single contract address.
#[derive(Debug, Clone)]
pub struct Filterer<P> {
    address: Address,
    provider: P,
}

impl<P> Filterer<P>
where
    P: Provider + Clone + 'static,
{
    pub const fn new(address: Address, provider: P) -> Self {
        Self { address, provider }
    }

    pub const fn address(&self) -> Address {
        self.address
    }

    /// Filter matching `E` emitted by this contract.
    ///
    /// At most three rules are used, one per indexed position.
    pub fn event_filter<E: SolEvent>(&self, rules: Vec<Topic>) -> Filter {
        let mut filter = Filter::new()
            .address(self.address)
            .event_signature(E::SIGNATURE_HASH);

        for (position, rule) in rules.into_iter().take(3).enumerate() {
            filter.topics[position + 1] = rule;
        }

        filter
    }

    /// Query historical `E` logs in the block range of `opts`.
    pub async fn filter_logs<E: SolEvent>(
        &self,
        opts: &FilterOpts,
        rules: Vec<Topic>,
    ) -> Result<LogIterator<E>> {
        let end = match opts.end {
            Some(end) => end,
            None => self.provider.get_block_number().await?,
        };

        if opts.start > end {
            return Err(BindingError::InvalidBlockRange {
                start: opts.start,
                end,
            });
        }

        let filter = self.event_filter::<E>(rules);
        let chunk_size = opts.chunk_size.max(1);

        debug!(
            event = E::SIGNATURE,
            address = %self.address,
            from = opts.start,
            to = end,
            chunk_size,
            "Filtering logs"
        );

        let mut logs = Vec::new();
        let mut current = opts.start;

        loop {
            let chunk_end = current.saturating_add(chunk_size - 1).min(end);

            logs.extend(self.get_logs_with_retry(&filter, current, chunk_end).await?);

            if chunk_end >= end {
                break;
            }
            current = chunk_end + 1;
        }

        debug!(event = E::SIGNATURE, count = logs.len(), "Fetched logs");

        let (logs, sub) = subscription::replay(logs);
        Ok(LogIterator::new(logs, sub))
    }

    /// Fetch a single chunk, retrying with exponential backoff.
    async fn get_logs_with_retry(
        &self,
        filter: &Filter,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<Log>> {
        // 100ms, 200ms, 400ms, 800ms, 1.6s
        let retry_strategy = ExponentialBackoff::from_millis(2).factor(50).take(5);
        let chunk = filter.clone().from_block(from_block).to_block(to_block);

        let logs = Retry::spawn(retry_strategy, || async {
            self.provider.get_logs(&chunk).await.map_err(|e| {
                warn!(
                    from = from_block,
                    to = to_block,
                    error = %e,
                    "Log chunk query failed, will retry"
                );
                e
            })
        })
        .await?;

        Ok(logs)
    }

    /// Live `E` logs as a pull iterator.
    pub async fn subscribe_logs<E: SolEvent>(
        &self,
        opts: &WatchOpts,
        rules: Vec<Topic>,
    ) -> Result<LogIterator<E>> {
        let (logs, sub) = self.poll::<E>(opts, rules).await?;
        Ok(LogIterator::new(logs, sub))
    }

    /// Live `E` events pushed into `sink`.
    ///
    /// The subscription fails on the first decode error or RPC error and
    /// completes cleanly once `sink` is closed. When the feed fails, logs it
    /// had already fetched but not yet pushed into `sink` (up to 128) are
    /// dropped.
    pub async fn watch_logs<E>(
        &self,
        opts: &WatchOpts,
        sink: mpsc::Sender<(E, Log)>,
        rules: Vec<Topic>,
    ) -> Result<Subscription>
    where
        E: SolEvent + Send + 'static,
    {
        let (logs, sub) = self.poll::<E>(opts, rules).await?;
        Ok(subscription::forward_decoded(logs, sub, sink))
    }

    async fn poll<E: SolEvent>(
        &self,
        opts: &WatchOpts,
        rules: Vec<Topic>,
    ) -> Result<(mpsc::Receiver<Log>, Subscription)> {
        let mut filter = self.event_filter::<E>(rules);
        if let Some(start) = opts.start {
            filter = filter.from_block(start);
        }

        debug!(
            event = E::SIGNATURE,
            address = %self.address,
            start = ?opts.start,
            "Watching logs"
        );

        subscription::poll_logs(self.provider.clone(), filter, opts.poll_interval).await
    }

    /// Decode a single raw log as `E`.
    pub fn parse_log<E: SolEvent>(&self, log: &Log) -> Result<E> {
        decode_log(log)
    }
}

/// Generates `filter_*`, `watch_*` and `parse_*` methods on a contract facade
/// holding a `filterer: Filterer<P>` field.
macro_rules! event_methods {
    ($(
        $event:ident => $filter:ident, $watch:ident, $parse:ident ($($rule:ident: $ty:ty),* $(,)?);
    )*) => {$(
        #[doc = concat!("Query historical `", stringify!($event), "` events.")]
        pub async fn $filter(
            &self,
            opts: &$crate::FilterOpts,
            $($rule: &[$ty],)*
        ) -> $crate::Result<$crate::LogIterator<$event>> {
            self.filterer
                .filter_logs::<$event>(opts, vec![$($crate::filterer::rule($rule)),*])
                .await
        }

        #[doc = concat!("Push live `", stringify!($event), "` events into `sink`.")]
        ///
        /// See [`Filterer::watch_logs`](crate::Filterer::watch_logs) for how
        /// the subscription ends.
        pub async fn $watch(
            &self,
            opts: &$crate::WatchOpts,
            sink: ::tokio::sync::mpsc::Sender<($event, ::alloy_rpc_types_eth::Log)>,
            $($rule: &[$ty],)*
        ) -> $crate::Result<$crate::Subscription> {
            self.filterer
                .watch_logs::<$event>(opts, sink, vec![$($crate::filterer::rule($rule)),*])
                .await
        }

        #[doc = concat!("Decode a raw `", stringify!($event), "` log.")]
        pub fn $parse(&self, log: &::alloy_rpc_types_eth::Log) -> $crate::Result<$event> {
            self.filterer.parse_log::<$event>(log)
        }
    )*};
}

pub(crate) use event_methods;

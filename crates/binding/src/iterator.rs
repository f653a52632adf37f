//! Pull cursor over a log feed.

use crate::{
    error::BindingError,
    filterer::decode_log,
    subscription::Subscription,
};
use alloy_rpc_types_eth::Log;
use alloy_sol_types::SolEvent;
use std::marker::PhantomData;
use tokio::sync::mpsc;

/// Iterator over `E` events of a single feed.
///
/// Iteration stops on the first feed error or decode error; the error is then
/// available from [`LogIterator::error`]. A feed that completes cleanly is
/// drained: logs already buffered are still delivered before `next` returns
/// `None`.
#[derive(Debug)]
pub struct LogIterator<E> {
    logs: mpsc::Receiver<Log>,
    sub: Subscription,
    done: bool,
    fail: Option<BindingError>,
    _event: PhantomData<fn() -> E>,
}

enum Step {
    Log(Option<Log>),
    Ended(Option<BindingError>),
}

impl<E: SolEvent> LogIterator<E> {
    pub(crate) const fn new(logs: mpsc::Receiver<Log>, sub: Subscription) -> Self {
        Self {
            logs,
            sub,
            done: false,
            fail: None,
            _event: PhantomData,
        }
    }

    /// Advance to the next event, together with the raw log it was decoded from.
    pub async fn next(&mut self) -> Option<(E, Log)> {
        if self.fail.is_some() {
            return None;
        }

        if !self.done {
            // errors win over pending logs
            let step = tokio::select! {
                biased;
                err = self.sub.err() => Step::Ended(err),
                log = self.logs.recv() => Step::Log(log),
            };

            match step {
                Step::Log(Some(log)) => return self.unpack(log),
                Step::Log(None) => {
                    self.done = true;
                    self.fail = self.sub.err().await;
                }
                Step::Ended(err) => {
                    self.done = true;
                    self.fail = err;
                }
            }

            if self.fail.is_some() {
                return None;
            }
        }

        match self.logs.try_recv() {
            Ok(log) => self.unpack(log),
            Err(_) => None,
        }
    }

    fn unpack(&mut self, log: Log) -> Option<(E, Log)> {
        match decode_log::<E>(&log) {
            Ok(event) => Some((event, log)),
            Err(err) => {
                self.fail = Some(err);
                None
            }
        }
    }

    /// Collect every remaining event.
    ///
    /// Returns the error that stopped the iteration, if any.
    pub async fn collect(mut self) -> crate::Result<Vec<(E, Log)>> {
        let mut events = Vec::new();
        while let Some(event) = self.next().await {
            events.push(event);
        }

        match self.fail.take() {
            Some(err) => Err(err),
            None => Ok(events),
        }
    }

    /// Error that stopped the iteration.
    pub const fn error(&self) -> Option<&BindingError> {
        self.fail.as_ref()
    }

    /// Stop the underlying feed. Logs already buffered are still delivered.
    pub fn close(&mut self) {
        self.sub.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        subscription::replay,
        wnative_token::WNativeToken::{Deposit, Withdrawal},
    };
    use alloy_primitives::{Address, U256};
    use alloy_transport::TransportErrorKind;

    fn log_of<E: SolEvent>(event: &E) -> Log {
        Log {
            inner: alloy_primitives::Log {
                address: Address::repeat_byte(0x06),
                data: event.encode_log_data(),
            },
            ..Default::default()
        }
    }

    fn deposit(wad: u64) -> Log {
        log_of(&Deposit {
            dst: Address::repeat_byte(0x11),
            wad: U256::from(wad),
        })
    }

    fn live() -> (
        mpsc::Sender<Log>,
        mpsc::Sender<BindingError>,
        LogIterator<Deposit>,
    ) {
        let (log_tx, log_rx) = mpsc::channel(16);
        let (err_tx, err_rx) = mpsc::channel(1);
        let iter = LogIterator::new(log_rx, Subscription::new(err_rx, None));
        (log_tx, err_tx, iter)
    }

    #[tokio::test]
    async fn test_replay_delivers_in_order() {
        let (logs, sub) = replay(vec![deposit(1), deposit(2), deposit(3)]);
        let mut iter = LogIterator::<Deposit>::new(logs, sub);

        let mut seen = Vec::new();
        while let Some((event, _)) = iter.next().await {
            seen.push(event.wad);
        }

        assert_eq!(seen, vec![U256::from(1), U256::from(2), U256::from(3)]);
        assert!(iter.error().is_none());
        assert!(iter.next().await.is_none());
    }

    #[tokio::test]
    async fn test_empty_replay() {
        let (logs, sub) = replay(vec![]);
        let mut iter = LogIterator::<Deposit>::new(logs, sub);

        assert!(iter.next().await.is_none());
        assert!(iter.error().is_none());
    }

    #[tokio::test]
    async fn test_decode_failure_stops_iteration() {
        let withdrawal = log_of(&Withdrawal {
            src: Address::repeat_byte(0x22),
            wad: U256::from(5),
        });
        let (logs, sub) = replay(vec![deposit(1), withdrawal, deposit(3)]);
        let mut iter = LogIterator::<Deposit>::new(logs, sub);

        assert!(iter.next().await.is_some());
        assert!(iter.next().await.is_none());
        assert!(matches!(
            iter.error(),
            Some(BindingError::EventSignatureMismatch { .. })
        ));
        // stays stopped even though a valid log is still buffered
        assert!(iter.next().await.is_none());
    }

    #[tokio::test]
    async fn test_live_feed_delivers_then_drains() {
        let (log_tx, err_tx, mut iter) = live();

        log_tx.send(deposit(1)).await.unwrap();
        let (event, _) = iter.next().await.unwrap();
        assert_eq!(event.wad, U256::from(1));

        // feed completes cleanly with two logs still buffered
        log_tx.send(deposit(2)).await.unwrap();
        log_tx.send(deposit(3)).await.unwrap();
        drop(err_tx);
        drop(log_tx);

        assert_eq!(iter.next().await.unwrap().0.wad, U256::from(2));
        assert_eq!(iter.next().await.unwrap().0.wad, U256::from(3));
        assert!(iter.next().await.is_none());
        assert!(iter.error().is_none());
    }

    #[tokio::test]
    async fn test_feed_error_stops_iteration() {
        let (log_tx, err_tx, mut iter) = live();

        log_tx.send(deposit(1)).await.unwrap();
        err_tx
            .send(TransportErrorKind::custom_str("filter not found").into())
            .await
            .unwrap();

        assert!(iter.next().await.is_none());
        assert!(matches!(iter.error(), Some(BindingError::Rpc(_))));
        assert!(iter.next().await.is_none());
    }

    #[tokio::test]
    async fn test_close_drains_buffered_logs() {
        let (log_tx, _err_tx, mut iter) = live();

        log_tx.send(deposit(9)).await.unwrap();
        iter.close();

        assert_eq!(iter.next().await.unwrap().0.wad, U256::from(9));
        assert!(iter.next().await.is_none());
        assert!(iter.error().is_none());
    }

    #[tokio::test]
    async fn test_collect() {
        let (logs, sub) = replay(vec![deposit(4), deposit(5)]);
        let events = LogIterator::<Deposit>::new(logs, sub)
            .collect()
            .await
            .unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].0.wad, U256::from(5));
    }
}

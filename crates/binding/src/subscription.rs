//! Log feeds backing the event iterators and watchers.
//!
//! A feed is a pair of channels: raw logs, and a single terminal error. The
//! error channel closes without a value when the feed completes cleanly or is
//! unsubscribed.

use crate::{
    error::{BindingError, Result},
    filterer::decode_log,
};
use alloy_provider::Provider;
use alloy_rpc_types_eth::{Filter, Log};
use alloy_sol_types::SolEvent;
use std::time::Duration;
use tokio::{
    sync::{mpsc, oneshot},
    time::MissedTickBehavior,
};
use tracing::{debug, warn};

/// Buffered logs per live feed.
pub(crate) const LOG_BUFFER: usize = 128;

/// Handle to a running log feed.
///
/// Dropping the handle stops the feed.
#[derive(Debug)]
pub struct Subscription {
    err: mpsc::Receiver<BindingError>,
    stop: Option<oneshot::Sender<()>>,
}

impl Subscription {
    pub(crate) const fn new(
        err: mpsc::Receiver<BindingError>,
        stop: Option<oneshot::Sender<()>>,
    ) -> Self {
        Self { err, stop }
    }

    /// A feed that has already delivered everything it ever will.
    pub(crate) fn completed() -> Self {
        let (_tx, rx) = mpsc::channel(1);
        Self::new(rx, None)
    }

    /// Wait for the feed to stop.
    ///
    /// Returns the error that stopped it, or `None` if it completed or was
    /// unsubscribed.
    pub async fn err(&mut self) -> Option<BindingError> {
        self.err.recv().await
    }

    /// Stop the feed. Pending `err()` calls resolve to `None`.
    pub fn unsubscribe(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        self.err.close();
    }
}

/// Feed over logs that were already fetched.
pub(crate) fn replay(logs: Vec<Log>) -> (mpsc::Receiver<Log>, Subscription) {
    let (tx, rx) = mpsc::channel(logs.len().max(1));
    for log in logs {
        // capacity covers every log
        let _ = tx.try_send(log);
    }

    (rx, Subscription::completed())
}

/// Live feed polling `eth_getFilterChanges` for `filter`.
///
/// The filter is installed before this returns. The polling task uninstalls
/// it on every exit path. A failed poll ends the feed with that RPC error.
pub(crate) async fn poll_logs<P>(
    provider: P,
    filter: Filter,
    poll_interval: Option<Duration>,
) -> Result<(mpsc::Receiver<Log>, Subscription)>
where
    P: Provider + Clone + 'static,
{
    let filter_id = provider.new_filter(&filter).await?;
    let period = poll_interval.unwrap_or_else(|| provider.client().poll_interval());

    debug!(filter_id = %filter_id, period = ?period, "Installed log filter");

    let (log_tx, log_rx) = mpsc::channel(LOG_BUFFER);
    let (err_tx, err_rx) = mpsc::channel(1);
    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let mut ticks = tokio::time::interval(period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // a dropped stop sender counts as a stop
        let failure = 'poll: loop {
            tokio::select! {
                biased;
                _ = &mut stop_rx => break 'poll None,
                _ = log_tx.closed() => break 'poll None,
                _ = ticks.tick() => {}
            }

            let batch = match provider.get_filter_changes::<Log>(filter_id).await {
                Ok(batch) => batch,
                Err(err) => break 'poll Some(err),
            };

            for log in batch {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => break 'poll None,
                    sent = log_tx.send(log) => {
                        if sent.is_err() {
                            break 'poll None;
                        }
                    }
                }
            }
        };

        match provider.uninstall_filter(filter_id).await {
            Ok(removed) => debug!(filter_id = %filter_id, removed, "Uninstalled log filter"),
            Err(err) => {
                debug!(filter_id = %filter_id, error = %err, "Failed to uninstall log filter");
            }
        }

        if let Some(err) = failure {
            warn!(filter_id = %filter_id, error = %err, "Log polling failed");
            let _ = err_tx.send(err.into()).await;
        }
    });

    Ok((log_rx, Subscription::new(err_rx, Some(stop_tx))))
}

/// Decode every log of `upstream` as `E` and push it into `sink`.
///
/// The returned subscription fails on the first decode error or upstream
/// error, and completes cleanly once `sink` is closed. An upstream error is
/// reported as soon as it arrives, so logs still queued behind it are
/// dropped. Stopping the returned subscription stops `upstream` too.
pub(crate) fn forward_decoded<E>(
    mut logs: mpsc::Receiver<Log>,
    mut upstream: Subscription,
    sink: mpsc::Sender<(E, Log)>,
) -> Subscription
where
    E: SolEvent + Send + 'static,
{
    let (err_tx, err_rx) = mpsc::channel(1);
    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        loop {
            let step = tokio::select! {
                biased;
                _ = &mut stop_rx => Forward::Ended(None),
                err = upstream.err() => Forward::Ended(err),
                _ = sink.closed() => Forward::Ended(None),
                log = logs.recv() => Forward::Log(log),
            };

            match step {
                Forward::Log(Some(log)) => {
                    let event = match decode_log::<E>(&log) {
                        Ok(event) => event,
                        Err(err) => {
                            let _ = err_tx.send(err).await;
                            return;
                        }
                    };
                    if sink.send((event, log)).await.is_err() {
                        return;
                    }
                }
                Forward::Log(None) => {
                    if let Some(err) = upstream.err().await {
                        let _ = err_tx.send(err).await;
                    }
                    return;
                }
                Forward::Ended(err) => {
                    if let Some(err) = err {
                        let _ = err_tx.send(err).await;
                    }
                    return;
                }
            }
        }
    });

    Subscription::new(err_rx, Some(stop_tx))
}

enum Forward {
    Log(Option<Log>),
    Ended(Option<BindingError>),
}

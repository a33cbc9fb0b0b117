// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live queries by change-detecting re-query.
//!
//! The first value is fetched before [`spawn`] returns, so an unreachable
//! deployment fails the subscribe call itself. After that a background task
//! re-runs the query every poll interval and forwards a value only when it
//! differs from the last one delivered.

use std::time::Duration;

use futures::StreamExt;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use haven_core::{FunctionRef, HavenError, Subscription};

use crate::client::{CallKind, DocumentClient};

const CHANNEL_CAPACITY: usize = 16;

/// Open a live query for `function(args)`.
pub(crate) async fn spawn(
    client: DocumentClient,
    function: FunctionRef,
    args: Value,
    poll_interval: Duration,
) -> Result<Subscription, HavenError> {
    let initial = client.call(CallKind::Query, &function, &args).await?;

    let (tx, mut rx) = mpsc::channel::<Result<Value, HavenError>>(CHANNEL_CAPACITY);
    let cancel = CancellationToken::new();

    // Capacity is non-zero and the receiver is alive, so this cannot fail.
    let _ = tx.try_send(Ok(initial.clone()));

    tokio::spawn(follow(
        client,
        function,
        args,
        initial,
        poll_interval,
        tx,
        cancel.clone(),
    ));

    let updates = futures::stream::poll_fn(move |cx| rx.poll_recv(cx)).boxed();
    Ok(Subscription::new(updates, cancel))
}

/// Re-query until cancelled or the receiver goes away. Every await is raced
/// against `cancel`, so a drop never waits out a slow request.
async fn follow(
    client: DocumentClient,
    function: FunctionRef,
    args: Value,
    initial: Value,
    poll_interval: Duration,
    tx: mpsc::Sender<Result<Value, HavenError>>,
    cancel: CancellationToken,
) {
    let mut last = Some(initial);
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the initial value is already sent.
    ticker.tick().await;

    loop {
        let polled = tokio::select! {
            _ = cancel.cancelled() => None,
            polled = async {
                ticker.tick().await;
                client.call(CallKind::Query, &function, &args).await
            } => Some(polled),
        };
        let Some(polled) = polled else {
            debug!(%function, "subscription cancelled");
            return;
        };

        let item = match polled {
            Ok(value) if last.as_ref() == Some(&value) => continue,
            Ok(value) => {
                last = Some(value.clone());
                Ok(value)
            }
            // Report a failure once per outage; the next success is then
            // always a change and gets delivered.
            Err(_) if last.is_none() => continue,
            Err(e) => {
                warn!(%function, error = %e, "subscription re-query failed");
                last = None;
                Err(e)
            }
        };

        tokio::select! {
            _ = cancel.cancelled() => return,
            sent = tx.send(item) => if sent.is_err() { return },
        }
    }
}

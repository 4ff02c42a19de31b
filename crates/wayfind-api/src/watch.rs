// ── Watch loop: a subscription over repeated blocking queries ──
//
// Turns a fetch closure into a long-lived subscription: fetch, absorb
// the cursor, dispatch, refetch. Exactly one fetch is in flight per
// subscription, and fetch N+1 is issued only after fetch N's result has
// been fully processed.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::blocking::{CursorOutcome, CursorState};
use crate::error::Error;
use crate::query::{QueryOptions, WithMeta};

// ── Lifecycle ────────────────────────────────────────────────────────

/// Subscription lifecycle state, observable via [`WatchHandle::state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// No successful fetch yet, or reconnecting after a transport failure.
    Connecting,
    /// At least one fetch has succeeded and polling continues.
    Open,
    /// The loop has stopped; no further events will be dispatched.
    Closed,
}

/// One dispatched update from a subscription.
#[derive(Debug, Clone)]
pub enum WatchEvent<T> {
    /// A successful fetch; carries the body and its query metadata.
    Data(WithMeta<T>),
    /// A failed fetch. Transport failures are followed by a retry;
    /// HTTP-status failures close the subscription.
    Error(Arc<Error>),
}

/// Tuning for the watch loop.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Whether fetches may block server-side on the cursor.
    pub blocking: bool,
    /// Server-side hold bound for blocking fetches.
    pub wait: Duration,
    /// Cadence between fetches when blocking is disabled.
    pub poll_interval: Duration,
    /// First retry delay after a transport failure.
    pub retry_initial: Duration,
    /// Retry delay cap.
    pub retry_max: Duration,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            blocking: true,
            wait: Duration::from_secs(300),
            poll_interval: Duration::from_secs(10),
            retry_initial: Duration::from_millis(500),
            retry_max: Duration::from_secs(8),
        }
    }
}

// ── Watcher ──────────────────────────────────────────────────────────

/// Spawns watch loops. The fetch closure is the only per-resource piece;
/// everything else (cursor handling, retry, lifecycle) is shared.
pub struct Watcher;

impl Watcher {
    /// Start a subscription driving `fetch` in a background task.
    ///
    /// `fetch` receives the scoped [`QueryOptions`] for each iteration,
    /// with the cursor and wait bound already attached when applicable.
    pub fn spawn<T, F, Fut>(fetch: F, options: QueryOptions, config: WatchConfig) -> WatchHandle<T>
    where
        T: Send + 'static,
        F: Fn(QueryOptions) -> Fut + Send + 'static,
        Fut: Future<Output = Result<WithMeta<T>, Error>> + Send + 'static,
    {
        Self::spawn_scoped(fetch, options, config, &CancellationToken::new())
    }

    /// Start a subscription tied to a parent token: cancelling the
    /// parent closes every subscription spawned under it, on top of the
    /// handle's own `close()`.
    pub fn spawn_scoped<T, F, Fut>(
        fetch: F,
        options: QueryOptions,
        config: WatchConfig,
        parent: &CancellationToken,
    ) -> WatchHandle<T>
    where
        T: Send + 'static,
        F: Fn(QueryOptions) -> Fut + Send + 'static,
        Fut: Future<Output = Result<WithMeta<T>, Error>> + Send + 'static,
    {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(WatchState::Connecting);
        let cancel = parent.child_token();

        let task = tokio::spawn(watch_loop(
            fetch,
            options,
            config,
            event_tx,
            state_tx,
            cancel.clone(),
        ));

        WatchHandle {
            events: event_rx,
            state: state_rx,
            cancel,
            task,
        }
    }
}

async fn watch_loop<T, F, Fut>(
    fetch: F,
    options: QueryOptions,
    config: WatchConfig,
    events: mpsc::UnboundedSender<WatchEvent<T>>,
    state: watch::Sender<WatchState>,
    cancel: CancellationToken,
) where
    F: Fn(QueryOptions) -> Fut + Send,
    Fut: Future<Output = Result<WithMeta<T>, Error>> + Send,
{
    let mut cursor = CursorState::new(config.blocking, config.wait);
    let mut backoff = config.retry_initial;

    loop {
        let mut opts = options.clone();
        cursor.prepare(&mut opts);

        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = fetch(opts) => result,
        };

        // A close that raced the in-flight fetch wins: the result is
        // discarded, never dispatched.
        if cancel.is_cancelled() {
            break;
        }

        match result {
            Ok(page) => {
                backoff = config.retry_initial;
                let outcome = cursor.absorb(&page.meta);
                let _ = state.send(WatchState::Open);

                if events.send(WatchEvent::Data(page)).is_err() {
                    break;
                }

                if outcome == CursorOutcome::NotWatchable {
                    debug!("resource carries no cursor, closing subscription");
                    break;
                }

                if !config.blocking {
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => break,
                        () = tokio::time::sleep(config.poll_interval) => {}
                    }
                }
            }

            Err(err) if err.is_transient() => {
                warn!(error = %err, retry_in = ?backoff, "watch fetch failed, will retry");
                cursor.clear();
                let _ = state.send(WatchState::Connecting);

                if events.send(WatchEvent::Error(Arc::new(err))).is_err() {
                    break;
                }

                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(backoff) => {}
                }
                backoff = (backoff * 2).min(config.retry_max);
            }

            // HTTP-status failures (403, 404, 500, ...) are terminal for
            // the subscription; the caller decides what they mean.
            Err(err) => {
                debug!(error = %err, "watch fetch rejected, closing subscription");
                let _ = events.send(WatchEvent::Error(Arc::new(err)));
                break;
            }
        }
    }

    let _ = state.send(WatchState::Closed);
}

// ── Handle ───────────────────────────────────────────────────────────

/// Client-side handle for one open watch loop.
///
/// Dropping the handle closes the subscription.
pub struct WatchHandle<T> {
    events: mpsc::UnboundedReceiver<WatchEvent<T>>,
    state: watch::Receiver<WatchState>,
    cancel: CancellationToken,
    task: tokio::task::JoinHandle<()>,
}

impl<T> WatchHandle<T> {
    /// Await the next dispatched event. Returns `None` once the
    /// subscription has closed and the buffer is drained.
    pub async fn next(&mut self) -> Option<WatchEvent<T>> {
        self.events.recv().await
    }

    /// Stop the loop. Idempotent. An already in-flight fetch is not
    /// aborted, but its result will be discarded.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WatchState {
        *self.state.borrow()
    }

    /// Wait until the loop has fully stopped.
    pub async fn closed(&mut self) {
        while self.state.changed().await.is_ok() {
            if *self.state.borrow() == WatchState::Closed {
                return;
            }
        }
    }

    /// Convert into a `Stream` of events for combinator-style consumers.
    pub fn into_stream(mut self) -> impl futures_core::Stream<Item = WatchEvent<T>> {
        async_stream::stream! {
            while let Some(event) = self.next().await {
                yield event;
            }
        }
    }
}

impl<T> Drop for WatchHandle<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

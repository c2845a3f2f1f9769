//! Progress reporting.
//!
//! Percentages flow from the engine through a [`ProgressTracker`] into a
//! [`ProgressReporter`]. The tracker owns the arithmetic and the ordering
//! rules; reporters only deliver.
//!
//! Within one transfer the reported sequence is non-decreasing and, on
//! success, ends with `100`.

use bridge_traits::dispatch::MainDispatcher;
use bridge_traits::http::{DownloadObserver, DownloadProgress};
use core_async::sync::mpsc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Receives completion percentages in `0..=100`.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, percent: u8);
}

/// Discards everything. Used for transfers that did not ask for progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _percent: u8) {}
}

/// Sending half of a per-request progress channel.
#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: mpsc::UnboundedSender<u8>,
}

/// Receiving half of a progress channel.
#[derive(Debug)]
pub struct ProgressStream {
    rx: mpsc::UnboundedReceiver<u8>,
}

/// Create an isolated progress channel for one transfer.
pub fn progress_channel() -> (ProgressSender, ProgressStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ProgressSender { tx }, ProgressStream { rx })
}

impl ProgressReporter for ProgressSender {
    fn report(&self, percent: u8) {
        // The receiver may have been dropped; progress is best-effort.
        let _ = self.tx.send(percent);
    }
}

impl ProgressStream {
    /// Next percentage, or `None` once the transfer side is gone.
    pub async fn next(&mut self) -> Option<u8> {
        self.rx.recv().await
    }

    /// Everything queued right now, without waiting.
    pub fn drain(&mut self) -> Vec<u8> {
        let mut values = Vec::new();
        while let Ok(percent) = self.rx.try_recv() {
            values.push(percent);
        }
        values
    }
}

type Listener = Arc<dyn Fn(u8) + Send + Sync>;

struct Subscription {
    id: u64,
    listener: Listener,
}

#[derive(Default)]
struct SinkState {
    current: Mutex<Option<Subscription>>,
    next_id: AtomicU64,
}

impl SinkState {
    fn current(&self) -> MutexGuard<'_, Option<Subscription>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn listener_for(&self, id: u64) -> Option<Listener> {
        self.current()
            .as_ref()
            .filter(|s| s.id == id)
            .map(|s| Arc::clone(&s.listener))
    }
}

/// Proof of a [`ProgressSink`] subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    id: u64,
}

impl SubscriptionHandle {
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Shared single-subscriber progress channel.
///
/// At most one listener is live. Subscribing replaces the previous
/// listener; emitting without a listener does nothing. Listeners always run
/// through the [`MainDispatcher`], and a listener is never invoked once its
/// subscription has been replaced or cancelled, even for values already
/// queued on the dispatcher.
///
/// Concurrent transfers reporting into the same sink interleave their
/// values; use a per-request [`progress_channel`] to keep them apart.
#[derive(Clone)]
pub struct ProgressSink {
    state: Arc<SinkState>,
    dispatcher: Arc<dyn MainDispatcher>,
}

impl std::fmt::Debug for ProgressSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressSink")
            .field("has_subscriber", &self.has_subscriber())
            .finish()
    }
}

impl ProgressSink {
    pub fn new(dispatcher: Arc<dyn MainDispatcher>) -> Self {
        Self {
            state: Arc::new(SinkState::default()),
            dispatcher,
        }
    }

    /// Install `listener` as the only subscriber.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionHandle
    where
        F: Fn(u8) + Send + Sync + 'static,
    {
        let id = self.state.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        *self.state.current() = Some(Subscription {
            id,
            listener: Arc::new(listener),
        });
        tracing::debug!(subscription = id, "Progress listener subscribed");
        SubscriptionHandle { id }
    }

    /// Subscribe with a channel instead of a callback.
    pub fn subscribe_channel(&self) -> (SubscriptionHandle, ProgressStream) {
        let (sender, stream) = progress_channel();
        let handle = self.subscribe(move |percent| sender.report(percent));
        (handle, stream)
    }

    /// Cancel a subscription. Returns `false` for a stale handle, which
    /// leaves the current subscriber in place. Transfers keep running.
    pub fn unsubscribe(&self, handle: &SubscriptionHandle) -> bool {
        let mut current = self.state.current();
        if current.as_ref().is_some_and(|s| s.id == handle.id) {
            *current = None;
            tracing::debug!(subscription = handle.id, "Progress listener removed");
            true
        } else {
            false
        }
    }

    pub fn has_subscriber(&self) -> bool {
        self.state.current().is_some()
    }

    /// Deliver `percent` to the current listener on the primary context.
    pub fn emit(&self, percent: u8) {
        let Some(id) = self.state.current().as_ref().map(|s| s.id) else {
            return;
        };

        let state = Arc::clone(&self.state);
        self.dispatcher.dispatch(Box::new(move || {
            if let Some(listener) = state.listener_for(id) {
                listener(percent);
            }
        }));
    }
}

impl ProgressReporter for ProgressSink {
    fn report(&self, percent: u8) {
        self.emit(percent);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Total {
    /// Not known yet; a push download reports it with its first update.
    Pending,
    Known(u64),
    /// Zero or absent. Only the opening 0 and the final 100 are reported.
    Unknown,
}

#[derive(Debug)]
struct TrackerState {
    total: Total,
    last: Option<u8>,
}

/// Turns byte counts and native fractions into an ordered percentage stream.
///
/// When disabled every call is a no-op, so plain transfers share the same
/// code path and emit nothing.
pub struct ProgressTracker<'a> {
    reporter: &'a dyn ProgressReporter,
    enabled: bool,
    state: Mutex<TrackerState>,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(reporter: &'a dyn ProgressReporter, enabled: bool) -> Self {
        Self {
            reporter,
            enabled,
            state: Mutex::new(TrackerState {
                total: Total::Pending,
                last: None,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fix the total size. `None` or `0` selects the degenerate path and
    /// reports `0` immediately. Only the first call has any effect.
    pub fn begin(&self, total: Option<u64>) {
        if !self.enabled {
            return;
        }
        let mut state = self.state();
        if state.total != Total::Pending {
            return;
        }
        match total {
            Some(total) if total > 0 => state.total = Total::Known(total),
            _ => {
                state.total = Total::Unknown;
                self.raise(&mut state, 0);
            }
        }
    }

    /// Record that `done` bytes have been written in total.
    pub fn advance(&self, done: u64) {
        if !self.enabled {
            return;
        }
        let mut state = self.state();
        if let Total::Known(total) = state.total {
            let percent = (u128::from(done) * 100 / u128::from(total)).min(100) as u8;
            self.raise(&mut state, percent);
        }
    }

    /// Record a completion fraction reported by a native download task.
    pub fn advance_fraction(&self, fraction: f64) {
        if !self.enabled || !fraction.is_finite() {
            return;
        }
        let percent = (fraction.clamp(0.0, 1.0) * 100.0).floor() as u8;
        let mut state = self.state();
        self.raise(&mut state, percent);
    }

    /// Report the terminal `100`. Called once the destination is complete.
    pub fn finish(&self) {
        if !self.enabled {
            return;
        }
        let mut state = self.state();
        state.last = Some(100);
        self.reporter.report(100);
    }

    fn raise(&self, state: &mut TrackerState, percent: u8) {
        if state.last.map_or(true, |last| percent > last) {
            state.last = Some(percent);
            self.reporter.report(percent);
        }
    }
}

impl DownloadObserver for ProgressTracker<'_> {
    fn on_progress(&self, progress: DownloadProgress) {
        match progress {
            DownloadProgress::Bytes { received, expected } => {
                self.begin(expected);
                self.advance(received);
            }
            DownloadProgress::Fraction(fraction) => self.advance_fraction(fraction),
        }
    }
}

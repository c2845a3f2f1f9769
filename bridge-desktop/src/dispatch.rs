//! Primary-context dispatchers for desktop hosts.
//!
//! Desktop has no UI thread the core can borrow, so [`QueueDispatcher`]
//! models one: tasks are queued FIFO and drained by a single consumer, either
//! a dedicated thread ([`QueueDispatcher::spawn_thread`]) or an async
//! [`MainLoop`] the host drives itself.

use bridge_traits::dispatch::{MainDispatcher, MainTask};
use std::panic::{catch_unwind, AssertUnwindSafe};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// FIFO dispatcher. Cloning shares the same queue.
#[derive(Debug, Clone)]
pub struct QueueDispatcher {
    tx: mpsc::UnboundedSender<MainTask>,
}

/// Consumer side of a [`QueueDispatcher`].
#[derive(Debug)]
pub struct MainLoop {
    rx: mpsc::UnboundedReceiver<MainTask>,
}

impl QueueDispatcher {
    /// Create a dispatcher and the loop that must drain it.
    pub fn channel() -> (Self, MainLoop) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, MainLoop { rx })
    }

    /// Create a dispatcher drained by a dedicated, named OS thread.
    ///
    /// The thread exits once every clone of the dispatcher is dropped.
    pub fn spawn_thread(name: &str) -> std::io::Result<Self> {
        let (dispatcher, mut main_loop) = Self::channel();
        std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                while let Some(task) = main_loop.rx.blocking_recv() {
                    run_task(task);
                }
                debug!("Main dispatch thread stopped");
            })?;
        Ok(dispatcher)
    }
}

impl MainDispatcher for QueueDispatcher {
    fn dispatch(&self, task: MainTask) {
        if self.tx.send(task).is_err() {
            warn!("Main loop is gone; dropping dispatched task");
        }
    }
}

impl MainLoop {
    /// Run tasks until every dispatcher handle is dropped.
    pub async fn run(mut self) {
        while let Some(task) = self.rx.recv().await {
            run_task(task);
        }
    }

    /// Run the tasks already queued, without waiting. Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            run_task(task);
            ran += 1;
        }
        ran
    }
}

fn run_task(task: MainTask) {
    if catch_unwind(AssertUnwindSafe(task)).is_err() {
        warn!("Dispatched task panicked");
    }
}

/// Runs every task immediately on the calling thread.
///
/// For hosts without a distinguished primary context, and for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineDispatcher;

impl MainDispatcher for InlineDispatcher {
    fn dispatch(&self, task: MainTask) {
        run_task(task);
    }
}

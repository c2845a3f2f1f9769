use crate::error::Result as CoreResult;
use crate::method::{BridgeMethod, Invocation, MethodCall, MethodResult};
use bridge_traits::{FileSystemAccess, MainDispatcher};
use core_async::sync::Semaphore;
use core_async::task::{self, JoinError, JoinHandle};
use core_runtime::config::{CoreConfig, TransferSettings};
use core_runtime::events::{EventBus, EventStream};
use core_transfer::{
    progress_channel, NoProgress, ProgressReporter, ProgressSink, ProgressStream, Result,
    TransferEngine, TransferError, TransferOutcome, TransferRequest,
};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

struct Inner {
    engine: TransferEngine,
    file_system: Arc<dyn FileSystemAccess>,
    dispatcher: Arc<dyn MainDispatcher>,
    progress: ProgressSink,
    permits: Arc<Semaphore>,
    events: EventBus,
}

/// Primary façade exposed to host applications.
///
/// Every transfer runs on its own task; at most
/// `max_concurrent_transfers` run at once and the rest wait for a slot.
/// Cloning is cheap and clones share the engine, the concurrency limit and
/// the shared progress sink.
#[derive(Clone)]
pub struct CoreService {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for CoreService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreService")
            .field("available_slots", &self.inner.permits.available_permits())
            .field("progress", &self.inner.progress)
            .finish()
    }
}

/// A transfer started with [`CoreService::submit`].
///
/// Progress arrives on a stream owned by this handle alone, so concurrent
/// transfers never see each other's values.
pub struct TransferHandle {
    progress: ProgressStream,
    join: JoinHandle<Result<TransferOutcome>>,
}

impl TransferHandle {
    pub fn progress(&mut self) -> &mut ProgressStream {
        &mut self.progress
    }

    /// Wait for the transfer to finish.
    pub async fn wait(self) -> Result<TransferOutcome> {
        joined(self.join.await)
    }

    /// Wait for the transfer and collect every progress value it reported.
    pub async fn wait_with_progress(mut self) -> (Result<TransferOutcome>, Vec<u8>) {
        let result = joined(self.join.await);
        (result, self.progress.drain())
    }
}

fn joined(result: std::result::Result<Result<TransferOutcome>, JoinError>) -> Result<TransferOutcome> {
    result.unwrap_or_else(|err| {
        let reason = if err.is_panic() {
            "transfer task panicked"
        } else {
            "transfer task was cancelled"
        };
        warn!(error = %err, "Transfer task did not complete");
        Err(TransferError::Unknown(reason.to_string()))
    })
}

impl CoreService {
    pub fn new(config: CoreConfig) -> Self {
        let events = EventBus::new(config.transfer.event_buffer_size);
        let engine = TransferEngine::new(&config).with_event_bus(events.clone());

        info!(
            max_concurrent = config.transfer.max_concurrent_transfers,
            chunk_size = config.transfer.chunk_size,
            "Core service ready"
        );

        Self {
            inner: Arc::new(Inner {
                engine,
                file_system: Arc::clone(&config.file_system),
                progress: ProgressSink::new(Arc::clone(&config.dispatcher)),
                dispatcher: config.dispatcher,
                permits: Arc::new(Semaphore::new(config.transfer.max_concurrent_transfers)),
                events,
            }),
        }
    }

    /// Build a service from a configured builder.
    pub fn from_builder(builder: core_runtime::config::CoreConfigBuilder) -> CoreResult<Self> {
        Ok(Self::new(builder.build()?))
    }

    pub fn settings(&self) -> &TransferSettings {
        self.inner.engine.settings()
    }

    /// The shared sink progress-reporting method calls report into.
    pub fn progress_sink(&self) -> &ProgressSink {
        &self.inner.progress
    }

    /// Subscribe to transfer lifecycle events.
    pub fn events(&self) -> EventStream {
        EventStream::new(self.inner.events.subscribe())
    }

    /// Start `request` with a progress stream of its own.
    pub fn submit(&self, request: TransferRequest) -> TransferHandle {
        let (sender, progress) = progress_channel();
        let join = self.spawn_transfer(request, Arc::new(sender));
        TransferHandle { progress, join }
    }

    /// Run `request`, reporting progress into the shared sink when the
    /// request asked for it.
    pub async fn transfer(&self, request: TransferRequest) -> Result<TransferOutcome> {
        let reporter: Arc<dyn ProgressReporter> = if request.report_progress() {
            Arc::new(self.inner.progress.clone())
        } else {
            Arc::new(NoProgress)
        };
        joined(self.spawn_transfer(request, reporter).await)
    }

    pub async fn file_exists(&self, path: impl AsRef<Path>) -> Result<bool> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(TransferError::InvalidArgument("target path is empty".into()));
        }
        Ok(self.inner.file_system.exists(path).await?)
    }

    /// Run one method call to completion.
    pub async fn invoke(&self, call: MethodCall) -> MethodResult {
        let method = match call.method.parse::<BridgeMethod>() {
            Ok(method) => method,
            Err(unknown) => {
                debug!(error = %unknown, "Method not implemented");
                return MethodResult::NotImplemented;
            }
        };
        debug!(%method, "Method call received");

        let invocation = match method.invocation(&call.arguments) {
            Ok(invocation) => invocation,
            Err(err) => return err.into(),
        };

        match invocation {
            Invocation::FileExists(path) => match self.file_exists(&path).await {
                Ok(exists) => MethodResult::Success(Value::Bool(exists)),
                Err(err) => err.into(),
            },
            Invocation::Transfer(request) => match self.transfer(request).await {
                Ok(_) => MethodResult::Success(Value::Null),
                Err(err) => err.into(),
            },
        }
    }

    /// Run `call` in the background and hand the result to `reply` on the
    /// host's primary context.
    ///
    /// Must be called from within a runtime.
    pub fn handle<F>(&self, call: MethodCall, reply: F) -> JoinHandle<()>
    where
        F: FnOnce(MethodResult) + Send + 'static,
    {
        let service = self.clone();
        task::spawn(async move {
            let result = service.invoke(call).await;
            service
                .inner
                .dispatcher
                .dispatch(Box::new(move || reply(result)));
        })
    }

    fn spawn_transfer(
        &self,
        request: TransferRequest,
        reporter: Arc<dyn ProgressReporter>,
    ) -> JoinHandle<Result<TransferOutcome>> {
        let engine = self.inner.engine.clone();
        let permits = Arc::clone(&self.inner.permits);

        task::spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|_| TransferError::Unknown("transfer queue is closed".into()))?;
            engine.execute(&request, reporter.as_ref()).await
        })
    }
}

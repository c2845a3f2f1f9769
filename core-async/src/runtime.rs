//! Runtime utilities that abstract over the underlying executor.

use std::io;

use tokio::runtime::Builder;

/// Runs the provided future to completion on a fresh current-thread runtime.
///
/// Intended for synchronous host entry points such as the logging sink
/// forwarder thread. Must not be called from inside an async context.
///
/// Returns an error if the runtime cannot be built.
pub fn block_on<F>(future: F) -> io::Result<F::Output>
where
    F: std::future::Future,
{
    let runtime = Builder::new_current_thread().enable_all().build()?;
    Ok(runtime.block_on(future))
}

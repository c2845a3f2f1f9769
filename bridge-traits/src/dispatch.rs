//! Primary Context Dispatch
//!
//! Host UI toolkits expect callbacks (progress listeners, method results) on
//! their primary thread. Work produced on transfer tasks is handed to a
//! [`MainDispatcher`], which runs it on that context.

/// A unit of work to run on the host's primary context.
pub type MainTask = Box<dyn FnOnce() + Send + 'static>;

/// Schedules work onto the host's primary execution context.
///
/// Implementations must run tasks in submission order; progress ordering
/// within a transfer relies on it.
pub trait MainDispatcher: Send + Sync {
    fn dispatch(&self, task: MainTask);
}

impl<F> MainDispatcher for F
where
    F: Fn(MainTask) + Send + Sync,
{
    fn dispatch(&self, task: MainTask) {
        self(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_closure_dispatcher_runs_task() {
        let ran = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = |task: MainTask| task();

        for value in [1, 2, 3] {
            let ran = ran.clone();
            dispatcher.dispatch(Box::new(move || ran.lock().unwrap().push(value)));
        }

        assert_eq!(*ran.lock().unwrap(), vec![1, 2, 3]);
    }
}

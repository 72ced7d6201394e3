//! Failure handlers.
//!
//! Operations that report through a handler never return an error to their
//! caller. The handler decides what a failure means: terminate, log, or
//! record it for later inspection.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::error::RunError;

/// Receives every failure reported by a [`Runner`](crate::Runner).
pub trait FailureHandler: Send + Sync {
    /// Handle one failure. May not return.
    fn fail(&self, err: RunError);
}

impl<F> FailureHandler for F
where
    F: Fn(RunError) + Send + Sync,
{
    fn fail(&self, err: RunError) {
        self(err)
    }
}

/// Default handler: log the error and terminate the process with status 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExitOnFailure;

impl FailureHandler for ExitOnFailure {
    fn fail(&self, err: RunError) {
        tracing::error!(error = %err, "command failed, exiting");
        if needs_stderr_fallback() {
            eprintln!("{}", err);
        }
        std::process::exit(1);
    }
}

/// Without a subscriber the `error!` event goes nowhere.
fn needs_stderr_fallback() -> bool {
    !tracing::dispatcher::has_been_set()
}

/// Handler that records failures instead of terminating.
#[derive(Debug, Default)]
pub struct CollectFailures {
    errors: Mutex<Vec<RunError>>,
}

impl CollectFailures {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of failures recorded so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no failure has been recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Message of the most recent failure.
    pub fn last_message(&self) -> Option<String> {
        self.lock().last().map(ToString::to_string)
    }

    /// Messages of all recorded failures, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.lock().iter().map(ToString::to_string).collect()
    }

    /// Remove and return all recorded failures.
    pub fn take(&self) -> Vec<RunError> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<RunError>> {
        self.errors.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FailureHandler for CollectFailures {
    fn fail(&self, err: RunError) {
        tracing::debug!(error = %err, "failure recorded");
        self.lock().push(err);
    }
}

static GLOBAL_HANDLER: RwLock<Option<Arc<dyn FailureHandler>>> = RwLock::new(None);

/// Replace the process-wide failure handler used by the free functions.
///
/// Takes effect for failures reported after this call returns.
pub fn set_failure_handler(handler: Arc<dyn FailureHandler>) {
    *GLOBAL_HANDLER
        .write()
        .unwrap_or_else(PoisonError::into_inner) = Some(handler);
}

/// Restore [`ExitOnFailure`] as the process-wide failure handler.
pub fn reset_failure_handler() {
    *GLOBAL_HANDLER
        .write()
        .unwrap_or_else(PoisonError::into_inner) = None;
}

/// The process-wide failure handler currently in force.
pub fn failure_handler() -> Arc<dyn FailureHandler> {
    GLOBAL_HANDLER
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .unwrap_or_else(|| Arc::new(ExitOnFailure))
}

/// Forwards to whatever global handler is installed when a failure happens.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct GlobalHandler;

impl FailureHandler for GlobalHandler {
    fn fail(&self, err: RunError) {
        failure_handler().fail(err);
    }
}

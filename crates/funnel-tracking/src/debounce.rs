//! Trailing-edge debounce on tokio timers.
//!
//! Each call replaces whatever call is still waiting, so a burst of calls
//! closer together than `wait` runs the wrapped function once, with the
//! arguments of the last call.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// A debounced wrapper around `Fn(A)`.
///
/// The pending timer is private to this value. Dropping it cancels any call
/// that has not fired yet.
pub struct Debounced<A> {
    func: Arc<dyn Fn(A) + Send + Sync>,
    wait: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

/// Wrap `func` so that it only runs once `wait` has passed without another call.
pub fn debounce<A, F>(func: F, wait: Duration) -> Debounced<A>
where
    A: Send + 'static,
    F: Fn(A) + Send + Sync + 'static,
{
    Debounced {
        func: Arc::new(func),
        wait,
        pending: Mutex::new(None),
    }
}

impl<A: Send + 'static> Debounced<A> {
    /// Schedule `func(args)` after `wait`, discarding any pending call.
    ///
    /// Outside a tokio runtime there is no timer to schedule on, so the call
    /// runs immediately.
    pub fn call(&self, args: A) {
        let mut pending = self.lock_pending();
        if let Some(previous) = pending.take() {
            previous.abort();
        }

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                drop(pending);
                tracing::debug!("No tokio runtime, debounced call runs inline");
                (self.func)(args);
                return;
            }
        };

        let func = Arc::clone(&self.func);
        let deadline = Instant::now() + self.wait;
        *pending = Some(handle.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            func(args);
        }));
    }

    /// Drop the pending call, if any.
    pub fn cancel(&self) {
        if let Some(previous) = self.lock_pending().take() {
            previous.abort();
        }
    }

    /// Whether a call is scheduled and has not fired yet.
    pub fn is_pending(&self) -> bool {
        self.lock_pending()
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<A> Drop for Debounced<A> {
    fn drop(&mut self) {
        let pending = match self.pending.get_mut() {
            Ok(pending) => pending,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }
}

impl<A> fmt::Debug for Debounced<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debounced").field("wait", &self.wait).finish()
    }
}

//! Cancellation for blocking dialog calls.
//!
//! A [`CancelToken`] fires either when [`CancelToken::cancel`] is called or
//! when its deadline passes. Backends use [`CancelToken::watch`] to run a
//! close action from a second thread while the dialog blocks the caller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::error::Error;

#[derive(Debug, Default)]
struct Shared {
    canceled: Mutex<bool>,
    cond: Condvar,
}

/// Cloneable cancellation signal with an optional deadline.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    shared: Arc<Shared>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self { shared: Arc::default(), deadline: Some(deadline) }
    }

    /// Derives a token that shares this one's cancel flag but carries an
    /// earlier deadline when `timeout` would expire first.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(existing) if existing <= candidate => existing,
            _ => candidate,
        };
        Self { shared: Arc::clone(&self.shared), deadline: Some(deadline) }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        let mut canceled = self.lock();
        *canceled = true;
        self.shared.cond.notify_all();
    }

    /// Returns the error the token stands for once it has fired.
    pub fn error(&self) -> Option<Error> {
        if *self.lock() {
            return Some(Error::ContextCanceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Error::DeadlineExceeded),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.error().is_some()
    }

    /// `Err` with the token's error once it has fired.
    pub fn check(&self) -> Result<(), Error> {
        match self.error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Blocks until the token fires or `timeout` elapses. Returns true if fired.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let until = Instant::now() + timeout;
        let mut canceled = self.lock();
        loop {
            if *canceled {
                return true;
            }
            let now = Instant::now();
            if self.deadline.is_some_and(|d| now >= d) {
                return true;
            }
            if now >= until {
                return false;
            }
            let mut wake = until;
            if let Some(deadline) = self.deadline {
                wake = wake.min(deadline);
            }
            canceled = self
                .shared
                .cond
                .wait_timeout(canceled, wake - now)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|poisoned| poisoned.into_inner().0);
        }
    }

    /// Runs `on_fire` on a background thread as soon as the token fires.
    /// Dropping the returned guard stops watching; `on_fire` then never runs.
    pub fn watch<F>(&self, on_fire: F) -> WatchGuard
    where
        F: FnOnce() + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let token = self.clone();
        let thread_stop = Arc::clone(&stop);
        let handle = std::thread::spawn(move || {
            if token.wait_until_fired_or(&thread_stop) {
                on_fire();
            }
        });
        WatchGuard { token: self.clone(), stop, handle: Some(handle) }
    }

    fn wait_until_fired_or(&self, stop: &AtomicBool) -> bool {
        let mut canceled = self.lock();
        loop {
            if *canceled || self.deadline.is_some_and(|d| Instant::now() >= d) {
                return true;
            }
            if stop.load(Ordering::Acquire) {
                return false;
            }
            canceled = match self.deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    self.shared
                        .cond
                        .wait_timeout(canceled, deadline.saturating_duration_since(now))
                        .map(|(guard, _)| guard)
                        .unwrap_or_else(|poisoned| poisoned.into_inner().0)
                }
                None => self
                    .shared
                    .cond
                    .wait(canceled)
                    .unwrap_or_else(|poisoned| poisoned.into_inner()),
            };
        }
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        self.shared.canceled.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Stops the watcher thread started by [`CancelToken::watch`] on drop.
pub struct WatchGuard {
    token: CancelToken,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Drop for WatchGuard {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        {
            // Taking the lock orders the store before the watcher's next check.
            let _guard = self.token.lock();
            self.token.shared.cond.notify_all();
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

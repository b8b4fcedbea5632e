//! Call scopes
//!
//! A [`CallScope`] bounds one accessor call in time and lets it be cancelled.
//! The call that acquires the scope owns it; transports receive a
//! [`ScopeHandle`] and must run their remote work through
//! [`ScopeHandle::run`]. Dropping the owning scope cancels every handle, so
//! nothing started on behalf of the call outlives it.

use crate::error::{Error, Result};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

/// Default upper bound for a single accessor call
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Longest span a scope deadline is set ahead; longer timeouts are capped
const MAX_DEADLINE: Duration = Duration::from_secs(86400 * 365 * 30);

struct ScopeState {
    deadline: Instant,
    timeout: Duration,
    cancelled: AtomicBool,
    notify: Notify,
}

/// Owning, deadline-bounded scope of one call
pub struct CallScope {
    handle: ScopeHandle,
}

impl CallScope {
    /// Scope that expires `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout.min(MAX_DEADLINE), timeout)
    }

    /// Scope with an explicit deadline; `timeout` is reported in
    /// [`Error::DeadlineExceeded`]
    pub fn with_deadline(deadline: Instant, timeout: Duration) -> Self {
        Self {
            handle: ScopeHandle {
                state: Arc::new(ScopeState {
                    deadline,
                    timeout,
                    cancelled: AtomicBool::new(false),
                    notify: Notify::new(),
                }),
            },
        }
    }

    /// Handle passed down into remote calls
    pub fn handle(&self) -> ScopeHandle {
        self.handle.clone()
    }
}

impl std::ops::Deref for CallScope {
    type Target = ScopeHandle;

    fn deref(&self) -> &ScopeHandle {
        &self.handle
    }
}

impl Drop for CallScope {
    fn drop(&mut self) {
        self.handle.cancel();
    }
}

/// Shared view of a [`CallScope`]
#[derive(Clone)]
pub struct ScopeHandle {
    state: Arc<ScopeState>,
}

impl ScopeHandle {
    pub fn deadline(&self) -> Instant {
        self.state.deadline
    }

    /// Time left before the deadline, zero once expired
    pub fn remaining(&self) -> Duration {
        self.state.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.state.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::Acquire)
    }

    /// Cancel the scope; in-flight [`run`](Self::run) calls return
    /// [`Error::Cancelled`]
    pub fn cancel(&self) {
        if !self.state.cancelled.swap(true, Ordering::AcqRel) {
            self.state.notify.notify_waiters();
        }
    }

    /// Error the scope would fail a call with right now, if any
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if self.is_expired() {
            return Err(Error::DeadlineExceeded(self.state.timeout));
        }
        Ok(())
    }

    /// Drive `fut` to completion unless the scope expires or is cancelled
    /// first. An already finished scope never polls `fut`.
    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check()?;

        tokio::select! {
            biased;
            _ = self.cancelled() => Err(Error::Cancelled),
            _ = tokio::time::sleep_until(self.state.deadline) => {
                Err(Error::DeadlineExceeded(self.state.timeout))
            }
            result = fut => result,
        }
    }

    /// Sleep for `duration`, cut short by the scope
    pub async fn sleep(&self, duration: Duration) -> Result<()> {
        self.run(async {
            tokio::time::sleep(duration).await;
            Ok(())
        })
        .await
    }

    async fn cancelled(&self) {
        loop {
            let notified = self.state.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Source of call scopes for accessor calls
pub trait CallScopeProvider: Send + Sync {
    fn acquire(&self) -> CallScope;
}

/// Provider handing out scopes with a fixed timeout
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeout {
    timeout: Duration,
}

impl FixedTimeout {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for FixedTimeout {
    fn default() -> Self {
        Self::new(DEFAULT_CALL_TIMEOUT)
    }
}

impl CallScopeProvider for FixedTimeout {
    fn acquire(&self) -> CallScope {
        CallScope::with_timeout(self.timeout)
    }
}

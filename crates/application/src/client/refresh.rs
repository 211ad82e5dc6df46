//! Single-flight bookkeeping for token refresh.
//!
//! The first caller to [`RefreshState::join`] becomes the leader and performs
//! the refresh; everyone arriving while it runs gets a receiver for the
//! leader's outcome. The leader's [`InFlight`] guard resets the state when it
//! is dropped, whether or not it settled.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

use crate::error::ApiError;

pub(crate) type Outcome = Result<String, ApiError>;

#[derive(Debug, Default)]
struct Inner {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<Outcome>>,
}

/// Whether a refresh is running and who is waiting on it.
#[derive(Debug, Default)]
pub(crate) struct RefreshState {
    inner: Mutex<Inner>,
}

/// What a caller of [`RefreshState::join`] has to do.
pub(crate) enum Role<'a> {
    /// Perform the refresh and settle the guard.
    Leader(InFlight<'a>),
    /// Await the leader's outcome.
    Waiter(oneshot::Receiver<Outcome>),
}

impl RefreshState {
    /// Becomes the leader, or queues behind the refresh already running.
    ///
    /// The flag is checked and set under the same lock.
    pub(crate) fn join(&self) -> Role<'_> {
        let mut inner = self.lock();
        if inner.in_flight {
            let (sender, receiver) = oneshot::channel();
            inner.waiters.push(sender);
            Role::Waiter(receiver)
        } else {
            inner.in_flight = true;
            Role::Leader(InFlight {
                state: self,
                outcome: None,
            })
        }
    }

    #[cfg(test)]
    pub(crate) fn is_in_flight(&self) -> bool {
        self.lock().in_flight
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Held by the leader while its refresh runs.
pub(crate) struct InFlight<'a> {
    state: &'a RefreshState,
    outcome: Option<Outcome>,
}

impl InFlight<'_> {
    /// Hands `outcome` to every waiter and clears the in-flight flag.
    pub(crate) fn settle(mut self, outcome: Outcome) {
        self.outcome = Some(outcome);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let waiters = {
            let mut inner = self.state.lock();
            inner.in_flight = false;
            std::mem::take(&mut inner.waiters)
        };
        // Without an outcome the senders are dropped and waiters see a closed channel.
        if let Some(outcome) = self.outcome.take() {
            for waiter in waiters {
                let _ = waiter.send(outcome.clone());
            }
        }
    }
}

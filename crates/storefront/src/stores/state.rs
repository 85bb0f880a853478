//! Snapshot state shared by the cart and wishlist stores.
//!
//! Every call takes a ticket from a per-store sequence before it sends its
//! request. A response is applied only if no response with a newer ticket
//! has been applied yet, so a slow reply can never overwrite a fresher one.
//! [`StoreCell::reset`] starts a new epoch; tickets from an older epoch are
//! discarded whatever their sequence number.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;

/// Lifecycle of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreStatus {
    /// Nothing fetched yet, or reset by logout.
    #[default]
    Idle,
    /// At least one call is in flight.
    Loading,
    /// The last settled call succeeded.
    Ready,
    /// The last settled call failed; the snapshot is the previous one.
    Error,
}

/// Point-in-time copy of a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSnapshot<T> {
    /// Last server-confirmed value. `None` before the first fetch and after
    /// `clear`.
    pub data: Option<T>,
    pub status: StoreStatus,
    /// Message of the most recent failure, until a newer call succeeds.
    pub error: Option<String>,
}

impl<T> StoreSnapshot<T> {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status == StoreStatus::Loading
    }
}

/// What happened to one store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOutcome {
    /// The response replaced the snapshot.
    Applied,
    /// A newer response had already been applied, or the store was reset.
    Stale,
    /// The call failed; the message is also kept in the store.
    Failed(String),
    /// The session ended while the call was in flight.
    Cancelled,
    /// No session; nothing was sent.
    Skipped,
}

impl StoreOutcome {
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

// =============================================================================
// StoreCell
// =============================================================================

pub(crate) struct StoreCell<T> {
    state: Mutex<CellState<T>>,
}

struct CellState<T> {
    data: Option<T>,
    error: Option<String>,
    settled: StoreStatus,
    in_flight: usize,
    next_seq: u64,
    applied_seq: u64,
    error_seq: u64,
    epoch: u64,
}

impl<T> CellState<T> {
    fn status(&self) -> StoreStatus {
        if self.in_flight > 0 {
            StoreStatus::Loading
        } else {
            self.settled
        }
    }
}

impl<T: Clone> StoreCell<T> {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(CellState {
                data: None,
                error: None,
                settled: StoreStatus::Idle,
                in_flight: 0,
                next_seq: 0,
                applied_seq: 0,
                error_seq: 0,
                epoch: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CellState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn snapshot(&self) -> StoreSnapshot<T> {
        let state = self.lock();
        StoreSnapshot {
            data: state.data.clone(),
            status: state.status(),
            error: state.error.clone(),
        }
    }

    /// Read the current data without cloning all of it.
    pub(crate) fn with_data<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        f(self.lock().data.as_ref())
    }

    /// Take a ticket and mark a call in flight.
    pub(crate) fn begin(&self) -> InFlight<'_, T> {
        let mut state = self.lock();
        state.in_flight += 1;
        state.next_seq += 1;
        InFlight {
            cell: self,
            seq: state.next_seq,
            epoch: state.epoch,
            settled: false,
        }
    }

    /// Drop everything and go back to `Idle`. Calls in flight become stale.
    pub(crate) fn reset(&self) {
        let mut state = self.lock();
        state.epoch += 1;
        state.data = None;
        state.error = None;
        state.settled = StoreStatus::Idle;
        state.in_flight = 0;
        state.applied_seq = state.next_seq;
        state.error_seq = state.next_seq;
    }

    /// Run `request` under a ticket, racing it against `cancel`.
    ///
    /// `Ok(data)` replaces the snapshot (`Ok(None)` empties it); `Err` keeps
    /// the snapshot and records the message.
    pub(crate) async fn run<F>(&self, cancel: &CancellationToken, request: F) -> StoreOutcome
    where
        F: Future<Output = Result<Option<T>, String>>,
    {
        let ticket = self.begin();
        tokio::select! {
            biased;
            () = cancel.cancelled() => ticket.cancel(),
            result = request => ticket.finish(result),
        }
    }
}

/// A call in flight. Dropping it without finishing releases the slot.
pub(crate) struct InFlight<'a, T: Clone> {
    cell: &'a StoreCell<T>,
    seq: u64,
    epoch: u64,
    settled: bool,
}

impl<T: Clone> InFlight<'_, T> {
    pub(crate) fn finish(mut self, result: Result<Option<T>, String>) -> StoreOutcome {
        self.settled = true;
        let mut state = self.cell.lock();

        if state.epoch != self.epoch {
            return StoreOutcome::Stale;
        }
        state.in_flight = state.in_flight.saturating_sub(1);

        match result {
            Ok(data) if self.seq > state.applied_seq => {
                state.data = data;
                state.applied_seq = self.seq;
                if state.error_seq < self.seq {
                    state.error = None;
                    state.settled = StoreStatus::Ready;
                }
                StoreOutcome::Applied
            }
            Ok(_) => StoreOutcome::Stale,
            Err(message) => {
                if self.seq > state.applied_seq && self.seq > state.error_seq {
                    state.error = Some(message.clone());
                    state.error_seq = self.seq;
                    state.settled = StoreStatus::Error;
                }
                StoreOutcome::Failed(message)
            }
        }
    }

    pub(crate) fn cancel(mut self) -> StoreOutcome {
        self.settled = true;
        self.release();
        StoreOutcome::Cancelled
    }

    fn release(&self) {
        let mut state = self.cell.lock();
        if state.epoch == self.epoch {
            state.in_flight = state.in_flight.saturating_sub(1);
        }
    }
}

impl<T: Clone> Drop for InFlight<'_, T> {
    fn drop(&mut self) {
        if !self.settled {
            self.release();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_idle() {
        let cell = StoreCell::<u32>::new();
        let snapshot = cell.snapshot();
        assert_eq!(snapshot.status, StoreStatus::Idle);
        assert!(snapshot.data.is_none());
        assert!(snapshot.error.is_none());
    }

    #[test]
    fn test_loading_until_last_call_settles() {
        let cell = StoreCell::<u32>::new();
        let first = cell.begin();
        let second = cell.begin();
        assert!(cell.snapshot().is_loading());

        assert_eq!(second.finish(Ok(Some(2))), StoreOutcome::Applied);
        assert!(cell.snapshot().is_loading());

        first.finish(Ok(Some(1)));
        let snapshot = cell.snapshot();
        assert_eq!(snapshot.status, StoreStatus::Ready);
        assert_eq!(snapshot.data, Some(2));
    }

    #[test]
    fn test_older_response_is_stale() {
        let cell = StoreCell::<u32>::new();
        let older = cell.begin();
        let newer = cell.begin();

        newer.finish(Ok(Some(2)));
        assert_eq!(older.finish(Ok(Some(1))), StoreOutcome::Stale);
        assert_eq!(cell.snapshot().data, Some(2));
    }

    #[test]
    fn test_failure_keeps_snapshot() {
        let cell = StoreCell::<u32>::new();
        cell.begin().finish(Ok(Some(1)));

        let outcome = cell.begin().finish(Err("view cart failed: boom".to_string()));
        assert!(matches!(outcome, StoreOutcome::Failed(_)));

        let snapshot = cell.snapshot();
        assert_eq!(snapshot.status, StoreStatus::Error);
        assert_eq!(snapshot.data, Some(1));
        assert_eq!(snapshot.error.as_deref(), Some("view cart failed: boom"));
    }

    #[test]
    fn test_success_clears_older_error() {
        let cell = StoreCell::<u32>::new();
        cell.begin().finish(Err("boom".to_string()));
        cell.begin().finish(Ok(Some(3)));

        let snapshot = cell.snapshot();
        assert_eq!(snapshot.status, StoreStatus::Ready);
        assert!(snapshot.error.is_none());
    }

    #[test]
    fn test_older_failure_does_not_mask_newer_success() {
        let cell = StoreCell::<u32>::new();
        let older = cell.begin();
        let newer = cell.begin();

        newer.finish(Ok(Some(2)));
        older.finish(Err("late".to_string()));

        let snapshot = cell.snapshot();
        assert_eq!(snapshot.status, StoreStatus::Ready);
        assert!(snapshot.error.is_none());
    }

    #[test]
    fn test_reset_discards_in_flight() {
        let cell = StoreCell::<u32>::new();
        cell.begin().finish(Ok(Some(1)));
        let pending = cell.begin();

        cell.reset();
        assert_eq!(cell.snapshot().status, StoreStatus::Idle);

        assert_eq!(pending.finish(Ok(Some(9))), StoreOutcome::Stale);
        let snapshot = cell.snapshot();
        assert_eq!(snapshot.status, StoreStatus::Idle);
        assert!(snapshot.data.is_none());
    }

    #[test]
    fn test_dropped_ticket_releases_loading() {
        let cell = StoreCell::<u32>::new();
        drop(cell.begin());
        assert_eq!(cell.snapshot().status, StoreStatus::Idle);
    }

    #[tokio::test]
    async fn test_run_observes_cancellation() {
        let cell = StoreCell::<u32>::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = cell.run(&cancel, async { Ok(Some(1)) }).await;
        assert_eq!(outcome, StoreOutcome::Cancelled);
        assert!(cell.snapshot().data.is_none());
        assert!(!cell.snapshot().is_loading());
    }
}

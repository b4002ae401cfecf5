//! Fan-in coordinator for the per-cell subscriptions of one query.
//!
//! [`GeoQueryStream`] holds one slot per cell (latest snapshot, or nothing
//! yet) and polls every cell subscription from the consumer's task. The state
//! machine is:
//!
//! ```text
//! AwaitingBarrier --all cells emitted--> Live
//!        |                                 |
//!        +---- cell error ----> Errored <--+
//!        +---- cancel/drop ---> Cancelled <+
//!        +---- cells closed --> Completed <+
//! ```
//!
//! Only one combine cycle runs at a time, and cancellation is checked before
//! every emission, so nothing is delivered once teardown has begun.
//!
//! A caller that cancels (drop, [`GeoQueryStream::cancel`], its own
//! [`cancel_token`](GeoQueryStream::cancel_token)) just sees the stream end.
//! When the engine shuts the query down before any result was produced, the
//! waiting consumer receives one `Err(GeoQueryError::Cancelled)` first.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use futures::stream::{FusedStream, Stream, StreamExt};
use log::{debug, info, warn};
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

use crate::error_handling::{GeoQueryError, StoreError};
use crate::store::{Snapshot, SnapshotStream};

use super::merge::{combine, GeoHit, QueryExecution};
use super::options::{CombineReport, QueryOptions};

/// Lifecycle of a live query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    /// Waiting for the first snapshot of at least one cell
    AwaitingBarrier,
    /// Every cell has emitted; each update produces a new result
    Live,
    /// A cell subscription failed (terminal)
    Errored,
    /// The query was cancelled or dropped (terminal)
    Cancelled,
    /// The cell subscriptions ended (terminal)
    Completed,
}

impl QueryState {
    /// Returns `true` for states that produce no further items.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            QueryState::Errored | QueryState::Cancelled | QueryState::Completed
        )
    }
}

struct CellSlot {
    cell: String,
    subscription: Option<SnapshotStream>,
    latest: Option<Snapshot>,
}

enum SlotPoll {
    Idle,
    Updated { first: bool },
    Failed(StoreError),
}

impl CellSlot {
    /// Drains every ready snapshot, keeping only the newest.
    fn drain(&mut self, cx: &mut Context<'_>) -> SlotPoll {
        let Some(subscription) = self.subscription.as_mut() else {
            return SlotPoll::Idle;
        };

        let first = self.latest.is_none();
        let mut updated = false;
        let mut ended = false;
        loop {
            match subscription.poll_next_unpin(cx) {
                Poll::Ready(Some(Ok(snapshot))) => {
                    self.latest = Some(snapshot);
                    updated = true;
                }
                Poll::Ready(Some(Err(error))) => return SlotPoll::Failed(error),
                Poll::Ready(None) => {
                    ended = true;
                    break;
                }
                Poll::Pending => break,
            }
        }

        if ended {
            debug!("Subscription for cell {} ended", self.cell);
            self.subscription = None;
        }

        if updated {
            SlotPoll::Updated { first }
        } else {
            SlotPoll::Idle
        }
    }
}

/// Live, sorted, annotated results of a proximity query.
///
/// Yields `Ok(hits)` each time the combined result is recomputed, or a single
/// `Err` if a cell subscription fails or the engine shuts down before the
/// first result. Dropping the stream (or calling
/// [`cancel`](GeoQueryStream::cancel)) tears every cell subscription down.
pub struct GeoQueryStream {
    execution: QueryExecution,
    slots: Vec<CellSlot>,
    awaiting: usize,
    state: QueryState,
    shutdown: CancellationToken,
    cancel: CancellationToken,
    cancelled: Pin<Box<WaitForCancellationFutureOwned>>,
    options: QueryOptions,
    cycles: u64,
}

impl GeoQueryStream {
    pub(crate) fn new(
        execution: QueryExecution,
        subscriptions: Vec<(String, SnapshotStream)>,
        shutdown: &CancellationToken,
        options: QueryOptions,
    ) -> Self {
        let cancel = shutdown.child_token();
        let slots: Vec<CellSlot> = subscriptions
            .into_iter()
            .map(|(cell, subscription)| CellSlot {
                cell,
                subscription: Some(subscription),
                latest: None,
            })
            .collect();

        GeoQueryStream {
            execution,
            awaiting: slots.len(),
            slots,
            state: QueryState::AwaitingBarrier,
            shutdown: shutdown.clone(),
            cancelled: Box::pin(cancel.clone().cancelled_owned()),
            cancel,
            options,
            cycles: 0,
        }
    }

    /// Parameters of this query (cells, precision, buffered radius).
    pub fn execution(&self) -> &QueryExecution {
        &self.execution
    }

    /// Current lifecycle state.
    pub fn state(&self) -> QueryState {
        self.state
    }

    /// Number of cell subscriptions still open.
    pub fn open_subscriptions(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.subscription.is_some())
            .count()
    }

    /// Token that cancels this query from elsewhere.
    ///
    /// Cancelling it wakes the consumer; the next poll tears the cell
    /// subscriptions down and ends the stream without emitting.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancels the query and tears every cell subscription down now.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        self.teardown(QueryState::Cancelled);
    }

    /// Moves to a terminal state, dropping each open subscription once.
    fn teardown(&mut self, state: QueryState) {
        if self.state.is_terminal() {
            return;
        }
        let released = self
            .slots
            .iter_mut()
            .filter_map(|slot| slot.subscription.take())
            .count();
        self.state = state;
        self.cancel.cancel();

        if self.options.log {
            info!(
                "Query complete ({:?}) after {} cycles, released {} cell subscriptions",
                state, self.cycles, released
            );
        } else {
            debug!(
                "Query complete ({:?}) after {} cycles, released {} cell subscriptions",
                state, self.cycles, released
            );
        }
    }

    /// Tears down after a cancellation was observed.
    ///
    /// Yields `Cancelled` only when the engine (not the caller) stopped the
    /// query and no result was ever produced.
    fn finish_cancelled(&mut self) -> Option<Result<Vec<GeoHit>, GeoQueryError>> {
        let engine_stopped = self.shutdown.is_cancelled() && self.cycles == 0;
        self.teardown(QueryState::Cancelled);
        engine_stopped.then_some(Err(GeoQueryError::Cancelled))
    }

    fn run_combine(&mut self) -> Vec<GeoHit> {
        let cycle_start = Instant::now();
        let combined = combine(
            &self.execution,
            self.slots.iter().filter_map(|slot| slot.latest.as_ref()),
        );
        self.cycles += 1;

        if self.options.reports_enabled() {
            let report = CombineReport {
                cycle: self.cycles,
                center: self.execution.center.geopoint,
                radius: self.execution.radius,
                cells: self.slots.len(),
                hits: combined.total,
                within_radius: combined.hits.len(),
                elapsed: self.execution.started.elapsed(),
                cycle_time: cycle_start.elapsed(),
            };
            match &self.options.diagnostics {
                Some(hook) => hook(&report),
                None => info!(
                    "Geo query center ({}, {}) radius {} km: {} cells, {} hits, {} within radius, {} ms elapsed",
                    report.center.latitude,
                    report.center.longitude,
                    report.radius,
                    report.cells,
                    report.hits,
                    report.within_radius,
                    report.elapsed.as_millis()
                ),
            }
        }

        combined.hits
    }
}

impl Stream for GeoQueryStream {
    type Item = Result<Vec<GeoHit>, GeoQueryError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.state.is_terminal() {
            return Poll::Ready(None);
        }
        if this.cancelled.as_mut().poll(cx).is_ready() {
            return Poll::Ready(this.finish_cancelled());
        }

        let mut updated = false;
        let mut failure = None;
        for slot in this.slots.iter_mut() {
            match slot.drain(cx) {
                SlotPoll::Idle => {}
                SlotPoll::Updated { first } => {
                    updated = true;
                    if first {
                        this.awaiting -= 1;
                    }
                }
                SlotPoll::Failed(error) => {
                    warn!("Subscription for cell {} failed: {}", slot.cell, error);
                    failure = Some(error);
                    break;
                }
            }
        }

        if let Some(error) = failure {
            this.teardown(QueryState::Errored);
            return Poll::Ready(Some(Err(GeoQueryError::Store(error))));
        }

        if this.awaiting > 0 {
            let starved = this
                .slots
                .iter()
                .any(|slot| slot.subscription.is_none() && slot.latest.is_none());
            if starved {
                debug!("A cell closed before its first snapshot; no result is possible");
                this.teardown(QueryState::Completed);
                return Poll::Ready(None);
            }
            return Poll::Pending;
        }

        if updated {
            if this.cancel.is_cancelled() {
                return Poll::Ready(this.finish_cancelled());
            }
            this.state = QueryState::Live;
            let hits = this.run_combine();
            return Poll::Ready(Some(Ok(hits)));
        }

        if this.slots.iter().all(|slot| slot.subscription.is_none()) {
            this.teardown(QueryState::Completed);
            return Poll::Ready(None);
        }

        Poll::Pending
    }
}

impl FusedStream for GeoQueryStream {
    fn is_terminated(&self) -> bool {
        self.state.is_terminal()
    }
}

impl Drop for GeoQueryStream {
    fn drop(&mut self) {
        self.teardown(QueryState::Cancelled);
    }
}

//! Client side of the worker protocol with request supersession.
//!
//! Every submission mints a new, strictly increasing request id and makes all
//! earlier ids stale. The worker still finishes stale requests (there is no
//! preemption), but their results are discarded here instead of reaching the
//! caller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use grid_interpolation::Grid;
use overlay_common::{BoundaryGeometry, OverlayError, OverlayResult, Sample};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::protocol::{ComputeRequest, RequestId, WorkerRequest, WorkerResponse};
use crate::worker::{GridWorker, WorkerHandle};

/// Where the submitter is in its request cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitterState {
    Idle,
    RequestSent { request_id: RequestId },
}

/// Handle for one submission. Stays current until the next submit or clear.
#[derive(Debug, Clone)]
pub struct RequestToken {
    id: RequestId,
    latest: Arc<AtomicU64>,
}

impl RequestToken {
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Whether no newer request has been issued since this one.
    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::Acquire) == self.id
    }
}

/// Outcome of matching a worker response against the latest request.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciled {
    /// Result for the latest request; now the accepted grid.
    Accepted(Arc<Grid>),
    /// Result for a superseded request, discarded.
    Stale { request_id: RequestId },
    /// Not a result message.
    Ignored,
}

/// Sends compute requests and keeps only the newest result.
#[derive(Debug)]
pub struct GridSubmitter {
    requests: UnboundedSender<WorkerRequest>,
    responses: UnboundedReceiver<WorkerResponse>,
    latest: Arc<AtomicU64>,
    state: SubmitterState,
    accepted: Option<Arc<Grid>>,
    boundary: Option<Vec<BoundaryGeometry>>,
}

impl GridSubmitter {
    /// Wrap an existing pair of worker channels.
    pub fn from_channels(
        requests: UnboundedSender<WorkerRequest>,
        responses: UnboundedReceiver<WorkerResponse>,
    ) -> Self {
        Self {
            requests,
            responses,
            latest: Arc::new(AtomicU64::new(0)),
            state: SubmitterState::Idle,
            accepted: None,
            boundary: None,
        }
    }

    /// Spawn `worker` and connect a submitter to it.
    pub fn connect(worker: GridWorker) -> (Self, JoinHandle<()>) {
        let WorkerHandle {
            requests,
            responses,
            task,
        } = worker.spawn();
        (Self::from_channels(requests, responses), task)
    }

    /// Send this boundary with every request instead of relying on the worker's.
    pub fn with_boundary(mut self, boundary: Vec<BoundaryGeometry>) -> Self {
        self.boundary = Some(boundary);
        self
    }

    pub fn state(&self) -> SubmitterState {
        self.state
    }

    /// The most recently accepted grid, if any.
    pub fn accepted(&self) -> Option<&Arc<Grid>> {
        self.accepted.as_ref()
    }

    /// Id of the most recently issued request (0 before the first).
    pub fn last_request_id(&self) -> RequestId {
        self.latest.load(Ordering::Acquire)
    }

    /// Issue a compute request, superseding any request still in flight.
    pub fn submit(
        &mut self,
        samples: Vec<Sample>,
        resolution: f64,
        idw_power: f64,
    ) -> OverlayResult<RequestToken> {
        // Published only after the send succeeds.
        let id = self.last_request_id() + 1;
        let request = ComputeRequest {
            request_id: id,
            samples,
            resolution,
            idw_power,
            boundary: self.boundary.clone(),
        };

        self.requests
            .send(WorkerRequest::Compute(request))
            .map_err(|_| OverlayError::WorkerClosed)?;
        self.latest.store(id, Ordering::Release);
        self.state = SubmitterState::RequestSent { request_id: id };
        debug!(request_id = id, "Submitted compute request");

        Ok(RequestToken {
            id,
            latest: Arc::clone(&self.latest),
        })
    }

    /// Forget the current grid without asking the worker for a new one.
    ///
    /// Any request still in flight becomes stale.
    pub fn clear(&mut self) {
        let id = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
        self.state = SubmitterState::Idle;
        self.accepted = None;
        debug!(superseded_by = id, "Cleared accepted grid");
    }

    /// Match a worker response against the latest request id.
    pub fn reconcile(&mut self, response: WorkerResponse) -> Reconciled {
        let WorkerResponse::Result(result) = response else {
            return Reconciled::Ignored;
        };

        let latest = self.last_request_id();
        if result.request_id != latest {
            debug!(
                request_id = result.request_id,
                latest,
                "Discarding stale result"
            );
            return Reconciled::Stale {
                request_id: result.request_id,
            };
        }

        self.state = SubmitterState::Idle;
        self.accepted = Some(Arc::clone(&result.grid));
        debug!(request_id = result.request_id, "Accepted result");
        Reconciled::Accepted(result.grid)
    }

    /// Wait for the next worker message and reconcile it.
    ///
    /// Returns `None` once the worker has shut down.
    pub async fn next_event(&mut self) -> Option<Reconciled> {
        let response = self.responses.recv().await?;
        Some(self.reconcile(response))
    }

    /// Wait until a result for the latest request arrives.
    pub async fn next_accepted(&mut self) -> OverlayResult<Arc<Grid>> {
        loop {
            match self.next_event().await {
                Some(Reconciled::Accepted(grid)) => return Ok(grid),
                Some(_) => continue,
                None => return Err(OverlayError::WorkerClosed),
            }
        }
    }
}

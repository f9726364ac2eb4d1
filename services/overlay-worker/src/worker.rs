//! Grid worker: owns a cache and turns compute requests into grids.
//!
//! The worker drains its inbound channel one request at a time. Each grid
//! computation runs on tokio's blocking pool so the async side never stalls;
//! the worker's state moves into the blocking task and back out with the
//! response, so nothing mutable is shared.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use grid_interpolation::{
    boundary_fingerprint, build_grid, fingerprint, CacheStats, GridCache, GridConfig, IdwOptions,
};
use overlay_common::{BoundaryGeometry, GeoBounds};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::protocol::{ComputeRequest, ComputeResult, WorkerRequest, WorkerResponse};

/// Computes grids for a fixed extent, serving repeats from its cache.
#[derive(Debug)]
pub struct GridWorker {
    bounds: GeoBounds,
    idw: IdwOptions,
    boundary: Option<Arc<Vec<BoundaryGeometry>>>,
    cache: GridCache,
}

impl GridWorker {
    /// Create a worker with an empty cache.
    pub fn new(config: &GridConfig, boundary: Option<Vec<BoundaryGeometry>>) -> Self {
        Self {
            bounds: config.bounds,
            idw: config.idw,
            boundary: boundary.map(Arc::new),
            cache: GridCache::new(config.cache_capacity),
        }
    }

    pub fn bounds(&self) -> &GeoBounds {
        &self.bounds
    }

    pub fn cache(&self) -> &GridCache {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop every cached grid.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Serve one compute request.
    ///
    /// The cache key covers the samples, resolution and power. A request
    /// carrying its own boundary also keys on that boundary's coordinates.
    pub fn compute(&mut self, request: &ComputeRequest) -> ComputeResult {
        let start = Instant::now();
        let mut key = fingerprint(&request.samples, request.resolution, request.idw_power);
        if let Some(boundary) = &request.boundary {
            key.push('-');
            key.push_str(&boundary_fingerprint(boundary));
        }

        let options = IdwOptions {
            power: request.idw_power,
            ..self.idw
        };
        let bounds = self.bounds;
        let boundary = request.boundary.as_deref().or(self.boundary.as_deref().map(Vec::as_slice));

        let (grid, cache_hit) = self.cache.get_or_compute(&key, || {
            build_grid(&bounds, &request.samples, request.resolution, &options, boundary)
        });

        info!(
            request_id = request.request_id,
            samples = request.samples.len(),
            rows = grid.rows(),
            cols = grid.cols(),
            cache_hit,
            cache_entries = self.cache.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Computed grid"
        );

        ComputeResult {
            request_id: request.request_id,
            grid,
        }
    }

    /// Handle any inbound message. Unknown messages produce no response.
    pub fn handle(&mut self, message: &WorkerRequest) -> Option<WorkerResponse> {
        match message {
            WorkerRequest::Compute(request) => Some(WorkerResponse::Result(self.compute(request))),
            WorkerRequest::Unknown => {
                debug!("Ignoring unknown worker message");
                None
            }
        }
    }

    /// Process requests until the inbound channel closes.
    ///
    /// Responses are sent in completion order, which equals receipt order
    /// because requests are handled one at a time.
    pub async fn run(
        mut self,
        mut requests: UnboundedReceiver<WorkerRequest>,
        responses: UnboundedSender<WorkerResponse>,
    ) {
        info!(
            north = self.bounds.north,
            south = self.bounds.south,
            east = self.bounds.east,
            west = self.bounds.west,
            cache_capacity = self.cache.capacity(),
            "Grid worker started"
        );

        while let Some(message) = requests.recv().await {
            if matches!(message, WorkerRequest::Unknown) {
                debug!("Ignoring unknown worker message");
                continue;
            }

            let request_id = message.request_id();

            // The cache is only written after a grid is built, so a panic
            // leaves the worker usable.
            let joined = tokio::task::spawn_blocking(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.handle(&message)));
                (self, outcome)
            })
            .await;

            let response = match joined {
                Ok((worker, outcome)) => {
                    self = worker;
                    match outcome {
                        Ok(response) => response,
                        Err(_) => {
                            error!(request_id, "Grid computation panicked, skipping request");
                            continue;
                        }
                    }
                }
                Err(e) => {
                    error!(error = %e, "Grid computation task was cancelled, stopping worker");
                    return;
                }
            };

            if let Some(response) = response {
                if responses.send(response).is_err() {
                    debug!("Response receiver dropped, stopping worker");
                    break;
                }
            }
        }

        info!(stats = ?self.cache.stats(), "Grid worker stopped");
    }

    /// Spawn the worker on the current runtime.
    pub fn spawn(self) -> WorkerHandle {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (response_tx, response_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(self.run(request_rx, response_tx));

        WorkerHandle {
            requests: request_tx,
            responses: response_rx,
            task,
        }
    }
}

/// Channels and task of a spawned [`GridWorker`].
#[derive(Debug)]
pub struct WorkerHandle {
    pub requests: UnboundedSender<WorkerRequest>,
    pub responses: UnboundedReceiver<WorkerResponse>,
    pub task: JoinHandle<()>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use overlay_common::Sample;

    fn request(id: u64, value: f64) -> ComputeRequest {
        ComputeRequest {
            request_id: id,
            samples: vec![Sample::new(7.0, -1.0, value)],
            resolution: 0.5,
            idw_power: 2.0,
            boundary: None,
        }
    }

    #[test]
    fn test_compute_uses_cache() {
        let mut worker = GridWorker::new(&GridConfig::default(), None);

        let first = worker.compute(&request(1, 30.0));
        let second = worker.compute(&request(2, 30.0));
        assert_eq!(second.request_id, 2);
        assert!(Arc::ptr_eq(&first.grid, &second.grid));

        let stats = worker.cache_stats();
        assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));

        worker.clear_cache();
        assert!(worker.cache().is_empty());
    }

    #[test]
    fn test_request_boundary_overrides_default() {
        let config = GridConfig {
            bounds: GeoBounds::new(10.0, 0.0, 10.0, 0.0),
            ..GridConfig::default()
        };
        let west_half = BoundaryGeometry::polygon(vec![vec![
            [0.0, 0.0],
            [5.0, 0.0],
            [5.0, 10.0],
            [0.0, 10.0],
            [0.0, 0.0],
        ]]);
        let mut worker = GridWorker::new(&config, None);

        let unmasked = worker.compute(&request(1, 1.0));
        assert_eq!(unmasked.grid.inside_count(), unmasked.grid.len());

        let mut masked = request(2, 2.0);
        masked.boundary = Some(vec![west_half]);
        let masked = worker.compute(&masked);
        assert_eq!(masked.grid.inside_count(), masked.grid.len() / 2);
    }

    #[test]
    fn test_same_samples_with_different_boundaries_are_cached_apart() {
        let config = GridConfig {
            bounds: GeoBounds::new(10.0, 0.0, 10.0, 0.0),
            ..GridConfig::default()
        };
        let west_half = BoundaryGeometry::polygon(vec![vec![
            [0.0, 0.0],
            [5.0, 0.0],
            [5.0, 10.0],
            [0.0, 10.0],
            [0.0, 0.0],
        ]]);
        let mut worker = GridWorker::new(&config, None);

        let mut masked = request(1, 1.0);
        masked.boundary = Some(vec![west_half.clone()]);
        let masked = worker.compute(&masked);
        assert_eq!(masked.grid.inside_count(), masked.grid.len() / 2);

        let unmasked = worker.compute(&request(2, 1.0));
        assert_eq!(unmasked.grid.inside_count(), unmasked.grid.len());
        assert!(!Arc::ptr_eq(&masked.grid, &unmasked.grid));

        let mut again = request(3, 1.0);
        again.boundary = Some(vec![west_half]);
        let again = worker.compute(&again);
        assert!(Arc::ptr_eq(&masked.grid, &again.grid));
        assert_eq!(worker.cache_stats().hits, 1);
    }

    #[test]
    fn test_oversized_request_yields_empty_grid() {
        let mut worker = GridWorker::new(&GridConfig::default(), None);
        let mut tiny = request(1, 30.0);
        tiny.resolution = 1e-9;

        let result = worker.compute(&tiny);
        assert_eq!(result.request_id, 1);
        assert!(result.grid.is_empty());
    }

    #[test]
    fn test_unknown_message_has_no_response() {
        let mut worker = GridWorker::new(&GridConfig::default(), None);
        assert!(worker.handle(&WorkerRequest::Unknown).is_none());
        assert!(worker.cache().is_empty());
    }
}

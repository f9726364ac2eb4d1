//! End-to-end tests for the grid worker and submitter.

use std::sync::Arc;

use grid_interpolation::{build_grid, Grid, GridConfig, IdwOptions};
use overlay_common::{GeoBounds, OverlayError, Sample};
use overlay_worker::{
    ComputeResult, GridSubmitter, GridWorker, Reconciled, SubmitterState, WorkerRequest,
    WorkerResponse,
};
use test_utils::assert_approx_eq;
use test_utils::fixtures::*;
use tokio::sync::mpsc;

fn ghana_worker() -> GridWorker {
    GridWorker::new(&GridConfig::default(), Some(ghana_outline()))
}

#[tokio::test]
async fn test_single_sample_scenario() {
    let (mut submitter, task) = GridSubmitter::connect(ghana_worker());

    let token = submitter
        .submit(vec![Sample::new(7.0, -1.0, 30.0)], 0.1, 2.0)
        .unwrap();
    let grid = submitter.next_accepted().await.unwrap();

    assert!(token.is_current());
    assert_eq!((grid.rows(), grid.cols()), (65, 45));
    for (value, inside) in grid.values().iter().zip(grid.mask()) {
        if *inside {
            assert_approx_eq!(*value, 30.0, 1e-9);
        }
    }
    assert_eq!(submitter.state(), SubmitterState::Idle);

    drop(submitter);
    task.await.unwrap();
}

#[tokio::test]
async fn test_only_latest_request_is_delivered() {
    let (mut submitter, task) = GridSubmitter::connect(ghana_worker());

    let first = submitter
        .submit(vec![Sample::new(7.0, -1.0, 10.0)], 0.25, 2.0)
        .unwrap();
    let second = submitter
        .submit(vec![Sample::new(7.0, -1.0, 20.0)], 0.25, 2.0)
        .unwrap();
    assert!(!first.is_current());

    // The worker answers both; only the second is accepted.
    assert_eq!(
        submitter.next_event().await,
        Some(Reconciled::Stale { request_id: 1 })
    );
    let grid = submitter.next_accepted().await.unwrap();
    assert!(second.is_current());
    assert_approx_eq!(grid.values()[0], 20.0, 1e-9);
    assert!(Arc::ptr_eq(submitter.accepted().unwrap(), &grid));

    drop(submitter);
    task.await.unwrap();
}

#[tokio::test]
async fn test_late_result_after_acceptance_is_discarded() {
    // Drive the submitter from a hand-held channel so the worker side can
    // answer out of order.
    let (request_tx, mut request_rx) = mpsc::unbounded_channel();
    let (response_tx, response_rx) = mpsc::unbounded_channel();
    let mut submitter = GridSubmitter::from_channels(request_tx, response_rx);

    submitter.submit(vec![Sample::new(7.0, -1.0, 1.0)], 0.5, 2.0).unwrap();
    submitter.submit(vec![Sample::new(7.0, -1.0, 2.0)], 0.5, 2.0).unwrap();

    let mut worker = ghana_worker();
    let mut answers = Vec::new();
    while let Ok(message) = request_rx.try_recv() {
        answers.push(worker.handle(&message).unwrap());
    }
    assert_eq!(answers.len(), 2);

    // Result 2 first, then the late result 1.
    response_tx.send(answers[1].clone()).unwrap();
    response_tx.send(answers[0].clone()).unwrap();

    let accepted = submitter.next_accepted().await.unwrap();
    assert_eq!(
        submitter.next_event().await,
        Some(Reconciled::Stale { request_id: 1 })
    );
    assert!(Arc::ptr_eq(submitter.accepted().unwrap(), &accepted));
    assert_approx_eq!(accepted.values()[0], 2.0, 1e-9);
}

#[tokio::test]
async fn test_repeated_request_is_served_from_cache() {
    let (mut submitter, task) = GridSubmitter::connect(ghana_worker());
    let samples = ghana_district_samples();

    submitter.submit(samples.clone(), 0.2, 2.0).unwrap();
    let first = submitter.next_accepted().await.unwrap();
    submitter.submit(samples.clone(), 0.2, 2.0).unwrap();
    let second = submitter.next_accepted().await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));

    let outline = ghana_outline();
    let expected = build_grid(&GHANA_BOUNDS, &samples, 0.2, &IdwOptions::default(), Some(&outline));
    assert_eq!(*first, expected);

    drop(submitter);
    task.await.unwrap();
}

#[tokio::test]
async fn test_unknown_messages_are_ignored() {
    let handle = ghana_worker().spawn();
    let mut responses = handle.responses;

    handle.requests.send(WorkerRequest::Unknown).unwrap();
    handle
        .requests
        .send(WorkerRequest::Compute(overlay_worker::ComputeRequest {
            request_id: 9,
            samples: vec![],
            resolution: 1.0,
            idw_power: 2.0,
            boundary: None,
        }))
        .unwrap();
    drop(handle.requests);

    let response = responses.recv().await.unwrap();
    assert_eq!(response.request_id(), Some(9));
    assert!(responses.recv().await.is_none());
    handle.task.await.unwrap();
}

#[tokio::test]
async fn test_clear_drops_accepted_grid() {
    let (request_tx, _request_rx) = mpsc::unbounded_channel();
    let (response_tx, response_rx) = mpsc::unbounded_channel();
    let mut submitter = GridSubmitter::from_channels(request_tx, response_rx);

    submitter.submit(vec![], 0.1, 2.0).unwrap();
    submitter.clear();

    let grid = Arc::new(Grid::empty(GHANA_BOUNDS, 0.1));
    response_tx
        .send(WorkerResponse::Result(ComputeResult {
            request_id: 1,
            grid,
        }))
        .unwrap();
    drop(response_tx);

    assert_eq!(
        submitter.next_event().await,
        Some(Reconciled::Stale { request_id: 1 })
    );
    assert!(matches!(
        submitter.next_accepted().await,
        Err(OverlayError::WorkerClosed)
    ));
    assert!(submitter.accepted().is_none());
}

#[tokio::test]
async fn test_worker_keeps_serving_after_oversized_request() {
    let handle = ghana_worker().spawn();
    let mut responses = handle.responses;

    for (request_id, resolution) in [(1, 1e-9), (2, 0.5)] {
        handle
            .requests
            .send(WorkerRequest::Compute(overlay_worker::ComputeRequest {
                request_id,
                samples: vec![Sample::new(7.0, -1.0, 30.0)],
                resolution,
                idw_power: 2.0,
                boundary: None,
            }))
            .unwrap();
    }
    drop(handle.requests);

    let Some(WorkerResponse::Result(oversized)) = responses.recv().await else {
        panic!("expected a result for the oversized request");
    };
    assert_eq!(oversized.request_id, 1);
    assert!(oversized.grid.is_empty());

    let Some(WorkerResponse::Result(normal)) = responses.recv().await else {
        panic!("expected a result for the follow-up request");
    };
    assert_eq!(normal.request_id, 2);
    assert!(normal.grid.inside_count() > 0);

    assert!(responses.recv().await.is_none());
    handle.task.await.unwrap();
}

#[tokio::test]
async fn test_submitter_boundary_is_cached_apart_from_default() {
    let config = GridConfig {
        bounds: SQUARE_BOUNDS,
        ..GridConfig::default()
    };
    let mut worker = GridWorker::new(&config, None);
    let samples = vec![Sample::new(5.0, 5.0, 12.0)];

    // Two submitters feeding one worker: one masks, the other does not.
    let (masked_tx, mut masked_rx) = mpsc::unbounded_channel();
    let (masked_resp_tx, masked_resp_rx) = mpsc::unbounded_channel();
    let mut masked = GridSubmitter::from_channels(masked_tx, masked_resp_rx)
        .with_boundary(two_island_boundary());

    let (plain_tx, mut plain_rx) = mpsc::unbounded_channel();
    let (plain_resp_tx, plain_resp_rx) = mpsc::unbounded_channel();
    let mut plain = GridSubmitter::from_channels(plain_tx, plain_resp_rx);

    masked.submit(samples.clone(), 0.5, 2.0).unwrap();
    let request = masked_rx.try_recv().unwrap();
    masked_resp_tx.send(worker.handle(&request).unwrap()).unwrap();
    let island = masked.next_accepted().await.unwrap();

    plain.submit(samples, 0.5, 2.0).unwrap();
    let request = plain_rx.try_recv().unwrap();
    plain_resp_tx.send(worker.handle(&request).unwrap()).unwrap();
    let whole = plain.next_accepted().await.unwrap();

    assert!(island.inside_count() > 0);
    assert!(island.inside_count() < island.len());
    assert_eq!(whole.inside_count(), whole.len());
    assert!(!Arc::ptr_eq(&island, &whole));
    assert_eq!(island.values(), whole.values());
    assert_eq!(worker.cache_stats().entries, 2);
    assert_eq!(whole.bounds(), &GeoBounds::new(10.0, 0.0, 10.0, 0.0));
}

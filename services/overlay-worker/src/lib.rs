//! Grid worker service for IDW overlays.
//!
//! A [`GridWorker`] owns a grid cache and answers compute requests on its own
//! task; a [`GridSubmitter`] sends requests to it and keeps only the result of
//! the newest one. The `overlay-worker` binary wraps both in a one-shot
//! `render` command and a line-oriented `serve` loop.

pub mod config;
pub mod protocol;
pub mod render;
pub mod serve;
pub mod submitter;
pub mod worker;

pub use config::WorkerConfig;
pub use protocol::{ComputeRequest, ComputeResult, RequestId, WorkerRequest, WorkerResponse};
pub use render::{render, RenderOptions, RenderSummary};
pub use serve::{serve, ServeStats};
pub use submitter::{GridSubmitter, Reconciled, RequestToken, SubmitterState};
pub use worker::{GridWorker, WorkerHandle};

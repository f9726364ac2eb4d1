//! Newline-delimited JSON front end for a grid worker.
//!
//! Each input line is one [`WorkerRequest`]; each output line is one
//! [`WorkerResponse`](crate::protocol::WorkerResponse). Blank lines, unknown
//! kinds and malformed messages are skipped without stopping the loop.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use overlay_common::{OverlayError, OverlayResult};

use crate::protocol::{decode_request, encode, WorkerRequest};
use crate::worker::{GridWorker, WorkerHandle};

/// Counters for one serve session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ServeStats {
    pub received: u64,
    pub forwarded: u64,
    pub skipped: u64,
    pub responses: u64,
}

/// Drive `worker` from `reader` until EOF, writing responses to `writer`.
///
/// Returns the writer once every forwarded request has been answered.
pub async fn serve<R, W>(reader: R, writer: W, worker: GridWorker) -> OverlayResult<(W, ServeStats)>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let WorkerHandle {
        requests,
        mut responses,
        task,
    } = worker.spawn();

    let writer_task = tokio::spawn(async move {
        let mut writer = writer;
        let mut written = 0u64;
        while let Some(response) = responses.recv().await {
            let line = encode(&response)?;
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
            written += 1;
        }
        Ok::<_, OverlayError>((writer, written))
    });

    let mut stats = ServeStats::default();
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        stats.received += 1;

        match decode_request(&line) {
            Ok(WorkerRequest::Unknown) => {
                debug!("Skipping message with unknown kind");
                stats.skipped += 1;
            }
            Ok(request) => {
                if requests.send(request).is_err() {
                    warn!("Worker stopped, no longer accepting requests");
                    break;
                }
                stats.forwarded += 1;
            }
            Err(e) => {
                warn!(error = %e, "Skipping malformed message");
                stats.skipped += 1;
            }
        }
    }

    // Closing the request channel lets the worker drain and exit.
    drop(requests);
    task.await
        .map_err(|e| OverlayError::InternalError(format!("worker task failed: {}", e)))?;

    let (writer, written) = writer_task
        .await
        .map_err(|e| OverlayError::InternalError(format!("writer task failed: {}", e)))??;
    stats.responses = written;

    info!(
        received = stats.received,
        forwarded = stats.forwarded,
        skipped = stats.skipped,
        responses = stats.responses,
        "Serve session finished"
    );

    Ok((writer, stats))
}

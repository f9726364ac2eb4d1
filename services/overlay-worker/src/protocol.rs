//! Messages exchanged between a submitter and a grid worker.
//!
//! Both directions are JSON objects tagged by `kind` with camelCase fields:
//!
//! ```json
//! {"kind":"compute","requestId":3,"samples":[{"lat":5.6,"lon":-0.19,"value":27.1}],"resolution":0.1,"idwPower":2}
//! {"kind":"result","requestId":3,"grid":{"values":[...],"mask":[...],"bounds":{...},"resolution":0.1,"rows":65,"cols":45}}
//! ```
//!
//! Any other `kind` decodes to an `Unknown` variant that receivers drop.

use std::sync::Arc;

use grid_interpolation::Grid;
use overlay_common::{BoundaryGeometry, OverlayResult, Sample};
use serde::{Deserialize, Serialize};

/// Request identifier minted by a submitter. Strictly increasing per submitter.
pub type RequestId = u64;

/// Ask the worker for the grid of a sample set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeRequest {
    pub request_id: RequestId,
    pub samples: Vec<Sample>,
    pub resolution: f64,
    pub idw_power: f64,
    /// Boundary to mask with. `None` uses the worker's own boundary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary: Option<Vec<BoundaryGeometry>>,
}

/// The grid computed (or served from cache) for a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeResult {
    pub request_id: RequestId,
    pub grid: Arc<Grid>,
}

/// Messages a worker accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkerRequest {
    Compute(ComputeRequest),
    #[serde(other)]
    Unknown,
}

/// Messages a worker emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkerResponse {
    Result(ComputeResult),
    #[serde(other)]
    Unknown,
}

impl WorkerRequest {
    /// Request id carried by a compute request.
    pub fn request_id(&self) -> Option<RequestId> {
        match self {
            Self::Compute(request) => Some(request.request_id),
            Self::Unknown => None,
        }
    }
}

impl WorkerResponse {
    /// Request id carried by a result.
    pub fn request_id(&self) -> Option<RequestId> {
        match self {
            Self::Result(result) => Some(result.request_id),
            Self::Unknown => None,
        }
    }
}

/// Decode one request line.
pub fn decode_request(line: &str) -> OverlayResult<WorkerRequest> {
    Ok(serde_json::from_str(line)?)
}

/// Decode one response line.
pub fn decode_response(line: &str) -> OverlayResult<WorkerResponse> {
    Ok(serde_json::from_str(line)?)
}

/// Encode a message as a single JSON line (no trailing newline).
pub fn encode<T: Serialize>(message: &T) -> OverlayResult<String> {
    Ok(serde_json::to_string(message)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use overlay_common::GeoBounds;

    #[test]
    fn test_decode_compute() {
        let line = r#"{"kind":"compute","requestId":7,"samples":[{"lat":5.6,"lon":-0.19,"value":27.1}],"resolution":0.1,"idwPower":2}"#;
        match decode_request(line).unwrap() {
            WorkerRequest::Compute(req) => {
                assert_eq!(req.request_id, 7);
                assert_eq!(WorkerRequest::Compute(req.clone()).request_id(), Some(7));
                assert_eq!(req.samples, vec![Sample::new(5.6, -0.19, 27.1)]);
                assert_eq!(req.idw_power, 2.0);
                assert!(req.boundary.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_decode_compute_with_boundary() {
        let line = r#"{"kind":"compute","requestId":1,"samples":[],"resolution":0.5,"idwPower":3,
            "boundary":[{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]}]}"#;
        let WorkerRequest::Compute(req) = decode_request(line).unwrap() else {
            panic!("expected compute");
        };
        assert_eq!(req.boundary.map(|b| b.len()), Some(1));
    }

    #[test]
    fn test_unknown_kind_is_not_an_error() {
        let req = decode_request(r#"{"kind":"cancel","requestId":3}"#).unwrap();
        assert_eq!(req, WorkerRequest::Unknown);
        assert_eq!(req.request_id(), None);
        let resp = decode_response(r#"{"kind":"progress","percent":50}"#).unwrap();
        assert_eq!(resp, WorkerResponse::Unknown);
        assert_eq!(resp.request_id(), None);
    }

    #[test]
    fn test_malformed_is_an_error() {
        assert!(decode_request("not json").is_err());
        assert!(decode_request(r#"{"kind":"compute","requestId":1}"#).is_err());
    }

    #[test]
    fn test_result_wire_shape() {
        let grid = Grid::empty(GeoBounds::new(1.0, 0.0, 1.0, 0.0), 0.5);
        let resp = WorkerResponse::Result(ComputeResult {
            request_id: 4,
            grid: Arc::new(grid),
        });
        let value: serde_json::Value = serde_json::from_str(&encode(&resp).unwrap()).unwrap();
        assert_eq!(value["kind"], "result");
        assert_eq!(value["requestId"], 4);
        assert_eq!(value["grid"]["rows"], 0);
        assert!(value["grid"]["values"].is_array());

        assert_eq!(decode_response(&encode(&resp).unwrap()).unwrap(), resp);
    }
}

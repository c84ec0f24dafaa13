//! Invocation error type.

use edge_core::{RequestId, WorkloadError};

/// A failed invocation, tagged with its request ID.
#[derive(Debug, thiserror::Error)]
#[error("Invocation {request_id} failed: {source}")]
pub struct InvocationError {
    pub request_id: RequestId,
    #[source]
    pub source: WorkloadError,
}

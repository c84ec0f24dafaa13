//! Observability infrastructure for the edge workload responder.
//!
//! This crate provides:
//! - `StructuredLogger` - Structured logging with request context
//! - `InvocationMetrics` - Per-invocation timing metrics

mod logging;
mod metrics;

pub use logging::*;
pub use metrics::*;

// Re-export RequestId and TimingContext from edge-core for convenience
pub use edge_core::{RequestId, TimingContext};

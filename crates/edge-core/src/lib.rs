//! Core abstractions for the edge workload responder.
//!
//! This crate provides the fundamental types:
//! - `RequestContext` - Per-invocation method, query and timing
//! - `QueryParams` - Case-insensitive, last-value-wins query map
//! - `WorkloadKind` / `WorkloadError` - Workload selection and failures
//! - `ResponderConfig` - Runtime identity, defaults and logging setup
//! - `LifecyclePhase` / `TimingContext` - Invocation lifecycle tracking

mod config;
mod context;
mod lifecycle;
mod query;
mod workload;

pub use config::*;
pub use context::*;
pub use lifecycle::*;
pub use query::*;
pub use workload::*;

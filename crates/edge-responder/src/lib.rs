//! Synthetic workload responder.
//!
//! One invocation parses the query string, runs the selected workload
//! (`cpu`, `io`, `delay` or `none`), times the workload alone and returns a
//! JSON envelope for the transport to send:
//!
//! ```ignore
//! use edge_responder::{ResponderConfig, WorkloadResponder};
//!
//! let responder = WorkloadResponder::new(ResponderConfig::new("native"));
//! let response = responder.handle("GET", "workload=cpu&iterations=1000").await;
//! assert_eq!(response.status, 200);
//! ```

mod delay;
mod error;
mod params;
mod responder;
mod response;
mod runner;

pub use delay::*;
pub use error::*;
pub use params::*;
pub use responder::*;
pub use response::*;
pub use runner::*;

pub use edge_observability::{LogEntry, LogLevel, LogSink};
pub use edge_core::{ParameterDefaults, QueryParams, ResponderConfig, WorkloadError, WorkloadKind};

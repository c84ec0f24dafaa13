//! Per-invocation request context.

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::lifecycle::{LifecyclePhase, TimingContext};
use crate::query::QueryParams;

/// Unique request identifier for tracing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

impl RequestId {
    /// Generate a new time-ordered request ID.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Borrow the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Request context for one invocation.
///
/// Captures the method verbatim, the parsed query and the UTC start time.
#[derive(Debug)]
pub struct RequestContext {
    /// Unique request identifier.
    pub request_id: RequestId,
    /// HTTP method as received.
    pub method: String,
    /// Query string parameters.
    pub query: QueryParams,
    /// Wall-clock time the invocation started.
    pub started_at: DateTime<Utc>,
    /// Timing context for observability.
    pub timing: TimingContext,
}

impl RequestContext {
    /// Create a context from a method and a raw query string.
    pub fn new(method: impl Into<String>, raw_query: &str) -> Self {
        let mut timing = TimingContext::new();
        timing.mark_phase(&LifecyclePhase::Start);
        Self {
            request_id: RequestId::generate(),
            method: method.into(),
            query: QueryParams::parse(raw_query),
            started_at: Utc::now(),
            timing,
        }
    }

    /// ISO-8601 UTC start timestamp, e.g. `2024-05-01T12:00:00.123456Z`.
    pub fn timestamp(&self) -> String {
        self.started_at.to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_unique() {
        let a = RequestId::generate();
        let b = RequestId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_query_parsed_and_start_marked() {
        let ctx = RequestContext::new("POST", "?Workload=cpu");
        assert_eq!(ctx.method, "POST");
        assert_eq!(ctx.query.get("workload"), Some("cpu"));
        assert!(ctx.timing.since_start("start").is_some());
    }

    #[test]
    fn test_method_kept_verbatim() {
        let ctx = RequestContext::new("patch", "");
        assert_eq!(ctx.method, "patch");
        assert!(ctx.query.is_empty());
    }

    #[test]
    fn test_timestamp_is_utc_iso8601() {
        let ctx = RequestContext::new("GET", "");
        let ts = ctx.timestamp();
        assert!(ts.ends_with('Z'));
        assert!(DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}

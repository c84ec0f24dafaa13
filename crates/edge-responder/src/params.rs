//! Parameter normalization.

use edge_core::{ParameterDefaults, QueryParams, WorkloadKind};

/// Query key selecting the workload.
pub const PARAM_WORKLOAD: &str = "workload";
/// Query key for the `cpu` loop count.
pub const PARAM_ITERATIONS: &str = "iterations";
/// Query key for the `io` payload size in KiB.
pub const PARAM_SIZE_KB: &str = "sizeKb";
/// Query key for the `delay` duration in milliseconds.
pub const PARAM_DELAY_MS: &str = "delayMs";

/// Parse a base-10 integer, returning `fallback` when absent or malformed.
///
/// Surrounding whitespace is ignored. Sign-only input, partial matches such
/// as `12abc` and out-of-range values all fall back. Negative values pass
/// through unchanged.
pub fn parse_int(value: Option<&str>, fallback: i64) -> i64 {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(fallback)
}

/// Typed parameters for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestParameters {
    /// Lowercased `workload` value, `"none"` when empty. Unrecognized names
    /// are kept as given so they can be echoed.
    pub workload: String,
    /// Workload to execute.
    pub kind: WorkloadKind,
    pub iterations: i64,
    pub size_kb: i64,
    pub delay_ms: i64,
    /// Every parsed query pair, for echoing.
    pub raw_query: QueryParams,
}

impl RequestParameters {
    /// Normalize a parsed query into typed parameters.
    pub fn from_query(query: &QueryParams, defaults: &ParameterDefaults) -> Self {
        let workload = query
            .get(PARAM_WORKLOAD)
            .map(str::to_lowercase)
            .filter(|w| !w.is_empty())
            .unwrap_or_else(|| WorkloadKind::None.as_str().to_string());

        Self {
            kind: WorkloadKind::from_param(&workload),
            workload,
            iterations: parse_int(query.get(PARAM_ITERATIONS), defaults.iterations),
            size_kb: parse_int(query.get(PARAM_SIZE_KB), defaults.size_kb),
            delay_ms: parse_int(query.get(PARAM_DELAY_MS), defaults.delay_ms),
            raw_query: query.clone(),
        }
    }

    /// Parse a raw query string and normalize it.
    pub fn parse(raw_query: &str, defaults: &ParameterDefaults) -> Self {
        Self::from_query(&QueryParams::parse(raw_query), defaults)
    }
}

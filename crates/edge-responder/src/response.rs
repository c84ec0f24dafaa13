//! Response assembly.

use std::time::Duration;

use edge_core::{QueryParams, RequestContext, RequestId, ResponderConfig, WorkloadError};
use http::header::{HeaderName, HeaderValue};
use http::StatusCode;
use serde::Serialize;

use crate::params::RequestParameters;

pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_RUNTIME: &str = "x-runtime";
pub const HEADER_REQUEST_ID: &str = "x-request-id";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Result of one invocation. Never modified after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadResult {
    pub workload: String,
    pub iterations: i64,
    pub size_kb: i64,
    pub delay_ms: i64,
    /// Workload time in milliseconds, two decimals.
    pub duration_ms: f64,
    /// ISO-8601 UTC time the invocation started.
    pub timestamp_utc: String,
    /// Inbound method, verbatim.
    pub method: String,
}

/// Round a duration to milliseconds with two decimals.
pub fn round_ms(duration: Duration) -> f64 {
    (duration.as_secs_f64() * 100_000.0).round() / 100.0
}

/// Assemble the result record for an invocation.
///
/// Integer parameters are echoed as parsed, whether or not the workload used them.
pub fn build_response(
    ctx: &RequestContext,
    params: &RequestParameters,
    elapsed: Duration,
) -> WorkloadResult {
    WorkloadResult {
        workload: params.workload.clone(),
        iterations: params.iterations,
        size_kb: params.size_kb,
        delay_ms: params.delay_ms,
        duration_ms: round_ms(elapsed),
        timestamp_utc: ctx.timestamp(),
        method: ctx.method.clone(),
    }
}

/// JSON body sent to the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody<'a> {
    pub message: &'a str,
    pub runtime: &'a str,
    pub workload: &'a str,
    pub iterations: i64,
    pub size_kb: i64,
    pub delay_ms: i64,
    pub duration_ms: f64,
    pub timestamp: &'a str,
    pub request_data: RequestData<'a>,
}

/// Echo of the inbound request.
#[derive(Debug, Clone, Serialize)]
pub struct RequestData<'a> {
    pub query: &'a QueryParams,
    pub method: &'a str,
}

impl<'a> ResponseBody<'a> {
    pub fn new(config: &'a ResponderConfig, result: &'a WorkloadResult, query: &'a QueryParams) -> Self {
        Self {
            message: &config.message,
            runtime: &config.runtime,
            workload: &result.workload,
            iterations: result.iterations,
            size_kb: result.size_kb,
            delay_ms: result.delay_ms,
            duration_ms: result.duration_ms,
            timestamp: &result.timestamp_utc,
            request_data: RequestData {
                query,
                method: &result.method,
            },
        }
    }
}

/// JSON body for a failed invocation.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody<'a> {
    pub error: String,
    pub kind: &'a str,
    pub runtime: &'a str,
}

/// Transport-neutral HTTP response for one invocation.
#[derive(Debug, Clone)]
pub struct WorkloadResponse {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: String,
    /// The result record, absent for failed invocations.
    pub result: Option<WorkloadResult>,
}

impl WorkloadResponse {
    /// A 200 response carrying the result envelope.
    pub fn ok(
        config: &ResponderConfig,
        request_id: &RequestId,
        result: WorkloadResult,
        query: &QueryParams,
    ) -> Self {
        let body = serde_json::to_string(&ResponseBody::new(config, &result, query))
            .unwrap_or_default();
        Self {
            status: StatusCode::OK,
            headers: standard_headers(&config.runtime, request_id),
            body,
            result: Some(result),
        }
    }

    /// A 500 response describing an I/O failure.
    pub fn failure(config: &ResponderConfig, request_id: &RequestId, error: &WorkloadError) -> Self {
        let body = serde_json::to_string(&ErrorBody {
            error: error.to_string(),
            kind: error.kind(),
            runtime: &config.runtime,
        })
        .unwrap_or_default();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            headers: standard_headers(&config.runtime, request_id),
            body,
            result: None,
        }
    }

    /// Look up a header value (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Convert into an `http::Response`. Headers with invalid values are dropped.
    pub fn into_http(self) -> http::Response<String> {
        let mut response = http::Response::new(self.body);
        *response.status_mut() = self.status;
        for (name, value) in self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                response.headers_mut().insert(name, value);
            }
        }
        response
    }
}

fn standard_headers(runtime: &str, request_id: &RequestId) -> Vec<(String, String)> {
    vec![
        (HEADER_CONTENT_TYPE.to_string(), JSON_CONTENT_TYPE.to_string()),
        (HEADER_RUNTIME.to_string(), runtime.to_string()),
        (HEADER_REQUEST_ID.to_string(), request_id.to_string()),
    ]
}

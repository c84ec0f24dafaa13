//! Per-invocation timing metrics.

use edge_core::{LifecyclePhase, RequestId, TimingContext};
use serde::{Deserialize, Serialize};

/// Metrics for a single invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationMetrics {
    /// Request ID for correlation.
    pub request_id: String,
    /// Runtime identifier of the serving transport.
    pub runtime: String,
    /// Normalized workload name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workload: Option<String>,
    /// Time from invocation start to workload start (microseconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_workload_us: Option<u64>,
    /// Workload execution time (microseconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workload_duration_us: Option<u64>,
    /// Total invocation time (microseconds).
    pub total_duration_us: u64,
    /// Bytes written and read back by the `io` workload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub io_bytes: Option<u64>,
    /// HTTP status code reported to the transport.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

/// Collector for invocation metrics.
#[derive(Debug)]
pub struct MetricsCollector {
    request_id: RequestId,
    runtime: String,
    workload: Option<String>,
    io_bytes: Option<u64>,
}

impl MetricsCollector {
    /// Create a new metrics collector.
    pub fn new(request_id: RequestId, runtime: impl Into<String>) -> Self {
        Self {
            request_id,
            runtime: runtime.into(),
            workload: None,
            io_bytes: None,
        }
    }

    /// Set workload name.
    pub fn set_workload(&mut self, workload: impl Into<String>) {
        self.workload = Some(workload.into());
    }

    /// Record bytes processed by the `io` workload.
    pub fn record_io_bytes(&mut self, bytes: u64) {
        self.io_bytes = Some(bytes);
    }

    /// Finalize using the marks recorded on the invocation's timing context.
    pub fn finalize(self, timing: &TimingContext, status_code: Option<u16>) -> InvocationMetrics {
        InvocationMetrics {
            request_id: self.request_id.to_string(),
            runtime: self.runtime,
            workload: self.workload,
            time_to_workload_us: timing
                .since_start(LifecyclePhase::WorkloadStarted.mark_name())
                .map(|d| d.as_micros() as u64),
            workload_duration_us: timing.workload_time().map(|d| d.as_micros() as u64),
            total_duration_us: timing.total_time().as_micros() as u64,
            io_bytes: self.io_bytes,
            status_code,
        }
    }
}

impl InvocationMetrics {
    /// Format as a one-line human-readable summary.
    pub fn to_summary(&self) -> String {
        let mut parts = vec![format!(
            "{} [{}] {}",
            self.request_id,
            self.runtime,
            self.workload.as_deref().unwrap_or("none")
        )];

        if let Some(workload_us) = self.workload_duration_us {
            parts.push(format!("workload {:.2}ms", workload_us as f64 / 1000.0));
        }
        parts.push(format!(
            "total {:.2}ms",
            self.total_duration_us as f64 / 1000.0
        ));
        if let Some(bytes) = self.io_bytes {
            parts.push(format!("io {}B", bytes));
        }
        if let Some(status) = self.status_code {
            parts.push(format!("status {}", status));
        }

        parts.join(" | ")
    }
}

//! Workload selection and error type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The synthetic workloads an invocation can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkloadKind {
    /// Floating point loop.
    Cpu,
    /// Temp file write, read back and delete.
    Io,
    /// Cooperative sleep.
    Delay,
    /// No-op. Also selected for unrecognized names.
    #[default]
    None,
}

impl WorkloadKind {
    /// Select a workload from a query value, ignoring case.
    pub fn from_param(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "cpu" => Self::Cpu,
            "io" => Self::Io,
            "delay" => Self::Delay,
            _ => Self::None,
        }
    }

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Io => "io",
            Self::Delay => "delay",
            Self::None => "none",
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Step of the `io` workload that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoStage {
    Write,
    Read,
}

impl fmt::Display for IoStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Write => f.write_str("write"),
            Self::Read => f.write_str("read"),
        }
    }
}

/// Error type for workload execution.
///
/// Only the `io` workload can fail; temp file cleanup failures are not errors.
#[derive(Debug, thiserror::Error)]
pub enum WorkloadError {
    #[error("Temp file {stage} failed: {source}")]
    Io {
        stage: IoStage,
        #[source]
        source: std::io::Error,
    },

    #[error("sizeKb {0} does not fit in memory")]
    SizeOverflow(i64),
}

impl WorkloadError {
    /// Short machine-readable kind for error bodies.
    ///
    /// Every variant is an I/O failure of the `io` workload.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io { .. } | Self::SizeOverflow(_) => "io",
        }
    }
}

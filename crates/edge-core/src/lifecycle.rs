//! Invocation lifecycle tracking.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Lifecycle phases for an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// Request received, processing started.
    Start,
    /// Query parameters have been normalized.
    ParametersParsed,
    /// The selected workload began executing.
    WorkloadStarted,
    /// The selected workload returned.
    WorkloadFinished,
    /// Response assembled.
    Completion,
    /// An error occurred.
    Error(String),
}

impl LifecyclePhase {
    /// Name used for the timing mark of this phase.
    pub fn mark_name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::ParametersParsed => "parameters_parsed",
            Self::WorkloadStarted => "workload_started",
            Self::WorkloadFinished => "workload_finished",
            Self::Completion => "completion",
            Self::Error(_) => "error",
        }
    }
}

/// Timing context for observability.
#[derive(Debug, Clone)]
pub struct TimingContext {
    start: Instant,
    marks: HashMap<String, Instant>,
}

impl TimingContext {
    /// Create a new timing context.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            marks: HashMap::new(),
        }
    }

    /// Record a timing mark.
    pub fn mark(&mut self, name: &str) {
        self.marks.insert(name.to_string(), Instant::now());
    }

    /// Record the mark for a lifecycle phase.
    pub fn mark_phase(&mut self, phase: &LifecyclePhase) {
        self.mark(phase.mark_name());
    }

    /// Get elapsed time since start.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Time from start to a named mark.
    pub fn since_start(&self, name: &str) -> Option<Duration> {
        self.marks.get(name).map(|t| t.duration_since(self.start))
    }

    /// Time between two named marks.
    pub fn between(&self, from: &str, to: &str) -> Option<Duration> {
        let from = self.marks.get(from)?;
        let to = self.marks.get(to)?;
        Some(to.saturating_duration_since(*from))
    }

    /// Time spent inside the workload, if both marks were recorded.
    pub fn workload_time(&self) -> Option<Duration> {
        self.between(
            LifecyclePhase::WorkloadStarted.mark_name(),
            LifecyclePhase::WorkloadFinished.mark_name(),
        )
    }

    /// Get total invocation time.
    pub fn total_time(&self) -> Duration {
        self.since_start(LifecyclePhase::Completion.mark_name())
            .unwrap_or_else(|| self.elapsed())
    }
}

impl Default for TimingContext {
    fn default() -> Self {
        Self::new()
    }
}

//! The workload responder.

use std::sync::Arc;

use edge_core::{LifecyclePhase, RequestContext, ResponderConfig};
use edge_observability::{LogSink, MetricsCollector, StructuredLogger};

use crate::delay::Delay;
use crate::error::InvocationError;
use crate::params::RequestParameters;
use crate::response::{build_response, WorkloadResponse};
use crate::runner::WorkloadRunner;

/// Handles invocations for one transport.
///
/// Holds only immutable configuration, so a single instance can serve
/// concurrent invocations.
#[derive(Debug, Clone)]
pub struct WorkloadResponder {
    config: ResponderConfig,
    runner: WorkloadRunner,
    log_sink: LogSink,
}

impl WorkloadResponder {
    /// Create a responder whose `delay` workload sleeps on the tokio timer.
    #[cfg(feature = "tokio")]
    pub fn new(config: ResponderConfig) -> Self {
        Self::with_delay(config, Arc::new(crate::delay::TokioDelay))
    }

    /// Create a responder with an explicit delay strategy.
    pub fn with_delay(config: ResponderConfig, delay: Arc<dyn Delay>) -> Self {
        let runner = WorkloadRunner::new(config.temp_dir(), delay);
        Self {
            config,
            runner,
            log_sink: LogSink::Stderr,
        }
    }

    /// Send invocation logs to `sink` instead of stderr.
    pub fn with_log_sink(mut self, sink: LogSink) -> Self {
        self.log_sink = sink;
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &ResponderConfig {
        &self.config
    }

    /// Run one invocation.
    ///
    /// Malformed parameters fall back to defaults; only `io` failures are
    /// returned as errors.
    pub async fn invoke(
        &self,
        method: &str,
        raw_query: &str,
    ) -> Result<WorkloadResponse, InvocationError> {
        let mut ctx = RequestContext::new(method, raw_query);
        let params = RequestParameters::from_query(&ctx.query, &self.config.defaults);
        ctx.timing.mark_phase(&LifecyclePhase::ParametersParsed);

        let logger = StructuredLogger::from_config(ctx.request_id.clone(), &self.config.logging)
            .with_runtime(&self.config.runtime)
            .with_workload(&params.workload)
            .with_sink(self.log_sink.clone());

        let mut metrics = MetricsCollector::new(ctx.request_id.clone(), &self.config.runtime);
        metrics.set_workload(&params.workload);

        logger
            .debug_builder("Invocation started")
            .field("method", &ctx.method)
            .field_i64("query_params", params.raw_query.len() as i64)
            .emit();

        ctx.timing.mark_phase(&LifecyclePhase::WorkloadStarted);
        let outcome = self.runner.run(&params, &logger).await;
        ctx.timing.mark_phase(&LifecyclePhase::WorkloadFinished);

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(source) => {
                ctx.timing
                    .mark_phase(&LifecyclePhase::Error(source.to_string()));
                let summary = metrics.finalize(&ctx.timing, Some(500)).to_summary();
                logger
                    .error_builder("Workload failed")
                    .field("error", source.to_string())
                    .field("metrics", summary)
                    .emit();
                return Err(InvocationError {
                    request_id: ctx.request_id,
                    source,
                });
            }
        };

        if let Some(bytes) = outcome.io_bytes {
            metrics.record_io_bytes(bytes);
        }

        let result = build_response(&ctx, &params, outcome.elapsed);
        let response = WorkloadResponse::ok(&self.config, &ctx.request_id, result, &params.raw_query);
        ctx.timing.mark_phase(&LifecyclePhase::Completion);

        let metrics = metrics.finalize(&ctx.timing, Some(response.status.as_u16()));
        logger
            .info_builder("Workload complete")
            .duration_ms("duration_ms", outcome.elapsed)
            .field("metrics", metrics.to_summary())
            .emit();

        Ok(response)
    }

    /// Run one invocation and map failures to a 500 response.
    pub async fn handle(&self, method: &str, raw_query: &str) -> WorkloadResponse {
        match self.invoke(method, raw_query).await {
            Ok(response) => response,
            Err(e) => WorkloadResponse::failure(&self.config, &e.request_id, &e.source),
        }
    }
}

//! Concurrent in-process load against the responder.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use edge_responder::{LogEntry, LogLevel, LogSink, WorkloadResponder};
use futures::stream::{self, StreamExt};
use serde::Serialize;

use super::BenchArgs;
use crate::context::Context;
use crate::output::format_ms;

/// Aggregated `durationMs` statistics for a bench run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchReport {
    pub requests: usize,
    pub failures: usize,
    /// Warn and error log entries emitted by the invocations.
    pub warnings: usize,
    pub min_ms: f64,
    pub mean_ms: f64,
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub max_ms: f64,
    pub wall_ms: f64,
    pub started_at: DateTime<Utc>,
}

/// Run the bench command.
pub async fn run(args: BenchArgs, ctx: &Context) -> Result<()> {
    if args.requests == 0 {
        bail!("--requests must be at least 1");
    }
    if args.concurrency == 0 {
        bail!("--concurrency must be at least 1");
    }

    let mut config = ctx.config.responder.clone();
    if !ctx.output.is_verbose() {
        config.logging.level = "warn".to_string();
    }
    config.validate()?;

    let (sink, log_entries) = LogSink::capture();
    let responder = Arc::new(WorkloadResponder::new(config).with_log_sink(sink));
    let query = Arc::new(args.query);
    let method = Arc::new(args.method);

    ctx.output.header("Bench");
    ctx.output.kv("query", &query);
    ctx.output.kv("requests", &args.requests.to_string());
    ctx.output.kv("concurrency", &args.concurrency.to_string());

    let started_at = Utc::now();
    let start = Instant::now();
    let pb = ctx.output.progress(args.requests as u64, "invoking");

    let results: Vec<Option<f64>> = stream::iter(0..args.requests)
        .map(|_| {
            let responder = Arc::clone(&responder);
            let query = Arc::clone(&query);
            let method = Arc::clone(&method);
            tokio::spawn(async move {
                let response = responder.handle(&method, &query).await;
                response.result.map(|result| result.duration_ms)
            })
        })
        .buffer_unordered(args.concurrency)
        .map(|joined| {
            pb.inc(1);
            joined.ok().flatten()
        })
        .collect()
        .await;

    pb.finish_and_clear();

    let failures = results.iter().filter(|r| r.is_none()).count();
    let durations: Vec<f64> = results.into_iter().flatten().collect();
    let mut report = summarize(&durations, failures, start.elapsed(), started_at);

    let entries = log_entries
        .lock()
        .map(|entries| entries.to_vec())
        .unwrap_or_default();
    report.warnings = count_warnings(&entries);
    for entry in entries.iter().filter(|e| e.level >= LogLevel::Warn) {
        ctx.output.debug(&entry.to_human());
    }

    if ctx.output.is_json() {
        ctx.output.json(&report);
    } else {
        ctx.output.header("durationMs");
        ctx.output.kv("min", &format_ms(report.min_ms));
        ctx.output.kv("mean", &format_ms(report.mean_ms));
        ctx.output.kv("p50", &format_ms(report.p50_ms));
        ctx.output.kv("p95", &format_ms(report.p95_ms));
        ctx.output.kv("max", &format_ms(report.max_ms));
        ctx.output.kv("wall", &format_ms(report.wall_ms));

        if report.warnings > 0 {
            ctx.output.warn(&format!(
                "{} warning(s) logged, rerun with --verbose to list them",
                report.warnings
            ));
        }

        if report.failures == 0 {
            ctx.output.success(&format!("{} invocations succeeded", report.requests));
        } else {
            ctx.output.warn(&format!(
                "{} of {} invocations failed",
                report.failures, report.requests
            ));
        }
    }

    Ok(())
}

/// Summarize successful durations. Percentiles use the nearest-rank method.
pub fn summarize(
    durations: &[f64],
    failures: usize,
    wall: Duration,
    started_at: DateTime<Utc>,
) -> BenchReport {
    let mut sorted = durations.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mean_ms = if sorted.is_empty() {
        0.0
    } else {
        sorted.iter().sum::<f64>() / sorted.len() as f64
    };

    BenchReport {
        requests: durations.len() + failures,
        failures,
        warnings: 0,
        min_ms: sorted.first().copied().unwrap_or(0.0),
        mean_ms,
        p50_ms: percentile(&sorted, 50.0),
        p95_ms: percentile(&sorted, 95.0),
        max_ms: sorted.last().copied().unwrap_or(0.0),
        wall_ms: wall.as_secs_f64() * 1000.0,
        started_at,
    }
}

/// Count captured entries at warn level or above.
pub fn count_warnings(entries: &[LogEntry]) -> usize {
    entries.iter().filter(|e| e.level >= LogLevel::Warn).count()
}

fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = ((pct / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_percentiles() {
        let durations: Vec<f64> = (1..=100).map(f64::from).collect();
        let report = summarize(&durations, 0, Duration::from_secs(2), Utc::now());

        assert_eq!(report.requests, 100);
        assert_eq!(report.min_ms, 1.0);
        assert_eq!(report.max_ms, 100.0);
        assert_eq!(report.mean_ms, 50.5);
        assert_eq!(report.p50_ms, 50.0);
        assert_eq!(report.p95_ms, 95.0);
        assert_eq!(report.wall_ms, 2000.0);
    }

    #[test]
    fn test_summarize_unsorted_input() {
        let report = summarize(&[3.0, 1.0, 2.0], 1, Duration::ZERO, Utc::now());

        assert_eq!(report.requests, 4);
        assert_eq!(report.failures, 1);
        assert_eq!(report.min_ms, 1.0);
        assert_eq!(report.p50_ms, 2.0);
        assert_eq!(report.max_ms, 3.0);
    }

    #[test]
    fn test_summarize_all_failed() {
        let report = summarize(&[], 5, Duration::ZERO, Utc::now());

        assert_eq!(report.requests, 5);
        assert_eq!(report.failures, 5);
        assert_eq!(report.mean_ms, 0.0);
        assert_eq!(report.p95_ms, 0.0);
    }

    #[tokio::test]
    async fn test_captured_invocation_warnings_counted() {
        let mut config = edge_core::ResponderConfig::default();
        config.logging.level = "warn".to_string();
        config.temp_dir = Some(std::env::temp_dir().join("edge-bench-missing-dir"));
        let (sink, entries) = LogSink::capture();
        let responder = WorkloadResponder::new(config).with_log_sink(sink);

        responder.handle("GET", "workload=cpu&iterations=10").await;
        assert_eq!(count_warnings(&entries.lock().unwrap()), 0);

        let response = responder.handle("GET", "workload=io&sizeKb=1").await;
        assert!(response.result.is_none());
        assert_eq!(count_warnings(&entries.lock().unwrap()), 1);
    }

    #[test]
    fn test_percentile_single_value() {
        assert_eq!(percentile(&[7.5], 50.0), 7.5);
        assert_eq!(percentile(&[7.5], 95.0), 7.5);
    }
}

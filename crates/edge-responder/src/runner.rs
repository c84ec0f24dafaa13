//! Workload execution.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use edge_core::{IoStage, WorkloadError, WorkloadKind};
use edge_observability::StructuredLogger;
use rand::RngCore;
use uuid::Uuid;

use crate::delay::Delay;
use crate::params::RequestParameters;

const TEMP_FILE_PREFIX: &str = "edge-bench-";

/// What a workload run produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkloadOutcome {
    /// Time spent inside the workload.
    pub elapsed: Duration,
    /// Bytes written and read back, for `io` runs.
    pub io_bytes: Option<u64>,
}

/// Runs the selected workload and times it.
#[derive(Clone)]
pub struct WorkloadRunner {
    temp_dir: PathBuf,
    delay: Arc<dyn Delay>,
}

impl std::fmt::Debug for WorkloadRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkloadRunner")
            .field("temp_dir", &self.temp_dir)
            .finish_non_exhaustive()
    }
}

impl WorkloadRunner {
    /// Create a runner writing temp files under `temp_dir`.
    pub fn new(temp_dir: impl Into<PathBuf>, delay: Arc<dyn Delay>) -> Self {
        Self {
            temp_dir: temp_dir.into(),
            delay,
        }
    }

    /// Directory used for `io` temp files.
    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Run the workload selected by `params`.
    ///
    /// Only the workload itself is inside the measured interval.
    pub async fn run(
        &self,
        params: &RequestParameters,
        logger: &StructuredLogger,
    ) -> Result<WorkloadOutcome, WorkloadError> {
        let start = Instant::now();
        let mut io_bytes = None;

        match params.kind {
            WorkloadKind::Cpu => {
                std::hint::black_box(cpu_workload(params.iterations));
            }
            WorkloadKind::Io => {
                io_bytes = Some(io_workload(&self.temp_dir, params.size_kb, logger)?);
            }
            WorkloadKind::Delay if params.delay_ms > 0 => {
                self.delay
                    .sleep(Duration::from_millis(params.delay_ms as u64))
                    .await;
            }
            WorkloadKind::Delay | WorkloadKind::None => {}
        }

        Ok(WorkloadOutcome {
            elapsed: start.elapsed(),
            io_bytes,
        })
    }
}

/// Accumulate `sqrt(i) / ln(i + 1)` for `i` in `1..=iterations`.
///
/// Non-positive counts run zero iterations.
pub fn cpu_workload(iterations: i64) -> f64 {
    let mut acc = 0.0_f64;
    for i in 1..=iterations {
        let x = i as f64;
        acc += x.sqrt() / (x + 1.0).ln();
    }
    acc
}

/// Write `size_kb` KiB of random bytes to a fresh temp file, read it back and
/// delete it. Returns the number of bytes read.
///
/// Negative sizes write an empty file. A failed delete is logged, not returned.
pub fn io_workload(
    dir: &Path,
    size_kb: i64,
    logger: &StructuredLogger,
) -> Result<u64, WorkloadError> {
    let len = usize::try_from(size_kb.max(0))
        .ok()
        .and_then(|kb| kb.checked_mul(1024))
        .ok_or(WorkloadError::SizeOverflow(size_kb))?;

    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| WorkloadError::SizeOverflow(size_kb))?;
    data.resize(len, 0u8);
    rand::thread_rng().fill_bytes(&mut data);

    let path = temp_file_path(dir);
    let written = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .and_then(|mut file| file.write_all(&data));

    let result = match written {
        Ok(()) => fs::read(&path)
            .map(|read| read.len() as u64)
            .map_err(|source| WorkloadError::Io {
                stage: IoStage::Read,
                source,
            }),
        Err(source) => Err(WorkloadError::Io {
            stage: IoStage::Write,
            source,
        }),
    };

    if let Err(e) = fs::remove_file(&path) {
        // A failed create leaves nothing to clean up.
        if e.kind() != std::io::ErrorKind::NotFound || result.is_ok() {
            logger
                .warn_builder("Temp file cleanup failed")
                .field("path", path.display().to_string())
                .field("error", e.to_string())
                .emit();
        }
    }

    result
}

/// A collision-resistant temp file path under `dir`.
pub fn temp_file_path(dir: &Path) -> PathBuf {
    dir.join(format!("{}{}.tmp", TEMP_FILE_PREFIX, Uuid::now_v7().simple()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use edge_core::{ParameterDefaults, RequestId};
    use edge_observability::{LogLevel, LogSink};

    use super::*;
    use crate::delay::InstanceDelay;

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("edge-runner-{}", Uuid::now_v7().simple()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn logger() -> StructuredLogger {
        let (sink, _) = LogSink::capture();
        StructuredLogger::new(RequestId::generate()).with_sink(sink)
    }

    fn params(query: &str) -> RequestParameters {
        RequestParameters::parse(query, &ParameterDefaults::default())
    }

    #[test]
    fn test_cpu_workload_accumulates() {
        assert_eq!(cpu_workload(0), 0.0);
        assert_eq!(cpu_workload(-10), 0.0);

        let expected = 1.0 / 2.0_f64.ln() + 2.0_f64.sqrt() / 3.0_f64.ln();
        assert!((cpu_workload(2) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_io_workload_round_trip() {
        let dir = scratch_dir();
        let bytes = io_workload(&dir, 64, &logger()).unwrap();
        assert_eq!(bytes, 64 * 1024);
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
        fs::remove_dir_all(&dir).unwrap();
    }

    fn median(mut samples: Vec<Duration>) -> Duration {
        samples.sort();
        samples[samples.len() / 2]
    }

    #[test]
    fn test_io_workload_costs_like_plain_write_read() {
        let dir = scratch_dir();
        let logger = logger();
        let payload = vec![7u8; 64 * 1024];
        let mut plain = Vec::new();
        let mut workload = Vec::new();

        for _ in 0..25 {
            let start = Instant::now();
            let path = temp_file_path(&dir);
            fs::write(&path, &payload).unwrap();
            assert_eq!(fs::read(&path).unwrap().len(), payload.len());
            fs::remove_file(&path).unwrap();
            plain.push(start.elapsed());

            let start = Instant::now();
            io_workload(&dir, 64, &logger).unwrap();
            workload.push(start.elapsed());
        }

        let plain = median(plain);
        let workload = median(workload);
        assert!(
            workload <= plain * 3 + Duration::from_micros(250),
            "io {workload:?} vs plain write/read {plain:?}"
        );
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_io_workload_negative_size_is_empty() {
        let dir = scratch_dir();
        assert_eq!(io_workload(&dir, -4, &logger()).unwrap(), 0);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_io_workload_missing_dir_fails_on_write() {
        let dir = std::env::temp_dir().join(format!("edge-missing-{}", Uuid::now_v7().simple()));
        let (sink, entries) = LogSink::capture();
        let logger = StructuredLogger::new(RequestId::generate())
            .with_min_level(LogLevel::Debug)
            .with_sink(sink);

        let err = io_workload(&dir, 1, &logger).unwrap_err();
        assert!(matches!(
            err,
            WorkloadError::Io {
                stage: IoStage::Write,
                ..
            }
        ));
        assert!(entries.lock().unwrap().is_empty());
    }

    #[test]
    fn test_temp_file_paths_unique() {
        let dir = std::env::temp_dir();
        let paths: HashSet<_> = (0..1000).map(|_| temp_file_path(&dir)).collect();
        assert_eq!(paths.len(), 1000);
        assert!(paths.iter().all(|p| p.starts_with(&dir)));
    }

    #[tokio::test]
    async fn test_run_none_is_fast() {
        let runner = WorkloadRunner::new(scratch_dir(), Arc::new(InstanceDelay));
        let outcome = runner
            .run(&params("workload=nope&iterations=999999999&delayMs=5000"), &logger())
            .await
            .unwrap();
        assert!(outcome.elapsed < Duration::from_millis(50));
        assert_eq!(outcome.io_bytes, None);
        fs::remove_dir_all(runner.temp_dir()).unwrap();
    }

    #[tokio::test]
    async fn test_run_delay_skips_non_positive() {
        let runner = WorkloadRunner::new(std::env::temp_dir(), Arc::new(InstanceDelay));
        let outcome = runner
            .run(&params("workload=delay&delayMs=-100"), &logger())
            .await
            .unwrap();
        assert!(outcome.elapsed < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_run_io_reports_bytes() {
        let runner = WorkloadRunner::new(scratch_dir(), Arc::new(InstanceDelay));
        let outcome = runner
            .run(&params("workload=io&sizeKb=2"), &logger())
            .await
            .unwrap();
        assert_eq!(outcome.io_bytes, Some(2048));
        fs::remove_dir_all(runner.temp_dir()).unwrap();
    }
}

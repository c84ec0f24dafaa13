//! Delay strategies for the `delay` workload.

use std::time::Duration;

use async_trait::async_trait;

/// Suspends the current invocation.
///
/// Implementations must not hold up other invocations served by the same
/// host while they wait.
#[async_trait]
pub trait Delay: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer, yielding the worker thread.
#[cfg(feature = "tokio")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[cfg(feature = "tokio")]
#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Parks the calling thread.
///
/// Only suitable where each invocation owns its thread or instance, such as
/// a Spin component where every request gets a fresh instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstanceDelay;

#[async_trait]
impl Delay for InstanceDelay {
    async fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

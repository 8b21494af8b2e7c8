//! Background task management
//!
//! Registration, startup and shutdown of every background task.
//!
//! # Task kinds
//!
//! - [`TaskKind::Warmup`] - runs once shortly after startup
//! - [`TaskKind::Periodic`] - interval driven, runs until shutdown

use futures::FutureExt;
use std::fmt;
use std::panic::AssertUnwindSafe;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Runs once
    Warmup,
    /// Runs on an interval until shutdown
    Periodic,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Warmup => write!(f, "Warmup"),
            TaskKind::Periodic => write!(f, "Periodic"),
        }
    }
}

struct RegisteredTask {
    name: &'static str,
    kind: TaskKind,
    handle: JoinHandle<()>,
}

/// Background task registry
///
/// # Example
///
/// ```ignore
/// let mut tasks = BackgroundTasks::new();
/// let token = tasks.shutdown_token();
///
/// tasks.spawn("retry_sweep", TaskKind::Periodic, async move {
///     monitor.run_retry_loop(token).await;
/// });
///
/// tasks.shutdown().await;
/// ```
pub struct BackgroundTasks {
    tasks: Vec<RegisteredTask>,
    shutdown: CancellationToken,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Token that tasks watch for the shutdown signal
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Register and start a background task
    ///
    /// The future is wrapped so that a panic is caught and logged instead of
    /// silently killing the task.
    pub fn spawn<F>(&mut self, name: &'static str, kind: TaskKind, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let shutdown = self.shutdown.clone();
        let wrapped_future = async move {
            let result: Result<(), Box<dyn std::any::Any + Send>> =
                AssertUnwindSafe(future).catch_unwind().await;
            match result {
                Ok(()) => {
                    if kind != TaskKind::Warmup && !shutdown.is_cancelled() {
                        tracing::warn!(task = %name, kind = %kind, "Background task completed unexpectedly");
                    }
                }
                Err(panic_info) => {
                    let panic_msg: String = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        (*s).to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    tracing::error!(
                        task = %name,
                        kind = %kind,
                        panic = %panic_msg,
                        "Background task panicked"
                    );
                }
            }
        };

        let handle = tokio::spawn(wrapped_future);
        tracing::debug!(task = %name, kind = %kind, "Registered background task");
        self.tasks.push(RegisteredTask { name, kind, handle });
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Task count as (warmup, periodic)
    pub fn count_by_kind(&self) -> (usize, usize) {
        self.tasks.iter().fold((0, 0), |(w, p), t| match t.kind {
            TaskKind::Warmup => (w + 1, p),
            TaskKind::Periodic => (w, p + 1),
        })
    }

    pub fn log_summary(&self) {
        let (warmup, periodic) = self.count_by_kind();
        tracing::info!(
            "Background tasks registered: {} total (Periodic: {}, Warmup: {})",
            self.tasks.len(),
            periodic,
            warmup
        );
    }

    /// Number of periodic tasks that stopped before shutdown
    pub fn check_health(&self) -> usize {
        let failed = self
            .tasks
            .iter()
            .filter(|t| t.kind == TaskKind::Periodic && t.handle.is_finished())
            .inspect(|t| {
                tracing::error!(task = %t.name, kind = %t.kind, "Background task unexpectedly finished");
            })
            .count();
        if failed > 0 {
            tracing::error!(
                failed,
                total = self.tasks.len(),
                "Background task health check: {} task(s) failed",
                failed
            );
        }
        failed
    }

    /// Graceful shutdown: cancel every task and wait for it
    pub async fn shutdown(self) {
        tracing::info!("Shutting down {} background tasks...", self.tasks.len());

        self.shutdown.cancel();

        for task in self.tasks {
            match task.handle.await {
                Ok(()) => {
                    tracing::debug!(task = %task.name, "Task completed");
                }
                Err(e) if e.is_cancelled() => {
                    tracing::debug!(task = %task.name, "Task cancelled");
                }
                Err(e) => {
                    tracing::error!(task = %task.name, error = ?e, "Task panicked");
                }
            }
        }

        tracing::info!("All background tasks stopped");
    }
}

impl Default for BackgroundTasks {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_spawn_and_shutdown() {
        let mut tasks = BackgroundTasks::new();
        let token = tasks.shutdown_token();
        let ticks = Arc::new(AtomicUsize::new(0));

        let counter = ticks.clone();
        tasks.spawn("ticker", TaskKind::Periodic, async move {
            let mut interval = tokio::time::interval(Duration::from_millis(5));
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => { counter.fetch_add(1, Ordering::SeqCst); }
                }
            }
        });
        tasks.spawn("once", TaskKind::Warmup, async {});

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks.count_by_kind(), (1, 1));

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(tasks.check_health(), 0);

        tasks.shutdown().await;
        assert!(ticks.load(Ordering::SeqCst) > 0);
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let mut tasks = BackgroundTasks::new();
        tasks.spawn("boom", TaskKind::Periodic, async {
            panic!("boom");
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(tasks.check_health(), 1);
        tasks.shutdown().await;
    }
}

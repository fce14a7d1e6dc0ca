//! Tokio runtime wrapper shared by Tiller binaries.
//!
//! Wraps a named multi-thread runtime together with a process-wide
//! [`CancellationToken`], and exposes [`TillerHandle::run_blocking`] as the
//! one sanctioned way to run synchronous work (console reads, file I/O)
//! without stalling the cooperative scheduler.

use anyhow::Result;
use std::sync::Arc;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct TillerHandle {
    inner: Handle,
    cancel: Arc<CancellationToken>,
}

pub struct TillerRuntime {
    runtime: Runtime,
    cancel: Arc<CancellationToken>,
}

impl TillerRuntime {
    /// Build a runtime for the Tiller workspace.
    ///
    /// ```
    /// use tiller_runtime::TillerRuntime;
    /// use std::time::Duration;
    ///
    /// let runtime = TillerRuntime::build("doctest-runtime", Some(1)).expect("runtime builds");
    /// assert_eq!(runtime.block_on(async { 2 + 2 }), 4);
    /// runtime.shutdown(Duration::from_millis(10));
    /// ```
    pub fn build(thread_name: &str, worker_threads: Option<usize>) -> Result<Self> {
        let mut builder = Builder::new_multi_thread();
        builder.enable_all().thread_name(thread_name);

        if let Some(workers) = worker_threads {
            builder.worker_threads(workers.max(1));
        }

        Ok(Self {
            runtime: builder.build()?,
            cancel: Arc::new(CancellationToken::new()),
        })
    }

    /// Cloneable handle for spawning tasks and sharing cancellation.
    pub fn handle(&self) -> TillerHandle {
        TillerHandle {
            inner: self.runtime.handle().clone(),
            cancel: self.cancel.clone(),
        }
    }

    /// Run a future to completion on the runtime.
    pub fn block_on<F: std::future::Future>(&self, fut: F) -> F::Output {
        self.runtime.block_on(fut)
    }

    /// Cancel outstanding work and shut the runtime down gracefully.
    pub fn shutdown(self, graceful: std::time::Duration) {
        self.cancel.cancel();
        self.runtime.shutdown_timeout(graceful);
    }
}

impl TillerHandle {
    /// Spawn a future onto the shared runtime.
    pub fn spawn<F, T>(&self, fut: F) -> JoinHandle<T>
    where
        F: std::future::Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.inner.spawn(fut)
    }

    /// Run a blocking closure off the scheduler threads and await its result.
    ///
    /// ```
    /// use tiller_runtime::TillerRuntime;
    /// use std::time::Duration;
    ///
    /// let runtime = TillerRuntime::build("blocking-doctest", Some(1)).unwrap();
    /// let handle = runtime.handle();
    /// let value = runtime.block_on(async move {
    ///     handle.run_blocking(|| 21 * 2).await.unwrap()
    /// });
    /// assert_eq!(value, 42);
    /// runtime.shutdown(Duration::from_millis(10));
    /// ```
    pub async fn run_blocking<F, T>(&self, work: F) -> Result<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let joined = self.inner.spawn_blocking(work).await?;
        Ok(joined)
    }

    /// Clone the shared cancellation token to coordinate shutdown.
    pub fn cancellation(&self) -> Arc<CancellationToken> {
        self.cancel.clone()
    }
}

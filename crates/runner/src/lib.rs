//! Runs long-lived app processes until an operator stops them.
//!
//! - App processes run concurrently, each with a shared `CancellationToken`
//! - SIGINT/SIGTERM cancel the token; so does the first process error
//! - Closers run after every process has stopped, bounded by a timeout
//!
//! # Example
//!
//! ```no_run
//! use hielera_runner::Runner;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let outcome = Runner::new()
//!         .with_named_process("heartbeat", |ctx| {
//!             Box::pin(async move {
//!                 loop {
//!                     tokio::select! {
//!                         _ = ctx.cancelled() => break,
//!                         _ = tokio::time::sleep(Duration::from_secs(1)) => {
//!                             tracing::info!("still alive");
//!                         }
//!                     }
//!                 }
//!                 Ok(())
//!             })
//!         })
//!         .with_closer(|| Box::pin(async move { Ok(()) }))
//!         .run()
//!         .await;
//!
//!     std::process::exit(outcome.exit_code());
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

pub type BoxedProcessFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// An app process: receives the shared cancellation token and runs until it
/// is cancelled or fails
pub type AppProcess = Box<dyn FnOnce(CancellationToken) -> BoxedProcessFuture + Send>;

/// Cleanup executed after all app processes have stopped
pub type Closer = Box<dyn FnOnce() -> BoxedProcessFuture + Send>;

/// How the runner finished
#[derive(Debug)]
pub enum RunOutcome {
    /// Every process stopped without error (normally after a shutdown signal)
    Completed,
    /// A process failed or panicked; carries the first failure
    Failed { process: String, error: anyhow::Error },
}

impl RunOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Completed => 0,
            RunOutcome::Failed { .. } => 1,
        }
    }
}

pub struct Runner {
    app_processes: Vec<(String, AppProcess)>,
    closers: Vec<Closer>,
    closer_timeout: Duration,
    cancellation_token: CancellationToken,
    handle_signals: bool,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner {
    /// Closer timeout defaults to 10 seconds; OS signal handling is on.
    pub fn new() -> Self {
        Self {
            app_processes: Vec::new(),
            closers: Vec::new(),
            closer_timeout: Duration::from_secs(10),
            cancellation_token: CancellationToken::new(),
            handle_signals: true,
        }
    }

    pub fn with_named_process<F>(mut self, name: impl Into<String>, process: F) -> Self
    where
        F: FnOnce(CancellationToken) -> BoxedProcessFuture + Send + 'static,
    {
        self.app_processes.push((name.into(), Box::new(process)));
        self
    }

    pub fn with_closer<F>(mut self, closer: F) -> Self
    where
        F: FnOnce() -> BoxedProcessFuture + Send + 'static,
    {
        self.closers.push(Box::new(closer));
        self
    }

    pub fn with_closer_timeout(mut self, timeout: Duration) -> Self {
        self.closer_timeout = timeout;
        self
    }

    /// Use an externally owned token, e.g. to stop the runner from a test
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    /// Disable SIGINT/SIGTERM handling
    pub fn without_signal_handlers(mut self) -> Self {
        self.handle_signals = false;
        self
    }

    /// Run every process until cancellation or the first failure, then run
    /// the closers.
    pub async fn run(self) -> RunOutcome {
        let token = self.cancellation_token;
        let mut join_set = JoinSet::new();

        for (name, process) in self.app_processes {
            let process_token = token.clone();
            join_set.spawn(async move {
                debug!(process = %name, "starting app process");
                let result = process(process_token).await;
                (name, result)
            });
        }

        if self.handle_signals {
            spawn_signal_handlers(token.clone());
        }

        let mut outcome = RunOutcome::Completed;
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((name, Ok(()))) => {
                    debug!(process = %name, "app process completed");
                }
                Ok((name, Err(err))) => {
                    error!(process = %name, error = format!("{:#}", err), "app process failed");
                    if matches!(outcome, RunOutcome::Completed) {
                        outcome = RunOutcome::Failed {
                            process: name,
                            error: err,
                        };
                    }
                    token.cancel();
                }
                Err(err) => {
                    error!(error = %err, "app process panicked");
                    if matches!(outcome, RunOutcome::Completed) {
                        outcome = RunOutcome::Failed {
                            process: "unknown".to_string(),
                            error: anyhow::anyhow!("app process panicked: {}", err),
                        };
                    }
                    token.cancel();
                }
            }
        }

        if !self.closers.is_empty() {
            info!(timeout = ?self.closer_timeout, "running closers");
            match tokio::time::timeout(self.closer_timeout, run_closers(self.closers)).await {
                Ok(()) => info!("all closers completed"),
                Err(_) => error!(timeout = ?self.closer_timeout, "closers timed out"),
            }
        }

        match &outcome {
            RunOutcome::Completed => info!("application exiting normally"),
            RunOutcome::Failed { process, error } => {
                error!(process = %process, error = format!("{:#}", error), "application exiting with error")
            }
        }
        outcome
    }
}

fn spawn_signal_handlers(token: CancellationToken) {
    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received shutdown signal");
                ctrl_c_token.cancel();
            }
            Err(err) => error!(error = %err, "failed to listen for ctrl-c"),
        }
    });

    #[cfg(unix)]
    tokio::spawn(async move {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("received SIGTERM signal");
                token.cancel();
            }
            Err(err) => error!(error = %err, "failed to install SIGTERM handler"),
        }
    });
}

/// Run every closer concurrently; failures are logged and do not stop the others
async fn run_closers(closers: Vec<Closer>) {
    let mut closer_set = JoinSet::new();
    for closer in closers {
        closer_set.spawn(closer());
    }

    while let Some(result) = closer_set.join_next().await {
        match result {
            Ok(Ok(())) => debug!("closer completed"),
            Ok(Err(err)) => error!(error = format!("{:#}", err), "closer failed"),
            Err(err) => error!(error = %err, "closer panicked"),
        }
    }
}

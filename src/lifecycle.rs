//! Process lifecycle: running until a termination signal, then a bounded drain.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    ShuttingDown,
}

/// Shared view of the process phase. `ShuttingDown` is terminal.
#[derive(Clone)]
pub struct Lifecycle {
    tx: Arc<watch::Sender<Phase>>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Phase::Running);
        Self { tx: Arc::new(tx) }
    }

    pub fn phase(&self) -> Phase {
        *self.tx.borrow()
    }

    /// Moves to `ShuttingDown`. Returns whether this call made the transition.
    pub fn begin_shutdown(&self) -> bool {
        self.tx.send_if_modified(|phase| {
            if *phase == Phase::ShuttingDown {
                return false;
            }
            *phase = Phase::ShuttingDown;
            true
        })
    }

    /// Resolves once the process is shutting down.
    pub async fn shutting_down(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|phase| *phase == Phase::ShuttingDown).await;
    }

    /// Spawns the task that turns the first termination signal into a shutdown.
    pub fn watch_signals(&self) -> tokio::task::JoinHandle<()> {
        let lifecycle = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                signal = termination_signal() => {
                    info!(signal, "termination signal received");
                    lifecycle.begin_shutdown();
                }
                _ = lifecycle.shutting_down() => {}
            }
        })
    }
}

/// Waits for SIGINT or, on Unix, SIGTERM and returns its name.
pub async fn termination_signal() -> &'static str {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drain {
    Completed,
    TimedOut,
}

/// Runs the shutdown `work` for at most `grace`.
pub async fn drain<F>(work: F, grace: Duration) -> Drain
where
    F: Future<Output = ()>,
{
    match tokio::time::timeout(grace, work).await {
        Ok(()) => Drain::Completed,
        Err(_) => {
            warn!(?grace, "shutdown grace period elapsed; exiting with work in flight");
            Drain::TimedOut
        }
    }
}

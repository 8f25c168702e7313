//! Shutdown and Cancellation Coordination
//!
//! Two layers live here:
//!
//! - [`CancellationToken`]: a cheap, cloneable, thread-safe flag that can
//!   also wake a thread parked in [`CancellationToken::sleep`]. Workers use
//!   one each as their "interrupt" so an in-flight blocking wait can be
//!   cancelled from another thread.
//! - [`ShutdownCoordinator`]: process-level signal handling for the CLI.
//!   Each OS signal is turned into a broadcast notification.

use crate::core::sync::lock_recovering;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;

#[derive(Debug, Default)]
struct TokenInner {
    cancelled: AtomicBool,
    lock: Mutex<()>,
    wakeup: Condvar,
}

/// Cloneable cancellation flag shared between a controller and a worker
///
/// Cancellation is one-way: once cancelled a token stays cancelled.
/// Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<TokenInner>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the token and wake every thread sleeping on it
    pub fn cancel(&self) {
        // Release pairs with the Acquire in is_cancelled(); the lock makes
        // sure a sleeper between its predicate check and its wait is not missed
        self.inner.cancelled.store(true, Ordering::Release);
        let _guard = lock_recovering(&self.inner.lock, "cancellation token");
        self.inner.wakeup.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Sleep for `duration`, returning early if the token is cancelled
    ///
    /// Returns `true` when the full duration elapsed without cancellation.
    pub fn sleep(&self, duration: Duration) -> bool {
        if duration.is_zero() {
            return !self.is_cancelled();
        }

        let guard = lock_recovering(&self.inner.lock, "cancellation token");
        let _ = self
            .inner
            .wakeup
            .wait_timeout_while(guard, duration, |_| !self.is_cancelled())
            .unwrap_or_else(PoisonError::into_inner);

        !self.is_cancelled()
    }
}

/// Coordinates graceful shutdown across the application
///
/// Cloned into every signal handler task; each signal becomes one broadcast
/// notification.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    shutdown_tx: broadcast::Sender<()>,
}

impl ShutdownCoordinator {
    /// Create a new shutdown coordinator
    pub fn new() -> (Self, broadcast::Receiver<()>) {
        // Larger than one so bursts of signals are not dropped
        let (shutdown_tx, shutdown_rx) = broadcast::channel(8);
        (Self { shutdown_tx }, shutdown_rx)
    }

    /// Notify every receiver that a shutdown was requested
    pub fn trigger_shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Guard execution of a future with shutdown coordination
    ///
    /// Installs the signal handlers, then hands the closure a receiver that
    /// fires on the first signal.
    pub async fn guard_with_coordinator<F, Fut, R, E>(future_fn: F) -> Result<R, E>
    where
        F: FnOnce(broadcast::Receiver<()>) -> Fut,
        Fut: std::future::Future<Output = Result<R, E>>,
    {
        let (coordinator, shutdown_rx) = Self::new();
        setup_signal_handlers(coordinator);
        future_fn(shutdown_rx).await
    }
}

/// Set up signal handlers for graceful shutdown
///
/// The first signal triggers the coordinator; a second one exits with 130.
fn setup_signal_handlers(coordinator: ShutdownCoordinator) {
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }

        use std::sync::atomic::AtomicUsize;
        use tokio::signal::unix::{signal, SignalKind};
        let signal_count = Arc::new(AtomicUsize::new(0));
        let signals = [
            SignalKind::interrupt(),
            SignalKind::terminate(),
            SignalKind::hangup(),
            SignalKind::quit(),
        ];

        for kind in signals {
            let coordinator = coordinator.clone();
            let sig_ctr = signal_count.clone();

            tokio::spawn(async move {
                if let Ok(mut sig) = signal(kind) {
                    while sig.recv().await.is_some() {
                        let prev = sig_ctr.fetch_add(1, Ordering::AcqRel);
                        coordinator.trigger_shutdown();
                        if prev >= 1 {
                            log::warn!("Second signal received; exiting");
                            std::process::exit(130);
                        }
                    }
                }
            });
        }
    }

    #[cfg(not(unix))]
    {
        tokio::spawn(async move {
            let mut received = 0usize;
            while tokio::signal::ctrl_c().await.is_ok() {
                received += 1;
                coordinator.trigger_shutdown();
                if received > 1 {
                    log::warn!("Ctrl-C received twice; exiting");
                    std::process::exit(130);
                }
            }
        });
    }
}

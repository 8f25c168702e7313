//! State and interface shared by producers and consumers

use crate::core::shutdown::CancellationToken;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Bound required of anything moved through the pipeline
pub trait Item: Clone + Send + Sync + fmt::Debug + 'static {}

impl<T: Clone + Send + Sync + fmt::Debug + 'static> Item for T {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerRole {
    Producer,
    Consumer,
}

impl fmt::Display for WorkerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerRole::Producer => write!(f, "producer"),
            WorkerRole::Consumer => write!(f, "consumer"),
        }
    }
}

/// Control block owned by one worker and readable from any thread
///
/// - `stopped`: cooperative stop flag, checked at the top of every loop
///   iteration.
/// - `interrupt`: cancels the worker's current blocking wait or delay.
///   Does not touch `stopped`.
/// - `processed`: items moved by this worker; only ever incremented.
#[derive(Debug, Default)]
pub struct WorkerControl {
    stopped: AtomicBool,
    interrupt: CancellationToken,
    processed: AtomicUsize,
}

impl WorkerControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    pub fn interrupt_token(&self) -> &CancellationToken {
        &self.interrupt
    }

    /// Count one more item; returns the new total
    pub fn record_item(&self) -> usize {
        self.processed.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::Acquire)
    }
}

/// A pipeline worker that runs on its own thread until done or stopped
pub trait Worker: Send + Sync {
    fn name(&self) -> &str;

    fn role(&self) -> WorkerRole;

    /// Run the worker loop on the calling thread
    ///
    /// Never returns an error: interruptions and failures end the loop and
    /// are reported through the worker's observer.
    fn run(&self);

    /// Ask the worker to leave its loop at the next iteration
    fn stop(&self);

    /// Cancel the worker's in-flight blocking wait
    fn interrupt(&self);

    fn is_stopped(&self) -> bool;

    /// Items this worker has moved so far
    fn processed(&self) -> usize;
}

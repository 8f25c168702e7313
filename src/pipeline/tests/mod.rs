//! Test modules for the pipeline
//!
//! Unit tests for each component live next to the component; these suites
//! exercise producers, consumers and the orchestrator together.


use crate::pipeline::api::{BoundedQueue, Envelope, Worker};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

pub(crate) type TestQueue = Arc<BoundedQueue<Envelope<i64>>>;

pub(crate) fn queue(capacity: usize) -> TestQueue {
    Arc::new(BoundedQueue::new(capacity).unwrap())
}

/// Run `worker` on a fresh thread
pub(crate) fn start<W: Worker + 'static>(worker: &Arc<W>) -> JoinHandle<()> {
    let worker = Arc::clone(worker);
    thread::spawn(move || worker.run())
}

/// `10, 20, ..., n * 10`
pub(crate) fn dataset(n: i64) -> Vec<i64> {
    (1..=n).map(|i| i * 10).collect()
}

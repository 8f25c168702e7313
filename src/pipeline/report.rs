//! Summary of a finished pipeline run

use crate::pipeline::worker::WorkerRole;
use serde::Serialize;

/// Number of sink items copied into [`RunReport::sink_sample`]
pub const SINK_SAMPLE_LEN: usize = 10;

/// Outcome for one worker thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerReport {
    pub name: String,
    pub role: WorkerRole,
    /// Items moved by this worker
    pub items: usize,
    /// The worker's thread panicked; `items` is what it moved before that
    pub panicked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// RFC 3339 start time
    pub started_at: String,
    pub elapsed_ms: u64,
    pub capacity: usize,
    pub source_items: usize,
    pub producers: Vec<WorkerReport>,
    pub consumers: Vec<WorkerReport>,
    pub total_produced: usize,
    pub total_consumed: usize,
    pub sink_items: usize,
    /// Debug rendering of the first sink items, in sink order
    pub sink_sample: Vec<String>,
    /// Envelopes (data or markers) still queued when the run ended
    pub queue_remaining: usize,
    pub peak_queue_len: usize,
    pub shutdown_requested: bool,
}

impl RunReport {
    /// Every source item went through the queue into the sink exactly once
    pub fn is_complete(&self) -> bool {
        self.total_produced == self.source_items
            && self.total_consumed == self.total_produced
            && self.sink_items == self.total_consumed
            && self.queue_remaining == 0
    }

    pub fn panicked_workers(&self) -> impl Iterator<Item = &WorkerReport> {
        self.producers
            .iter()
            .chain(self.consumers.iter())
            .filter(|worker| worker.panicked)
    }
}

//! Worker lifecycle and progress events
//!
//! Producers and consumers never write to the console or the logger
//! directly; they report what happened to a [`WorkerObserver`]. The default
//! [`LoggingObserver`] forwards events to the `log` facade, tests plug in
//! a recording observer instead.

use crate::pipeline::error::PipelineError;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerEventType {
    Started,
    /// Producer enqueued one item
    Produced,
    /// Producer enqueued its shutdown marker
    ShutdownSent,
    /// Consumer stored one item in the sink
    Consumed,
    /// Consumer poll expired with nothing to take
    TimedOut,
    /// Consumer took a shutdown marker
    ShutdownReceived,
    /// Loop left because the stop flag was set
    Stopped,
    /// A blocking wait or delay was interrupted
    Interrupted,
    /// Unexpected failure inside the loop
    Failed,
    Finished,
}

/// One event emitted by a worker
///
/// Borrowed for the duration of [`WorkerObserver::notify`]; observers that
/// keep events must copy what they need.
#[derive(Clone, Copy, Debug)]
pub struct WorkerEvent<'a> {
    pub event_type: WorkerEventType,
    pub worker: &'a str,
    /// Items this worker has moved so far
    pub count: usize,
    pub item: Option<&'a dyn fmt::Debug>,
    pub queue_len: Option<usize>,
    pub error: Option<&'a PipelineError>,
}

impl<'a> WorkerEvent<'a> {
    pub fn new(event_type: WorkerEventType, worker: &'a str, count: usize) -> Self {
        Self {
            event_type,
            worker,
            count,
            item: None,
            queue_len: None,
            error: None,
        }
    }

    pub fn with_item(mut self, item: &'a dyn fmt::Debug) -> Self {
        self.item = Some(item);
        self
    }

    pub fn with_queue_len(mut self, queue_len: usize) -> Self {
        self.queue_len = Some(queue_len);
        self
    }

    pub fn with_error(mut self, error: &'a PipelineError) -> Self {
        self.error = Some(error);
        self
    }
}

/// Receiver of worker events; called on the worker's own thread
pub trait WorkerObserver: Send + Sync {
    fn notify(&self, event: &WorkerEvent<'_>);
}

/// Observer that writes every event through the `log` crate
///
/// Per-item events go to debug, lifecycle to info, interruptions to warn
/// and failures to error.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl WorkerObserver for LoggingObserver {
    fn notify(&self, event: &WorkerEvent<'_>) {
        let worker = event.worker;
        let item = ItemDisplay(event.item);
        match event.event_type {
            WorkerEventType::Started => log::info!("[{}] Started", worker),
            WorkerEventType::Produced => log::debug!(
                "[{}] Produced: {} (queue size: {})",
                worker,
                item,
                event.queue_len.unwrap_or_default()
            ),
            WorkerEventType::ShutdownSent => {
                log::info!("[{}] Added shutdown marker (production complete)", worker)
            }
            WorkerEventType::Consumed => log::debug!(
                "[{}] Consumed: {} (total consumed: {})",
                worker,
                item,
                event.count
            ),
            WorkerEventType::TimedOut => {
                log::debug!("[{}] Timeout waiting for items, checking again", worker)
            }
            WorkerEventType::ShutdownReceived => {
                log::info!("[{}] Received shutdown marker, stopping", worker)
            }
            WorkerEventType::Stopped => log::info!("[{}] Stop requested", worker),
            WorkerEventType::Interrupted => log::warn!("[{}] Interrupted", worker),
            WorkerEventType::Failed => match event.error {
                Some(error) => log::error!("[{}] Error: {}", worker, error),
                None => log::error!("[{}] Error", worker),
            },
            WorkerEventType::Finished => {
                log::info!("[{}] Finished. Total items: {}", worker, event.count)
            }
        }
    }
}

struct ItemDisplay<'a>(Option<&'a dyn fmt::Debug>);

impl fmt::Display for ItemDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(item) => write!(f, "{:?}", item),
            None => write!(f, "-"),
        }
    }
}

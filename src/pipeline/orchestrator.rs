//! Pipeline orchestration: wire workers around one queue and run them
//!
//! Shutdown protocol: producers never enqueue markers themselves. Once every
//! producer thread has joined, the orchestrator enqueues exactly one
//! [`Envelope::Shutdown`] per consumer, then joins the consumers. A marker
//! can therefore never overtake an item that is still being produced.

use crate::core::shutdown::CancellationToken;
use crate::pipeline::consumer::{Consumer, DEFAULT_POLL_TIMEOUT};
use crate::pipeline::envelope::Envelope;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::events::{LoggingObserver, WorkerObserver};
use crate::pipeline::producer::Producer;
use crate::pipeline::queue::{BoundedQueue, WakeWaiters};
use crate::pipeline::report::{RunReport, WorkerReport, SINK_SAMPLE_LEN};
use crate::pipeline::sink::Sink;
use crate::pipeline::source::Source;
use crate::pipeline::worker::{Item, Worker};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Shape of a pipeline run
///
/// Worker `n` (zero-based) pauses for `producer_delays[n]` or
/// `consumer_delays[n]` after each item. Workers past the end of a list use
/// the uniform `producer_delay` or `consumer_delay`; surplus entries are
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub capacity: usize,
    pub producers: usize,
    pub consumers: usize,
    pub producer_delay: Duration,
    pub consumer_delay: Duration,
    pub producer_delays: Vec<Duration>,
    pub consumer_delays: Vec<Duration>,
    /// `None` makes consumers block in `take` indefinitely
    pub poll_timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            capacity: 10,
            producers: 1,
            consumers: 1,
            producer_delay: Duration::ZERO,
            consumer_delay: Duration::ZERO,
            producer_delays: Vec::new(),
            consumer_delays: Vec::new(),
            poll_timeout: Some(DEFAULT_POLL_TIMEOUT),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> PipelineResult<()> {
        if self.capacity == 0 {
            return Err(PipelineError::construction("queue capacity must be at least 1"));
        }
        if self.producers == 0 {
            return Err(PipelineError::construction("at least one producer is required"));
        }
        if self.consumers == 0 {
            return Err(PipelineError::construction("at least one consumer is required"));
        }
        Ok(())
    }

    /// Pause after each item for the producer at `index`
    pub fn producer_delay_for(&self, index: usize) -> Duration {
        self.producer_delays
            .get(index)
            .copied()
            .unwrap_or(self.producer_delay)
    }

    /// Pause after each item for the consumer at `index`
    pub fn consumer_delay_for(&self, index: usize) -> Duration {
        self.consumer_delays
            .get(index)
            .copied()
            .unwrap_or(self.consumer_delay)
    }
}

/// Cloneable handle for requesting a shutdown from another thread
#[derive(Clone)]
pub struct PipelineHandle {
    workers: Vec<Arc<dyn Worker>>,
    queue: Arc<dyn WakeWaiters>,
    injector: CancellationToken,
    shutdown_requested: Arc<AtomicBool>,
}

impl PipelineHandle {
    /// Stop and interrupt every worker and abandon marker injection
    ///
    /// The run still returns a report; items already taken from the source
    /// but not yet enqueued are lost, which the report shows as a count
    /// mismatch.
    pub fn shutdown(&self) {
        if self.shutdown_requested.swap(true, Ordering::AcqRel) {
            return;
        }
        log::warn!("Pipeline shutdown requested, interrupting {} workers", self.workers.len());

        self.injector.cancel();
        for worker in &self.workers {
            worker.stop();
            worker.interrupt();
        }
        self.queue.wake_all();
    }
}

/// A configured set of producers and consumers sharing one bounded queue
pub struct Pipeline<T> {
    config: PipelineConfig,
    source: Arc<Source<T>>,
    sink: Arc<Sink<T>>,
    queue: Arc<BoundedQueue<Envelope<T>>>,
    producers: Vec<Arc<Producer<T>>>,
    consumers: Vec<Arc<Consumer<T>>>,
    injector: CancellationToken,
    shutdown_requested: Arc<AtomicBool>,
}

impl<T: Item> Pipeline<T> {
    /// Build a pipeline whose workers log through [`LoggingObserver`]
    pub fn new(
        config: PipelineConfig,
        source: Arc<Source<T>>,
        sink: Arc<Sink<T>>,
    ) -> PipelineResult<Self> {
        Self::with_observer(config, source, sink, Arc::new(LoggingObserver))
    }

    pub fn with_observer(
        config: PipelineConfig,
        source: Arc<Source<T>>,
        sink: Arc<Sink<T>>,
        observer: Arc<dyn WorkerObserver>,
    ) -> PipelineResult<Self> {
        config.validate()?;
        let queue = Arc::new(BoundedQueue::new(config.capacity)?);

        let producers = (0..config.producers)
            .map(|index| {
                Producer::builder(format!("producer-{}", index + 1))
                    .with_source(Arc::clone(&source))
                    .with_queue(Arc::clone(&queue))
                    .with_delay(config.producer_delay_for(index))
                    .with_emit_shutdown(false)
                    .with_observer(Arc::clone(&observer))
                    .build()
                    .map(Arc::new)
            })
            .collect::<PipelineResult<Vec<_>>>()?;

        let consumers = (0..config.consumers)
            .map(|index| {
                Consumer::builder(format!("consumer-{}", index + 1))
                    .with_sink(Arc::clone(&sink))
                    .with_queue(Arc::clone(&queue))
                    .with_poll_timeout(config.poll_timeout)
                    .with_delay(config.consumer_delay_for(index))
                    .with_observer(Arc::clone(&observer))
                    .build()
                    .map(Arc::new)
            })
            .collect::<PipelineResult<Vec<_>>>()?;

        Ok(Self {
            config,
            source,
            sink,
            queue,
            producers,
            consumers,
            injector: CancellationToken::new(),
            shutdown_requested: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn queue(&self) -> &Arc<BoundedQueue<Envelope<T>>> {
        &self.queue
    }

    pub fn producers(&self) -> &[Arc<Producer<T>>] {
        &self.producers
    }

    pub fn consumers(&self) -> &[Arc<Consumer<T>>] {
        &self.consumers
    }

    pub fn handle(&self) -> PipelineHandle {
        PipelineHandle {
            workers: self.workers(),
            queue: self.queue.clone(),
            injector: self.injector.clone(),
            shutdown_requested: Arc::clone(&self.shutdown_requested),
        }
    }

    fn workers(&self) -> Vec<Arc<dyn Worker>> {
        self.producers
            .iter()
            .map(|p| Arc::clone(p) as Arc<dyn Worker>)
            .chain(self.consumers.iter().map(|c| Arc::clone(c) as Arc<dyn Worker>))
            .collect()
    }

    /// Run every worker to completion on its own thread
    ///
    /// Blocks the calling thread until all workers have joined.
    pub fn run(self) -> PipelineResult<RunReport> {
        let started_at = chrono::Utc::now().to_rfc3339();
        let start = Instant::now();
        log::info!(
            "Starting pipeline: {} producers, {} consumers, capacity {}, {} items",
            self.producers.len(),
            self.consumers.len(),
            self.config.capacity,
            self.source.size()
        );
        for producer in &self.producers {
            log::debug!(
                "{}: delay {:?}, emits shutdown marker: {}",
                producer.name(),
                producer.delay(),
                producer.emits_shutdown()
            );
        }
        for consumer in &self.consumers {
            log::debug!(
                "{}: delay {:?}, poll timeout {:?}",
                consumer.name(),
                consumer.delay(),
                consumer.poll_timeout()
            );
        }

        let mut producer_threads = Vec::with_capacity(self.producers.len());
        let mut consumer_threads = Vec::with_capacity(self.consumers.len());
        let spawned = spawn_group(&self.producers, &mut producer_threads)
            .and_then(|()| spawn_group(&self.consumers, &mut consumer_threads));

        if let Err(error) = spawned {
            log::error!("Failed to start pipeline: {}", error);
            self.handle().shutdown();
            join_all(producer_threads);
            join_all(consumer_threads);
            return Err(error);
        }

        let producer_reports = join_all(producer_threads);
        if self.source.remaining() > 0 {
            log::warn!(
                "Producers stopped with {} items left in the source",
                self.source.remaining()
            );
        }
        log::debug!("All producers finished, sending {} shutdown markers", self.consumers.len());
        self.inject_markers();
        let consumer_reports = join_all(consumer_threads);

        let report = RunReport {
            started_at,
            elapsed_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            capacity: self.config.capacity,
            source_items: self.source.size(),
            total_produced: producer_reports.iter().map(|r| r.items).sum(),
            total_consumed: consumer_reports.iter().map(|r| r.items).sum(),
            producers: producer_reports,
            consumers: consumer_reports,
            sink_items: self.sink.size(),
            sink_sample: self
                .sink
                .head(SINK_SAMPLE_LEN)
                .iter()
                .map(|item| format!("{:?}", item))
                .collect(),
            queue_remaining: self.queue.len(),
            peak_queue_len: self.queue.peak_len(),
            shutdown_requested: self.shutdown_requested.load(Ordering::Acquire),
        };
        log::info!(
            "Pipeline finished in {} ms: produced {}, consumed {}, sink holds {}",
            report.elapsed_ms,
            report.total_produced,
            report.total_consumed,
            report.sink_items
        );
        Ok(report)
    }

    fn inject_markers(&self) {
        for sent in 0..self.consumers.len() {
            match self.queue.put(Envelope::Shutdown, &self.injector) {
                Ok(()) => {}
                Err(PipelineError::Interrupted) => {
                    log::warn!(
                        "Shutdown requested, {} of {} markers sent",
                        sent,
                        self.consumers.len()
                    );
                    return;
                }
                Err(error) => {
                    log::error!("Could not send shutdown marker: {}", error);
                    return;
                }
            }
        }
    }
}

struct WorkerThread {
    worker: Arc<dyn Worker>,
    handle: JoinHandle<()>,
}

fn spawn_worker(worker: Arc<dyn Worker>) -> PipelineResult<WorkerThread> {
    let runner = Arc::clone(&worker);
    let handle = thread::Builder::new()
        .name(worker.name().to_string())
        .spawn(move || runner.run())
        .map_err(|e| PipelineError::ThreadSpawn {
            message: format!("{}: {}", worker.name(), e),
        })?;
    Ok(WorkerThread { worker, handle })
}

fn spawn_group<W: Worker + 'static>(
    workers: &[Arc<W>],
    threads: &mut Vec<WorkerThread>,
) -> PipelineResult<()> {
    for worker in workers {
        threads.push(spawn_worker(Arc::clone(worker) as Arc<dyn Worker>)?);
    }
    Ok(())
}

fn join_all(threads: Vec<WorkerThread>) -> Vec<WorkerReport> {
    threads
        .into_iter()
        .map(|WorkerThread { worker, handle }| {
            let panicked = handle.join().is_err();
            if panicked {
                log::error!("[{}] Worker thread panicked", worker.name());
            }
            WorkerReport {
                name: worker.name().to_string(),
                role: worker.role(),
                items: worker.processed(),
                panicked,
            }
        })
        .collect()
}

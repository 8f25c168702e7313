//! Consumer worker: drains the queue into a [`Sink`]

use crate::pipeline::envelope::Envelope;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::events::{LoggingObserver, WorkerEvent, WorkerEventType, WorkerObserver};
use crate::pipeline::queue::BoundedQueue;
use crate::pipeline::sink::Sink;
use crate::pipeline::worker::{Item, Worker, WorkerControl, WorkerRole};
use std::sync::Arc;
use std::time::Duration;

/// Poll timeout used when the builder is not told otherwise
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(5000);

/// Takes envelopes off the queue and appends their items to a sink until it
/// receives a shutdown marker or is stopped
pub struct Consumer<T> {
    name: String,
    sink: Arc<Sink<T>>,
    queue: Arc<BoundedQueue<Envelope<T>>>,
    /// `None` blocks in `take` indefinitely
    poll_timeout: Option<Duration>,
    delay: Duration,
    observer: Arc<dyn WorkerObserver>,
    control: WorkerControl,
}

/// Builder for [`Consumer`]; sink and queue are required
pub struct ConsumerBuilder<T> {
    name: String,
    sink: Option<Arc<Sink<T>>>,
    queue: Option<Arc<BoundedQueue<Envelope<T>>>>,
    poll_timeout: Option<Duration>,
    delay: Duration,
    observer: Option<Arc<dyn WorkerObserver>>,
}

impl<T: Item> ConsumerBuilder<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sink: None,
            queue: None,
            poll_timeout: Some(DEFAULT_POLL_TIMEOUT),
            delay: Duration::ZERO,
            observer: None,
        }
    }

    pub fn with_sink(mut self, sink: Arc<Sink<T>>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_queue(mut self, queue: Arc<BoundedQueue<Envelope<T>>>) -> Self {
        self.queue = Some(queue);
        self
    }

    /// Bound each wait on the queue; `None` or a zero duration blocks
    /// indefinitely
    pub fn with_poll_timeout(mut self, poll_timeout: Option<Duration>) -> Self {
        self.poll_timeout = poll_timeout.filter(|timeout| !timeout.is_zero());
        self
    }

    /// Pause after every stored item
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn WorkerObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn build(self) -> PipelineResult<Consumer<T>> {
        let sink = self.sink.ok_or_else(|| {
            PipelineError::construction(format!("consumer '{}' has no sink", self.name))
        })?;
        let queue = self.queue.ok_or_else(|| {
            PipelineError::construction(format!("consumer '{}' has no queue", self.name))
        })?;

        Ok(Consumer {
            name: self.name,
            sink,
            queue,
            poll_timeout: self.poll_timeout,
            delay: self.delay,
            observer: self.observer.unwrap_or_else(|| Arc::new(LoggingObserver)),
            control: WorkerControl::new(),
        })
    }
}

impl<T: Item> Consumer<T> {
    pub fn builder(name: impl Into<String>) -> ConsumerBuilder<T> {
        ConsumerBuilder::new(name)
    }

    pub fn poll_timeout(&self) -> Option<Duration> {
        self.poll_timeout
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    fn notify(&self, event: WorkerEvent<'_>) {
        self.observer.notify(&event);
    }

    fn event(&self, event_type: WorkerEventType) -> WorkerEvent<'_> {
        WorkerEvent::new(event_type, &self.name, self.control.processed())
    }

    fn consume(&self) -> PipelineResult<()> {
        let cancel = self.control.interrupt_token();

        while !self.control.is_stopped() {
            let envelope = match self.poll_timeout {
                Some(timeout) => match self.queue.poll(timeout, cancel)? {
                    Some(envelope) => envelope,
                    None => {
                        if !self.control.is_stopped() {
                            self.notify(self.event(WorkerEventType::TimedOut));
                        }
                        continue;
                    }
                },
                None => self.queue.take(cancel)?,
            };

            let item = match envelope {
                Envelope::Shutdown => {
                    self.notify(self.event(WorkerEventType::ShutdownReceived));
                    return Ok(());
                }
                Envelope::Data(item) => item,
            };

            self.sink.add(item.clone());
            let count = self.control.record_item();
            self.notify(
                WorkerEvent::new(WorkerEventType::Consumed, &self.name, count).with_item(&item),
            );

            if !cancel.sleep(self.delay) {
                return Err(PipelineError::Interrupted);
            }
        }

        self.notify(self.event(WorkerEventType::Stopped));
        Ok(())
    }
}

impl<T: Item> Worker for Consumer<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn role(&self) -> WorkerRole {
        WorkerRole::Consumer
    }

    fn run(&self) {
        self.notify(self.event(WorkerEventType::Started));

        match self.consume() {
            Ok(()) => {}
            Err(PipelineError::Interrupted) => {
                self.notify(self.event(WorkerEventType::Interrupted));
            }
            Err(error) => {
                self.notify(self.event(WorkerEventType::Failed).with_error(&error));
            }
        }

        self.notify(self.event(WorkerEventType::Finished));
    }

    fn stop(&self) {
        self.control.request_stop();
    }

    fn interrupt(&self) {
        self.control.interrupt_token().cancel();
        self.queue.wake_all();
    }

    fn is_stopped(&self) -> bool {
        self.control.is_stopped()
    }

    fn processed(&self) -> usize {
        self.control.processed()
    }
}

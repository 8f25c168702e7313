//! Producer worker: moves items from a [`Source`] into the queue

use crate::pipeline::envelope::Envelope;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::events::{LoggingObserver, WorkerEvent, WorkerEventType, WorkerObserver};
use crate::pipeline::queue::BoundedQueue;
use crate::pipeline::source::Source;
use crate::pipeline::worker::{Item, Worker, WorkerControl, WorkerRole};
use std::sync::Arc;
use std::time::Duration;

/// Pulls items from a shared source and enqueues them until the source is
/// exhausted or the producer is stopped
pub struct Producer<T> {
    name: String,
    source: Arc<Source<T>>,
    queue: Arc<BoundedQueue<Envelope<T>>>,
    delay: Duration,
    /// Enqueue one `Shutdown` after a normal finish
    emit_shutdown: bool,
    observer: Arc<dyn WorkerObserver>,
    control: WorkerControl,
}

/// Builder for [`Producer`]; source and queue are required
pub struct ProducerBuilder<T> {
    name: String,
    source: Option<Arc<Source<T>>>,
    queue: Option<Arc<BoundedQueue<Envelope<T>>>>,
    delay: Duration,
    emit_shutdown: bool,
    observer: Option<Arc<dyn WorkerObserver>>,
}

impl<T: Item> ProducerBuilder<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: None,
            queue: None,
            delay: Duration::ZERO,
            emit_shutdown: false,
            observer: None,
        }
    }

    pub fn with_source(mut self, source: Arc<Source<T>>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_queue(mut self, queue: Arc<BoundedQueue<Envelope<T>>>) -> Self {
        self.queue = Some(queue);
        self
    }

    /// Pause after every enqueued item
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Enqueue a single shutdown marker when the source runs dry
    ///
    /// Only meant for one producer feeding consumers directly; with several
    /// producers the marker would overtake items still being produced.
    pub fn with_emit_shutdown(mut self, emit_shutdown: bool) -> Self {
        self.emit_shutdown = emit_shutdown;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn WorkerObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn build(self) -> PipelineResult<Producer<T>> {
        let source = self.source.ok_or_else(|| {
            PipelineError::construction(format!("producer '{}' has no source", self.name))
        })?;
        let queue = self.queue.ok_or_else(|| {
            PipelineError::construction(format!("producer '{}' has no queue", self.name))
        })?;

        Ok(Producer {
            name: self.name,
            source,
            queue,
            delay: self.delay,
            emit_shutdown: self.emit_shutdown,
            observer: self.observer.unwrap_or_else(|| Arc::new(LoggingObserver)),
            control: WorkerControl::new(),
        })
    }
}

impl<T: Item> Producer<T> {
    pub fn builder(name: impl Into<String>) -> ProducerBuilder<T> {
        ProducerBuilder::new(name)
    }

    pub fn emits_shutdown(&self) -> bool {
        self.emit_shutdown
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

    fn produce(&self) -> PipelineResult<()> {
        let cancel = self.control.interrupt_token();

        while !self.control.is_stopped() {
            let Some(item) = self.source.next_item() else {
                break;
            };

            self.queue.put(Envelope::Data(item.clone()), cancel)?;
            let count = self.control.record_item();
            self.notify(
                WorkerEvent::new(WorkerEventType::Produced, &self.name, count)
                    .with_item(&item)
                    .with_queue_len(self.queue.len()),
            );

            if !cancel.sleep(self.delay) {
                return Err(PipelineError::Interrupted);
            }
        }

        if self.control.is_stopped() {
            self.notify(self.event(WorkerEventType::Stopped));
            return Ok(());
        }

        if self.emit_shutdown {
            self.queue.put(Envelope::Shutdown, cancel)?;
            self.notify(self.event(WorkerEventType::ShutdownSent));
        }
        Ok(())
    }
}

impl<T: Item> Worker for Producer<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn role(&self) -> WorkerRole {
        WorkerRole::Producer
    }

    fn run(&self) {
        self.notify(self.event(WorkerEventType::Started));

        match self.produce() {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shutdown::CancellationToken;
    use crate::pipeline::events::recording::RecordingObserver;

    fn queue(capacity: usize) -> Arc<BoundedQueue<Envelope<i32>>> {
        Arc::new(BoundedQueue::new(capacity).unwrap())
    }

    fn drain(queue: &BoundedQueue<Envelope<i32>>) -> Vec<Envelope<i32>> {
        let open = CancellationToken::new();
        let mut out = Vec::new();
        while let Some(envelope) = queue.poll(Duration::ZERO, &open).unwrap() {
            out.push(envelope);
        }
        out
    }

    #[test]
    fn test_build_requires_source() {
        let result = Producer::<i32>::builder("p").with_queue(queue(1)).build();
        match result {
            Err(PipelineError::Construction { message }) => assert!(message.contains("source")),
            Err(other) => panic!("Expected Construction error, got {:?}", other),
            Ok(_) => panic!("Expected Construction error, got a producer"),
        }
    }

    #[test]
    fn test_build_requires_queue() {
        let result = Producer::builder("p")
            .with_source(Arc::new(Source::new(&[1])))
            .build();
        match result {
            Err(PipelineError::Construction { message }) => assert!(message.contains("queue")),
            Err(other) => panic!("Expected Construction error, got {:?}", other),
            Ok(_) => panic!("Expected Construction error, got a producer"),
        }
    }

    #[test]
    fn test_produces_in_source_order_then_marker() {
        let queue = queue(10);
        let producer = Producer::builder("p")
            .with_source(Arc::new(Source::new(&[1, 2, 3])))
            .with_queue(Arc::clone(&queue))
            .with_emit_shutdown(true)
            .build()
            .unwrap();

        producer.run();

        assert_eq!(producer.processed(), 3);
        assert_eq!(
            drain(&queue),
            vec![Envelope::Data(1), Envelope::Data(2), Envelope::Data(3), Envelope::Shutdown]
        );
    }

    #[test]
    fn test_no_marker_unless_configured() {
        let queue = queue(10);
        let producer = Producer::builder("p")
            .with_source(Arc::new(Source::new(&[5])))
            .with_queue(Arc::clone(&queue))
            .build()
            .unwrap();

        assert!(!producer.emits_shutdown());
        producer.run();

        assert_eq!(drain(&queue), vec![Envelope::Data(5)]);
    }

    #[test]
    fn test_empty_source_emits_only_marker() {
        let source: Arc<Source<i32>> = Arc::new(Source::new(&[]));
        let queue = queue(2);
        let observer = Arc::new(RecordingObserver::default());
        let producer = Producer::builder("p")
            .with_source(Arc::clone(&source))
            .with_queue(Arc::clone(&queue))
            .with_emit_shutdown(true)
            .with_observer(observer.clone())
            .build()
            .unwrap();

        producer.run();

        assert_eq!(producer.processed(), 0);
        assert_eq!(source.position(), 0);
        assert_eq!(drain(&queue), vec![Envelope::Shutdown]);
        assert_eq!(observer.count_of(WorkerEventType::Produced), 0);
        assert_eq!(observer.count_of(WorkerEventType::Failed), 0);
    }

    #[test]
    fn test_stopped_before_run_produces_nothing_and_skips_marker() {
        let queue = queue(2);
        let observer = Arc::new(RecordingObserver::default());
        let producer = Producer::builder("p")
            .with_source(Arc::new(Source::new(&[1, 2])))
            .with_queue(Arc::clone(&queue))
            .with_emit_shutdown(true)
            .with_observer(observer.clone())
            .build()
            .unwrap();

        producer.stop();
        producer.run();

        assert!(producer.is_stopped());
        assert_eq!(producer.processed(), 0);
        assert!(queue.is_empty());
        assert_eq!(
            observer.types_for("p"),
            vec![WorkerEventType::Started, WorkerEventType::Stopped, WorkerEventType::Finished]
        );
    }

    #[test]
    fn test_interrupted_put_exits_without_setting_stop() {
        let queue = queue(1);
        queue.put(Envelope::Data(0), &CancellationToken::new()).unwrap();
        let observer = Arc::new(RecordingObserver::default());
        let producer = Arc::new(
            Producer::builder("p")
                .with_source(Arc::new(Source::new(&[1, 2])))
                .with_queue(Arc::clone(&queue))
                .with_observer(observer.clone())
                .build()
                .unwrap(),
        );

        let runner = Arc::clone(&producer);
        let handle = std::thread::spawn(move || runner.run());

        std::thread::sleep(Duration::from_millis(50));
        producer.interrupt();
        handle.join().unwrap();

        assert!(!producer.is_stopped());
        assert_eq!(producer.processed(), 0);
        assert_eq!(observer.count_of(WorkerEventType::Interrupted), 1);
        assert_eq!(drain(&queue), vec![Envelope::Data(0)]);
    }

    #[test]
    fn test_produced_events_carry_items() {
        let observer = Arc::new(RecordingObserver::default());
        let producer = Producer::builder("p")
            .with_source(Arc::new(Source::new(&[7, 8])))
            .with_queue(queue(4))
            .with_observer(observer.clone())
            .build()
            .unwrap();

        producer.run();

        let produced: Vec<_> = observer
            .events()
            .into_iter()
            .filter(|e| e.event_type == WorkerEventType::Produced)
            .map(|e| (e.item.unwrap(), e.count))
            .collect();
        assert_eq!(produced, vec![("7".to_string(), 1), ("8".to_string(), 2)]);
    }
}

//! Public API for the pipeline
//!
//! External modules should import from here rather than directly from the
//! individual pipeline modules.

// Containers at either end and the queue between them
pub use crate::pipeline::envelope::Envelope;
pub use crate::pipeline::queue::BoundedQueue;
pub use crate::pipeline::sink::Sink;
pub use crate::pipeline::source::Source;

// Workers
pub use crate::pipeline::consumer::{Consumer, ConsumerBuilder, DEFAULT_POLL_TIMEOUT};
pub use crate::pipeline::producer::{Producer, ProducerBuilder};
pub use crate::pipeline::worker::{Item, Worker, WorkerRole};

// Orchestration and results
pub use crate::pipeline::orchestrator::{Pipeline, PipelineConfig, PipelineHandle};
pub use crate::pipeline::report::{RunReport, WorkerReport, SINK_SAMPLE_LEN};

// Events
pub use crate::pipeline::events::{LoggingObserver, WorkerEvent, WorkerEventType, WorkerObserver};

// Error handling
pub use crate::pipeline::error::{PipelineError, PipelineResult};

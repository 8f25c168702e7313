//! Bounded Producer/Consumer Pipeline
//!
//! Moves a finite set of items from a [`Source`] to a [`Sink`] through one
//! fixed-capacity queue, using any number of producer and consumer threads.
//!
//! # Overview
//!
//! - **Backpressure**: producers block while the queue is full
//! - **Shutdown markers**: consumers stop on [`Envelope::Shutdown`], which
//!   can never be mistaken for a data item
//! - **Cooperative stop**: every worker checks a stop flag once per item
//! - **Interruptible waits**: blocking queue calls and per-item delays wake
//!   up as soon as the worker is interrupted
//! - **Observability**: workers report progress through a [`WorkerObserver`]
//!
//! # Architecture
//!
//! ```text
//!                    ┌──────────────────────┐
//!                    │   Source (cursor)    │
//!                    └──┬────────────────┬──┘
//!             next_item │                │ next_item
//!                       ▼                ▼
//!             ┌────────────┐      ┌────────────┐
//!             │ producer-1 │      │ producer-2 │
//!             └─────┬──────┘      └─────┬──────┘
//!                   │ put (blocks when full)
//!                   ▼                   ▼
//!         ┌─────────────────────────────────────────┐
//!         │ BoundedQueue<Envelope<T>>  (capacity C) │
//!         │ ┌──────┬──────┬──────┬──────────┬─────┐ │
//!         │ │ Data │ Data │ Data │ Shutdown │ ... │ │
//!         │ └──────┴──────┴──────┴──────────┴─────┘ │
//!         └──────────┬─────────────────┬────────────┘
//!                    │ take / poll     │ take / poll
//!                    ▼                 ▼
//!             ┌────────────┐    ┌────────────┐
//!             │ consumer-1 │    │ consumer-2 │
//!             └─────┬──────┘    └─────┬──────┘
//!                   │ add             │ add
//!                   ▼                 ▼
//!                 ┌─────────────────────┐
//!                 │        Sink         │
//!                 └─────────────────────┘
//! ```
//!
//! The [`Pipeline`] enqueues one `Shutdown` per consumer after all
//! producers have joined.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use handoff::pipeline::api::{Pipeline, PipelineConfig, Sink, Source};
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = Arc::new(Source::new(&[10, 20, 30]));
//! let sink = Arc::new(Sink::new());
//!
//! let config = PipelineConfig {
//!     producers: 2,
//!     consumers: 2,
//!     ..Default::default()
//! };
//! let report = Pipeline::new(config, source, Arc::clone(&sink))?.run()?;
//!
//! assert!(report.is_complete());
//! assert_eq!(sink.size(), 3);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod consumer;
pub mod envelope;
pub mod error;
pub mod events;
pub mod orchestrator;
pub mod producer;
pub mod queue;
pub mod report;
pub mod sink;
pub mod source;
pub mod worker;

pub use consumer::{Consumer, ConsumerBuilder};
pub use envelope::Envelope;
pub use error::{PipelineError, PipelineResult};
pub use events::{LoggingObserver, WorkerEvent, WorkerEventType, WorkerObserver};
pub use orchestrator::{Pipeline, PipelineConfig, PipelineHandle};
pub use producer::{Producer, ProducerBuilder};
pub use queue::BoundedQueue;
pub use report::{RunReport, WorkerReport};
pub use sink::Sink;
pub use source::Source;
pub use worker::Worker;

#[cfg(test)]
mod tests;

//! Queue element type
//!
//! The queue never carries bare items. Each element is either real data or
//! the shutdown marker, so no item value has to be reserved as a sentinel.

/// Element carried by the shared queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope<T> {
    /// A real item moving from a producer to a consumer
    Data(T),
    /// "No more work" for exactly one consumer
    Shutdown,
}

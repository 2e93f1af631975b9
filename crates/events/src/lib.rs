//! `taskhive-events` — pub/sub plumbing for side-channel work.
//!
//! Request handlers publish messages here instead of doing slow or
//! fallible side work inline; background workers subscribe and drain.

pub mod bus;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};

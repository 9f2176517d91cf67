//! Event-driven projection: inbound change events, dispatch to update plans,
//! and queue consumption with bounded redelivery.

pub mod dispatcher;
pub mod event;
pub mod listener;

pub use dispatcher::{DispatchOutcome, EventDispatcher};
pub use event::{ChangeEvent, EventKind};
pub use listener::{
    queue, DeadLetterSink, InMemoryDeadLetter, LoggingDeadLetter, QueueListener, QueueMessage,
    QueueSender, RetryPolicy,
};

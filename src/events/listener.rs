//! Queue consumption with bounded redelivery.
//!
//! Failed events are redelivered after a multiplicatively growing delay,
//! without blocking the consumer. Once the redelivery bound is reached the
//! original message body goes to the dead-letter sink.

use crate::config::QueueConfig;
use crate::events::dispatcher::EventDispatcher;
use crate::events::event::ChangeEvent;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, warn};

/// Redelivery bound and backoff schedule
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_redeliveries: u32,
    pub initial_backoff: Duration,
    pub multiplier: f64,
}

impl RetryPolicy {
    pub fn from_config(config: &QueueConfig) -> Self {
        Self {
            max_redeliveries: config.max_redeliveries,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            multiplier: config.backoff_multiplier,
        }
    }

    /// Delay before the redelivery after `delivery_count` failed attempts
    pub fn delay_for(&self, delivery_count: u32) -> Duration {
        let factor = self.multiplier.powi(delivery_count as i32);
        self.initial_backoff.mul_f64(factor)
    }
}

/// A message as delivered from the queue, with its redelivery count
#[derive(Debug, Clone)]
pub struct QueueMessage {
    pub body: String,
    pub delivery_count: u32,
}

impl QueueMessage {
    pub fn new(body: String) -> Self {
        Self {
            body,
            delivery_count: 0,
        }
    }
}

/// Destination for messages that exhausted their redeliveries
#[async_trait]
pub trait DeadLetterSink: Send + Sync {
    async fn send(&self, body: String);
}

/// Default sink: the message is logged and dropped
pub struct LoggingDeadLetter;

#[async_trait]
impl DeadLetterSink for LoggingDeadLetter {
    async fn send(&self, body: String) {
        error!(body = %body, "message dead-lettered");
    }
}

/// Capturing sink for tests
pub struct InMemoryDeadLetter {
    pub messages: std::sync::Mutex<Vec<String>>,
}

impl InMemoryDeadLetter {
    pub fn new() -> Self {
        Self {
            messages: std::sync::Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryDeadLetter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeadLetterSink for InMemoryDeadLetter {
    async fn send(&self, body: String) {
        self.messages.lock().unwrap().push(body);
    }
}

/// In-process queue handle used by producers (the HTTP ingest endpoint) and
/// by the listener itself for delayed redeliveries
#[derive(Clone)]
pub struct QueueSender {
    tx: mpsc::UnboundedSender<QueueMessage>,
}

impl QueueSender {
    pub fn enqueue(&self, message: QueueMessage) {
        // Receiver dropping means shutdown is in progress
        if self.tx.send(message).is_err() {
            warn!("queue receiver closed, message dropped");
        }
    }
}

pub fn queue() -> (QueueSender, mpsc::UnboundedReceiver<QueueMessage>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (QueueSender { tx }, rx)
}

pub struct QueueListener {
    dispatcher: Arc<EventDispatcher>,
    policy: RetryPolicy,
    dead_letter: Arc<dyn DeadLetterSink>,
    redeliver: QueueSender,
}

impl QueueListener {
    pub fn new(
        dispatcher: Arc<EventDispatcher>,
        policy: RetryPolicy,
        dead_letter: Arc<dyn DeadLetterSink>,
        redeliver: QueueSender,
    ) -> Self {
        Self {
            dispatcher,
            policy,
            dead_letter,
            redeliver,
        }
    }

    /// Consume the queue until the sender side closes
    pub async fn run(&self, mut rx: mpsc::UnboundedReceiver<QueueMessage>) {
        while let Some(message) = rx.recv().await {
            self.handle(message).await;
        }
    }

    async fn handle(&self, message: QueueMessage) {
        let event: ChangeEvent = match serde_json::from_str(&message.body) {
            Ok(event) => event,
            Err(e) => {
                // An unparseable envelope will never succeed on retry
                warn!(error = %e, "discarding malformed event envelope");
                self.dead_letter.send(message.body).await;
                return;
            }
        };

        match self.dispatcher.dispatch(&event).await {
            Ok(_) => {}
            Err(e) => {
                if e.is_transient() {
                    warn!(
                        case_uuid = %event.case_uuid,
                        delivery_count = message.delivery_count,
                        error = %e,
                        "event dispatch failed"
                    );
                } else {
                    error!(
                        case_uuid = %event.case_uuid,
                        delivery_count = message.delivery_count,
                        error = %e,
                        "event dispatch failed"
                    );
                }

                if message.delivery_count >= self.policy.max_redeliveries {
                    self.dead_letter.send(message.body).await;
                    return;
                }

                let delay = self.policy.delay_for(message.delivery_count);
                let redeliver = self.redeliver.clone();
                let redelivery = QueueMessage {
                    body: message.body,
                    delivery_count: message.delivery_count + 1,
                };
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    redeliver.enqueue(redelivery);
                });
            }
        }
    }
}

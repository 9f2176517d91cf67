//! Topic entity attached to a case.
//!
//! The label is resolved from the external lookup service when the topic is
//! attached, and is static from then on (no rename).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Topic {
    /// Topic identity
    pub uuid: Uuid,

    /// Topic label
    pub text: String,
}

impl Topic {
    pub fn new(uuid: Uuid, text: impl Into<String>) -> Self {
        Self {
            uuid,
            text: text.into(),
        }
    }
}

/// Payload of CASE_TOPIC_CREATED / CASE_TOPIC_DELETED events. Only the UUID
/// is carried; the label comes from the lookup service.
#[derive(Debug, Clone, Deserialize)]
pub struct TopicRef {
    pub uuid: Uuid,
}

//! Inbound change events.
//!
//! Every event carries the case identity, a type tag, and an opaque data
//! payload whose shape depends on the tag. The payload is kept as a raw
//! string here and only parsed once the tag is known.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

/// A single case mutation notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Case the mutation applies to
    #[serde(rename = "caseUUID")]
    pub case_uuid: Uuid,

    /// Event type tag; absent tags are skipped, not failed
    #[serde(rename = "type", default)]
    pub event_type: Option<String>,

    /// Raw payload, parsed according to the tag
    #[serde(default)]
    pub data: String,
}

/// The recognised event tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    CaseCreated,
    CaseUpdated,
    CaseDeleted,
    CaseCompleted,
    CaseTopicCreated,
    CaseTopicDeleted,
    CorrespondentCreated,
    CorrespondentUpdated,
    CorrespondentDeleted,
    SomuItemCreated,
    SomuItemUpdated,
    SomuItemDeleted,
}

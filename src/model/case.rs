//! The case document and the scalar payload carried by case lifecycle events.

use crate::model::{Correspondent, SomuItem, Topic};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// One logical document per case UUID, keyed by that UUID as the store's
/// document id. Owned exclusively by the indexing pipeline: after creation
/// every mutation is a partial patch, never a wholesale replace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaseDocument {
    /// Case identity (immutable)
    #[serde(rename = "caseUUID")]
    pub case_uuid: Option<Uuid>,

    /// Case type code
    #[serde(rename = "type")]
    pub case_type: Option<String>,

    /// Case reference in the current format
    pub reference: Option<String>,

    /// Legacy-system reference carried by migrated cases
    pub migrated_reference: Option<String>,

    /// Creation timestamp
    pub created: Option<DateTime<Utc>>,

    /// Deadline date
    pub case_deadline: Option<NaiveDate>,

    /// Receipt date
    pub date_received: Option<NaiveDate>,

    /// Primary topic reference
    pub primary_topic: Option<Uuid>,

    /// Primary correspondent reference
    pub primary_correspondent: Option<Uuid>,

    /// Soft-delete marker; excludes the case from default search results
    /// but the document is retained
    pub deleted: bool,

    /// Completion marker; absent on the wire when false
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub completed: bool,

    /// Ad-hoc searchable data fields
    pub data: HashMap<String, String>,

    /// Presently-attached correspondents, keyed by UUID
    pub current_correspondents: Vec<Correspondent>,

    /// Every correspondent ever attached, keyed by UUID; DELETE never
    /// removes from this set
    pub all_correspondents: Vec<Correspondent>,

    /// Presently-attached topics, keyed by UUID
    pub current_topics: Vec<Topic>,

    /// Every topic ever attached, keyed by UUID
    pub all_topics: Vec<Topic>,

    /// Ad-hoc somu items; removal here is real deletion
    pub all_somu_items: Vec<SomuItem>,
}

/// Scalar payload of CASE_CREATED / CASE_UPDATED events. Every field is
/// optional: a partial DTO must never null out existing document values, so
/// absent and blank fields are stripped before any patch is dispatched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaseData {
    #[serde(rename = "type")]
    pub case_type: Option<String>,

    pub reference: Option<String>,

    pub migrated_reference: Option<String>,

    pub created: Option<DateTime<Utc>>,

    pub case_deadline: Option<NaiveDate>,

    pub date_received: Option<NaiveDate>,

    pub primary_topic: Option<Uuid>,

    pub primary_correspondent: Option<Uuid>,

    pub completed: Option<bool>,

    pub deleted: Option<bool>,

    pub data: Option<HashMap<String, String>>,
}

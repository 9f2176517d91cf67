//! Ad-hoc "somu" items: structurally arbitrary payloads keyed by UUID in a
//! single collection (no current/all distinction; removal is real deletion).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SomuItem {
    /// Item identity
    pub uuid: Uuid,

    /// Foreign key to the somu schema this item conforms to
    pub somu_type_uuid: Uuid,

    /// Opaque payload
    #[serde(default)]
    pub data: Value,
}

/// Payload of SOMU_ITEM_DELETED events
#[derive(Debug, Clone, Deserialize)]
pub struct SomuItemRef {
    pub uuid: Uuid,
}

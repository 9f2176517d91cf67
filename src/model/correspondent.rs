//! Correspondent entity attached to a case.
//!
//! Membership equality in both the current and historical collections is by
//! UUID only, never by full-value equality.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Correspondent {
    /// Correspondent identity
    pub uuid: Option<Uuid>,

    /// Creation timestamp
    pub created: Option<DateTime<Utc>>,

    /// Correspondent type (e.g. MEMBER, CONSTITUENT)
    #[serde(rename = "type")]
    pub correspondent_type: Option<String>,

    /// Full name
    pub fullname: Option<String>,

    /// Address
    pub postcode: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub address3: Option<String>,
    pub country: Option<String>,

    /// Contact details
    pub telephone: Option<String>,
    pub email: Option<String>,

    /// Free-text reference
    pub reference: Option<String>,

    /// Key in an external system
    pub external_key: Option<String>,
}

/// Minimal deletion payload: only the identity is carried
#[derive(Debug, Clone, Deserialize)]
pub struct CorrespondentRef {
    pub uuid: Uuid,
}

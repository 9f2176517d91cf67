//! Inbound search request: every field optional, blank fields ignored.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Inclusive receipt-date range; either bound may be absent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchRequest {
    /// Case reference substring
    pub reference: Option<String>,

    /// Case type codes to search
    pub case_type: Option<Vec<String>>,

    /// Receipt date range
    pub date_received: Option<DateRange>,

    /// Correspondent sub-field criteria, each scoped to a single current
    /// correspondent entry
    pub correspondent_name: Option<String>,
    pub correspondent_name_not_member: Option<String>,
    pub correspondent_reference: Option<String>,
    pub correspondent_external_key: Option<String>,
    pub correspondent_address1: Option<String>,
    pub correspondent_email: Option<String>,
    pub correspondent_postcode: Option<String>,

    /// Current topic label
    pub topic: Option<String>,

    /// Private office team, subject to the override cascade
    pub po_team_uuid: Option<String>,

    /// Ad-hoc data field criteria
    pub data: Option<HashMap<String, String>>,

    /// When true, excludes completed cases
    pub active_only: Option<bool>,
}

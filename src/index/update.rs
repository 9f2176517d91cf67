//! Partial update planning: the smallest possible write for a mutation.
//!
//! Scalar case mutations become field-map patches containing only the fields
//! the payload actually set. Nested-collection mutations become merge
//! scripts, because a field-map patch would replace the entire collection
//! and lose other entries. The planner is pure computation; it never
//! contacts the store.

use crate::error::{AppError, Result};
use crate::model::{CaseData, Correspondent, SomuItem, Topic};
use serde_json::{json, Map, Value};
use uuid::Uuid;

/// Upserts an entry by UUID into both the current and historical
/// correspondent collections, initialising either when absent.
const CORRESPONDENT_UPSERT: &str = "\
if (ctx._source.currentCorrespondents == null) { \
ctx._source.currentCorrespondents = [params.correspondent]; } \
else { ctx._source.currentCorrespondents.removeIf(item -> item.uuid == params.correspondent.uuid); \
ctx._source.currentCorrespondents.add(params.correspondent); } \
if (ctx._source.allCorrespondents == null) { \
ctx._source.allCorrespondents = [params.correspondent]; } \
else { ctx._source.allCorrespondents.removeIf(item -> item.uuid == params.correspondent.uuid); \
ctx._source.allCorrespondents.add(params.correspondent); }";

/// Removes an entry by UUID from the current collection only; the
/// historical collection is append-only.
const CORRESPONDENT_REMOVE: &str = "\
if (ctx._source.currentCorrespondents != null) { \
ctx._source.currentCorrespondents.removeIf(item -> item.uuid == params.uuid); }";

const TOPIC_UPSERT: &str = "\
if (ctx._source.currentTopics == null) { \
ctx._source.currentTopics = [params.topic]; } \
else { ctx._source.currentTopics.removeIf(item -> item.uuid == params.topic.uuid); \
ctx._source.currentTopics.add(params.topic); } \
if (ctx._source.allTopics == null) { \
ctx._source.allTopics = [params.topic]; } \
else { ctx._source.allTopics.removeIf(item -> item.uuid == params.topic.uuid); \
ctx._source.allTopics.add(params.topic); }";

const TOPIC_REMOVE: &str = "\
if (ctx._source.currentTopics != null) { \
ctx._source.currentTopics.removeIf(item -> item.uuid == params.uuid); }";

const SOMU_UPSERT: &str = "\
if (ctx._source.allSomuItems == null) { \
ctx._source.allSomuItems = [params.item]; } \
else { ctx._source.allSomuItems.removeIf(item -> item.uuid == params.item.uuid); \
ctx._source.allSomuItems.add(params.item); }";

const SOMU_REMOVE: &str = "\
if (ctx._source.allSomuItems != null) { \
ctx._source.allSomuItems.removeIf(item -> item.uuid == params.uuid); }";

/// The smallest write for a given mutation: either a field-map patch or a
/// merge script. Every plan is an upsert: the first write for an unseen
/// case UUID creates the document.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdatePlan {
    /// Direct field-map patch; only fields the request actually set
    Patch(Map<String, Value>),

    /// Store-side merge script rewriting a UUID-keyed collection
    Script {
        source: &'static str,
        params: Map<String, Value>,
    },
}

impl UpdatePlan {
    /// Render the plan as a store `_update` request body
    pub fn to_request_body(&self) -> Value {
        match self {
            UpdatePlan::Patch(fields) => json!({
                "doc": fields,
                "doc_as_upsert": true,
            }),
            UpdatePlan::Script { source, params } => json!({
                "scripted_upsert": true,
                "upsert": {},
                "script": {
                    "lang": "painless",
                    "source": source,
                    "params": params,
                },
            }),
        }
    }
}

/// Plan a scalar case patch from a (possibly partial) payload.
///
/// Nulls and blank strings are stripped so a partial DTO never nulls out
/// existing values; `completed=false` is stripped so "not completed" is
/// represented by field absence.
pub fn case_upsert(data: &CaseData) -> Result<UpdatePlan> {
    let value = serde_json::to_value(data)?;
    let Value::Object(fields) = value else {
        return Err(AppError::Internal(
            "case payload did not serialize to an object".to_string(),
        ));
    };

    let mut patch = Map::new();
    for (key, value) in fields {
        match value {
            Value::Null => {}
            Value::String(s) if s.trim().is_empty() => {}
            Value::Bool(false) if key == "completed" => {}
            Value::Object(map) if key == "data" => {
                let stripped: Map<String, Value> = map
                    .into_iter()
                    .filter(|(_, v)| !matches!(v, Value::Null) && !is_blank(v))
                    .collect();
                if !stripped.is_empty() {
                    patch.insert(key, Value::Object(stripped));
                }
            }
            other => {
                patch.insert(key, other);
            }
        }
    }

    Ok(UpdatePlan::Patch(patch))
}

/// Soft delete: the document is retained but excluded from default results
pub fn case_soft_delete() -> UpdatePlan {
    let mut patch = Map::new();
    patch.insert("deleted".to_string(), Value::Bool(true));
    UpdatePlan::Patch(patch)
}

/// Mark a case completed
pub fn case_complete() -> UpdatePlan {
    let mut patch = Map::new();
    patch.insert("completed".to_string(), Value::Bool(true));
    UpdatePlan::Patch(patch)
}

/// Upsert a correspondent into both collections in one atomic update call
pub fn correspondent_upsert(correspondent: &Correspondent) -> Result<UpdatePlan> {
    let uuid = correspondent.uuid.ok_or_else(|| {
        AppError::Validation("correspondent payload is missing a uuid".to_string())
    })?;

    let mut params = Map::new();
    params.insert(
        "correspondent".to_string(),
        serde_json::to_value(correspondent)?,
    );
    tracing::trace!(correspondent_uuid = %uuid, "planned correspondent upsert");

    Ok(UpdatePlan::Script {
        source: CORRESPONDENT_UPSERT,
        params,
    })
}

/// Remove a correspondent from the current collection only
pub fn correspondent_remove(uuid: Uuid) -> UpdatePlan {
    UpdatePlan::Script {
        source: CORRESPONDENT_REMOVE,
        params: uuid_params(uuid),
    }
}

/// Upsert a topic into both collections in one atomic update call
pub fn topic_upsert(topic: &Topic) -> Result<UpdatePlan> {
    let mut params = Map::new();
    params.insert("topic".to_string(), serde_json::to_value(topic)?);

    Ok(UpdatePlan::Script {
        source: TOPIC_UPSERT,
        params,
    })
}

/// Remove a topic from the current collection only
pub fn topic_remove(uuid: Uuid) -> UpdatePlan {
    UpdatePlan::Script {
        source: TOPIC_REMOVE,
        params: uuid_params(uuid),
    }
}

/// Upsert a somu item into the single item collection
pub fn somu_upsert(item: &SomuItem) -> Result<UpdatePlan> {
    let mut params = Map::new();
    params.insert("item".to_string(), serde_json::to_value(item)?);

    Ok(UpdatePlan::Script {
        source: SOMU_UPSERT,
        params,
    })
}

/// Remove a somu item; removal here is real deletion
pub fn somu_remove(uuid: Uuid) -> UpdatePlan {
    UpdatePlan::Script {
        source: SOMU_REMOVE,
        params: uuid_params(uuid),
    }
}

fn uuid_params(uuid: Uuid) -> Map<String, Value> {
    let mut params = Map::new();
    params.insert("uuid".to_string(), Value::String(uuid.to_string()));
    params
}

fn is_blank(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_case_patch_strips_absent_and_blank_fields() {
        let data = CaseData {
            case_type: Some("MIN".to_string()),
            reference: Some("MIN/0123456/26".to_string()),
            migrated_reference: Some("   ".to_string()),
            ..Default::default()
        };

        let plan = case_upsert(&data).unwrap();
        let UpdatePlan::Patch(patch) = plan else {
            panic!("expected a patch");
        };

        assert_eq!(patch.get("type"), Some(&json!("MIN")));
        assert_eq!(patch.get("reference"), Some(&json!("MIN/0123456/26")));
        assert!(!patch.contains_key("migratedReference"));
        assert!(!patch.contains_key("dateReceived"));
        assert!(!patch.contains_key("deleted"));
    }

    #[test]
    fn test_case_patch_strips_completed_false() {
        let data = CaseData {
            completed: Some(false),
            reference: Some("REF".to_string()),
            ..Default::default()
        };

        let UpdatePlan::Patch(patch) = case_upsert(&data).unwrap() else {
            panic!("expected a patch");
        };
        assert!(!patch.contains_key("completed"));

        let data = CaseData {
            completed: Some(true),
            ..Default::default()
        };
        let UpdatePlan::Patch(patch) = case_upsert(&data).unwrap() else {
            panic!("expected a patch");
        };
        assert_eq!(patch.get("completed"), Some(&json!(true)));
    }

    #[test]
    fn test_case_patch_strips_blank_data_entries() {
        let mut map = HashMap::new();
        map.insert("CaseSummary".to_string(), "lost passport".to_string());
        map.insert("Empty".to_string(), " ".to_string());

        let data = CaseData {
            data: Some(map),
            ..Default::default()
        };

        let UpdatePlan::Patch(patch) = case_upsert(&data).unwrap() else {
            panic!("expected a patch");
        };
        let inner = patch.get("data").unwrap().as_object().unwrap();
        assert_eq!(inner.len(), 1);
        assert!(inner.contains_key("CaseSummary"));
    }

    #[test]
    fn test_soft_delete_and_complete_patches() {
        let UpdatePlan::Patch(patch) = case_soft_delete() else {
            panic!("expected a patch");
        };
        assert_eq!(patch.get("deleted"), Some(&json!(true)));
        assert_eq!(patch.len(), 1);

        let UpdatePlan::Patch(patch) = case_complete() else {
            panic!("expected a patch");
        };
        assert_eq!(patch.get("completed"), Some(&json!(true)));
        assert_eq!(patch.len(), 1);
    }

    #[test]
    fn test_correspondent_upsert_rewrites_both_collections() {
        let correspondent = Correspondent {
            uuid: Some(Uuid::new_v4()),
            fullname: Some("Jo Member".to_string()),
            ..Default::default()
        };

        let plan = correspondent_upsert(&correspondent).unwrap();
        let UpdatePlan::Script { source, params } = plan else {
            panic!("expected a script");
        };

        assert!(source.contains("currentCorrespondents"));
        assert!(source.contains("allCorrespondents"));
        assert!(source.contains("removeIf"));
        assert!(params.contains_key("correspondent"));
    }

    #[test]
    fn test_correspondent_upsert_requires_uuid() {
        let err = correspondent_upsert(&Correspondent::default()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_correspondent_remove_touches_current_only() {
        let UpdatePlan::Script { source, .. } = correspondent_remove(Uuid::new_v4()) else {
            panic!("expected a script");
        };
        assert!(source.contains("currentCorrespondents"));
        assert!(!source.contains("allCorrespondents"));
    }

    #[test]
    fn test_topic_remove_touches_current_only() {
        let UpdatePlan::Script { source, .. } = topic_remove(Uuid::new_v4()) else {
            panic!("expected a script");
        };
        assert!(source.contains("currentTopics"));
        assert!(!source.contains("allTopics"));
    }

    #[test]
    fn test_somu_scripts_target_single_collection() {
        let item = SomuItem {
            uuid: Uuid::new_v4(),
            somu_type_uuid: Uuid::new_v4(),
            data: json!({"status": "complete"}),
        };

        let UpdatePlan::Script { source, .. } = somu_upsert(&item).unwrap() else {
            panic!("expected a script");
        };
        assert!(source.contains("allSomuItems"));
        assert!(!source.contains("current"));

        let UpdatePlan::Script { source, .. } = somu_remove(item.uuid) else {
            panic!("expected a script");
        };
        assert!(source.contains("allSomuItems"));
    }

    #[test]
    fn test_patch_request_body_is_doc_as_upsert() {
        let body = case_soft_delete().to_request_body();
        assert_eq!(body["doc"]["deleted"], json!(true));
        assert_eq!(body["doc_as_upsert"], json!(true));
    }

    #[test]
    fn test_script_request_body_is_scripted_upsert() {
        let body = topic_remove(Uuid::new_v4()).to_request_body();
        assert_eq!(body["scripted_upsert"], json!(true));
        assert_eq!(body["upsert"], json!({}));
        assert_eq!(body["script"]["lang"], json!("painless"));
        assert!(body["script"]["params"]["uuid"].is_string());
    }
}

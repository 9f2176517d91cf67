//! Compound boolean query construction.
//!
//! The builder folds a sparse search request into a bool query, one clause
//! per non-empty criterion. Each method consumes and returns the builder and
//! is a no-op when its input is null/blank/empty. `build` always appends the
//! NOT-deleted clause, independent of prior calls.

use crate::search::policy::{FieldQueryPolicy, QueryStrategy};
use crate::search::request::SearchRequest;
use chrono::NaiveDate;
use serde_json::{json, Value};

const PO_TEAM_FIELD: &str = "data.POTeamUUID";
const OVERRIDE_PO_TEAM_FIELD: &str = "data.OverridePOTeamUUID";
const PRIVATE_OFFICE_OVERRIDE_FIELD: &str = "data.PrivateOfficeOverridePOTeamUUID";

/// A finished compound query plus the count of optional criteria that
/// contributed, used by callers to reject empty/unscoped searches.
#[derive(Debug, Clone)]
pub struct CaseSearchQuery {
    pub query: Value,
    clause_count: usize,
}

impl CaseSearchQuery {
    /// Whether any optional criterion contributed a clause (the always-on
    /// NOT-deleted clause does not count)
    pub fn has_clauses(&self) -> bool {
        self.clause_count > 0
    }
}

#[derive(Debug, Clone)]
pub struct CaseQueryBuilder {
    migrated_types: Vec<String>,
    must: Vec<Value>,
    must_not: Vec<Value>,
    clause_count: usize,
}

impl CaseQueryBuilder {
    pub fn new(migrated_types: &[String]) -> Self {
        Self {
            migrated_types: migrated_types.to_vec(),
            must: Vec::new(),
            must_not: Vec::new(),
            clause_count: 0,
        }
    }

    /// Fold a whole request through every criterion method
    pub fn from_request(
        request: &SearchRequest,
        policy: &FieldQueryPolicy,
        migrated_types: &[String],
    ) -> CaseSearchQuery {
        let (from, to) = request
            .date_received
            .as_ref()
            .map(|r| (r.from, r.to))
            .unwrap_or((None, None));

        Self::new(migrated_types)
            .reference(request.reference.as_deref(), request.case_type.as_deref())
            .case_types(request.case_type.as_deref())
            .date_received(from, to)
            .correspondent_name(request.correspondent_name.as_deref())
            .correspondent_name_not_member(request.correspondent_name_not_member.as_deref())
            .correspondent_reference(request.correspondent_reference.as_deref())
            .correspondent_external_key(request.correspondent_external_key.as_deref())
            .correspondent_address1(request.correspondent_address1.as_deref())
            .correspondent_email(request.correspondent_email.as_deref())
            .correspondent_postcode(request.correspondent_postcode.as_deref())
            .topic(request.topic.as_deref())
            .private_office_team(request.po_team_uuid.as_deref())
            .data_fields(request.data.as_ref(), policy)
            .active_only(request.active_only)
            .build()
    }

    /// Substring match on the case reference; migrated case types also
    /// accept an exact match on the legacy reference field.
    pub fn reference(self, reference: Option<&str>, case_types: Option<&[String]>) -> Self {
        let Some(reference) = non_blank(reference) else {
            return self;
        };
        let Some(case_types) = case_types.filter(|t| !t.is_empty()) else {
            return self;
        };

        let wildcard = wildcard_clause("reference", reference);
        let migrated = case_types.iter().any(|t| self.migrated_types.contains(t));

        let clause = if migrated {
            json!({
                "bool": {
                    "should": [
                        wildcard,
                        match_clause("migratedReference", reference),
                    ],
                    "minimum_should_match": 1,
                }
            })
        } else {
            wildcard
        };

        self.push_must(clause)
    }

    /// Exact terms match against the case type
    pub fn case_types(self, case_types: Option<&[String]>) -> Self {
        let Some(case_types) = case_types.filter(|t| !t.is_empty()) else {
            return self;
        };

        self.push_must(json!({ "terms": { "type": case_types } }))
    }

    /// Inclusive range on the receipt date; either bound may be absent
    pub fn date_received(self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        if from.is_none() && to.is_none() {
            return self;
        }

        let mut range = serde_json::Map::new();
        if let Some(from) = from {
            range.insert("gte".to_string(), json!(from));
        }
        if let Some(to) = to {
            range.insert("lte".to_string(), json!(to));
        }

        self.push_must(json!({ "range": { "dateReceived": range } }))
    }

    pub fn correspondent_name(self, value: Option<&str>) -> Self {
        self.correspondent_field("currentCorrespondents.fullname", value, false)
    }

    /// Fullname match that must NOT be a MEMBER, both conditions within the
    /// same nested correspondent entry
    pub fn correspondent_name_not_member(self, value: Option<&str>) -> Self {
        let Some(value) = non_blank(value) else {
            return self;
        };

        let clause = json!({
            "nested": {
                "path": "currentCorrespondents",
                "query": {
                    "bool": {
                        "must": [match_clause("currentCorrespondents.fullname", value)],
                        "must_not": [match_clause("currentCorrespondents.type", "MEMBER")],
                    }
                }
            }
        });

        self.push_must(clause)
    }

    pub fn correspondent_reference(self, value: Option<&str>) -> Self {
        self.correspondent_field("currentCorrespondents.reference", value, false)
    }

    pub fn correspondent_external_key(self, value: Option<&str>) -> Self {
        self.correspondent_field("currentCorrespondents.externalKey", value, false)
    }

    pub fn correspondent_address1(self, value: Option<&str>) -> Self {
        self.correspondent_field("currentCorrespondents.address1", value, true)
    }

    pub fn correspondent_email(self, value: Option<&str>) -> Self {
        self.correspondent_field("currentCorrespondents.email", value, false)
    }

    pub fn correspondent_postcode(self, value: Option<&str>) -> Self {
        self.correspondent_field("currentCorrespondents.postcode", value, true)
    }

    /// Nested match on the current topic label
    pub fn topic(self, value: Option<&str>) -> Self {
        let Some(value) = non_blank(value) else {
            return self;
        };

        let clause = json!({
            "nested": {
                "path": "currentTopics",
                "query": match_clause("currentTopics.text", value),
            }
        });

        self.push_must(clause)
    }

    /// The 3-tier team override cascade: base team assignment, overridden by
    /// the override field, itself overridden by the private-office override.
    ///
    /// Exactly 7 should-clauses, ordered by override precedence. Lower-tier
    /// matches only apply when every higher tier is absent, tested both as
    /// field-does-not-exist and as exists-but-blank (the wildcard-non-empty
    /// check), to match the legacy semantics where a blank string counts as
    /// absent.
    pub fn private_office_team(self, team_uuid: Option<&str>) -> Self {
        let Some(team_uuid) = non_blank(team_uuid) else {
            return self;
        };

        let po = match_clause(PO_TEAM_FIELD, team_uuid);
        let overridden = match_clause(OVERRIDE_PO_TEAM_FIELD, team_uuid);
        let private_office = match_clause(PRIVATE_OFFICE_OVERRIDE_FIELD, team_uuid);

        let should = vec![
            // (i) private-office override wins outright
            private_office,
            // (ii)/(iii) override wins when the private-office field is
            // absent or blank
            json!({ "bool": {
                "must": [overridden.clone()],
                "must_not": [exists_clause(PRIVATE_OFFICE_OVERRIDE_FIELD)],
            }}),
            json!({ "bool": {
                "must": [overridden],
                "must_not": [non_empty_clause(PRIVATE_OFFICE_OVERRIDE_FIELD)],
            }}),
            // (iv)-(vii) base assignment applies when both override fields
            // are absent or blank
            json!({ "bool": {
                "must": [po.clone()],
                "must_not": [
                    exists_clause(OVERRIDE_PO_TEAM_FIELD),
                    exists_clause(PRIVATE_OFFICE_OVERRIDE_FIELD),
                ],
            }}),
            json!({ "bool": {
                "must": [po.clone()],
                "must_not": [
                    exists_clause(OVERRIDE_PO_TEAM_FIELD),
                    non_empty_clause(PRIVATE_OFFICE_OVERRIDE_FIELD),
                ],
            }}),
            json!({ "bool": {
                "must": [po.clone()],
                "must_not": [
                    non_empty_clause(OVERRIDE_PO_TEAM_FIELD),
                    exists_clause(PRIVATE_OFFICE_OVERRIDE_FIELD),
                ],
            }}),
            json!({ "bool": {
                "must": [po],
                "must_not": [
                    non_empty_clause(OVERRIDE_PO_TEAM_FIELD),
                    non_empty_clause(PRIVATE_OFFICE_OVERRIDE_FIELD),
                ],
            }}),
        ];

        self.push_must(json!({ "bool": {
            "should": should,
            "minimum_should_match": 1,
        }}))
    }

    /// Ad-hoc data field criteria; each non-empty entry contributes one
    /// required clause under its configured query strategy
    pub fn data_fields(
        mut self,
        data: Option<&std::collections::HashMap<String, String>>,
        policy: &FieldQueryPolicy,
    ) -> Self {
        let Some(data) = data else {
            return self;
        };

        let mut keys: Vec<&String> = data.keys().collect();
        keys.sort();

        for key in keys {
            let value = &data[key];
            if key.trim().is_empty() || value.trim().is_empty() {
                continue;
            }

            let field = format!("data.{}", key);
            let clause = match policy.strategy_for(key) {
                QueryStrategy::Wildcard => wildcard_clause(&field, value),
                QueryStrategy::Exact => json!({
                    "match": { (field): { "query": value, "operator": "and" } }
                }),
            };
            self = self.push_must(clause);
        }

        self
    }

    /// When true, excludes completed cases; false/absent is a no-op
    pub fn active_only(mut self, flag: Option<bool>) -> Self {
        if flag != Some(true) {
            return self;
        }

        self.clause_count += 1;
        self.must_not.push(match_clause("completed", true));
        self
    }

    /// Finish the query. The required NOT-deleted clause is always
    /// appended, regardless of prior calls.
    pub fn build(mut self) -> CaseSearchQuery {
        self.must_not.push(match_clause("deleted", true));

        CaseSearchQuery {
            query: json!({
                "bool": {
                    "must": self.must,
                    "must_not": self.must_not,
                }
            }),
            clause_count: self.clause_count,
        }
    }

    fn push_must(mut self, clause: Value) -> Self {
        self.clause_count += 1;
        self.must.push(clause);
        self
    }

    /// One correspondent sub-field criterion, scoped to a single nested
    /// entry so the match cannot span correspondents
    fn correspondent_field(self, field: &str, value: Option<&str>, wildcard: bool) -> Self {
        let Some(value) = non_blank(value) else {
            return self;
        };

        let inner = if wildcard {
            wildcard_clause(field, value)
        } else {
            match_clause(field, value)
        };

        let clause = json!({
            "nested": {
                "path": "currentCorrespondents",
                "query": inner,
            }
        });

        self.push_must(clause)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn match_clause(field: &str, value: impl serde::Serialize) -> Value {
    json!({ "match": { (field): value } })
}

fn wildcard_clause(field: &str, value: &str) -> Value {
    json!({ "wildcard": { (field): { "value": format!("*{}*", value) } } })
}

fn exists_clause(field: &str) -> Value {
    json!({ "exists": { "field": field } })
}

/// Exists-but-non-empty: a wildcard-any check, used instead of `exists` to
/// treat a blank string as absent
fn non_empty_clause(field: &str) -> Value {
    json!({ "wildcard": { (field): { "value": "*" } } })
}

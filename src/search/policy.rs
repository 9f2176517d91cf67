//! Per-field query strategy: whether a data field is matched by substring
//! wildcard or by exact token match. Pure lookup, never errors; unmapped
//! fields default to exact match.

use crate::error::{AppError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Embedded default policy table
const DEFAULT_POLICY: &str = include_str!("../../config/field_query_policy.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStrategy {
    Wildcard,
    Exact,
}

#[derive(Debug, Clone)]
pub struct FieldQueryPolicy {
    mappings: HashMap<String, QueryStrategy>,
}

impl FieldQueryPolicy {
    pub fn new(mappings: HashMap<String, QueryStrategy>) -> Self {
        Self { mappings }
    }

    /// Build a policy from the embedded default table
    pub fn embedded() -> Result<Self> {
        Self::from_json(DEFAULT_POLICY)
    }

    /// Build a policy from a JSON table file; missing or invalid files are
    /// fatal at startup
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Configuration(format!(
                "failed to read field query policy {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&raw)
    }

    fn from_json(raw: &str) -> Result<Self> {
        let mappings: HashMap<String, QueryStrategy> = serde_json::from_str(raw)
            .map_err(|e| AppError::Configuration(format!("invalid field query policy: {}", e)))?;

        Ok(Self { mappings })
    }

    /// Strategy for a field label, defaulting to exact match when unmapped
    pub fn strategy_for(&self, field: &str) -> QueryStrategy {
        self.mappings
            .get(field)
            .copied()
            .unwrap_or(QueryStrategy::Exact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_policy() {
        let policy = FieldQueryPolicy::embedded().unwrap();
        assert_eq!(policy.strategy_for("CaseSummary"), QueryStrategy::Wildcard);
        assert_eq!(policy.strategy_for("POTeamUUID"), QueryStrategy::Exact);
    }

    #[test]
    fn test_unmapped_field_defaults_to_exact() {
        let policy = FieldQueryPolicy::new(HashMap::new());
        assert_eq!(policy.strategy_for("anything"), QueryStrategy::Exact);
    }

    #[test]
    fn test_invalid_table_is_configuration_error() {
        let err = FieldQueryPolicy::from_json("{\"f\": \"fuzzy\"}").unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }
}

//! Case type resolution from the short code embedded in a case UUID.
//!
//! Case UUIDs carry a 2-character type short code at a fixed offset of the
//! canonical string form. The resolver maps that short code onto a type name
//! through a static table; a missing entry is a data/config mismatch, fatal
//! for operations that need the type to route an index write.

use crate::error::{AppError, Result};
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

/// Offset of the short code in the canonical (36-character) UUID string
const SHORT_CODE_OFFSET: usize = 34;

/// Embedded default short-code table
const DEFAULT_CASE_TYPES: &str = include_str!("../config/case_types.json");

#[derive(Debug, Clone)]
pub struct CaseTypeResolver {
    mappings: HashMap<String, String>,
}

impl CaseTypeResolver {
    /// Build a resolver from an explicit table
    pub fn new(mappings: HashMap<String, String>) -> Self {
        Self { mappings }
    }

    /// Build a resolver from the embedded default table
    pub fn embedded() -> Result<Self> {
        Self::from_json(DEFAULT_CASE_TYPES)
    }

    /// Build a resolver from a JSON table file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Configuration(format!(
                "failed to read case type table {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&raw)
    }

    fn from_json(raw: &str) -> Result<Self> {
        let mappings: HashMap<String, String> = serde_json::from_str(raw)
            .map_err(|e| AppError::Configuration(format!("invalid case type table: {}", e)))?;

        if mappings.is_empty() {
            return Err(AppError::Configuration(
                "case type table is empty".to_string(),
            ));
        }

        Ok(Self { mappings })
    }

    /// Resolve the case type for a case UUID.
    ///
    /// Fails with `NotFound` when the embedded short code has no table entry.
    pub fn resolve(&self, case_uuid: Uuid) -> Result<&str> {
        let canonical = case_uuid.to_string();
        let short_code = &canonical[SHORT_CODE_OFFSET..SHORT_CODE_OFFSET + 2];

        self.mappings
            .get(short_code)
            .map(String::as_str)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "no case type mapping for short code '{}' (case {})",
                    short_code, case_uuid
                ))
            })
    }
}

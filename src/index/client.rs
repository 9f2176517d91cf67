//! Thin REST client for the Elasticsearch-compatible document store.
//!
//! Only the four operations the router needs: point read, partial update,
//! search, and batched multi-search. Raw reqwest errors never leave this
//! module; everything is mapped onto `StoreError`.

use crate::config::ElasticsearchConfig;
use crate::error::{AppError, Result};
use crate::index::error::{StoreError, StoreResult};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

/// A single raw hit from a search response
#[derive(Debug, Clone)]
pub struct StoreHit {
    /// Store document id
    pub id: String,

    /// Requested `_source` fields (may be empty)
    pub source: Value,
}

pub struct ElasticClient {
    http: Client,
    base_url: String,
}

impl ElasticClient {
    /// Create a client with a call-scoped timeout from configuration
    pub fn new(config: &ElasticsearchConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                AppError::Configuration(format!("failed to create store HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch a document's source by id. `Ok(None)` when the store reports
    /// the document absent.
    pub async fn get_document(&self, alias: &str, id: &str) -> StoreResult<Option<Value>> {
        let url = format!("{}/{}/_doc/{}", self.base_url, alias, id);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(StoreError::from_reqwest)?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))?;

        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                body: body.to_string(),
            });
        }

        if body.get("found").and_then(Value::as_bool) == Some(false) {
            return Ok(None);
        }

        Ok(body.get("_source").cloned())
    }

    /// Apply a partial update (doc patch or script) to a document
    pub async fn update_document(&self, alias: &str, id: &str, body: &Value) -> StoreResult<()> {
        let url = format!("{}/{}/_update/{}", self.base_url, alias, id);

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(StoreError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }

    /// Execute a search against a single alias
    pub async fn search(&self, alias: &str, body: &Value) -> StoreResult<Vec<StoreHit>> {
        let url = format!("{}/{}/_search", self.base_url, alias);

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(StoreError::from_reqwest)?;

        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))?;

        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                body: payload.to_string(),
            });
        }

        Ok(Self::parse_hits(&payload))
    }

    /// Execute one batched multi-search request; one entry in, one hit list
    /// out, positionally. A failed line degrades to an empty hit list.
    pub async fn msearch(&self, targets: &[(String, Value)]) -> StoreResult<Vec<Vec<StoreHit>>> {
        let url = format!("{}/_msearch", self.base_url);

        let mut ndjson = String::new();
        for (alias, body) in targets {
            ndjson.push_str(&serde_json::json!({ "index": alias }).to_string());
            ndjson.push('\n');
            ndjson.push_str(&body.to_string());
            ndjson.push('\n');
        }

        let response = self
            .http
            .post(&url)
            .header("Content-Type", "application/x-ndjson")
            .body(ndjson)
            .send()
            .await
            .map_err(StoreError::from_reqwest)?;

        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))?;

        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                body: payload.to_string(),
            });
        }

        let responses = payload
            .get("responses")
            .and_then(Value::as_array)
            .ok_or_else(|| StoreError::Malformed("missing 'responses' array".to_string()))?;

        let mut results = Vec::with_capacity(responses.len());
        for item in responses {
            if let Some(error) = item.get("error") {
                warn!(error = %error, "multi-search line failed, returning no hits for it");
                results.push(Vec::new());
            } else {
                results.push(Self::parse_hits(item));
            }
        }

        Ok(results)
    }

    fn parse_hits(payload: &Value) -> Vec<StoreHit> {
        payload
            .pointer("/hits/hits")
            .and_then(Value::as_array)
            .map(|hits| {
                hits.iter()
                    .filter_map(|hit| {
                        let id = hit.get("_id").and_then(Value::as_str)?.to_string();
                        let source = hit.get("_source").cloned().unwrap_or(Value::Null);
                        Some(StoreHit { id, source })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_hits() {
        let payload = json!({
            "hits": {
                "total": {"value": 2},
                "hits": [
                    {"_id": "a", "_source": {"type": "MIN"}},
                    {"_id": "b"},
                ]
            }
        });

        let hits = ElasticClient::parse_hits(&payload);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "a");
        assert_eq!(hits[0].source["type"], "MIN");
        assert!(hits[1].source.is_null());
    }

    #[test]
    fn test_parse_hits_empty_payload() {
        assert!(ElasticClient::parse_hits(&json!({})).is_empty());
    }
}

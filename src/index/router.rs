//! Index routing: resolves read/write targets for a case type under the
//! active topology and executes store operations.
//!
//! Two interchangeable strategies, selected by configuration:
//!
//! - **Singular**: one physical index for all cases; the case type is
//!   ignored for routing but kept for interface symmetry.
//! - **Per-type**: writes target a type-scoped write alias, point reads a
//!   type-scoped read alias, broad searches a global read alias, and
//!   multi-search issues one batched request per requested type.
//!
//! Point reads and updates surface store failures to the caller; searches
//! must never hard-fail and degrade to an empty result set, logged.

use crate::config::{ElasticsearchConfig, IndexTopology};
use crate::error::{AppError, Result};
use crate::index::client::{ElasticClient, StoreHit};
use crate::index::update::UpdatePlan;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// A search hit tagged with its originating case type where known
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseSearchHit {
    pub case_uuid: Uuid,
    pub case_type: Option<String>,
}

/// Read/write target resolution plus store execution for one topology
#[async_trait]
pub trait IndexRouter: Send + Sync {
    /// Point read of a case document. A missing document is a `NotFound`
    /// error, surfaced and not retried.
    async fn find_by_id(&self, case_type: &str, case_uuid: Uuid) -> Result<Value>;

    /// Apply a partial update. Every update is an upsert: the first write
    /// for an unseen UUID creates the document.
    async fn update(&self, case_type: &str, case_uuid: Uuid, plan: &UpdatePlan) -> Result<()>;

    /// Broad search across all case types. Failures (including timeouts)
    /// degrade to an empty result set.
    async fn search(&self, query: &Value) -> Vec<CaseSearchHit>;

    /// One batched round trip over the given (case type, query) pairs, hits
    /// tagged with their originating type. Failures degrade to empty.
    async fn multi_search(&self, queries: &[(String, Value)]) -> Vec<CaseSearchHit>;
}

/// Build the configured router strategy
pub fn build_router(
    client: Arc<ElasticClient>,
    config: &ElasticsearchConfig,
) -> Arc<dyn IndexRouter> {
    match config.topology {
        IndexTopology::Singular => Arc::new(SingularIndexRouter::new(client, config)),
        IndexTopology::PerType => Arc::new(PerTypeIndexRouter::new(client, config)),
    }
}

fn search_body(query: &Value, max_results: usize) -> Value {
    // The result cap truncates oversized result sets silently.
    json!({
        "query": query,
        "size": max_results,
        "_source": ["type"],
    })
}

fn hit_to_case(hit: &StoreHit, tagged_type: Option<&str>) -> Option<CaseSearchHit> {
    let case_uuid = match hit.id.parse::<Uuid>() {
        Ok(uuid) => uuid,
        Err(_) => {
            warn!(doc_id = %hit.id, "search hit with a non-UUID document id, skipping");
            return None;
        }
    };

    let case_type = tagged_type
        .map(str::to_string)
        .or_else(|| {
            hit.source
                .get("type")
                .and_then(Value::as_str)
                .map(str::to_string)
        });

    Some(CaseSearchHit {
        case_uuid,
        case_type,
    })
}

/// One shared index for all cases
pub struct SingularIndexRouter {
    client: Arc<ElasticClient>,
    alias: String,
    max_results: usize,
}

impl SingularIndexRouter {
    pub fn new(client: Arc<ElasticClient>, config: &ElasticsearchConfig) -> Self {
        Self {
            client,
            alias: format!("{}-case", config.index_prefix),
            max_results: config.max_results,
        }
    }
}

#[async_trait]
impl IndexRouter for SingularIndexRouter {
    async fn find_by_id(&self, _case_type: &str, case_uuid: Uuid) -> Result<Value> {
        let id = case_uuid.to_string();
        let source = self.client.get_document(&self.alias, &id).await?;

        source.ok_or_else(|| AppError::NotFound(format!("case {} not found", case_uuid)))
    }

    async fn update(&self, _case_type: &str, case_uuid: Uuid, plan: &UpdatePlan) -> Result<()> {
        let body = plan.to_request_body();
        self.client
            .update_document(&self.alias, &case_uuid.to_string(), &body)
            .await?;

        debug!(case_uuid = %case_uuid, alias = %self.alias, "document updated");
        Ok(())
    }

    async fn search(&self, query: &Value) -> Vec<CaseSearchHit> {
        let body = search_body(query, self.max_results);
        match self.client.search(&self.alias, &body).await {
            Ok(hits) => hits.iter().filter_map(|h| hit_to_case(h, None)).collect(),
            Err(err) => {
                warn!(alias = %self.alias, error = %err, "search failed, returning empty result set");
                Vec::new()
            }
        }
    }

    async fn multi_search(&self, queries: &[(String, Value)]) -> Vec<CaseSearchHit> {
        let targets: Vec<(String, Value)> = queries
            .iter()
            .map(|(_, query)| (self.alias.clone(), search_body(query, self.max_results)))
            .collect();

        match self.client.msearch(&targets).await {
            Ok(per_line) => per_line
                .iter()
                .zip(queries.iter())
                .flat_map(|(hits, (case_type, _))| {
                    hits.iter()
                        .filter_map(|h| hit_to_case(h, Some(case_type)))
                        .collect::<Vec<_>>()
                })
                .collect(),
            Err(err) => {
                warn!(error = %err, "multi-search failed, returning empty result set");
                Vec::new()
            }
        }
    }
}

/// One index per case type with separate read/write aliases
pub struct PerTypeIndexRouter {
    client: Arc<ElasticClient>,
    prefix: String,
    max_results: usize,
}

impl PerTypeIndexRouter {
    pub fn new(client: Arc<ElasticClient>, config: &ElasticsearchConfig) -> Self {
        Self {
            client,
            prefix: config.index_prefix.clone(),
            max_results: config.max_results,
        }
    }

    fn read_alias(&self, case_type: &str) -> String {
        format!("{}-{}-read", self.prefix, case_type.to_lowercase())
    }

    fn write_alias(&self, case_type: &str) -> String {
        format!("{}-{}-write", self.prefix, case_type.to_lowercase())
    }

    fn global_read_alias(&self) -> String {
        format!("{}-read", self.prefix)
    }
}

#[async_trait]
impl IndexRouter for PerTypeIndexRouter {
    async fn find_by_id(&self, case_type: &str, case_uuid: Uuid) -> Result<Value> {
        let alias = self.read_alias(case_type);
        let source = self
            .client
            .get_document(&alias, &case_uuid.to_string())
            .await?;

        source.ok_or_else(|| AppError::NotFound(format!("case {} not found", case_uuid)))
    }

    async fn update(&self, case_type: &str, case_uuid: Uuid, plan: &UpdatePlan) -> Result<()> {
        let alias = self.write_alias(case_type);
        let body = plan.to_request_body();
        self.client
            .update_document(&alias, &case_uuid.to_string(), &body)
            .await?;

        debug!(case_uuid = %case_uuid, alias = %alias, "document updated");
        Ok(())
    }

    async fn search(&self, query: &Value) -> Vec<CaseSearchHit> {
        let alias = self.global_read_alias();
        let body = search_body(query, self.max_results);

        match self.client.search(&alias, &body).await {
            Ok(hits) => hits.iter().filter_map(|h| hit_to_case(h, None)).collect(),
            Err(err) => {
                warn!(alias = %alias, error = %err, "search failed, returning empty result set");
                Vec::new()
            }
        }
    }

    async fn multi_search(&self, queries: &[(String, Value)]) -> Vec<CaseSearchHit> {
        let targets: Vec<(String, Value)> = queries
            .iter()
            .map(|(case_type, query)| {
                (
                    self.read_alias(case_type),
                    search_body(query, self.max_results),
                )
            })
            .collect();

        match self.client.msearch(&targets).await {
            Ok(per_line) => per_line
                .iter()
                .zip(queries.iter())
                .flat_map(|(hits, (case_type, _))| {
                    hits.iter()
                        .filter_map(|h| hit_to_case(h, Some(case_type)))
                        .collect::<Vec<_>>()
                })
                .collect(),
            Err(err) => {
                warn!(error = %err, "multi-search failed, returning empty result set");
                Vec::new()
            }
        }
    }
}

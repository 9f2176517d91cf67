//! Topic label lookup against the info service, with a TTL cache in front.

use crate::config::InfoServiceConfig;
use crate::error::{AppError, Result};
use moka::future::Cache;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Topic payload returned by the info service
#[derive(Debug, Clone, Deserialize)]
pub struct TopicInfo {
    pub uuid: Uuid,
    pub label: String,
}

#[derive(Debug, Deserialize)]
struct TopicsEnvelope {
    topics: Vec<TopicInfo>,
}

/// Thin HTTP client for the info service
#[derive(Debug, Clone)]
pub struct InfoClient {
    http: reqwest::Client,
    base_url: String,
}

impl InfoClient {
    pub fn new(config: &InfoServiceConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                AppError::Configuration(format!("failed to build info service client: {}", e))
            })?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch a single topic label by UUID
    pub async fn get_topic(&self, uuid: Uuid) -> Result<TopicInfo> {
        let url = format!("{}/topic/{}", self.base_url, uuid);
        let response = self.http.get(&url).send().await.map_err(map_reqwest)?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("topic {}", uuid)));
        }
        let response = response.error_for_status().map_err(map_reqwest)?;
        response.json::<TopicInfo>().await.map_err(map_reqwest)
    }

    /// Fetch the full topic table for cache priming
    pub async fn get_all_topics(&self) -> Result<Vec<TopicInfo>> {
        let url = format!("{}/topics", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(map_reqwest)?
            .error_for_status()
            .map_err(map_reqwest)?;

        let envelope = response.json::<TopicsEnvelope>().await.map_err(map_reqwest)?;
        Ok(envelope.topics)
    }
}

fn map_reqwest(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::Timeout(format!("info service call timed out: {}", err))
    } else {
        AppError::Internal(format!("info service call failed: {}", err))
    }
}

/// UUID -> label resolution with a bounded TTL cache
pub struct TopicLabelService {
    client: InfoClient,
    cache: Cache<Uuid, String>,
}

impl TopicLabelService {
    pub fn new(client: InfoClient, config: &InfoServiceConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(Duration::from_secs(config.cache_ttl_secs))
            .build();

        Self { client, cache }
    }

    /// Resolve a topic label, hitting the info service on cache miss
    pub async fn label(&self, uuid: Uuid) -> Result<String> {
        if let Some(label) = self.cache.get(&uuid).await {
            debug!(topic_uuid = %uuid, "topic label cache hit");
            return Ok(label);
        }

        let topic = self.client.get_topic(uuid).await?;
        self.cache.insert(uuid, topic.label.clone()).await;
        Ok(topic.label)
    }

    /// Bulk-load the full topic table into the cache
    pub async fn prime(&self) -> Result<usize> {
        let topics = self.client.get_all_topics().await?;
        let count = topics.len();
        for topic in topics {
            self.cache.insert(topic.uuid, topic.label).await;
        }
        info!(topic_count = count, "topic label cache primed");
        Ok(count)
    }
}

/// Periodic cache priming; lookup failures are logged and the next tick
/// retried, never propagated
pub async fn run_priming_task(service: Arc<TopicLabelService>, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    loop {
        interval.tick().await;
        if let Err(e) = service.prime().await {
            warn!(error = %e, "topic label cache priming failed");
        }
    }
}

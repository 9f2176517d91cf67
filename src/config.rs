use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Document store configuration
    pub elasticsearch: ElasticsearchConfig,

    /// Static mapping table overrides
    #[serde(default)]
    pub mappings: MappingsConfig,

    /// Topic label lookup service configuration
    pub info_service: InfoServiceConfig,

    /// Delivery/retry contract configuration
    #[serde(default)]
    pub queue: QueueConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());

        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: CASE_SEARCH_)
            .add_source(
                config::Environment::with_prefix("CASE_SEARCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Index topology: one shared index vs one index per case type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IndexTopology {
    #[default]
    Singular,
    PerType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticsearchConfig {
    /// Base URL of the Elasticsearch-compatible store
    #[serde(default = "default_es_url")]
    pub url: String,

    /// Alias name prefix
    #[serde(default = "default_index_prefix")]
    pub index_prefix: String,

    /// Active index topology
    #[serde(default)]
    pub topology: IndexTopology,

    /// Per-call timeout (seconds)
    #[serde(default = "default_es_timeout")]
    pub timeout_secs: u64,

    /// Server-enforced result-count cap; oversized result sets are
    /// truncated silently
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Legacy case types whose documents carry a migrated reference
    #[serde(default)]
    pub migrated_case_types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MappingsConfig {
    /// Path to a short-code -> case type JSON table; embedded default when
    /// absent
    pub case_types_path: Option<PathBuf>,

    /// Path to a field -> query strategy JSON table; embedded default when
    /// absent
    pub field_query_policy_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoServiceConfig {
    /// Base URL of the topic label lookup service
    #[serde(default = "default_info_url")]
    pub url: String,

    /// Per-call timeout (seconds)
    #[serde(default = "default_info_timeout")]
    pub timeout_secs: u64,

    /// Label cache time-to-live (seconds)
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Label cache maximum entry count
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,

    /// Interval between bulk cache priming runs (seconds)
    #[serde(default = "default_prime_interval")]
    pub prime_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Bounded redelivery count before dead-lettering
    #[serde(default = "default_max_redeliveries")]
    pub max_redeliveries: u32,

    /// Initial redelivery delay (milliseconds)
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Multiplicative backoff factor applied per redelivery
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_redeliveries: default_max_redeliveries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8082
}

fn default_request_timeout() -> u64 {
    30
}

fn default_es_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_index_prefix() -> String {
    "case".to_string()
}

fn default_es_timeout() -> u64 {
    10
}

fn default_max_results() -> usize {
    500
}

fn default_info_url() -> String {
    "http://localhost:8085".to_string()
}

fn default_info_timeout() -> u64 {
    10
}

fn default_cache_ttl() -> u64 {
    3600
}

fn default_cache_capacity() -> u64 {
    10_000
}

fn default_prime_interval() -> u64 {
    86_400
}

fn default_max_redeliveries() -> u32 {
    10
}

fn default_initial_backoff_ms() -> u64 {
    5_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        assert_eq!(default_http_port(), 8082);
        assert_eq!(default_index_prefix(), "case");
        assert_eq!(default_max_results(), 500);
        assert_eq!(default_max_redeliveries(), 10);
    }

    #[test]
    fn test_default_topology() {
        assert_eq!(IndexTopology::default(), IndexTopology::Singular);
    }

    #[test]
    fn test_embedded_default_parses() {
        let parsed: Config = config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(parsed.elasticsearch.topology, IndexTopology::Singular);
        assert!(parsed
            .elasticsearch
            .migrated_case_types
            .contains(&"COMP".to_string()));
    }
}

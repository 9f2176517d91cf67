use case_search_indexer::{
    api::{build_router, AppState},
    casetype::CaseTypeResolver,
    config::Config,
    events::{queue, EventDispatcher, LoggingDeadLetter, QueueListener, RetryPolicy},
    index::{self, ElasticClient},
    info::{run_priming_task, InfoClient, TopicLabelService},
    search::{CaseSearchService, FieldQueryPolicy},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration first so logging can honour it
    let config = Config::load()?;

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "case_search_indexer={},tower_http=info",
            config.observability.log_level
        ))
    });
    if config.observability.json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting case search indexer v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Index topology: {:?}", config.elasticsearch.topology);

    // Static lookup tables, embedded defaults unless overridden on disk
    let resolver = Arc::new(match &config.mappings.case_types_path {
        Some(path) => CaseTypeResolver::from_file(path)?,
        None => CaseTypeResolver::embedded()?,
    });
    let policy = Arc::new(match &config.mappings.field_query_policy_path {
        Some(path) => FieldQueryPolicy::from_file(path)?,
        None => FieldQueryPolicy::embedded()?,
    });

    // Document store client and topology-aware router
    let client = Arc::new(ElasticClient::new(&config.elasticsearch)?);
    let router = index::build_router(client, &config.elasticsearch);
    tracing::info!("Document store: {}", config.elasticsearch.url);

    // Topic label lookup with cache priming
    let info_client = InfoClient::new(&config.info_service)?;
    let topics = Arc::new(TopicLabelService::new(info_client, &config.info_service));
    let priming_topics = topics.clone();
    let prime_interval = config.info_service.prime_interval_secs;
    tokio::spawn(async move {
        run_priming_task(priming_topics, prime_interval).await;
    });
    tracing::info!("Topic label cache priming started");

    // Event pipeline: queue, dispatcher, listener with bounded redelivery
    let dispatcher = Arc::new(EventDispatcher::new(
        router.clone(),
        resolver.clone(),
        topics,
    ));
    let (sender, receiver) = queue();
    let listener = QueueListener::new(
        dispatcher,
        RetryPolicy::from_config(&config.queue),
        Arc::new(LoggingDeadLetter),
        sender.clone(),
    );
    tokio::spawn(async move {
        listener.run(receiver).await;
    });
    tracing::info!(
        "Event listener started (max redeliveries: {})",
        config.queue.max_redeliveries
    );

    // Search service and HTTP API
    let search = Arc::new(CaseSearchService::new(
        router.clone(),
        policy,
        config.elasticsearch.migrated_case_types.clone(),
    ));
    let app_state = AppState::new(search, router, resolver, sender);
    let app = build_router(app_state);

    let http_addr = format!("{}:{}", config.server.host, config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("HTTP API server listening on http://{}", http_addr);

    tokio::select! {
        result = axum::serve(http_listener, app) => {
            if let Err(e) = result {
                tracing::error!("HTTP server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

//! End-to-end tests against a mocked document store: event dispatch into
//! index writes, document retrieval, and search execution.

use case_search_indexer::casetype::CaseTypeResolver;
use case_search_indexer::config::{ElasticsearchConfig, IndexTopology, InfoServiceConfig};
use case_search_indexer::error::AppError;
use case_search_indexer::events::{ChangeEvent, DispatchOutcome, EventDispatcher};
use case_search_indexer::index::{self, ElasticClient};
use case_search_indexer::info::{InfoClient, TopicLabelService};
use case_search_indexer::search::{CaseSearchService, FieldQueryPolicy, SearchRequest};
use std::sync::Arc;
use uuid::Uuid;

// Short code a1 maps to MIN in the embedded table
const MIN_CASE_UUID: &str = "02caf2ed-6c9e-4fa4-bbd2-82ef285400a1";

fn es_config(url: &str, topology: IndexTopology) -> ElasticsearchConfig {
    ElasticsearchConfig {
        url: url.to_string(),
        index_prefix: "case".to_string(),
        topology,
        timeout_secs: 5,
        max_results: 500,
        migrated_case_types: vec!["COMP".to_string()],
    }
}

fn info_config(url: &str) -> InfoServiceConfig {
    InfoServiceConfig {
        url: url.to_string(),
        timeout_secs: 5,
        cache_ttl_secs: 60,
        cache_capacity: 100,
        prime_interval_secs: 300,
    }
}

fn dispatcher(
    store_url: &str,
    info_url: &str,
    topology: IndexTopology,
) -> EventDispatcher {
    let config = es_config(store_url, topology);
    let client = Arc::new(ElasticClient::new(&config).unwrap());
    let router = index::build_router(client, &config);

    let info = info_config(info_url);
    let topics = Arc::new(TopicLabelService::new(
        InfoClient::new(&info).unwrap(),
        &info,
    ));

    EventDispatcher::new(
        router,
        Arc::new(CaseTypeResolver::embedded().unwrap()),
        topics,
    )
}

#[tokio::test]
async fn test_case_created_writes_to_per_type_write_alias() {
    let mut server = mockito::Server::new_async().await;
    let case_uuid: Uuid = MIN_CASE_UUID.parse().unwrap();

    let update = server
        .mock(
            "POST",
            format!("/case-min-write/_update/{}", case_uuid).as_str(),
        )
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "doc": { "reference": "MIN/0123456/26" },
            "doc_as_upsert": true,
        })))
        .with_status(200)
        .with_body("{\"result\": \"updated\"}")
        .expect(1)
        .create_async()
        .await;

    let event = ChangeEvent {
        case_uuid,
        event_type: Some("CASE_CREATED".to_string()),
        data: "{\"reference\": \"MIN/0123456/26\"}".to_string(),
    };
    let outcome = dispatcher(&server.url(), "http://localhost:1", IndexTopology::PerType)
        .dispatch(&event)
        .await
        .unwrap();

    assert_eq!(outcome, DispatchOutcome::Handled);
    update.assert_async().await;
}

#[tokio::test]
async fn test_topic_created_fetches_label_then_writes_script() {
    let mut store = mockito::Server::new_async().await;
    let mut info = mockito::Server::new_async().await;
    let case_uuid: Uuid = MIN_CASE_UUID.parse().unwrap();
    let topic_uuid = Uuid::new_v4();

    info.mock("GET", format!("/topic/{}", topic_uuid).as_str())
        .with_status(200)
        .with_body(format!(
            "{{\"uuid\": \"{}\", \"label\": \"Borders\"}}",
            topic_uuid
        ))
        .create_async()
        .await;

    let update = store
        .mock(
            "POST",
            format!("/case-case/_update/{}", case_uuid).as_str(),
        )
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "scripted_upsert": true,
            "script": { "params": { "topic": { "text": "Borders" } } },
        })))
        .with_status(200)
        .with_body("{\"result\": \"updated\"}")
        .expect(1)
        .create_async()
        .await;

    let event = ChangeEvent {
        case_uuid,
        event_type: Some("CASE_TOPIC_CREATED".to_string()),
        data: format!("{{\"uuid\": \"{}\"}}", topic_uuid),
    };
    let outcome = dispatcher(&store.url(), &info.url(), IndexTopology::Singular)
        .dispatch(&event)
        .await
        .unwrap();

    assert_eq!(outcome, DispatchOutcome::Handled);
    update.assert_async().await;
}

#[tokio::test]
async fn test_find_by_id_reads_from_read_alias() {
    let mut server = mockito::Server::new_async().await;
    let case_uuid: Uuid = MIN_CASE_UUID.parse().unwrap();

    server
        .mock("GET", format!("/case-min-read/_doc/{}", case_uuid).as_str())
        .with_status(200)
        .with_body(format!(
            "{{\"found\": true, \"_source\": {{\"caseUUID\": \"{}\", \"type\": \"MIN\"}}}}",
            case_uuid
        ))
        .create_async()
        .await;

    let config = es_config(&server.url(), IndexTopology::PerType);
    let client = Arc::new(ElasticClient::new(&config).unwrap());
    let router = index::build_router(client, &config);

    let document = router.find_by_id("MIN", case_uuid).await.unwrap();
    assert_eq!(document["type"], "MIN");
}

#[tokio::test]
async fn test_find_by_id_missing_document_is_not_found() {
    let mut server = mockito::Server::new_async().await;
    let case_uuid: Uuid = MIN_CASE_UUID.parse().unwrap();

    server
        .mock("GET", format!("/case-case/_doc/{}", case_uuid).as_str())
        .with_status(404)
        .with_body("{\"found\": false}")
        .create_async()
        .await;

    let config = es_config(&server.url(), IndexTopology::Singular);
    let client = Arc::new(ElasticClient::new(&config).unwrap());
    let router = index::build_router(client, &config);

    let err = router.find_by_id("MIN", case_uuid).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_search_returns_deduplicated_uuids() {
    let mut server = mockito::Server::new_async().await;
    let case_uuid: Uuid = MIN_CASE_UUID.parse().unwrap();

    server
        .mock("POST", "/case-case/_search")
        .with_status(200)
        .with_body(format!(
            "{{\"hits\": {{\"hits\": [\
              {{\"_id\": \"{0}\", \"_source\": {{\"type\": \"MIN\"}}}},\
              {{\"_id\": \"{0}\", \"_source\": {{\"type\": \"MIN\"}}}}\
            ]}}}}",
            case_uuid
        ))
        .create_async()
        .await;

    let config = es_config(&server.url(), IndexTopology::Singular);
    let client = Arc::new(ElasticClient::new(&config).unwrap());
    let router = index::build_router(client, &config);
    let service = CaseSearchService::new(
        router,
        Arc::new(FieldQueryPolicy::embedded().unwrap()),
        vec!["COMP".to_string()],
    );

    let request = SearchRequest {
        topic: Some("Borders".to_string()),
        ..Default::default()
    };
    let result = service.search(&request).await.unwrap();
    assert_eq!(result, vec![case_uuid]);
}

#[tokio::test]
async fn test_store_failure_degrades_to_empty_results() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("POST", "/case-case/_search")
        .with_status(500)
        .with_body("{\"error\": \"boom\"}")
        .create_async()
        .await;

    let config = es_config(&server.url(), IndexTopology::Singular);
    let client = Arc::new(ElasticClient::new(&config).unwrap());
    let router = index::build_router(client, &config);
    let service = CaseSearchService::new(
        router,
        Arc::new(FieldQueryPolicy::embedded().unwrap()),
        vec![],
    );

    let request = SearchRequest {
        topic: Some("Borders".to_string()),
        ..Default::default()
    };
    let result = service.search(&request).await.unwrap();
    assert!(result.is_empty());
}

#[tokio::test]
async fn test_typed_search_goes_through_msearch() {
    let mut server = mockito::Server::new_async().await;
    let case_uuid: Uuid = MIN_CASE_UUID.parse().unwrap();

    server
        .mock("POST", "/_msearch")
        .match_header("content-type", "application/x-ndjson")
        .with_status(200)
        .with_body(format!(
            "{{\"responses\": [{{\"hits\": {{\"hits\": [\
              {{\"_id\": \"{}\", \"_source\": {{\"type\": \"MIN\"}}}}\
            ]}}}}]}}",
            case_uuid
        ))
        .create_async()
        .await;

    let config = es_config(&server.url(), IndexTopology::Singular);
    let client = Arc::new(ElasticClient::new(&config).unwrap());
    let router = index::build_router(client, &config);
    let service = CaseSearchService::new(
        router,
        Arc::new(FieldQueryPolicy::embedded().unwrap()),
        vec![],
    );

    let request = SearchRequest {
        case_type: Some(vec!["MIN".to_string()]),
        reference: Some("0123456".to_string()),
        ..Default::default()
    };
    let result = service.search(&request).await.unwrap();
    assert_eq!(result, vec![case_uuid]);
}

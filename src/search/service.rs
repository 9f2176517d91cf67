//! Search execution: compiles a request into a query and routes it.

use crate::error::{AppError, Result};
use crate::index::IndexRouter;
use crate::search::builder::CaseQueryBuilder;
use crate::search::policy::FieldQueryPolicy;
use crate::search::request::SearchRequest;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub struct CaseSearchService {
    router: Arc<dyn IndexRouter>,
    policy: Arc<FieldQueryPolicy>,
    migrated_types: Vec<String>,
}

impl CaseSearchService {
    pub fn new(
        router: Arc<dyn IndexRouter>,
        policy: Arc<FieldQueryPolicy>,
        migrated_types: Vec<String>,
    ) -> Self {
        Self {
            router,
            policy,
            migrated_types,
        }
    }

    /// Execute a structured search, returning matching case UUIDs.
    ///
    /// A request where no optional criterion contributes a clause is
    /// rejected rather than run as an unscoped scan.
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<Uuid>> {
        let query = CaseQueryBuilder::from_request(request, &self.policy, &self.migrated_types);

        if !query.has_clauses() {
            return Err(AppError::Validation(
                "search request contains no criteria".to_string(),
            ));
        }

        let hits = match request.case_type.as_deref().filter(|t| !t.is_empty()) {
            Some(case_types) => {
                let queries: Vec<(String, serde_json::Value)> = case_types
                    .iter()
                    .map(|t| (t.clone(), query.query.clone()))
                    .collect();
                self.router.multi_search(&queries).await
            }
            None => self.router.search(&query.query).await,
        };

        let mut seen = HashSet::new();
        let uuids: Vec<Uuid> = hits
            .into_iter()
            .map(|hit| hit.case_uuid)
            .filter(|uuid| seen.insert(*uuid))
            .collect();

        info!(result_count = uuids.len(), "search executed");
        Ok(uuids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{CaseSearchHit, UpdatePlan};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Router double recording which entry point was used
    struct RecordingRouter {
        hits: Vec<CaseSearchHit>,
        multi_search_calls: Mutex<Vec<Vec<String>>>,
        search_calls: Mutex<usize>,
    }

    impl RecordingRouter {
        fn returning(hits: Vec<CaseSearchHit>) -> Self {
            Self {
                hits,
                multi_search_calls: Mutex::new(Vec::new()),
                search_calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl IndexRouter for RecordingRouter {
        async fn find_by_id(&self, _case_type: &str, case_uuid: Uuid) -> Result<Value> {
            Err(AppError::NotFound(case_uuid.to_string()))
        }

        async fn update(
            &self,
            _case_type: &str,
            _case_uuid: Uuid,
            _plan: &UpdatePlan,
        ) -> Result<()> {
            Ok(())
        }

        async fn search(&self, _query: &Value) -> Vec<CaseSearchHit> {
            *self.search_calls.lock().unwrap() += 1;
            self.hits.clone()
        }

        async fn multi_search(&self, queries: &[(String, Value)]) -> Vec<CaseSearchHit> {
            self.multi_search_calls
                .lock()
                .unwrap()
                .push(queries.iter().map(|(t, _)| t.clone()).collect());
            self.hits.clone()
        }
    }

    fn service(router: Arc<RecordingRouter>) -> CaseSearchService {
        CaseSearchService::new(
            router,
            Arc::new(FieldQueryPolicy::new(HashMap::new())),
            vec!["COMP".to_string()],
        )
    }

    fn hit(uuid: Uuid) -> CaseSearchHit {
        CaseSearchHit {
            case_uuid: uuid,
            case_type: None,
        }
    }

    #[tokio::test]
    async fn test_unscoped_search_is_rejected() {
        let router = Arc::new(RecordingRouter::returning(vec![]));
        let err = service(router.clone())
            .search(&SearchRequest::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(*router.search_calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_search_without_types_uses_broad_search() {
        let uuid = Uuid::new_v4();
        let router = Arc::new(RecordingRouter::returning(vec![hit(uuid)]));

        let request = SearchRequest {
            topic: Some("Borders".to_string()),
            ..Default::default()
        };
        let result = service(router.clone()).search(&request).await.unwrap();

        assert_eq!(result, vec![uuid]);
        assert_eq!(*router.search_calls.lock().unwrap(), 1);
        assert!(router.multi_search_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_with_types_uses_multi_search() {
        let uuid = Uuid::new_v4();
        let router = Arc::new(RecordingRouter::returning(vec![hit(uuid)]));

        let request = SearchRequest {
            case_type: Some(vec!["MIN".to_string(), "TRO".to_string()]),
            ..Default::default()
        };
        let result = service(router.clone()).search(&request).await.unwrap();

        assert_eq!(result, vec![uuid]);
        let calls = router.multi_search_calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[vec!["MIN".to_string(), "TRO".to_string()]]);
    }

    #[tokio::test]
    async fn test_duplicate_hits_are_deduplicated_in_order() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let router = Arc::new(RecordingRouter::returning(vec![
            hit(first),
            hit(second),
            hit(first),
        ]));

        let request = SearchRequest {
            topic: Some("Borders".to_string()),
            ..Default::default()
        };
        let result = service(router).search(&request).await.unwrap();

        assert_eq!(result, vec![first, second]);
    }
}

pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::casetype::CaseTypeResolver;
use crate::events::QueueSender;
use crate::index::IndexRouter;
use crate::search::CaseSearchService;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<CaseSearchService>,
    pub index: Arc<dyn IndexRouter>,
    pub resolver: Arc<CaseTypeResolver>,
    pub queue: QueueSender,
}

impl AppState {
    pub fn new(
        search: Arc<CaseSearchService>,
        index: Arc<dyn IndexRouter>,
        resolver: Arc<CaseTypeResolver>,
        queue: QueueSender,
    ) -> Self {
        Self {
            search,
            index,
            resolver,
            queue,
        }
    }
}

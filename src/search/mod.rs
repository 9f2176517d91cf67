//! Query construction and search execution.
//!
//! A search request is a sparse set of optional criteria. The builder folds
//! the non-empty ones into a compound boolean query, the service routes the
//! finished query through the index router, and the field policy decides
//! wildcard vs exact matching for ad-hoc data fields.

pub mod builder;
pub mod policy;
pub mod request;
pub mod service;

pub use builder::{CaseQueryBuilder, CaseSearchQuery};
pub use policy::{FieldQueryPolicy, QueryStrategy};
pub use request::{DateRange, SearchRequest};
pub use service::CaseSearchService;

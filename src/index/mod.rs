//! Document store access: REST client, partial-update planning, and the
//! topology-aware index router.

pub mod client;
pub mod error;
pub mod router;
pub mod update;

pub use client::{ElasticClient, StoreHit};
pub use error::{StoreError, StoreResult};
pub use router::{build_router, CaseSearchHit, IndexRouter, PerTypeIndexRouter, SingularIndexRouter};
pub use update::{
    case_complete, case_soft_delete, case_upsert, correspondent_remove, correspondent_upsert,
    somu_remove, somu_upsert, topic_remove, topic_upsert, UpdatePlan,
};

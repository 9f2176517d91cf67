//! Case document model: the entity definitions and merge invariants for a
//! case document and its nested UUID-keyed collections.

pub mod case;
pub mod correspondent;
pub mod somu;
pub mod topic;

pub use case::{CaseData, CaseDocument};
pub use correspondent::{Correspondent, CorrespondentRef};
pub use somu::{SomuItem, SomuItemRef};
pub use topic::{Topic, TopicRef};

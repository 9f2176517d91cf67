//! Info service integration: topic label lookup and caching.

pub mod client;

pub use client::{run_priming_task, InfoClient, TopicInfo, TopicLabelService};

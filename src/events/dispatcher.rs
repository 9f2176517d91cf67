//! Maps change events to document updates.
//!
//! Each recognised event tag is translated into a single update plan and
//! routed to the case's index. The case type is always derived from the
//! case UUID, never trusted from the event body.

use crate::casetype::CaseTypeResolver;
use crate::error::{AppError, Result};
use crate::events::event::{ChangeEvent, EventKind};
use crate::index::{self, IndexRouter, UpdatePlan};
use crate::info::TopicLabelService;
use crate::model::{CaseData, Correspondent, CorrespondentRef, SomuItem, SomuItemRef, Topic, TopicRef};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

/// Whether an event produced an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Handled,
    Skipped,
}

pub struct EventDispatcher {
    router: Arc<dyn IndexRouter>,
    resolver: Arc<CaseTypeResolver>,
    topics: Arc<TopicLabelService>,
}

impl EventDispatcher {
    pub fn new(
        router: Arc<dyn IndexRouter>,
        resolver: Arc<CaseTypeResolver>,
        topics: Arc<TopicLabelService>,
    ) -> Self {
        Self {
            router,
            resolver,
            topics,
        }
    }

    /// Apply one event to the document store.
    ///
    /// Untagged events are skipped; unrecognised tags are an error so the
    /// listener can retry or dead-letter them.
    pub async fn dispatch(&self, event: &ChangeEvent) -> Result<DispatchOutcome> {
        let tag = match event.event_type.as_deref() {
            Some(tag) => tag,
            None => {
                debug!(case_uuid = %event.case_uuid, "event without type tag skipped");
                return Ok(DispatchOutcome::Skipped);
            }
        };

        let kind = EventKind::from_str(tag)
            .map_err(|_| AppError::UnknownEventType(tag.to_string()))?;
        let case_type = self.resolver.resolve(event.case_uuid)?.to_string();

        let plan = self.plan_for(kind, event).await?;
        self.router
            .update(&case_type, event.case_uuid, &plan)
            .await?;

        info!(
            case_uuid = %event.case_uuid,
            case_type = %case_type,
            event_type = %kind,
            "event applied"
        );
        Ok(DispatchOutcome::Handled)
    }

    async fn plan_for(&self, kind: EventKind, event: &ChangeEvent) -> Result<UpdatePlan> {
        match kind {
            EventKind::CaseCreated | EventKind::CaseUpdated => {
                let data: CaseData = parse_payload(&event.data)?;
                index::case_upsert(&data)
            }
            EventKind::CaseDeleted => Ok(index::case_soft_delete()),
            EventKind::CaseCompleted => Ok(index::case_complete()),
            EventKind::CaseTopicCreated => {
                let topic_ref: TopicRef = parse_payload(&event.data)?;
                let label = self.topics.label(topic_ref.uuid).await?;
                index::topic_upsert(&Topic::new(topic_ref.uuid, label))
            }
            EventKind::CaseTopicDeleted => {
                let topic_ref: TopicRef = parse_payload(&event.data)?;
                Ok(index::topic_remove(topic_ref.uuid))
            }
            EventKind::CorrespondentCreated | EventKind::CorrespondentUpdated => {
                let correspondent: Correspondent = parse_payload(&event.data)?;
                index::correspondent_upsert(&correspondent)
            }
            EventKind::CorrespondentDeleted => {
                let correspondent_ref: CorrespondentRef = parse_payload(&event.data)?;
                Ok(index::correspondent_remove(correspondent_ref.uuid))
            }
            EventKind::SomuItemCreated | EventKind::SomuItemUpdated => {
                let item: SomuItem = parse_payload(&event.data)?;
                index::somu_upsert(&item)
            }
            EventKind::SomuItemDeleted => {
                let item_ref: SomuItemRef = parse_payload(&event.data)?;
                Ok(index::somu_remove(item_ref.uuid))
            }
        }
    }
}

fn parse_payload<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T> {
    serde_json::from_str(raw)
        .map_err(|e| AppError::Serialization(format!("malformed event payload: {}", e)))
}

//! Inbound cohort traffic: discard what does not belong here, route the rest

use crate::context::ProcessingContext;
use crate::processor::{InstanceEventProcessor, RegistryEventProcessor, TypeDefEventProcessor};
use crate::wire::{CohortEnvelope, CohortEvent, DecodeError, EventCategory};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Why an envelope was not dispatched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscardReason {
    /// No originator, so the sender cannot be identified
    NoOriginator,
    /// Sent by this member; it already knows
    SelfOriginated,
    NoProcessor(EventCategory),
    Malformed(DecodeError),
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscardReason::NoOriginator => f.write_str("no originator"),
            DiscardReason::SelfOriginated => f.write_str("self-originated"),
            DiscardReason::NoProcessor(category) => write!(f, "no {} processor", category),
            DiscardReason::Malformed(e) => write!(f, "malformed: {}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerOutcome {
    Dispatched(EventCategory),
    Discarded(DiscardReason),
}

impl ListenerOutcome {
    pub fn is_dispatched(&self) -> bool {
        matches!(self, ListenerOutcome::Dispatched(_))
    }
}

#[derive(Debug, Default)]
pub struct ListenerStats {
    received: AtomicU64,
    dispatched: AtomicU64,
    discarded: AtomicU64,
}

impl ListenerStats {
    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    pub fn discarded(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }
}

/// Routes inbound envelopes to the processor registered for their category.
///
/// Pure routing: no retries, and whatever the processor does with the event
/// is its own business.
pub struct CohortEventListener {
    source_name: String,
    local_metadata_collection_id: String,
    registry_processor: Option<Arc<dyn RegistryEventProcessor>>,
    type_def_processor: Option<Arc<dyn TypeDefEventProcessor>>,
    instance_processor: Option<Arc<dyn InstanceEventProcessor>>,
    stats: ListenerStats,
}

impl CohortEventListener {
    pub fn new(
        source_name: impl Into<String>,
        local_metadata_collection_id: impl Into<String>,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            local_metadata_collection_id: local_metadata_collection_id.into(),
            registry_processor: None,
            type_def_processor: None,
            instance_processor: None,
            stats: ListenerStats::default(),
        }
    }

    pub fn with_registry_processor(mut self, processor: Arc<dyn RegistryEventProcessor>) -> Self {
        self.registry_processor = Some(processor);
        self
    }

    pub fn with_type_def_processor(mut self, processor: Arc<dyn TypeDefEventProcessor>) -> Self {
        self.type_def_processor = Some(processor);
        self
    }

    pub fn with_instance_processor(mut self, processor: Arc<dyn InstanceEventProcessor>) -> Self {
        self.instance_processor = Some(processor);
        self
    }

    pub fn local_metadata_collection_id(&self) -> &str {
        &self.local_metadata_collection_id
    }

    pub fn stats(&self) -> &ListenerStats {
        &self.stats
    }

    /// Handle one inbound envelope
    pub async fn process_event(&self, envelope: CohortEnvelope) -> ListenerOutcome {
        self.stats.received.fetch_add(1, Ordering::Relaxed);

        let category = envelope.category();
        match self.route(envelope).await {
            Ok(()) => {
                self.stats.dispatched.fetch_add(1, Ordering::Relaxed);
                ListenerOutcome::Dispatched(category)
            }
            Err(reason) => {
                self.stats.discarded.fetch_add(1, Ordering::Relaxed);
                debug!(
                    source = %self.source_name,
                    %category,
                    "Discarding cohort event: {}",
                    reason
                );
                ListenerOutcome::Discarded(reason)
            }
        }
    }

    async fn route(&self, envelope: CohortEnvelope) -> Result<(), DiscardReason> {
        match envelope.originator_id() {
            None => return Err(DiscardReason::NoOriginator),
            Some(id) if id == self.local_metadata_collection_id => {
                return Err(DiscardReason::SelfOriginated);
            }
            Some(_) => {}
        }

        let category = envelope.category();
        let registered = match category {
            EventCategory::Registry => self.registry_processor.is_some(),
            EventCategory::TypeDef => self.type_def_processor.is_some(),
            EventCategory::Instance => self.instance_processor.is_some(),
        };
        if !registered {
            return Err(DiscardReason::NoProcessor(category));
        }

        let processing = ProcessingContext::new();
        match envelope.decode().map_err(DiscardReason::Malformed)? {
            CohortEvent::Registry(event) => {
                if let Some(processor) = &self.registry_processor {
                    processor
                        .process_registry_event(&self.source_name, &event, &processing)
                        .await;
                }
            }
            CohortEvent::TypeDef(event) => {
                if let Some(processor) = &self.type_def_processor {
                    processor
                        .process_type_def_event(&self.source_name, &event, &processing)
                        .await;
                }
            }
            CohortEvent::Instance(event) => {
                if let Some(processor) = &self.instance_processor {
                    processor
                        .process_instance_event(&self.source_name, &event, &processing)
                        .await;
                }
            }
        }

        Ok(())
    }
}

impl fmt::Debug for CohortEventListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CohortEventListener")
            .field("source_name", &self.source_name)
            .field(
                "local_metadata_collection_id",
                &self.local_metadata_collection_id,
            )
            .field("stats", &self.stats)
            .finish()
    }
}

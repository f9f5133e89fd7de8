//! Event manager: validation, filtering, start-up buffering and fan-out

use crate::builder::Sender;
use crate::context::ProcessingContext;
use crate::error::{EventError, Result};
use crate::event::{InstanceEvent, InstanceEventBody, InstanceSubject, TypeDefEvent, TypeDefEventBody};
use crate::future::CompletionFuture;
use crate::model::InstanceGraph;
use crate::processor::{InstanceEventProcessor, TypeDefEventProcessor};
use crate::rule::ExchangeRule;
use crate::validator::Validator;
use async_trait::async_trait;
use omrs_audit::{AuditMessage, AuditSeverity, AuditSink};
use parking_lot::{Mutex, MutexGuard, RwLock};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// An event accepted before start-up, waiting for the drain
struct BufferedEvent<E> {
    source: String,
    event: E,
    correlation_id: Option<String>,
    completion: CompletionFuture,
}

impl<E> BufferedEvent<E> {
    fn new(source: &str, event: E, processing: &ProcessingContext) -> Self {
        let correlation_id = processing.message_id().map(str::to_string);
        let completion = CompletionFuture::correlated(correlation_id.clone());
        processing.track(completion.clone());

        Self {
            source: source.to_string(),
            event,
            correlation_id,
            completion,
        }
    }

    /// Context the drained event is distributed under
    fn processing_context(&self) -> ProcessingContext {
        match &self.correlation_id {
            Some(id) => ProcessingContext::with_message_id(id.clone()),
            None => ProcessingContext::detached(),
        }
    }

    fn complete(&self, processing: &ProcessingContext) {
        if let Err(e) = self.completion.delegate_to(processing.aggregate()) {
            warn!(correlation_id = ?self.correlation_id, "Buffered event completion not linked: {}", e);
        }
    }
}

#[derive(Default)]
struct State {
    active: bool,
    type_def_events: Vec<BufferedEvent<TypeDefEvent>>,
    instance_events: Vec<BufferedEvent<InstanceEvent>>,
}

/// Central hub between event producers and registered consumers.
///
/// Events are validated and filtered as they are sent. Until [`start`] is
/// called accepted events are buffered; afterwards they are delivered to each
/// consumer in registration order on the sending task.
///
/// [`start`]: EventManager::start
pub struct EventManager {
    source_name: String,
    exchange_rule: Arc<ExchangeRule>,
    validator: Arc<dyn Validator>,
    audit: Option<Arc<dyn AuditSink>>,
    type_def_processors: RwLock<Vec<Arc<dyn TypeDefEventProcessor>>>,
    instance_processors: RwLock<Vec<Arc<dyn InstanceEventProcessor>>>,
    state: Mutex<State>,
}

impl EventManager {
    /// Start building an event manager
    pub fn builder() -> EventManagerBuilder {
        EventManagerBuilder::new()
    }

    /// Name used in logs and audit messages
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Exchange rule shared with consumers that learn types
    pub fn exchange_rule(&self) -> &Arc<ExchangeRule> {
        &self.exchange_rule
    }

    /// Add a type definition consumer; delivery follows registration order
    pub fn register_type_def_processor(&self, processor: Arc<dyn TypeDefEventProcessor>) {
        self.type_def_processors.write().push(processor);
    }

    /// Add an instance consumer; delivery follows registration order
    pub fn register_instance_processor(&self, processor: Arc<dyn InstanceEventProcessor>) {
        self.instance_processors.write().push(processor);
    }

    /// Register a consumer of both type definition and instance events
    pub fn register_repository_event_processor<P>(&self, processor: Arc<P>)
    where
        P: TypeDefEventProcessor + InstanceEventProcessor + 'static,
    {
        self.register_type_def_processor(processor.clone());
        self.register_instance_processor(processor);
    }

    /// Number of registered type definition consumers
    pub fn type_def_processor_count(&self) -> usize {
        self.type_def_processors.read().len()
    }

    /// Number of registered instance consumers
    pub fn instance_processor_count(&self) -> usize {
        self.instance_processors.read().len()
    }

    /// Whether [`EventManager::start`] has run
    pub fn is_active(&self) -> bool {
        self.lock_state().active
    }

    /// Number of events waiting for [`EventManager::start`]
    pub fn buffered_len(&self) -> usize {
        let state = self.lock_state();
        state.type_def_events.len() + state.instance_events.len()
    }

    /// Switch to active and deliver everything buffered so far.
    ///
    /// Buffered type definition events go first, then instance events, each in
    /// the order they were sent. Returns the number of events drained; a
    /// second call drains nothing.
    pub async fn start(&self) -> usize {
        let (type_def_events, instance_events) = {
            let mut state = self.lock_state();
            if state.active {
                debug!(source = %self.source_name, "Event manager already started");
                return 0;
            }
            state.active = true;
            (
                std::mem::take(&mut state.type_def_events),
                std::mem::take(&mut state.instance_events),
            )
        };

        let drained = type_def_events.len() + instance_events.len();
        info!(
            source = %self.source_name,
            type_def_events = type_def_events.len(),
            instance_events = instance_events.len(),
            "Event manager starting"
        );

        for buffered in type_def_events {
            let processing = buffered.processing_context();
            self.distribute_type_def_event(&buffered.source, &buffered.event, &processing)
                .await;
            buffered.complete(&processing);
        }

        for buffered in instance_events {
            let processing = buffered.processing_context();
            self.distribute_instance_event(&buffered.source, &buffered.event, &processing)
                .await;
            buffered.complete(&processing);
        }

        self.audit_start(drained).await;
        drained
    }

    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock()
    }

    async fn audit_start(&self, drained: usize) {
        if let Some(audit) = &self.audit {
            let message = AuditMessage::new(
                "OMRS-EVENTS-0001",
                AuditSeverity::Startup,
                format!(
                    "The event manager for {} is active and has distributed {} buffered events",
                    self.source_name, drained
                ),
            )
            .context("drained", &drained);
            audit.log_message("start", message).await;
        }
    }

    // ------------------------------------------------------------------------
    // Filtering
    // ------------------------------------------------------------------------

    fn accept_type_def_event(&self, source: &str, event: &TypeDefEvent) -> bool {
        if !self.exchange_rule.process_type_def_events() {
            return false;
        }

        match &event.body {
            TypeDefEventBody::Conflict(conflict) => {
                self.validator
                    .valid_type_def_summary(source, &conflict.originator_type_def)
                    && self
                        .validator
                        .valid_type_def_summary(source, &conflict.conflicting_type_def)
            }
            TypeDefEventBody::PatchMismatch(mismatch) => self
                .validator
                .valid_type_def_summary(source, &mismatch.target_type_def),
            _ => true,
        }
    }

    /// Returns the event to distribute, if any. Batches come back with only
    /// their acceptable members.
    fn filter_instance_event(&self, source: &str, mut event: InstanceEvent) -> Option<InstanceEvent> {
        if let InstanceEventBody::BatchInstances { graph } = &mut event.body {
            let filtered = self.filter_graph(source, std::mem::take(graph));
            if filtered.is_empty() {
                return None;
            }
            *graph = filtered;
            return Some(event);
        }

        let accepted = match event.body.subject() {
            InstanceSubject::Entity(entity) => {
                self.validator.valid_entity(source, entity)
                    && self
                        .exchange_rule
                        .process_instance_header(Some(&entity.header))
            }
            InstanceSubject::Relationship(relationship) => {
                self.validator.valid_relationship(source, relationship)
                    && self
                        .exchange_rule
                        .process_instance_header(Some(&relationship.header))
            }
            InstanceSubject::Reference(instance) => {
                self.validator.valid_instance_id(
                    source,
                    &instance.type_def_guid,
                    &instance.type_def_name,
                    instance.category,
                    &instance.instance_guid,
                ) && self
                    .exchange_rule
                    .process_instance_event(&instance.type_def_guid, &instance.type_def_name)
            }
            InstanceSubject::Conflict { target, other } => {
                self.validator.valid_type_def_summary(source, target)
                    && self.validator.valid_type_def_summary(source, other)
                    && (self.exchange_rule.process_instance_type(Some(target))
                        || self.exchange_rule.process_instance_type(Some(other)))
            }
            InstanceSubject::Batch(_) => false,
        };

        accepted.then_some(event)
    }

    fn filter_graph(&self, source: &str, graph: InstanceGraph) -> InstanceGraph {
        let entities = graph
            .entities
            .into_iter()
            .filter(|entity| {
                self.validator.valid_entity(source, entity)
                    && self
                        .exchange_rule
                        .process_instance_header(Some(&entity.header))
            })
            .collect();
        let relationships = graph
            .relationships
            .into_iter()
            .filter(|relationship| {
                self.validator.valid_relationship(source, relationship)
                    && self
                        .exchange_rule
                        .process_instance_header(Some(&relationship.header))
            })
            .collect();

        InstanceGraph::new(entities, relationships)
    }

    // ------------------------------------------------------------------------
    // Fan-out
    // ------------------------------------------------------------------------

    async fn distribute_type_def_event(
        &self,
        source: &str,
        event: &TypeDefEvent,
        processing: &ProcessingContext,
    ) {
        let processors = self.type_def_processors.read().clone();

        for processor in processors {
            processor
                .process_type_def_event(source, event, processing)
                .await;
        }
    }

    async fn distribute_instance_event(
        &self,
        source: &str,
        event: &InstanceEvent,
        processing: &ProcessingContext,
    ) {
        let processors = self.instance_processors.read().clone();

        for processor in processors {
            processor
                .process_instance_event(source, event, processing)
                .await;
        }
    }
}

#[async_trait]
impl Sender for EventManager {
    async fn send_type_def_event(
        &self,
        source: &str,
        event: TypeDefEvent,
        processing: &ProcessingContext,
    ) {
        if !self.accept_type_def_event(source, &event) {
            debug!(source, kind = %event.kind(), "Type definition event filtered out");
            return;
        }

        {
            let mut state = self.lock_state();
            if !state.active {
                debug!(source, kind = %event.kind(), "Buffering type definition event");
                state
                    .type_def_events
                    .push(BufferedEvent::new(source, event, processing));
                return;
            }
        }

        self.distribute_type_def_event(source, &event, processing)
            .await;
    }

    async fn send_instance_event(
        &self,
        source: &str,
        event: InstanceEvent,
        processing: &ProcessingContext,
    ) {
        let kind = event.kind();
        let Some(event) = self.filter_instance_event(source, event) else {
            debug!(source, %kind, "Instance event filtered out");
            return;
        };

        {
            let mut state = self.lock_state();
            if !state.active {
                debug!(source, %kind, "Buffering instance event");
                state
                    .instance_events
                    .push(BufferedEvent::new(source, event, processing));
                return;
            }
        }

        self.distribute_instance_event(source, &event, processing)
            .await;
    }
}

impl std::fmt::Debug for EventManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventManager")
            .field("source_name", &self.source_name)
            .field("exchange_rule", &self.exchange_rule)
            .field("active", &self.is_active())
            .field("buffered", &self.buffered_len())
            .finish()
    }
}

/// Event manager builder
pub struct EventManagerBuilder {
    source_name: String,
    exchange_rule: Option<Arc<ExchangeRule>>,
    validator: Option<Arc<dyn Validator>>,
    audit: Option<Arc<dyn AuditSink>>,
}

impl EventManagerBuilder {
    pub fn new() -> Self {
        Self {
            source_name: "event-manager".to_string(),
            exchange_rule: None,
            validator: None,
            audit: None,
        }
    }

    pub fn source_name(mut self, source_name: impl Into<String>) -> Self {
        self.source_name = source_name.into();
        self
    }

    pub fn exchange_rule(mut self, exchange_rule: Arc<ExchangeRule>) -> Self {
        self.exchange_rule = Some(exchange_rule);
        self
    }

    pub fn validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn build(self) -> Result<EventManager> {
        let exchange_rule = self
            .exchange_rule
            .ok_or(EventError::MissingDependency("event manager exchange rule"))?;
        let validator = self
            .validator
            .ok_or(EventError::MissingDependency("event manager validator"))?;

        Ok(EventManager {
            source_name: self.source_name,
            exchange_rule,
            validator,
            audit: self.audit,
            type_def_processors: RwLock::new(Vec::new()),
            instance_processors: RwLock::new(Vec::new()),
            state: Mutex::new(State::default()),
        })
    }
}

impl Default for EventManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventOriginator, InstanceEventKind, TypeDefEventKind};
    use crate::future::Outcome;
    use crate::lookup::InMemoryTypeLookup;
    use crate::model::{
        EntityDetail, InstanceType, Relationship, TypeDef, TypeDefCategory, TypeDefSummary,
    };
    use crate::rule::ExchangeRuleMode;
    use crate::validator::ShapeValidator;

    #[derive(Default)]
    struct Collector {
        type_defs: Mutex<Vec<TypeDefEventKind>>,
        instances: Mutex<Vec<InstanceEvent>>,
    }

    impl Collector {
        fn instances(&self) -> Vec<InstanceEvent> {
            self.instances.lock().clone()
        }
    }

    #[async_trait]
    impl TypeDefEventProcessor for Collector {
        async fn process_type_def_event(&self, _: &str, event: &TypeDefEvent, _: &ProcessingContext) {
            self.type_defs.lock().push(event.kind());
        }
    }

    #[async_trait]
    impl InstanceEventProcessor for Collector {
        async fn process_instance_event(&self, _: &str, event: &InstanceEvent, _: &ProcessingContext) {
            self.instances.lock().push(event.clone());
        }
    }

    fn manager(mode: ExchangeRuleMode) -> EventManager {
        let lookup = Arc::new(InMemoryTypeLookup::with_types([
            TypeDef::new(TypeDefSummary::new("t-asset", "Asset"), TypeDefCategory::Entity),
            TypeDef::new(
                TypeDefSummary::new("t-link", "AssetLink"),
                TypeDefCategory::Relationship,
            ),
        ]));
        let rule = ExchangeRule::builder()
            .source_name("test")
            .type_lookup(lookup)
            .mode(mode)
            .build()
            .unwrap();

        EventManager::builder()
            .source_name("test")
            .exchange_rule(Arc::new(rule))
            .validator(Arc::new(ShapeValidator))
            .build()
            .unwrap()
    }

    fn asset(guid: &str) -> EntityDetail {
        EntityDetail::new(guid, InstanceType::new("t-asset", "Asset", TypeDefCategory::Entity))
    }

    fn link(guid: &str) -> Relationship {
        Relationship::new(
            guid,
            InstanceType::new("t-link", "AssetLink", TypeDefCategory::Relationship),
            asset("e1").proxy(),
            asset("e2").proxy(),
        )
    }

    fn new_entity(guid: &str) -> InstanceEvent {
        InstanceEvent::new(
            EventOriginator::new("B"),
            InstanceEventBody::NewEntity { entity: asset(guid) },
        )
    }

    #[tokio::test]
    async fn test_buffers_until_started() {
        let manager = manager(ExchangeRuleMode::All);
        let collector = Arc::new(Collector::default());
        manager.register_repository_event_processor(collector.clone());

        let processing = ProcessingContext::new();
        manager
            .send_instance_event("cohort", new_entity("e1"), &processing)
            .await;

        assert!(!manager.is_active());
        assert_eq!(manager.buffered_len(), 1);
        assert!(collector.instances().is_empty());
        assert_eq!(processing.tracked_len(), 1);

        assert_eq!(manager.start().await, 1);
        assert!(manager.is_active());
        assert_eq!(manager.buffered_len(), 0);
        assert_eq!(collector.instances().len(), 1);

        let completion = processing.aggregate();
        assert_eq!(completion.outcome(), Some(Outcome::Succeeded));
    }

    #[tokio::test]
    async fn test_live_after_start() {
        let manager = manager(ExchangeRuleMode::All);
        let collector = Arc::new(Collector::default());
        manager.register_instance_processor(collector.clone());
        manager.start().await;

        let processing = ProcessingContext::new();
        manager
            .send_instance_event("cohort", new_entity("e1"), &processing)
            .await;

        assert_eq!(collector.instances().len(), 1);
        assert_eq!(processing.tracked_len(), 0);
    }

    #[tokio::test]
    async fn test_second_start_is_a_no_op() {
        let manager = manager(ExchangeRuleMode::All);
        manager
            .send_instance_event("cohort", new_entity("e1"), &ProcessingContext::new())
            .await;

        assert_eq!(manager.start().await, 1);
        assert_eq!(manager.start().await, 0);
    }

    #[tokio::test]
    async fn test_type_defs_drained_before_instances() {
        let manager = manager(ExchangeRuleMode::All);
        let order = Arc::new(Mutex::new(Vec::new()));

        struct Ordered(Arc<Mutex<Vec<&'static str>>>);

        #[async_trait]
        impl TypeDefEventProcessor for Ordered {
            async fn process_type_def_event(&self, _: &str, _: &TypeDefEvent, _: &ProcessingContext) {
                self.0.lock().push("type_def");
            }
        }

        #[async_trait]
        impl InstanceEventProcessor for Ordered {
            async fn process_instance_event(&self, _: &str, _: &InstanceEvent, _: &ProcessingContext) {
                self.0.lock().push("instance");
            }
        }

        manager.register_repository_event_processor(Arc::new(Ordered(order.clone())));

        let processing = ProcessingContext::new();
        manager
            .send_instance_event("cohort", new_entity("e1"), &processing)
            .await;
        manager
            .send_type_def_event(
                "cohort",
                TypeDefEvent::new(
                    EventOriginator::new("B"),
                    TypeDefEventBody::DeletedTypeDef {
                        type_def_guid: "t-old".into(),
                        type_def_name: "Old".into(),
                    },
                ),
                &processing,
            )
            .await;

        manager.start().await;
        assert_eq!(*order.lock(), vec!["type_def", "instance"]);
    }

    #[tokio::test]
    async fn test_invalid_entity_dropped() {
        let manager = manager(ExchangeRuleMode::All);
        let collector = Arc::new(Collector::default());
        manager.register_instance_processor(collector.clone());
        manager.start().await;

        let mut untyped = asset("e1");
        untyped.header.instance_type = None;
        manager
            .send_instance_event(
                "cohort",
                InstanceEvent::new(
                    EventOriginator::new("B"),
                    InstanceEventBody::NewEntity { entity: untyped },
                ),
                &ProcessingContext::new(),
            )
            .await;

        assert!(collector.instances().is_empty());
    }

    #[tokio::test]
    async fn test_batch_filtered_to_acceptable_members() {
        let manager = manager(ExchangeRuleMode::All);
        let collector = Arc::new(Collector::default());
        manager.register_instance_processor(collector.clone());
        manager.start().await;

        let bad_entity = asset("");
        let mut bad_link = link("r2");
        bad_link.entity_two = None;

        let graph = InstanceGraph::new(
            vec![asset("e1"), bad_entity, asset("e3")],
            vec![link("r1"), bad_link],
        );
        manager
            .send_instance_event(
                "cohort",
                InstanceEvent::new(
                    EventOriginator::new("B"),
                    InstanceEventBody::BatchInstances { graph },
                ),
                &ProcessingContext::new(),
            )
            .await;

        let received = collector.instances();
        assert_eq!(received.len(), 1);
        match &received[0].body {
            InstanceEventBody::BatchInstances { graph } => {
                assert_eq!(graph.entities.len(), 2);
                assert_eq!(graph.relationships.len(), 1);
            }
            other => panic!("unexpected body {:?}", other.kind()),
        }
    }

    #[tokio::test]
    async fn test_type_def_events_blocked_in_registration_only_mode() {
        let manager = manager(ExchangeRuleMode::RegistrationOnly);
        let collector = Arc::new(Collector::default());
        manager.register_type_def_processor(collector.clone());
        manager.start().await;

        manager
            .send_type_def_event(
                "cohort",
                TypeDefEvent::new(
                    EventOriginator::new("B"),
                    TypeDefEventBody::DeletedTypeDef {
                        type_def_guid: "t-asset".into(),
                        type_def_name: "Asset".into(),
                    },
                ),
                &ProcessingContext::new(),
            )
            .await;

        assert!(collector.type_defs.lock().is_empty());
    }

    #[tokio::test]
    async fn test_process_entry_point_uses_builder() {
        let manager = manager(ExchangeRuleMode::All);
        let collector = Arc::new(Collector::default());
        manager.register_instance_processor(collector.clone());
        manager.start().await;

        let originator = EventOriginator::new("B");
        let processing = ProcessingContext::new();
        let ctx = crate::context::EventContext::new("cohort", &originator, &processing);
        manager.process_deleted_entity_event(&ctx, &asset("e9")).await;

        let received = collector.instances();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].kind(), InstanceEventKind::DeletedEntityEvent);
        assert_eq!(received[0].originator, originator);
    }

    #[test]
    fn test_missing_dependencies() {
        let no_rule = EventManager::builder()
            .validator(Arc::new(ShapeValidator))
            .build();
        assert!(matches!(no_rule, Err(EventError::MissingDependency(_))));

        let lookup = Arc::new(InMemoryTypeLookup::new());
        let rule = ExchangeRule::builder()
            .source_name("test")
            .type_lookup(lookup)
            .mode(ExchangeRuleMode::All)
            .build()
            .unwrap();
        let no_validator = EventManager::builder().exchange_rule(Arc::new(rule)).build();
        assert!(matches!(no_validator, Err(EventError::MissingDependency(_))));
    }
}

//! Integration tests for common cohort workflows.
//!
//! These tests drive the facade the way an embedding repository server does.

use omrs::prelude::*;
use omrs::{InstanceEventBody, InstanceType, TypeDef, TypeDefCategory, TypeDefSummary};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct LocalRepository {
    stored: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl InstanceEventProcessor for LocalRepository {
    async fn process_new_entity_event(&self, ctx: &EventContext<'_>, entity: &EntityDetail) {
        self.stored.lock().unwrap().push(format!(
            "{}:{}",
            ctx.originator.metadata_collection_id,
            entity.guid()
        ));
    }
}

fn server(local_id: &str, mode: ExchangeRuleMode) -> (Arc<EventManager>, Arc<LocalRepository>) {
    let lookup = Arc::new(InMemoryTypeLookup::with_types([TypeDef::new(
        TypeDefSummary::new("t-asset", "Asset"),
        TypeDefCategory::Entity,
    )]));
    let rule = ExchangeRule::builder()
        .source_name(local_id)
        .type_lookup(lookup)
        .mode(mode)
        .build()
        .unwrap();
    let manager = Arc::new(
        EventManager::builder()
            .source_name(local_id)
            .exchange_rule(Arc::new(rule))
            .validator(Arc::new(ShapeValidator))
            .build()
            .unwrap(),
    );
    let repository = Arc::new(LocalRepository::default());
    manager.register_instance_processor(repository.clone());
    (manager, repository)
}

fn asset(guid: &str) -> EntityDetail {
    EntityDetail::new(
        guid,
        InstanceType::new("t-asset", "Asset", TypeDefCategory::Entity),
    )
}

// =============================================================================
// Startup
// =============================================================================

#[tokio::test]
async fn test_events_heard_during_startup_wait_for_consumers() {
    let (manager, repository) = server("A", ExchangeRuleMode::All);
    let listener = CohortEventListener::new("server-a", "A").with_instance_processor(manager.clone());

    let envelope = CohortEnvelope::from(&InstanceEvent::new(
        EventOriginator::new("B"),
        InstanceEventBody::NewEntity {
            entity: asset("early"),
        },
    ));
    assert!(listener.process_event(envelope).await.is_dispatched());
    assert!(repository.stored.lock().unwrap().is_empty());

    assert_eq!(manager.start().await, 1);
    assert_eq!(*repository.stored.lock().unwrap(), vec!["B:early"]);
    assert_eq!(listener.stats().dispatched(), 1);
}

#[tokio::test]
async fn test_completion_follows_buffered_delivery() {
    let (manager, _repository) = server("A", ExchangeRuleMode::All);

    let originator = EventOriginator::new("B");
    let processing = ProcessingContext::with_message_id("msg-1");
    let ctx = EventContext::new("server-a", &originator, &processing);
    EventBuilder::new(manager.as_ref())
        .send_new_entity_event(&ctx, asset("e1"))
        .await;

    let completion = processing.aggregate();
    let waiter = tokio::spawn(async move { completion.wait().await });

    manager.start().await;
    assert_eq!(waiter.await.unwrap(), Outcome::Succeeded);
}

// =============================================================================
// Cohort exchange
// =============================================================================

#[tokio::test]
async fn test_two_servers_share_events_over_a_channel() {
    let audit = Arc::new(
        AuditLogger::builder()
            .component("server-a")
            .backend(MemoryBackend::new())
            .build()
            .unwrap(),
    );
    let (transport, mut wire) = ChannelTransport::new(8);
    let publisher = Arc::new(
        EventPublisher::builder()
            .source_name("server-a")
            .transport(Arc::new(transport))
            .audit(audit)
            .build()
            .unwrap(),
    );

    let (server_a, _) = server("A", ExchangeRuleMode::All);
    server_a.register_repository_event_processor(publisher);
    server_a.start().await;

    let (server_b, repository_b) = server("B", ExchangeRuleMode::All);
    server_b.start().await;
    let listener_b = CohortEventListener::new("server-b", "B").with_instance_processor(server_b.clone());

    let originator = EventOriginator::new("A");
    let processing = ProcessingContext::new();
    let ctx = EventContext::new("server-a", &originator, &processing);
    EventBuilder::new(server_a.as_ref())
        .send_new_entity_event(&ctx, asset("shared"))
        .await;

    let envelope = wire.recv().await.unwrap();
    assert_eq!(envelope.originator_id(), Some("A"));
    listener_b.process_event(envelope).await;

    assert_eq!(*repository_b.stored.lock().unwrap(), vec!["A:shared"]);
}

#[tokio::test]
async fn test_registration_only_server_ignores_instances() {
    let (manager, repository) = server("A", ExchangeRuleMode::RegistrationOnly);
    manager.start().await;

    let listener = CohortEventListener::new("server-a", "A").with_instance_processor(manager.clone());
    listener
        .process_event(CohortEnvelope::from(&InstanceEvent::new(
            EventOriginator::new("B"),
            InstanceEventBody::NewEntity { entity: asset("e1") },
        )))
        .await;

    assert!(repository.stored.lock().unwrap().is_empty());
}

//! Outbound publishing of approved events

use crate::builder::Sender;
use crate::context::ProcessingContext;
use crate::error::{EventError, Result};
use crate::event::{EventOriginator, InstanceEvent, RegistryEvent, TypeDefEvent};
use crate::processor::RegistryEventProcessor;
use crate::wire::CohortEnvelope;
use async_trait::async_trait;
use omrs_audit::{AuditMessage, AuditSeverity, AuditSink};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Transport failures
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Publish failed: {0}")]
    Publish(String),

    #[error("Channel closed: {0}")]
    ChannelClosed(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl TransportError {
    /// Whether resending the same event later could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransportError::Connection(_) | TransportError::Publish(_)
        )
    }
}

/// Outbound connection to the cohort
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_registry_event(&self, event: &RegistryEvent) -> std::result::Result<(), TransportError>;

    async fn send_type_def_event(&self, event: &TypeDefEvent) -> std::result::Result<(), TransportError>;

    async fn send_instance_event(&self, event: &InstanceEvent) -> std::result::Result<(), TransportError>;
}

/// Hands approved events to the transport.
///
/// Transport failures never reach the caller. They are written to the audit
/// log with the event and its originator; registry sends also report `false`.
pub struct EventPublisher {
    source_name: String,
    transport: Arc<dyn Transport>,
    audit: Arc<dyn AuditSink>,
}

impl EventPublisher {
    pub fn builder() -> EventPublisherBuilder {
        EventPublisherBuilder::new()
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Publish a registry event, returning whether the transport accepted it
    pub async fn send_registry_event(&self, event: &RegistryEvent) -> bool {
        match self.transport.send_registry_event(event).await {
            Ok(()) => {
                debug!(source = %self.source_name, kind = %event.kind(), "Registry event published");
                true
            }
            Err(e) => {
                self.audit_failure("OMRS-PUBLISHER-0001", "registry", event, &event.originator, &e)
                    .await;
                false
            }
        }
    }

    async fn audit_failure<E: Serialize + Sync>(
        &self,
        message_id: &str,
        category: &str,
        event: &E,
        originator: &EventOriginator,
        error: &TransportError,
    ) {
        warn!(
            source = %self.source_name,
            category,
            retryable = error.is_retryable(),
            "Unable to publish event: {}",
            error
        );

        let message = AuditMessage::new(
            message_id,
            AuditSeverity::Exception,
            format!(
                "{} was unable to send a {} event to the cohort: {}",
                self.source_name, category, error
            ),
        )
        .system_action("The event is not sent; processing continues")
        .user_action("Check the cohort transport connection and that peers are reachable")
        .context("event", event)
        .context("originator", originator);

        self.audit.log_exception("send", message, error).await;
    }
}

#[async_trait]
impl Sender for EventPublisher {
    async fn send_type_def_event(&self, _source: &str, event: TypeDefEvent, _: &ProcessingContext) {
        if let Err(e) = self.transport.send_type_def_event(&event).await {
            self.audit_failure("OMRS-PUBLISHER-0002", "type_def", &event, &event.originator, &e)
                .await;
        }
    }

    async fn send_instance_event(&self, _source: &str, event: InstanceEvent, _: &ProcessingContext) {
        if let Err(e) = self.transport.send_instance_event(&event).await {
            self.audit_failure("OMRS-PUBLISHER-0003", "instance", &event, &event.originator, &e)
                .await;
        }
    }
}

#[async_trait]
impl RegistryEventProcessor for EventPublisher {
    async fn process_registry_event(&self, _source: &str, event: &RegistryEvent, _: &ProcessingContext) {
        self.send_registry_event(event).await;
    }
}

impl std::fmt::Debug for EventPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventPublisher")
            .field("source_name", &self.source_name)
            .finish()
    }
}

/// Event publisher builder
pub struct EventPublisherBuilder {
    source_name: String,
    transport: Option<Arc<dyn Transport>>,
    audit: Option<Arc<dyn AuditSink>>,
}

impl EventPublisherBuilder {
    pub fn new() -> Self {
        Self {
            source_name: "event-publisher".to_string(),
            transport: None,
            audit: None,
        }
    }

    pub fn source_name(mut self, source_name: impl Into<String>) -> Self {
        self.source_name = source_name.into();
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn build(self) -> Result<EventPublisher> {
        Ok(EventPublisher {
            source_name: self.source_name,
            transport: self
                .transport
                .ok_or(EventError::MissingDependency("event publisher transport"))?,
            audit: self
                .audit
                .ok_or(EventError::MissingDependency("event publisher audit sink"))?,
        })
    }
}

impl Default for EventPublisherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// In-process transport delivering envelopes over a bounded channel.
///
/// Sends wait while the channel is full.
#[derive(Clone, Debug)]
pub struct ChannelTransport {
    sender: mpsc::Sender<CohortEnvelope>,
}

impl ChannelTransport {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<CohortEnvelope>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    async fn deliver(&self, envelope: CohortEnvelope) -> std::result::Result<(), TransportError> {
        self.sender
            .send(envelope)
            .await
            .map_err(|_| TransportError::ChannelClosed("cohort receiver dropped".to_string()))
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn send_registry_event(&self, event: &RegistryEvent) -> std::result::Result<(), TransportError> {
        self.deliver(CohortEnvelope::from(event)).await
    }

    async fn send_type_def_event(&self, event: &TypeDefEvent) -> std::result::Result<(), TransportError> {
        self.deliver(CohortEnvelope::from(event)).await
    }

    async fn send_instance_event(&self, event: &InstanceEvent) -> std::result::Result<(), TransportError> {
        self.deliver(CohortEnvelope::from(event)).await
    }
}

//! Cohort event distribution for open metadata repositories
//!
//! Members of a cohort exchange notifications about type definitions and
//! metadata instances. This crate decides which of those events a member
//! passes on, holds them back until the member has started, and fans them out
//! to any number of consumers without losing or duplicating them.
//!
//! ## Features
//!
//! - **Exchange rules** - all, registration only, type definitions only,
//!   selected types, or types learned as they are seen
//! - **Event manager** - validation, filtering, start-up buffering and
//!   in-order fan-out to registered consumers
//! - **Listener** - routes inbound [`CohortEnvelope`]s by category, dropping
//!   self-originated and malformed traffic
//! - **Publisher** - hands approved events to a [`Transport`], audit-logging
//!   failures instead of raising them
//! - **Completion futures** - buffered work reports back once it is drained
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use omrs_events::*;
//! use std::sync::Arc;
//!
//! let lookup = Arc::new(InMemoryTypeLookup::new());
//! let rule = ExchangeRule::builder()
//!     .source_name("cocoMDS1")
//!     .type_lookup(lookup)
//!     .mode(ExchangeRuleMode::All)
//!     .build()?;
//!
//! let manager = Arc::new(
//!     EventManager::builder()
//!         .source_name("cocoMDS1")
//!         .exchange_rule(Arc::new(rule))
//!         .validator(Arc::new(ShapeValidator))
//!         .build()?,
//! );
//! manager.register_instance_processor(Arc::new(MyRepositoryConsumer::default()));
//!
//! // Events sent now are buffered...
//! manager.send_instance_event("cocoMDS1", event, &ProcessingContext::new()).await;
//!
//! // ...and delivered here.
//! manager.start().await;
//! ```
//!
//! ## Inbound traffic
//!
//! ```rust,ignore
//! let listener = CohortEventListener::new("cocoMDS1", "local-collection-id")
//!     .with_type_def_processor(manager.clone())
//!     .with_instance_processor(manager.clone());
//!
//! listener.process_event(envelope).await;
//! ```

pub mod builder;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod future;
pub mod listener;
pub mod lookup;
pub mod manager;
pub mod model;
pub mod processor;
pub mod publisher;
pub mod rule;
pub mod validator;
pub mod wire;

pub use builder::{EventBuilder, Sender};
pub use config::CohortEventSettings;
pub use context::{EventContext, ProcessingContext};
pub use error::{EventError, FutureError, Result, TypeLookupError};
pub use event::*;
pub use future::{CompletionFuture, Outcome};
pub use listener::{CohortEventListener, DiscardReason, ListenerOutcome, ListenerStats};
pub use lookup::{InMemoryTypeLookup, TypeLookup};
pub use manager::{EventManager, EventManagerBuilder};
pub use model::*;
pub use processor::{
    InstanceEventProcessor, RegistryEventProcessor, TypeDefEventProcessor,
    dispatch_instance_event, dispatch_registry_event, dispatch_type_def_event,
};
pub use publisher::{ChannelTransport, EventPublisher, EventPublisherBuilder, Transport, TransportError};
pub use rule::{ExchangeRule, ExchangeRuleBuilder, ExchangeRuleMode};
pub use validator::{ShapeValidator, Validator};
pub use wire::{
    CohortEnvelope, CohortEvent, DecodeError, EnvelopeSection, EventCategory, InstanceSection,
    PROTOCOL_VERSION, RegistrySection, TypeDefSection,
};

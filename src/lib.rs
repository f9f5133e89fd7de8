// OMRS - cohort event distribution for open metadata repositories
//
// This library wires repository events between the members of a metadata
// cohort: exchange rules decide what is shared, the event manager buffers
// until its consumers are ready, and listeners and publishers move events
// across the cohort transport.

// Re-export core functionality
pub use omrs_events::*;

// Re-export the supporting crates
pub use omrs_audit;
pub use omrs_events;

#[cfg(feature = "config")]
pub use omrs_config;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        ChannelTransport,
        CohortEnvelope,
        CohortEventListener,
        CohortEventSettings,
        CompletionFuture,
        EntityDetail,
        EventBuilder,
        EventContext,
        EventManager,
        EventOriginator,
        EventPublisher,
        ExchangeRule,
        ExchangeRuleMode,
        InMemoryTypeLookup,
        InstanceEvent,
        InstanceEventProcessor,
        ListenerOutcome,
        Outcome,
        ProcessingContext,
        RegistryEventProcessor,
        Relationship,
        Sender,
        ShapeValidator,
        Transport,
        TypeDefEvent,
        TypeDefEventProcessor,
        TypeLookup,
        Validator,
    };
    pub use omrs_audit::{AuditLogger, AuditSink, MemoryBackend};
}

//! The audit collaborator seen by event-processing components

use crate::AuditMessage;
use async_trait::async_trait;

/// Destination for audit messages.
///
/// Calls never fail from the caller's point of view: a sink that cannot store a
/// record deals with that itself.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Record a message about `action`
    async fn log_message(&self, action: &str, message: AuditMessage);

    /// Record a message about an error raised by a collaborator during `action`
    async fn log_exception(
        &self,
        action: &str,
        message: AuditMessage,
        error: &(dyn std::error::Error + Send + Sync),
    );
}

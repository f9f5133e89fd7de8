//! Audit logger

use crate::{AuditBackend, AuditBackendError, AuditMessage, AuditRecord, AuditSeverity, AuditSink};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Audit logger
///
/// Stores records in a backend and mirrors each one to `tracing`.
pub struct AuditLogger {
    component: String,
    backend: Arc<dyn AuditBackend>,
    enabled: bool,
}

impl AuditLogger {
    /// Create a new audit logger builder
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use omrs_audit::*;
    ///
    /// let logger = AuditLogger::builder()
    ///     .component("cocoMDS1")
    ///     .backend(FileBackend::new("audit.log"))
    ///     .build()
    ///     .unwrap();
    /// ```
    pub fn builder() -> AuditLoggerBuilder {
        AuditLoggerBuilder::new()
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Store a record, reporting storage failures to the caller
    pub async fn write(&self, record: AuditRecord) -> Result<(), AuditBackendError> {
        if !self.enabled {
            return Ok(());
        }

        let message = &record.message;
        if message.severity.is_failure() {
            error!(
                component = %record.reporting_component,
                action = %record.action,
                message_id = %message.message_id,
                exception = record.exception.as_deref().unwrap_or(""),
                "{}",
                message.text
            );
        } else if message.severity == AuditSeverity::Decision {
            warn!(
                component = %record.reporting_component,
                action = %record.action,
                message_id = %message.message_id,
                "{}",
                message.text
            );
        } else {
            info!(
                component = %record.reporting_component,
                action = %record.action,
                message_id = %message.message_id,
                "{}",
                message.text
            );
        }

        self.backend.write(&record).await
    }

    pub async fn flush(&self) -> Result<(), AuditBackendError> {
        self.backend.flush().await
    }

    async fn store(&self, record: AuditRecord) {
        if let Err(e) = self.write(record).await {
            error!(component = %self.component, "Failed to store audit record: {}", e);
        }
    }
}

#[async_trait]
impl AuditSink for AuditLogger {
    async fn log_message(&self, action: &str, message: AuditMessage) {
        self.store(AuditRecord::new(&self.component, action, message))
            .await;
    }

    async fn log_exception(
        &self,
        action: &str,
        message: AuditMessage,
        error: &(dyn std::error::Error + Send + Sync),
    ) {
        self.store(AuditRecord::new(&self.component, action, message).with_exception(error))
            .await;
    }
}

/// Audit logger builder
pub struct AuditLoggerBuilder {
    component: String,
    backend: Option<Arc<dyn AuditBackend>>,
    enabled: bool,
}

impl AuditLoggerBuilder {
    pub fn new() -> Self {
        Self {
            component: "omrs".to_string(),
            backend: None,
            enabled: true,
        }
    }

    /// Name recorded as the reporting component
    pub fn component(mut self, component: impl Into<String>) -> Self {
        self.component = component.into();
        self
    }

    pub fn backend(mut self, backend: impl AuditBackend + 'static) -> Self {
        self.backend = Some(Arc::new(backend));
        self
    }

    /// Share a backend with other loggers
    pub fn shared_backend(mut self, backend: Arc<dyn AuditBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn build(self) -> Result<AuditLogger, AuditBackendError> {
        Ok(AuditLogger {
            component: self.component,
            backend: self.backend.ok_or(AuditBackendError::MissingBackend)?,
            enabled: self.enabled,
        })
    }
}

impl Default for AuditLoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryBackend;

    #[derive(Debug, thiserror::Error)]
    #[error("topic unavailable")]
    struct TopicDown;

    #[tokio::test]
    async fn test_log_message_stores_record() {
        let backend = MemoryBackend::new();
        let logger = AuditLogger::builder()
            .component("cocoMDS1")
            .backend(backend.clone())
            .build()
            .unwrap();

        logger
            .log_message(
                "start",
                AuditMessage::new("OMRS-EVENTS-0001", AuditSeverity::Startup, "started"),
            )
            .await;

        let records = backend.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].reporting_component, "cocoMDS1");
        assert_eq!(records[0].action, "start");
        assert!(records[0].exception.is_none());
    }

    #[tokio::test]
    async fn test_log_exception_renders_error() {
        let backend = MemoryBackend::new();
        let logger = AuditLogger::builder()
            .backend(backend.clone())
            .build()
            .unwrap();

        logger
            .log_exception(
                "sendInstanceEvent",
                AuditMessage::new("OMRS-PUBLISHER-0002", AuditSeverity::Exception, "failed"),
                &TopicDown,
            )
            .await;

        let records = backend.records().await;
        assert_eq!(records[0].exception.as_deref(), Some("topic unavailable"));
    }

    #[tokio::test]
    async fn test_disabled_logger_stores_nothing() {
        let backend = MemoryBackend::new();
        let logger = AuditLogger::builder()
            .backend(backend.clone())
            .enabled(false)
            .build()
            .unwrap();

        logger
            .log_message("x", AuditMessage::new("ID", AuditSeverity::Info, "ignored"))
            .await;

        assert!(backend.records().await.is_empty());
    }

    #[test]
    fn test_builder_requires_backend() {
        assert!(matches!(
            AuditLogger::builder().build(),
            Err(AuditBackendError::MissingBackend)
        ));
    }
}

//! Audit record structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Severity of an audit log record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditSeverity {
    /// Informational message
    Info,
    /// An event was received or sent
    Event,
    /// A decision was made about an event
    Decision,
    /// An action was taken
    Action,
    /// Component lifecycle: starting up
    Startup,
    /// Component lifecycle: shutting down
    Shutdown,
    /// Something went wrong that the component handled
    Error,
    /// Unexpected failure from a collaborator
    Exception,
}

impl AuditSeverity {
    pub fn is_failure(&self) -> bool {
        matches!(self, AuditSeverity::Error | AuditSeverity::Exception)
    }
}

/// The message part of an audit call: what the reporting component wants said
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditMessage {
    /// Stable message identifier, e.g. `OMRS-EVENTS-0003`
    pub message_id: String,

    pub severity: AuditSeverity,

    /// Human readable text
    pub text: String,

    /// What the system did about it
    pub system_action: Option<String>,

    /// What an operator should do about it
    pub user_action: Option<String>,

    /// Extra structured context (event contents, originator, ...)
    pub context: BTreeMap<String, serde_json::Value>,
}

impl AuditMessage {
    pub fn new(
        message_id: impl Into<String>,
        severity: AuditSeverity,
        text: impl Into<String>,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            severity,
            text: text.into(),
            system_action: None,
            user_action: None,
            context: BTreeMap::new(),
        }
    }

    pub fn system_action(mut self, action: impl Into<String>) -> Self {
        self.system_action = Some(action.into());
        self
    }

    pub fn user_action(mut self, action: impl Into<String>) -> Self {
        self.user_action = Some(action.into());
        self
    }

    /// Attach a context value; serialization failures store `null`
    pub fn context<T: Serialize>(mut self, key: impl Into<String>, value: &T) -> Self {
        let value = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
        self.context.insert(key.into(), value);
        self
    }
}

/// A stored audit log record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: String,

    pub timestamp: DateTime<Utc>,

    /// Component that reported the record
    pub reporting_component: String,

    /// Operation in progress when the record was written
    pub action: String,

    #[serde(flatten)]
    pub message: AuditMessage,

    /// Rendered error for exception records
    pub exception: Option<String>,
}

impl AuditRecord {
    pub fn new(
        reporting_component: impl Into<String>,
        action: impl Into<String>,
        message: AuditMessage,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            reporting_component: reporting_component.into(),
            action: action.into(),
            message,
            exception: None,
        }
    }

    pub fn with_exception(mut self, error: &(dyn std::error::Error + Send + Sync)) -> Self {
        self.exception = Some(error.to_string());
        self
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_builder() {
        let message = AuditMessage::new("OMRS-EVENTS-0001", AuditSeverity::Startup, "started")
            .system_action("buffer drained")
            .context("buffered", &3);

        assert_eq!(message.system_action.as_deref(), Some("buffer drained"));
        assert_eq!(message.context["buffered"], serde_json::json!(3));
        assert!(message.user_action.is_none());
    }

    #[test]
    fn test_record_json_flattens_message() {
        let record = AuditRecord::new(
            "cocoMDS1",
            "start",
            AuditMessage::new("OMRS-EVENTS-0001", AuditSeverity::Info, "hello"),
        );
        let json: serde_json::Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();

        assert_eq!(json["message_id"], "OMRS-EVENTS-0001");
        assert_eq!(json["severity"], "info");
        assert_eq!(json["reporting_component"], "cocoMDS1");
    }

    #[test]
    fn test_failure_severities() {
        assert!(AuditSeverity::Exception.is_failure());
        assert!(AuditSeverity::Error.is_failure());
        assert!(!AuditSeverity::Decision.is_failure());
    }
}

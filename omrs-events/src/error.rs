//! Error types for event distribution

use thiserror::Error;

/// Errors raised while assembling or configuring the event pipeline.
///
/// Event traffic itself never produces errors: malformed or unwanted events are
/// dropped and transport failures are audit-logged.
#[derive(Debug, Error)]
pub enum EventError {
    /// A required collaborator was not supplied
    #[error("Missing dependency: {0}")]
    MissingDependency(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error(transparent)]
    Future(#[from] FutureError),

    #[error(transparent)]
    Config(#[from] omrs_config::ConfigError),
}

/// Completion future misuse
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FutureError {
    /// The future already has a result or a delegate
    #[error("Completion future already assigned")]
    AlreadyAssigned,

    /// Delegating would make the future wait on itself
    #[error("Completion future cannot delegate to itself")]
    Cycle,
}

/// Failures reported by a [`crate::TypeLookup`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeLookupError {
    #[error("Type {name} ({guid}) not found")]
    NotFound { guid: String, name: String },

    #[error("Type store unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, EventError>;

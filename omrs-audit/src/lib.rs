//! Audit logging for open metadata repository services
//!
//! Event-processing components report what they decided and what went wrong
//! through the [`AuditSink`] trait. [`AuditLogger`] is the standard sink: it
//! stores [`AuditRecord`]s in an [`AuditBackend`] and mirrors them to `tracing`.
//!
//! # Quick Start
//!
//! ```no_run
//! use omrs_audit::*;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let audit = AuditLogger::builder()
//!     .component("cocoMDS1")
//!     .backend(FileBackend::new("audit.log"))
//!     .build()?;
//!
//! audit
//!     .log_message(
//!         "start",
//!         AuditMessage::new("OMRS-EVENTS-0001", AuditSeverity::Startup, "event manager started"),
//!     )
//!     .await;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod logger;
pub mod record;
pub mod sink;

pub use backend::*;
pub use logger::*;
pub use record::*;
pub use sink::*;

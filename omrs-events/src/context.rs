//! Per-call processing context
//!
//! Every send and every consumer callback receives the context explicitly. The
//! context names the message being processed and collects the completion
//! futures of any asynchronous work started on its behalf.

use crate::event::EventOriginator;
use crate::future::CompletionFuture;
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone, Debug, Default)]
pub struct ProcessingContext {
    message_id: Option<String>,
    results: Arc<Mutex<Vec<CompletionFuture>>>,
}

impl ProcessingContext {
    /// A context for a freshly received message
    pub fn new() -> Self {
        Self::with_message_id(Uuid::new_v4().to_string())
    }

    pub fn with_message_id(message_id: impl Into<String>) -> Self {
        Self {
            message_id: Some(message_id.into()),
            results: Arc::default(),
        }
    }

    /// A context not tied to any inbound message
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    /// Register asynchronous work done on behalf of this message
    pub fn track(&self, future: CompletionFuture) {
        self.results.lock().push(future);
    }

    pub fn tracked_len(&self) -> usize {
        self.results.lock().len()
    }

    /// A future that completes once everything tracked so far completes
    pub fn aggregate(&self) -> CompletionFuture {
        let tracked = self.results.lock().clone();
        CompletionFuture::all(tracked)
    }
}

/// Arguments shared by every consumer callback
#[derive(Clone, Copy, Debug)]
pub struct EventContext<'a> {
    /// Component reporting the event
    pub source: &'a str,
    pub originator: &'a EventOriginator,
    pub processing: &'a ProcessingContext,
}

impl<'a> EventContext<'a> {
    pub fn new(
        source: &'a str,
        originator: &'a EventOriginator,
        processing: &'a ProcessingContext,
    ) -> Self {
        Self {
            source,
            originator,
            processing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::future::Outcome;

    #[test]
    fn test_clones_share_tracker() {
        let ctx = ProcessingContext::with_message_id("msg-7");
        let clone = ctx.clone();
        clone.track(CompletionFuture::pending());

        assert_eq!(ctx.tracked_len(), 1);
        assert_eq!(ctx.message_id(), Some("msg-7"));
    }

    #[test]
    fn test_aggregate_of_nothing_is_done() {
        assert!(ProcessingContext::new().aggregate().is_done());
        assert!(ProcessingContext::detached().message_id().is_none());
    }

    #[test]
    fn test_aggregate_waits_for_tracked_work() {
        let ctx = ProcessingContext::new();
        let work = CompletionFuture::pending();
        ctx.track(work.clone());

        let aggregate = ctx.aggregate();
        assert!(!aggregate.is_done());
        work.resolve(Outcome::Succeeded).unwrap();
        assert!(aggregate.is_done());
    }
}

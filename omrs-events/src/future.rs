//! Delegatable completion futures
//!
//! A [`CompletionFuture`] is a single-assignment cell. It starts pending and is
//! given its result exactly once, either directly ([`CompletionFuture::resolve`])
//! or by pointing it at another future ([`CompletionFuture::delegate_to`]), after
//! which it mirrors that future forever. A second assignment is rejected and the
//! first one stays in force.

use crate::error::FutureError;
use parking_lot::{Mutex, MutexGuard, const_mutex};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Notify;

/// Serializes delegations so the cycle check and the assignment happen as one step
static DELEGATION: Mutex<()> = const_mutex(());

/// Result of asynchronous event processing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Succeeded,
    Failed(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded)
    }
}

enum State {
    Pending,
    Resolved(Outcome),
    Delegated(CompletionFuture),
    All(Vec<CompletionFuture>),
}

struct Inner {
    correlation_id: Option<String>,
    state: Mutex<State>,
    changed: Notify,
}

#[derive(Clone)]
pub struct CompletionFuture {
    inner: Arc<Inner>,
}

impl CompletionFuture {
    fn with_state(correlation_id: Option<String>, state: State) -> Self {
        Self {
            inner: Arc::new(Inner {
                correlation_id,
                state: Mutex::new(state),
                changed: Notify::new(),
            }),
        }
    }

    /// A pending future with no correlation id
    pub fn pending() -> Self {
        Self::with_state(None, State::Pending)
    }

    /// A pending future correlated with a processing-context message id
    pub fn correlated(correlation_id: Option<String>) -> Self {
        Self::with_state(correlation_id, State::Pending)
    }

    pub fn resolved(outcome: Outcome) -> Self {
        Self::with_state(None, State::Resolved(outcome))
    }

    pub fn succeeded() -> Self {
        Self::resolved(Outcome::Succeeded)
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self::resolved(Outcome::Failed(reason.into()))
    }

    /// Done once every member is done; fails with the first failing member.
    /// An empty aggregate is immediately successful.
    pub fn all(members: Vec<CompletionFuture>) -> Self {
        if members.is_empty() {
            return Self::succeeded();
        }
        Self::with_state(None, State::All(members))
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.inner.correlation_id.as_deref()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.inner.state.lock()
    }

    /// Give a pending future its result
    pub fn resolve(&self, outcome: Outcome) -> Result<(), FutureError> {
        {
            let mut state = self.lock();
            if !matches!(*state, State::Pending) {
                return Err(FutureError::AlreadyAssigned);
            }
            *state = State::Resolved(outcome);
        }
        self.inner.changed.notify_waiters();
        Ok(())
    }

    /// Make a pending future mirror `source`
    pub fn delegate_to(&self, source: CompletionFuture) -> Result<(), FutureError> {
        {
            let _delegation = DELEGATION.lock();
            if source.waits_on(self) {
                return Err(FutureError::Cycle);
            }
            let mut state = self.lock();
            if !matches!(*state, State::Pending) {
                return Err(FutureError::AlreadyAssigned);
            }
            *state = State::Delegated(source);
        }
        self.inner.changed.notify_waiters();
        Ok(())
    }

    fn waits_on(&self, other: &CompletionFuture) -> bool {
        if Arc::ptr_eq(&self.inner, &other.inner) {
            return true;
        }
        let next: Vec<CompletionFuture> = match &*self.lock() {
            State::Delegated(delegate) => vec![delegate.clone()],
            State::All(members) => members.clone(),
            _ => Vec::new(),
        };
        next.iter().any(|f| f.waits_on(other))
    }

    pub fn is_done(&self) -> bool {
        self.outcome().is_some()
    }

    /// The result, or `None` while still pending
    pub fn outcome(&self) -> Option<Outcome> {
        let next = match &*self.lock() {
            State::Pending => return None,
            State::Resolved(outcome) => return Some(outcome.clone()),
            State::Delegated(delegate) => vec![delegate.clone()],
            State::All(members) => members.clone(),
        };

        let mut result = Outcome::Succeeded;
        for member in &next {
            match member.outcome()? {
                Outcome::Succeeded => {}
                failed @ Outcome::Failed(_) => {
                    if result.is_success() {
                        result = failed;
                    }
                }
            }
        }
        Some(result)
    }

    /// Wait until the future has a result
    pub async fn wait(&self) -> Outcome {
        let mut current = self.clone();
        loop {
            match current.wait_step().await {
                Step::Done(outcome) => return outcome,
                Step::Follow(delegate) => current = delegate,
            }
        }
    }

    async fn wait_step(&self) -> Step {
        loop {
            let notified = self.inner.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let members = match &*self.lock() {
                State::Pending => None,
                State::Resolved(outcome) => return Step::Done(outcome.clone()),
                State::Delegated(delegate) => return Step::Follow(delegate.clone()),
                State::All(members) => Some(members.clone()),
            };

            match members {
                Some(members) => {
                    let mut result = Outcome::Succeeded;
                    for member in members {
                        let outcome = Box::pin(member.wait()).await;
                        if result.is_success() {
                            result = outcome;
                        }
                    }
                    return Step::Done(result);
                }
                None => notified.await,
            }
        }
    }
}

enum Step {
    Done(Outcome),
    Follow(CompletionFuture),
}

impl std::fmt::Debug for CompletionFuture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionFuture")
            .field("correlation_id", &self.inner.correlation_id)
            .field("outcome", &self.outcome())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_pending_until_delegated() {
        let future = CompletionFuture::correlated(Some("msg-1".to_string()));
        assert!(!future.is_done());
        assert_eq!(future.correlation_id(), Some("msg-1"));

        future.delegate_to(CompletionFuture::succeeded()).unwrap();
        assert!(future.is_done());
        assert_eq!(future.outcome(), Some(Outcome::Succeeded));
    }

    #[test]
    fn test_second_delegation_rejected() {
        let future = CompletionFuture::pending();
        future.delegate_to(CompletionFuture::failed("boom")).unwrap();

        assert_eq!(
            future.delegate_to(CompletionFuture::succeeded()),
            Err(FutureError::AlreadyAssigned)
        );
        assert_eq!(future.outcome(), Some(Outcome::Failed("boom".to_string())));
        assert_eq!(
            future.resolve(Outcome::Succeeded),
            Err(FutureError::AlreadyAssigned)
        );
    }

    #[test]
    fn test_delegate_mirrors_later_resolution() {
        let source = CompletionFuture::pending();
        let future = CompletionFuture::pending();
        future.delegate_to(source.clone()).unwrap();

        assert!(!future.is_done());
        source.resolve(Outcome::Succeeded).unwrap();
        assert!(future.is_done());
    }

    #[test]
    fn test_cycles_rejected() {
        let a = CompletionFuture::pending();
        let b = CompletionFuture::pending();
        assert_eq!(a.delegate_to(a.clone()), Err(FutureError::Cycle));

        b.delegate_to(a.clone()).unwrap();
        assert_eq!(a.delegate_to(b.clone()), Err(FutureError::Cycle));
        assert!(!a.is_done());
    }

    #[test]
    fn test_aggregate_reports_first_failure() {
        let first = CompletionFuture::pending();
        let second = CompletionFuture::pending();
        let all = CompletionFuture::all(vec![first.clone(), second.clone()]);

        assert!(!all.is_done());
        first.resolve(Outcome::Failed("first".to_string())).unwrap();
        assert!(!all.is_done());
        second.resolve(Outcome::Failed("second".to_string())).unwrap();
        assert_eq!(all.outcome(), Some(Outcome::Failed("first".to_string())));
    }

    #[test]
    fn test_empty_aggregate_is_done() {
        assert_eq!(
            CompletionFuture::all(Vec::new()).outcome(),
            Some(Outcome::Succeeded)
        );
    }

    #[test]
    fn test_concurrent_cross_delegation_never_forms_cycle() {
        for _ in 0..2_000 {
            let a = CompletionFuture::pending();
            let b = CompletionFuture::pending();
            let barrier = Arc::new(Barrier::new(2));

            let other = {
                let (a, b, barrier) = (a.clone(), b.clone(), barrier.clone());
                thread::spawn(move || {
                    barrier.wait();
                    a.delegate_to(b).is_ok()
                })
            };
            barrier.wait();
            let here = b.delegate_to(a.clone()).is_ok();
            let there = other.join().unwrap();

            assert!(!(here && there), "both delegations accepted");
            assert!(here || there);
            assert!(!a.is_done());
        }
    }

    #[test]
    fn test_blocking_wait_on_delegated_outcome() {
        let future = CompletionFuture::pending();
        future.delegate_to(CompletionFuture::failed("rejected")).unwrap();

        assert_eq!(
            tokio_test::block_on(future.wait()),
            Outcome::Failed("rejected".to_string())
        );
    }

    #[tokio::test]
    async fn test_wait_follows_delegation_chain() {
        let source = CompletionFuture::pending();
        let middle = CompletionFuture::pending();
        let future = CompletionFuture::pending();
        future.delegate_to(middle.clone()).unwrap();

        let waiter = {
            let future = future.clone();
            tokio::spawn(async move { future.wait().await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        middle
            .delegate_to(CompletionFuture::all(vec![source.clone()]))
            .unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        source.resolve(Outcome::Succeeded).unwrap();

        let outcome = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome, Outcome::Succeeded);
    }
}

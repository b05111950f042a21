//! Route guards
//!
//! A guard is a cold stream of booleans: every navigation subscribes afresh
//! and the first emission decides.

use futures::stream::{self, BoxStream, StreamExt};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

/// Guard errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    /// The guard stream reported an error
    #[error("Guard failed: {0}")]
    Failed(String),
}

/// Stream produced by subscribing to a guard
pub type GuardStream = BoxStream<'static, Result<bool, GuardError>>;

/// Outcome of evaluating a guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardVerdict {
    /// First emission was `true`
    Allow,
    /// First emission was `false`
    Deny,
    /// The stream errored before approving
    Error(GuardError),
    /// The stream ended without emitting
    Completed,
}

impl GuardVerdict {
    /// Whether navigation may proceed
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardVerdict::Allow)
    }
}

/// An asynchronous predicate that must approve a navigation before it commits
#[derive(Clone)]
pub struct RouteGuard {
    subscribe: Arc<dyn Fn() -> GuardStream + Send + Sync>,
}

impl RouteGuard {
    /// Create a guard from a stream factory
    pub fn new<F, S>(subscribe: F) -> Self
    where
        F: Fn() -> S + Send + Sync + 'static,
        S: futures::Stream<Item = Result<bool, GuardError>> + Send + 'static,
    {
        Self {
            subscribe: Arc::new(move || subscribe().boxed()),
        }
    }

    /// Guard that always approves
    pub fn allow() -> Self {
        Self::from_fn(|| true)
    }

    /// Guard that always rejects
    pub fn deny() -> Self {
        Self::from_fn(|| false)
    }

    /// Guard from a synchronous predicate
    pub fn from_fn<F>(predicate: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        Self::new(move || stream::once(futures::future::ready(Ok(predicate()))))
    }

    /// Guard from an async check
    pub fn from_future<F, Fut>(check: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool, GuardError>> + Send + 'static,
    {
        Self::new(move || stream::once(check()))
    }

    /// Guard that reads the current value of a watch channel
    pub fn from_watch(receiver: watch::Receiver<bool>) -> Self {
        Self::from_fn(move || *receiver.borrow())
    }

    /// Subscribe to the guard
    pub fn subscribe(&self) -> GuardStream {
        (self.subscribe)()
    }

    /// Subscribe and wait for the first emission
    pub async fn evaluate(&self) -> GuardVerdict {
        match self.subscribe().next().await {
            Some(Ok(true)) => GuardVerdict::Allow,
            Some(Ok(false)) => GuardVerdict::Deny,
            Some(Err(e)) => GuardVerdict::Error(e),
            None => GuardVerdict::Completed,
        }
    }
}

impl fmt::Debug for RouteGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RouteGuard")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_guards() {
        assert_eq!(RouteGuard::allow().evaluate().await, GuardVerdict::Allow);
        assert_eq!(RouteGuard::deny().evaluate().await, GuardVerdict::Deny);
    }

    #[tokio::test]
    async fn test_first_emission_decides() {
        let guard = RouteGuard::new(|| stream::iter(vec![Ok(false), Ok(true)]));
        assert_eq!(guard.evaluate().await, GuardVerdict::Deny);

        let guard = RouteGuard::new(|| stream::iter(vec![Ok(true), Ok(false)]));
        assert!(guard.evaluate().await.is_allowed());
    }

    #[tokio::test]
    async fn test_error_and_empty_streams() {
        let guard = RouteGuard::new(|| stream::iter(vec![Err(GuardError::Failed("401".into()))]));
        assert_eq!(guard.evaluate().await, GuardVerdict::Error(GuardError::Failed("401".into())));

        let guard = RouteGuard::new(|| stream::empty());
        assert_eq!(guard.evaluate().await, GuardVerdict::Completed);
        assert!(!GuardVerdict::Completed.is_allowed());
    }

    #[tokio::test]
    async fn test_watch_guard_follows_channel() {
        let (tx, rx) = watch::channel(false);
        let guard = RouteGuard::from_watch(rx);
        assert_eq!(guard.evaluate().await, GuardVerdict::Deny);

        tx.send(true).unwrap();
        assert_eq!(guard.evaluate().await, GuardVerdict::Allow);
    }

    #[tokio::test]
    async fn test_async_guard() {
        let guard = RouteGuard::from_future(|| async {
            tokio::task::yield_now().await;
            Ok(true)
        });
        assert_eq!(guard.evaluate().await, GuardVerdict::Allow);
    }
}

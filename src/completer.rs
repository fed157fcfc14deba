//! Write side of a deferred result
//!
//! A completer is handed over to the execution unit alongside the
//! computation, and is the only way to move a running deferred result to its
//! final state. It exists so that a computation which never reports an
//! outcome (because it panicked, or because it was dropped by an executor
//! which could not run it) does not leave readers blocked forever.

use crate::deferred::Shared;
use crate::error::Error;
use std::sync::Arc;
use tracing::warn;


/// Interface used to submit the outcome of a deferred computation
pub(crate) struct Completer<T, E>
    where T: Send + Sync + 'static,
          E: Send + Sync + 'static
{
    /// Deferred result to be completed, until it has been
    shared: Option<Arc<Shared<T, E>>>,
}
//
impl<T, E> Completer<T, E>
    where T: Send + Sync + 'static,
          E: Send + Sync + 'static
{
    /// Create a completer for a running deferred result
    pub fn new(shared: Arc<Shared<T, E>>) -> Self {
        Completer { shared: Some(shared) }
    }

    /// Submit the outcome of the computation
    pub fn complete(mut self, outcome: Result<T, Error<E>>) {
        if let Some(shared) = self.shared.take() {
            shared.settle(outcome);
        }
    }
}
//
impl<T, E> Drop for Completer<T, E>
    where T: Send + Sync + 'static,
          E: Send + Sync + 'static
{
    /// If the completer is dropped before an outcome was submitted, reject
    /// the deferred result in order to prevent its readers from hanging
    fn drop(&mut self) {
        if let Some(shared) = self.shared.take() {
            warn!(deferred = shared.id(),
                  "computation dropped before producing an outcome");
            shared.settle(Err(Error::Abandoned));
        }
    }
}

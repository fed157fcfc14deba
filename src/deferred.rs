//! Deferred results
//!
//! A deferred result wraps a computation which will eventually produce either
//! a value or a failure. Nothing happens when it is created: the computation
//! is handed over to an executor when the deferred result is started, either
//! explicitly or implicitly by someone blocking on its result or chaining
//! further work after it.
//!
//! Interested parties can learn about the outcome in three ways:
//!
//! - Blocking on the result, which is easy to use and reason about but
//!   should be used with care as it stalls the calling thread.
//! - Registering callbacks, which are run by the execution unit as soon as
//!   the outcome is known (or right away, if it already is).
//! - Chaining a continuation with `then`, which produces a new deferred
//!   result fed by the outcome of the previous one.
//!
//! Deferred results are cheap to clone: all clones refer to the same
//! computation and outcome.

use crate::completer::Completer;
use crate::error::Error;
use crate::executor::{self, Executor, Job};
use crate::monitor::StateMonitor;
use crate::signal::CompletionSignal;
use crate::state::State;
use parking_lot::Mutex;
use std::fmt;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace, warn};
use triple_buffer::{Input, TripleBuffer};


/// Computation backing a deferred result
type Computation<T, E> = Box<dyn FnOnce() -> Result<T, Error<E>> + Send>;

/// Callback run when a deferred result is fulfilled
type SuccessCallback<T> = Box<dyn FnOnce(&T) + Send>;

/// Callback run when a deferred result is rejected
type FailureCallback<E> = Box<dyn FnOnce(&Error<E>) + Send>;

/// Source of deferred result identifiers
static NEXT_ID: AtomicU64 = AtomicU64::new(0);


/// Eventual outcome of a computation
pub struct Deferred<T, E> {
    /// Reference-counted shared state
    shared: Arc<Shared<T, E>>,
}
//
impl<T, E> Deferred<T, E>
    where T: Send + Sync + 'static,
          E: Send + Sync + 'static
{
    /// Create a pending deferred result, run by the default executor
    ///
    /// The computation is not invoked until the deferred result is started.
    ///
    pub fn new<F>(computation: F) -> Self
        where F: FnOnce() -> Result<T, E> + Send + 'static
    {
        Self::with_executor(executor::default_executor(), computation)
    }

    /// Create a pending deferred result, run by a specific executor
    ///
    /// Deferred results chained after this one will use the same executor.
    ///
    pub fn with_executor<F>(executor: Arc<dyn Executor>, computation: F) -> Self
        where F: FnOnce() -> Result<T, E> + Send + 'static
    {
        Self::from_computation(
            executor,
            Box::new(move || computation().map_err(Error::Failed))
        )
    }

    /// Create a deferred result which will be fulfilled with a known value
    pub fn resolved(value: T) -> Self {
        Self::new(move || Ok(value))
    }

    /// Create a deferred result which will be rejected with a known failure
    pub fn rejected(failure: E) -> Self {
        Self::new(move || Err(failure))
    }

    /// Build a pending deferred result around an already wrapped computation
    fn from_computation(executor: Arc<dyn Executor>,
                        computation: Computation<T, E>) -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        trace!(deferred = id, "created deferred result");
        Deferred {
            shared: Arc::new(
                Shared {
                    id,
                    executor,
                    inner: Mutex::new(
                        Inner {
                            computation: Some(computation),
                            state: State::Pending,
                            started: false,
                            outcome: None,
                            on_success: Vec::new(),
                            on_failure: Vec::new(),
                            successor: None,
                            monitors: Vec::new(),
                        }
                    ),
                    done: CompletionSignal::new(),
                }
            ),
        }
    }

    /// Process-wide unique identifier of this deferred result
    pub fn id(&self) -> u64 {
        self.shared.id
    }

    /// Hand the computation over to the executor
    ///
    /// Only the first call has any effect, no matter how many threads try to
    /// start the deferred result concurrently. This does not wait for the
    /// computation, unless the executor itself runs it inline.
    ///
    pub fn start(&self) {
        // Claim the computation, if nobody did so already
        let computation = {
            let mut inner = self.shared.inner.lock();
            if inner.state != State::Pending || inner.started {
                return;
            }
            let Some(computation) = inner.computation.take() else {
                return;
            };
            inner.started = true;
            inner.transition(State::Running);
            computation
        };
        debug!(deferred = self.id(), "starting deferred computation");

        // Run it, letting the completer report the outcome
        let completer = Completer::new(self.shared.clone());
        let job: Job = Box::new(move || completer.complete(computation()));
        if let Err(error) = self.shared.executor.execute(job) {
            warn!(deferred = self.id(), %error,
                  "failed to spawn an execution unit");
        }
    }

    /// Start the deferred result if needed, then block until it reaches its
    /// final state and all callbacks registered by then have run
    pub fn wait(&self) {
        self.start();
        self.shared.done.wait();
    }

    /// Start the deferred result if needed, then block until its outcome is
    /// known and return it
    ///
    /// Every caller, on every thread, receives the same outcome.
    ///
    pub fn result(&self) -> Result<T, Error<E>>
        where T: Clone,
              E: Clone
    {
        self.wait();
        let inner = self.shared.inner.lock();
        match inner.outcome.as_deref() {
            Some(outcome) => outcome.clone(),
            None => Err(Error::Abandoned),
        }
    }

    /// Chain a continuation after this deferred result
    ///
    /// The returned deferred result waits for this one, then feeds its value
    /// to the continuation. If this one fails, the continuation is never
    /// invoked and the failure is propagated unchanged.
    ///
    /// This deferred result is started right away so that chains make
    /// progress, but the returned one is left pending: it only runs once it
    /// is started, chained after, or blocked on.
    ///
    pub fn then<U, F>(&self, continuation: F) -> Deferred<U, E>
        where U: Send + Sync + 'static,
              F: FnOnce(T) -> Result<U, E> + Send + 'static,
              T: Clone,
              E: Clone
    {
        self.start();

        let parent = self.clone();
        let next = Deferred::from_computation(
            self.shared.executor.clone(),
            Box::new(move || {
                let value = parent.result()?;
                continuation(value).map_err(Error::Failed)
            })
        );

        let link: Arc<dyn ChainLink> = next.shared.clone();
        self.shared.inner.lock().successor = Some(Arc::downgrade(&link));
        trace!(deferred = self.id(), successor = next.id(),
               "chained deferred result");
        next
    }

    /// Register a callback to be run when this deferred result is fulfilled
    ///
    /// If it already is, the callback is run right away on the calling
    /// thread. If it was rejected instead, the callback is dropped without
    /// ever being run. Callbacks registered before completion run in
    /// registration order, on the execution unit, before readers blocked on
    /// the result are woken up. They must thus not block on this deferred
    /// result themselves.
    ///
    pub fn on_success<F>(&self, callback: F)
        where F: FnOnce(&T) + Send + 'static
    {
        let outcome = {
            let mut inner = self.shared.inner.lock();
            match inner.state {
                State::Pending | State::Running => {
                    trace!(deferred = self.id(), "queued success callback");
                    inner.on_success.push(Box::new(callback));
                    return;
                }
                State::Rejected => return,
                State::Fulfilled => inner.outcome.clone(),
            }
        };
        if let Some(Ok(value)) = outcome.as_deref() {
            trace!(deferred = self.id(), "running late success callback");
            callback(value);
        }
    }

    /// Register a callback to be run when this deferred result is rejected
    ///
    /// This is the failure counterpart of `on_success`, with the same
    /// ordering and reentrancy rules.
    ///
    pub fn on_failure<F>(&self, callback: F)
        where F: FnOnce(&Error<E>) + Send + 'static
    {
        let outcome = {
            let mut inner = self.shared.inner.lock();
            match inner.state {
                State::Pending | State::Running => {
                    trace!(deferred = self.id(), "queued failure callback");
                    inner.on_failure.push(Box::new(callback));
                    return;
                }
                State::Fulfilled => return,
                State::Rejected => inner.outcome.clone(),
            }
        };
        if let Some(Err(error)) = outcome.as_deref() {
            trace!(deferred = self.id(), "running late failure callback");
            callback(error);
        }
    }

    /// Current state of this deferred result
    pub fn state(&self) -> State {
        self.shared.inner.lock().state
    }

    /// Check whether the outcome is known and all callbacks registered
    /// before completion have run, without blocking
    pub fn is_done(&self) -> bool {
        self.shared.done.is_fired()
    }

    /// Deferred result most recently chained after this one, if it is still
    /// alive
    pub fn successor(&self) -> Option<Arc<dyn ChainLink>> {
        self.shared.successor()
    }

    /// Create a lock-free monitor of this deferred result's state
    pub fn monitor(&self) -> StateMonitor {
        let mut inner = self.shared.inner.lock();
        let (buf_input, buf_output) = TripleBuffer::new(&inner.state).split();
        // Final states are never published again
        if !inner.state.is_terminal() {
            inner.monitors.push(buf_input);
        }
        StateMonitor::new(self.id(), buf_output)
    }
}
//
impl<T, E> Clone for Deferred<T, E> {
    fn clone(&self) -> Self {
        Deferred { shared: self.shared.clone() }
    }
}
//
impl<T, E> fmt::Debug for Deferred<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Deferred")
         .field("id", &self.shared.id)
         .field("state", &self.shared.inner.lock().state)
         .finish()
    }
}


/// Type-erased view of a link in a chain of deferred results
pub trait ChainLink: Send + Sync {
    /// Identifier of the deferred result
    fn id(&self) -> u64;

    /// Current state of the deferred result
    fn state(&self) -> State;

    /// Next link in the chain, if any is still alive
    fn successor(&self) -> Option<Arc<dyn ChainLink>>;
}


/// State shared between all clones of a deferred result and its completer
pub(crate) struct Shared<T, E> {
    /// Identifier of the deferred result, used for logging and introspection
    id: u64,

    /// Executor which runs the computation
    executor: Arc<dyn Executor>,

    /// Mutable state (mutex-protected)
    inner: Mutex<Inner<T, E>>,

    /// Fired once the outcome is known and callbacks have run
    done: CompletionSignal,
}
//
impl<T, E> Shared<T, E>
    where T: Send + Sync + 'static,
          E: Send + Sync + 'static
{
    /// Identifier of the deferred result
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Record the outcome of the computation, run the callbacks which were
    /// registered so far, then wake up readers
    pub fn settle(&self, outcome: Result<T, Error<E>>) {
        let outcome = Arc::new(outcome);

        // Move to the final state and grab the callbacks
        let (on_success, on_failure) = {
            let mut inner = self.inner.lock();
            if inner.state != State::Running {
                warn!(deferred = self.id, state = %inner.state,
                      "ignoring outcome of a deferred result which is not running");
                return;
            }
            inner.outcome = Some(outcome.clone());
            inner.transition(if outcome.is_ok() { State::Fulfilled }
                             else { State::Rejected });
            (mem::take(&mut inner.on_success), mem::take(&mut inner.on_failure))
        };
        debug!(deferred = self.id, fulfilled = outcome.is_ok(),
               "deferred result settled");

        // Run the callbacks outside of the lock, so that they may use this
        // deferred result. A panicking callback must neither skip the next
        // ones nor keep readers from being woken up.
        match &*outcome {
            Ok(value) => {
                trace!(deferred = self.id, callbacks = on_success.len(),
                       "running success callbacks");
                for callback in on_success {
                    self.run_callback(|| callback(value));
                }
            }
            Err(error) => {
                trace!(deferred = self.id, callbacks = on_failure.len(),
                       "running failure callbacks");
                for callback in on_failure {
                    self.run_callback(|| callback(error));
                }
            }
        }

        self.done.fire();
    }

    /// Run a completion callback, containing any panic it raises
    fn run_callback(&self, callback: impl FnOnce()) {
        if panic::catch_unwind(AssertUnwindSafe(callback)).is_err() {
            warn!(deferred = self.id, "completion callback panicked");
        }
    }
}
//
impl<T, E> ChainLink for Shared<T, E>
    where T: Send + Sync + 'static,
          E: Send + Sync + 'static
{
    fn id(&self) -> u64 {
        self.id
    }

    fn state(&self) -> State {
        self.inner.lock().state
    }

    fn successor(&self) -> Option<Arc<dyn ChainLink>> {
        self.inner.lock().successor.as_ref().and_then(Weak::upgrade)
    }
}


/// Mutable part of the shared state
struct Inner<T, E> {
    /// Computation, until an execution unit claims it
    computation: Option<Computation<T, E>>,

    /// Current state
    state: State,

    /// Whether the computation was handed over to the executor
    started: bool,

    /// Outcome of the computation, once known
    outcome: Option<Arc<Result<T, Error<E>>>>,

    /// Callbacks waiting for a value, in registration order
    on_success: Vec<SuccessCallback<T>>,

    /// Callbacks waiting for a failure, in registration order
    on_failure: Vec<FailureCallback<E>>,

    /// Deferred result most recently chained after this one
    successor: Option<Weak<dyn ChainLink>>,

    /// State transitions are published to these triple buffers
    monitors: Vec<Input<State>>,
}
//
impl<T, E> Inner<T, E> {
    /// Move to a new state and tell monitors about it
    fn transition(&mut self, next: State) {
        debug_assert!(self.state.can_become(next),
                      "illegal state transition {} -> {}", self.state, next);
        self.state = next;
        for monitor in &mut self.monitors {
            monitor.write(next);
        }
        if next.is_terminal() {
            self.monitors.clear();
        }
    }
}

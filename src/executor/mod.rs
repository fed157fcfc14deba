//! Execution substrates for deferred computations
//!
//! A deferred result does not care much about where its computation runs, as
//! long as it runs independently from whoever started it and eventually gets
//! to report an outcome. This module abstracts this away behind the Executor
//! trait, so that the same deferred results can be backed by dedicated OS
//! threads, run inline for testing purposes, or be handed over to whatever
//! scheduling infrastructure an application already has.
//!
//! Two executors are provided:
//!
//! - The thread executor spawns one OS thread per computation. It is the
//!   default, and matches the "fire and forget" execution model which
//!   deferred results are designed around.
//! - The inline executor runs computations synchronously on the thread which
//!   starts them. It is mostly useful for deterministic tests.

pub mod inline;
pub mod thread;

use std::io;
use std::sync::{Arc, OnceLock};


/// Unit of work submitted to an executor
pub type Job = Box<dyn FnOnce() + Send + 'static>;


/// Entry point to computation scheduling. Runs jobs independently from the
/// code which submits them.
pub trait Executor: Send + Sync {
    /// Schedule a job for execution
    ///
    /// If the job cannot be scheduled, it must be dropped without being run
    /// and an error must be returned.
    ///
    fn execute(&self, job: Job) -> io::Result<()>;
}


/// Executor used by deferred results which were not given one explicitly
pub fn default_executor() -> Arc<dyn Executor> {
    static DEFAULT: OnceLock<Arc<thread::ThreadExecutor>> = OnceLock::new();
    DEFAULT.get_or_init(|| Arc::new(thread::ThreadExecutor::new()))
           .clone()
}

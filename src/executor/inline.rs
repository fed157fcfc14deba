//! Inline executor, implementing synchronous computation execution
//!
//! This executor directly runs computations on the thread which starts them,
//! so that starting a deferred result only returns once it has reached its
//! final state. This defeats the purpose of deferred results in production,
//! but makes for fully deterministic tests and can be a good choice for very
//! short computations whose result is needed right away.

use crate::executor::{Executor, Job};
use std::io;


/// Executor implementation suitable for inline computation execution
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineExecutor {}
//
impl InlineExecutor {
    /// Create a new inline executor
    pub fn new() -> Self {
        InlineExecutor {}
    }
}
//
impl Executor for InlineExecutor {
    fn execute(&self, job: Job) -> io::Result<()> {
        job();
        Ok(())
    }
}

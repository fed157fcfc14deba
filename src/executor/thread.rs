//! Thread executor, running each computation on a dedicated OS thread
//!
//! Threads are detached: nobody ever joins them, and the only way to learn
//! about the end of a computation is through the deferred result which it
//! feeds.

use crate::executor::{Executor, Job};
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;


/// Default prefix of the names given to spawned threads
pub const DEFAULT_NAME_PREFIX: &str = "deferred";


/// Executor implementation spawning one OS thread per job
#[derive(Debug)]
pub struct ThreadExecutor {
    /// Spawned threads are named "<name_prefix>-<thread number>"
    name_prefix: String,

    /// Stack size of spawned threads, if the platform default won't do
    stack_size: Option<usize>,

    /// Number of threads spawned so far
    spawned: AtomicU64,
}
//
impl ThreadExecutor {
    /// Create a thread executor with the default configuration
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start configuring a thread executor
    pub fn builder() -> ThreadExecutorBuilder {
        ThreadExecutorBuilder {
            name_prefix: DEFAULT_NAME_PREFIX.to_owned(),
            stack_size: None,
        }
    }

    /// Prefix of the names given to spawned threads
    pub fn name_prefix(&self) -> &str {
        &self.name_prefix
    }

    /// Stack size of spawned threads, if configured
    pub fn stack_size(&self) -> Option<usize> {
        self.stack_size
    }
}
//
impl Default for ThreadExecutor {
    fn default() -> Self {
        Self::new()
    }
}
//
impl Executor for ThreadExecutor {
    fn execute(&self, job: Job) -> io::Result<()> {
        let number = self.spawned.fetch_add(1, Ordering::Relaxed);
        let mut builder = thread::Builder::new()
            .name(format!("{}-{}", self.name_prefix, number));
        if let Some(stack_size) = self.stack_size {
            builder = builder.stack_size(stack_size);
        }
        builder.spawn(job).map(|_detached| ())
    }
}


/// Configuration of a ThreadExecutor
#[derive(Clone, Debug)]
pub struct ThreadExecutorBuilder {
    name_prefix: String,
    stack_size: Option<usize>,
}
//
impl ThreadExecutorBuilder {
    /// Set the prefix of spawned thread names
    pub fn name_prefix(mut self, name_prefix: impl Into<String>) -> Self {
        self.name_prefix = name_prefix.into();
        self
    }

    /// Set the stack size of spawned threads, in bytes
    pub fn stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = Some(stack_size);
        self
    }

    /// Build the configured executor
    pub fn build(self) -> ThreadExecutor {
        ThreadExecutor {
            name_prefix: self.name_prefix,
            stack_size: self.stack_size,
            spawned: AtomicU64::new(0),
        }
    }
}

//! Deferred results
//!
//! Picture yourself in a situation where: you want some work to happen in the
//! background, you have other things to do meanwhile, and at some point you
//! will need its outcome, or want something to happen as soon as it is known,
//! or want more work to be done with it in the background as well.
//!
//! This crate provides a single primitive for all of this: the deferred
//! result. It wraps a computation which produces either a value or a failure,
//! runs it exactly once on an independent execution unit, and lets any number
//! of threads block on its outcome, subscribe callbacks to it, or chain
//! further computations after it.
//!
//! ```
//! use deferred_result::Deferred;
//!
//! let greeting = Deferred::<_, String>::new(|| Ok("Hello".to_owned()))
//!     .then(|s| Ok(s + ", world"));
//! assert_eq!(greeting.result().unwrap(), "Hello, world");
//! ```

mod completer;
pub mod deferred;
pub mod error;
pub mod executor;
pub mod monitor;
pub mod signal;
pub mod state;

#[cfg(test)]
pub(crate) mod test_utils;

pub use deferred::{ChainLink, Deferred};
pub use error::Error;
pub use executor::Executor;
pub use monitor::StateMonitor;
pub use state::State;

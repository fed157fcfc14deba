//! Failures carried by deferred results
//!
//! A deferred result does not interpret the failures produced by its
//! computation: it records them and hands them, unchanged, to whoever reads
//! the result, to failure callbacks, and to every link chained after it.
//! The only failure it produces itself is `Abandoned`, for computations that
//! never got to report an outcome.

use thiserror::Error;


/// Failure of a deferred result
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error<E> {
    /// The computation, or a continuation earlier in the chain, failed
    #[error("{0}")]
    Failed(E),

    /// The computation was dropped before producing an outcome, either
    /// because it unwound or because no execution unit could be started
    #[error("computation was abandoned before producing an outcome")]
    Abandoned,
}
//
impl<E> Error<E> {
    /// Access the application-specific failure, if any
    pub fn failure(&self) -> Option<&E> {
        match self {
            Error::Failed(failure) => Some(failure),
            Error::Abandoned => None,
        }
    }

    /// Extract the application-specific failure, if any
    pub fn into_failure(self) -> Option<E> {
        match self {
            Error::Failed(failure) => Some(failure),
            Error::Abandoned => None,
        }
    }

    /// Check whether the computation never produced an outcome
    pub fn is_abandoned(&self) -> bool {
        matches!(self, Error::Abandoned)
    }
}
//
impl<E> From<E> for Error<E> {
    fn from(failure: E) -> Self {
        Error::Failed(failure)
    }
}

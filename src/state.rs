//! Facilities to represent the state of deferred results
//!
//! Any deferred result follows the same state machine: it is created in a
//! pending state by whoever supplies its computation, moves to a running
//! state when an execution unit picks the computation up, and finally ends
//! up in either a successful (fulfilled) or unsuccessful (rejected) final
//! state, which it never leaves.

use std::fmt;


/// Representation of a deferred result's state
///
/// Here are the possible state transitions:
///
/// - Pending -> Running
/// - Running -> Fulfilled / Rejected
///
/// Once a deferred result is either Fulfilled or Rejected, its state won't
/// change anymore.
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum State {
    /// The computation has been supplied, but not started yet
    #[default]
    Pending,

    /// The computation is being run by an execution unit
    Running,

    /// The computation has produced a value
    Fulfilled,

    /// The computation has produced a failure
    Rejected,
}
//
impl State {
    /// Check if a state is terminal (i.e. won't change anymore)
    pub fn is_terminal(self) -> bool {
        use self::State::*;
        match self {
            Pending | Running => false,
            Fulfilled | Rejected => true,
        }
    }

    /// Check if moving from this state to another one is a legal transition
    pub(crate) fn can_become(self, next: State) -> bool {
        use self::State::*;
        matches!(
            (self, next),
            (Pending, Running) | (Running, Fulfilled) | (Running, Rejected)
        )
    }
}
//
impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            State::Pending => "pending",
            State::Running => "running",
            State::Fulfilled => "fulfilled",
            State::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

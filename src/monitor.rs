//! Polling-based deferred result monitoring
//!
//! This module provides a way to keep an eye on a deferred result's state
//! without ever contending for its lock. It is the most efficient option for
//! clients which only need to periodically check where a computation stands,
//! as is the case for example when refreshing progress displays, but it does
//! not allow waiting for anything.

use crate::state::State;
use triple_buffer::Output;


/// Lock-free view of a deferred result's state
///
/// Every state transition of the monitored deferred result is published to
/// all of its monitors. Reading a monitor returns the most recently published
/// state, which may lag behind the deferred result's own view by the time it
/// takes the publishing thread to move on.
///
pub struct StateMonitor {
    /// Identifier of the monitored deferred result
    deferred_id: u64,

    /// Latest published state will be read through this triple buffer
    buf_output: Output<State>,
}
//
impl StateMonitor {
    /// Wrap the receiving end of a state triple buffer
    pub(crate) fn new(deferred_id: u64, buf_output: Output<State>) -> Self {
        StateMonitor { deferred_id, buf_output }
    }

    /// Identifier of the monitored deferred result
    pub fn deferred_id(&self) -> u64 {
        self.deferred_id
    }

    /// Access the latest published state
    pub fn state(&mut self) -> State {
        *self.buf_output.read()
    }

    /// Check whether a state was published since the last read
    pub fn has_update(&self) -> bool {
        self.buf_output.updated()
    }

    /// Check whether the monitored deferred result has reached its final state
    pub fn is_terminal(&mut self) -> bool {
        self.state().is_terminal()
    }
}

// Boundary with whatever hosts the cells
//
// The engine never owns host state. It reads dependency values through
// StateReader, writes results through StateSink, and the bridge listens on a
// ChangeFeed. Inputs are written through StateWriter, which is what makes
// the host emit change notifications.

mod memory;
mod subscription;

pub use memory::{MemoryHost, Publication};
pub use subscription::{ChangeHandler, Subscription, SubscriptionSlot};

use crate::value::{CellName, CellValue, RawState};

/// Read access to the host's current value of a named cell
pub trait StateReader {
    /// Current raw state of `name`, or [`RawState::Unavailable`] if absent
    fn get_value(&self, name: &str) -> RawState;
}

impl<F> StateReader for F
where
    F: Fn(&str) -> RawState,
{
    fn get_value(&self, name: &str) -> RawState {
        self(name)
    }
}

/// Write-through of computed output values into host state
pub trait StateSink {
    /// Record `value` as the state of output `name`
    ///
    /// Called after every recompute, whether or not the value changed.
    fn publish(&self, name: &CellName, value: CellValue);
}

/// Write access for input values, emitting a change notification
pub trait StateWriter {
    /// Store `state` for `name` and notify subscribers of `name`
    fn write_state(&self, name: &CellName, state: RawState);
}

/// Change notifications for named cells
pub trait ChangeFeed {
    /// Call `handler` with the changed name whenever any of `names` changes
    fn subscribe(&self, names: Vec<CellName>, handler: ChangeHandler) -> Subscription;
}

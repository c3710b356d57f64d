use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::value::CellName;

/// Callback run with the name of the cell that changed
pub type ChangeHandler = Box<dyn FnMut(&CellName) + Send>;

/// Shared delivery slot between a feed and one [`Subscription`]
///
/// The feed keeps a clone and calls [`SubscriptionSlot::deliver`]. The
/// handler runs with the slot locked, so [`SubscriptionSlot::close`] waits
/// for an in-flight callback and no callback can start after it returns.
/// A handler must not cancel its own subscription.
pub struct SubscriptionSlot {
    closed: AtomicBool,
    handler: Mutex<Option<ChangeHandler>>,
}

impl SubscriptionSlot {
    /// Wrap a handler in a new open slot
    pub fn new(handler: ChangeHandler) -> Arc<Self> {
        Arc::new(Self {
            closed: AtomicBool::new(false),
            handler: Mutex::new(Some(handler)),
        })
    }

    /// Run the handler for `name`
    ///
    /// Returns false if the slot was already closed.
    pub fn deliver(&self, name: &CellName) -> bool {
        let mut handler = self.handler.lock();
        if self.is_closed() {
            return false;
        }
        match handler.as_mut() {
            Some(handler) => {
                handler(name);
                true
            }
            None => false,
        }
    }

    /// Drop the handler; later deliveries are no-ops
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        // Take under the lock, drop outside it so handler destructors can't
        // observe the slot locked.
        let handler = self.handler.lock().take();
        drop(handler);
    }

    /// Whether [`SubscriptionSlot::close`] has run
    ///
    /// Never blocks, so feeds may call it while this slot is delivering.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Handle for a registered change handler
///
/// Cancelling, or dropping the handle, guarantees no further callbacks once
/// it returns.
#[must_use = "dropping a Subscription cancels it"]
pub struct Subscription {
    slot: Arc<SubscriptionSlot>,
}

impl Subscription {
    /// Create the handle side of `slot`
    pub fn new(slot: Arc<SubscriptionSlot>) -> Self {
        Self { slot }
    }

    /// Stop delivery
    pub fn cancel(self) {
        self.slot.close();
    }

    /// Whether delivery is still active
    pub fn is_active(&self) -> bool {
        !self.slot.is_closed()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.slot.close();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

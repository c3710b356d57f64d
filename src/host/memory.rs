use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use slab::Slab;
use tracing::trace;

use super::subscription::{ChangeHandler, Subscription, SubscriptionSlot};
use super::{ChangeFeed, StateReader, StateSink, StateWriter};
use crate::hash::{FastHashMap, FastIndexSet};
use crate::value::{CellName, CellValue, RawState};

/// One call to [`StateSink::publish`] observed by a [`MemoryHost`]
#[derive(Clone, Debug, PartialEq)]
pub struct Publication {
    /// Output that was published
    pub name: CellName,
    /// Value written
    pub value: CellValue,
}

struct Watcher {
    names: FastIndexSet<CellName>,
    slot: Arc<SubscriptionSlot>,
}

/// In-process host: a value store, a change feed and a publish log
///
/// Writing an input state notifies every subscriber watching that name,
/// synchronously and on the writing thread. Publishing an output only
/// updates the store; outputs are never watched.
#[derive(Default)]
pub struct MemoryHost {
    states: RwLock<FastHashMap<CellName, RawState>>,
    watchers: Mutex<Slab<Watcher>>,
    published: Mutex<Vec<Publication>>,
}

impl MemoryHost {
    /// Create an empty host
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Store `state` for `name` and notify its watchers
    ///
    /// Returns how many handlers ran.
    pub fn set_state(&self, name: impl Into<CellName>, state: impl Into<RawState>) -> usize {
        let name = name.into();
        self.states.write().insert(name.clone(), state.into());
        self.notify(&name)
    }

    /// Forget the state of `name`, making it unavailable, and notify watchers
    pub fn remove_state(&self, name: &str) -> usize {
        let removed = self.states.write().remove_entry(name);
        match removed {
            Some((name, _)) => self.notify(&name),
            None => 0,
        }
    }

    /// Current state, without going through [`StateReader`]
    pub fn state(&self, name: &str) -> RawState {
        self.get_value(name)
    }

    /// Every publication so far, oldest first
    pub fn publications(&self) -> Vec<Publication> {
        self.published.lock().clone()
    }

    /// Drain the publish log
    pub fn take_publications(&self) -> Vec<Publication> {
        std::mem::take(&mut *self.published.lock())
    }

    /// Number of subscriptions still active
    pub fn subscriber_count(&self) -> usize {
        self.watchers
            .lock()
            .iter()
            .filter(|(_, watcher)| !watcher.slot.is_closed())
            .count()
    }

    fn notify(&self, name: &CellName) -> usize {
        // Collect slots first: handlers read state and may subscribe, so no
        // host lock may be held while they run.
        let slots: Vec<Arc<SubscriptionSlot>> = {
            let mut watchers = self.watchers.lock();
            watchers.retain(|_, watcher| !watcher.slot.is_closed());
            watchers
                .iter()
                .filter(|(_, watcher)| watcher.names.contains(name))
                .map(|(_, watcher)| watcher.slot.clone())
                .collect()
        };

        trace!(cell = %name, watchers = slots.len(), "dispatching change");
        slots.iter().filter(|slot| slot.deliver(name)).count()
    }
}

impl StateReader for MemoryHost {
    fn get_value(&self, name: &str) -> RawState {
        self.states
            .read()
            .get(name)
            .cloned()
            .unwrap_or(RawState::Unavailable)
    }
}

impl StateWriter for MemoryHost {
    fn write_state(&self, name: &CellName, state: RawState) {
        self.set_state(name.clone(), state);
    }
}

impl StateSink for MemoryHost {
    fn publish(&self, name: &CellName, value: CellValue) {
        self.states.write().insert(name.clone(), value.into());
        self.published.lock().push(Publication {
            name: name.clone(),
            value,
        });
    }
}

impl ChangeFeed for MemoryHost {
    fn subscribe(&self, names: Vec<CellName>, handler: ChangeHandler) -> Subscription {
        let slot = SubscriptionSlot::new(handler);
        self.watchers.lock().insert(Watcher {
            names: names.into_iter().collect(),
            slot: slot.clone(),
        });
        Subscription::new(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_handler(count: &Arc<AtomicUsize>) -> ChangeHandler {
        let count = count.clone();
        Box::new(move |_: &CellName| {
            count.fetch_add(1, Ordering::Relaxed);
        })
    }

    #[test]
    fn absent_cell_reads_unavailable() {
        let host = MemoryHost::new();
        assert_eq!(host.get_value("number.gauge_cm"), RawState::Unavailable);

        host.set_state("number.gauge_cm", 10.0);
        assert_eq!(host.get_value("number.gauge_cm"), RawState::Number(10.0));

        host.remove_state("number.gauge_cm");
        assert_eq!(host.get_value("number.gauge_cm"), RawState::Unavailable);
    }

    #[test]
    fn notifies_only_watched_names() {
        let host = MemoryHost::new();
        let count = Arc::new(AtomicUsize::new(0));
        let _subscription = host.subscribe(
            vec!["number.gauge_cm".into(), "number.gauge_stitches".into()],
            counting_handler(&count),
        );

        assert_eq!(host.set_state("number.gauge_cm", 12.0), 1);
        assert_eq!(host.set_state("number.desired_width", 12.0), 0);
        host.set_state("number.gauge_stitches", "18");

        assert_eq!(count.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn cancelled_subscription_is_pruned() {
        let host = MemoryHost::new();
        let count = Arc::new(AtomicUsize::new(0));
        let subscription = host.subscribe(vec!["a".into()], counting_handler(&count));
        assert_eq!(host.subscriber_count(), 1);

        subscription.cancel();
        host.set_state("a", 1.0);

        assert_eq!(count.load(Ordering::Relaxed), 0);
        assert_eq!(host.subscriber_count(), 0);
    }

    #[test]
    fn publish_writes_state_without_notifying() {
        let host = MemoryHost::new();
        let count = Arc::new(AtomicUsize::new(0));
        let _subscription = host.subscribe(vec!["sensor.out".into()], counting_handler(&count));
        let name = CellName::new("sensor.out");

        host.publish(&name, CellValue::Available(3.0));
        host.publish(&name, CellValue::Unavailable);

        assert_eq!(count.load(Ordering::Relaxed), 0);
        assert_eq!(host.get_value("sensor.out"), RawState::Unavailable);
        assert_eq!(host.take_publications().len(), 2);
        assert!(host.publications().is_empty());
    }
}

//! Adapter between a host's change feed and the engine
//!
//! The bridge subscribes to every input the engine watches and turns each
//! notification into one [`Engine::on_input_changed`] call, on the thread
//! that wrote the input and before the write returns. Only one notification
//! is processed at a time: the engine sits behind a mutex.
//!
//! ## Usage
//!
//! ```ignore
//! let engine = Arc::new(Mutex::new(engine));
//! let bridge = NotificationBridge::attach(engine.clone(), host.clone());
//!
//! host.set_state("number.gauge_cm", 12.0);   // outputs already updated
//!
//! // Dropping the bridge cancels the subscription
//! drop(bridge);
//! ```

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::engine::Engine;
use crate::host::{ChangeFeed, ChangeHandler, StateReader, StateSink, Subscription};
use crate::value::CellName;

/// Live subscription feeding host notifications into an [`Engine`]
///
/// The bridge holds the host weakly. Notifications that arrive after the
/// host is gone are ignored.
pub struct NotificationBridge {
    subscription: Option<Subscription>,
    watched: Vec<CellName>,
}

impl NotificationBridge {
    /// Recompute on the notifying thread
    pub fn attach<H>(engine: Arc<Mutex<Engine>>, host: Arc<H>) -> Self
    where
        H: StateReader + StateSink + ChangeFeed + Send + Sync + 'static,
    {
        let watched = watched_inputs(&engine);
        let weak_host = Arc::downgrade(&host);
        let handler: ChangeHandler = Box::new(move |name: &CellName| {
            dispatch(&engine, &weak_host, name);
        });

        debug!(inputs = watched.len(), "attaching notification bridge");
        let subscription = host.subscribe(watched.clone(), handler);
        Self {
            subscription: Some(subscription),
            watched,
        }
    }

    /// Inputs this bridge listens to
    pub fn watched(&self) -> &[CellName] {
        &self.watched
    }

    /// Whether notifications are still being delivered
    pub fn is_attached(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(Subscription::is_active)
    }

    /// Cancel the subscription; no callback runs after this returns
    pub fn detach(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }
    }
}

impl Drop for NotificationBridge {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn watched_inputs(engine: &Mutex<Engine>) -> Vec<CellName> {
    engine.lock().watched_inputs().cloned().collect()
}

fn dispatch<H>(engine: &Mutex<Engine>, host: &Weak<H>, name: &CellName)
where
    H: StateReader + StateSink,
{
    let Some(host) = host.upgrade() else {
        trace!(input = %name, "host dropped, ignoring notification");
        return;
    };
    engine.lock().on_input_changed(name.as_str(), &*host, &*host);
}

//! In-process event bus.
//!
//! Maps an [`EventKind`] to an ordered list of subscriber callbacks.
//! Registration order is invocation order; the same callback may be
//! registered twice and will fire twice. Emission is synchronous against a
//! snapshot taken when `emit` starts, so a callback may subscribe or
//! unsubscribe without affecting the in-flight delivery.
//!
//! A panicking callback is isolated: the panic is caught, reported on the
//! log channel, and later callbacks still run.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, Weak};

use crate::domain::events::{ClientEvent, EventKind};

/// Subscriber callback. Runs on the supervisor task; keep it quick.
pub type Callback = Arc<dyn Fn(&ClientEvent) + Send + Sync + 'static>;

struct Entry {
    id: u64,
    callback: Callback,
}

#[derive(Default)]
struct Registry {
    entries: HashMap<EventKind, Vec<Entry>>,
    next_id: u64,
}

/// Publish/subscribe registry for [`ClientEvent`]s.
///
/// Shared by every handle of one client instance. Cheap to clone.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` for `kind`, appending it to the invocation
    /// order. The returned [`Subscription`] removes exactly this entry when
    /// dropped or explicitly unsubscribed; call [`Subscription::detach`] to
    /// keep the callback registered for the bus lifetime instead.
    pub fn on(
        &self,
        kind: EventKind,
        callback: impl Fn(&ClientEvent) + Send + Sync + 'static,
    ) -> Subscription {
        let mut registry = self.registry.lock().expect("EventBus: registry poisoned");
        registry.next_id += 1;
        let id = registry.next_id;
        registry.entries.entry(kind).or_default().push(Entry {
            id,
            callback: Arc::new(callback),
        });

        Subscription {
            kind,
            id,
            registry: Arc::downgrade(&self.registry),
            active: true,
        }
    }

    /// Invokes every callback registered for the event's kind, in
    /// registration order, isolating panics per callback.
    pub fn emit(&self, event: &ClientEvent) {
        let snapshot: Vec<Callback> = {
            let registry = self.registry.lock().expect("EventBus: registry poisoned");
            registry
                .entries
                .get(&event.kind())
                .map(|entries| entries.iter().map(|e| Arc::clone(&e.callback)).collect())
                .unwrap_or_default()
        };

        for callback in snapshot {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| callback(event))) {
                tracing::error!(
                    event = %event.kind(),
                    "subscriber panicked: {}",
                    panic_message(panic.as_ref())
                );
            }
        }
    }

    /// Number of callbacks currently registered for `kind`.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.registry
            .lock()
            .expect("EventBus: registry poisoned")
            .entries
            .get(&kind)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Removes every subscription. Called on `disconnect()`.
    pub fn clear(&self) {
        self.registry
            .lock()
            .expect("EventBus: registry poisoned")
            .entries
            .clear();
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

/// Scoped handle to one registered callback.
///
/// Dropping the subscription unregisters the callback, which ties listener
/// lifetime to the owning handle and rules out the leaked-listener class of
/// bugs by construction.
#[must_use = "dropping a Subscription unregisters the callback; call detach() to keep it"]
pub struct Subscription {
    kind: EventKind,
    id: u64,
    registry: Weak<Mutex<Registry>>,
    active: bool,
}

impl Subscription {
    /// Unregisters the callback now.
    pub fn unsubscribe(mut self) {
        self.remove();
    }

    /// Leaves the callback registered for the remaining bus lifetime.
    pub fn detach(mut self) {
        self.active = false;
    }

    fn remove(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;

        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = registry.lock().expect("EventBus: registry poisoned");
        if let Some(entries) = registry.entries.get_mut(&self.kind) {
            if let Some(pos) = entries.iter().position(|e| e.id == self.id) {
                entries.remove(pos);
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.remove();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn event_for(kind: EventKind) -> ClientEvent {
        match kind {
            EventKind::ConnectionSuccess => ClientEvent::ConnectionSuccess,
            EventKind::HeartbeatResponse => ClientEvent::HeartbeatResponse,
            EventKind::LocationUpdateAck => ClientEvent::LocationUpdateAck,
            EventKind::ConnectionRestored => ClientEvent::ConnectionRestored,
            other => panic!("no payload-free event for {:?}", other),
        }
    }

    #[test]
    fn callbacks_run_in_registration_order() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let subs: Vec<_> = (0..5)
            .map(|i| {
                let log = Arc::clone(&log);
                bus.on(EventKind::ConnectionSuccess, move |_| {
                    log.lock().unwrap().push(i);
                })
            })
            .collect();

        bus.emit(&ClientEvent::ConnectionSuccess);

        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2, 3, 4]);
        drop(subs);
        assert_eq!(bus.subscriber_count(EventKind::ConnectionSuccess), 0);
    }

    #[test]
    fn same_callback_registered_twice_fires_twice() {
        let bus = EventBus::new();
        let count = Arc::new(Mutex::new(0));

        let make = |count: Arc<Mutex<i32>>| move |_: &ClientEvent| *count.lock().unwrap() += 1;
        let _a = bus.on(EventKind::HeartbeatResponse, make(Arc::clone(&count)));
        let _b = bus.on(EventKind::HeartbeatResponse, make(Arc::clone(&count)));

        bus.emit(&ClientEvent::HeartbeatResponse);
        assert_eq!(*count.lock().unwrap(), 2);
    }

    #[test]
    fn unsubscribe_removes_exactly_one_entry() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let make = |log: Arc<Mutex<Vec<&'static str>>>, tag: &'static str| {
            move |_: &ClientEvent| log.lock().unwrap().push(tag)
        };
        let first = bus.on(EventKind::ConnectionSuccess, make(Arc::clone(&log), "first"));
        let _second = bus.on(EventKind::ConnectionSuccess, make(Arc::clone(&log), "second"));

        first.unsubscribe();
        bus.emit(&ClientEvent::ConnectionSuccess);

        assert_eq!(*log.lock().unwrap(), vec!["second"]);
    }

    #[test]
    fn detached_subscription_outlives_its_guard() {
        let bus = EventBus::new();
        let count = Arc::new(Mutex::new(0));

        {
            let count = Arc::clone(&count);
            bus.on(EventKind::ConnectionSuccess, move |_| {
                *count.lock().unwrap() += 1;
            })
            .detach();
        }

        bus.emit(&ClientEvent::ConnectionSuccess);
        assert_eq!(*count.lock().unwrap(), 1);
        assert_eq!(bus.subscriber_count(EventKind::ConnectionSuccess), 1);
    }

    #[test]
    fn panicking_callback_does_not_stop_later_callbacks() {
        let bus = EventBus::new();
        let reached = Arc::new(Mutex::new(false));

        let _a = bus.on(EventKind::ConnectionSuccess, |_| {
            panic!("subscriber exploded");
        });
        let reached_clone = Arc::clone(&reached);
        let _b = bus.on(EventKind::ConnectionSuccess, move |_| {
            *reached_clone.lock().unwrap() = true;
        });

        // emit itself must not panic.
        bus.emit(&ClientEvent::ConnectionSuccess);
        assert!(*reached.lock().unwrap());
    }

    #[test]
    fn emit_uses_a_snapshot_of_the_registry() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        // The first callback registers a new one mid-emission; the newcomer
        // must not run for the current event.
        let bus_clone = bus.clone();
        let log_clone = Arc::clone(&log);
        let _a = bus.on(EventKind::ConnectionSuccess, move |_| {
            log_clone.lock().unwrap().push("a");
            let log_inner = Arc::clone(&log_clone);
            bus_clone
                .on(EventKind::ConnectionSuccess, move |_| {
                    log_inner.lock().unwrap().push("late");
                })
                .detach();
        });

        bus.emit(&ClientEvent::ConnectionSuccess);
        assert_eq!(*log.lock().unwrap(), vec!["a"]);

        bus.emit(&ClientEvent::ConnectionSuccess);
        assert!(log.lock().unwrap().contains(&"late"));
    }

    #[test]
    fn clear_removes_all_subscriptions() {
        let bus = EventBus::new();
        let _a = bus.on(EventKind::ConnectionSuccess, |_| {});
        let _b = bus.on(EventKind::HeartbeatResponse, |_| {});

        bus.clear();

        assert_eq!(bus.subscriber_count(EventKind::ConnectionSuccess), 0);
        assert_eq!(bus.subscriber_count(EventKind::HeartbeatResponse), 0);
    }

    #[test]
    fn events_of_other_kinds_do_not_reach_a_subscriber() {
        let bus = EventBus::new();
        let count = Arc::new(Mutex::new(0));

        let count_clone = Arc::clone(&count);
        let _sub = bus.on(EventKind::HeartbeatResponse, move |_| {
            *count_clone.lock().unwrap() += 1;
        });

        bus.emit(&ClientEvent::ConnectionSuccess);
        bus.emit(&ClientEvent::LocationUpdateAck);
        assert_eq!(*count.lock().unwrap(), 0);
    }

    proptest! {
        // Within one kind, delivery order matches emission order no matter
        // how emissions of other kinds interleave.
        #[test]
        fn per_kind_order_is_preserved(sequence in proptest::collection::vec(0usize..3, 0..60)) {
            let kinds = [
                EventKind::ConnectionSuccess,
                EventKind::HeartbeatResponse,
                EventKind::LocationUpdateAck,
            ];

            let bus = EventBus::new();
            let log = Arc::new(Mutex::new(Vec::new()));

            let _subs: Vec<_> = kinds
                .iter()
                .map(|&kind| {
                    let log = Arc::clone(&log);
                    bus.on(kind, move |event| log.lock().unwrap().push(event.kind()))
                })
                .collect();

            for &i in &sequence {
                bus.emit(&event_for(kinds[i]));
            }

            let log = log.lock().unwrap();
            for &kind in &kinds {
                let delivered = log.iter().filter(|k| **k == kind).count();
                let emitted = sequence.iter().filter(|&&i| kinds[i] == kind).count();
                prop_assert_eq!(delivered, emitted);
            }
            // Total order equals the emission order because each kind has
            // exactly one subscriber and emission is synchronous.
            let expected: Vec<_> = sequence.iter().map(|&i| kinds[i]).collect();
            prop_assert_eq!(log.clone(), expected);
        }
    }
}

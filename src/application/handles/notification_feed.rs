//! Notification feed handle.
//!
//! Maintains the capped notification list and the pruned order-offer board.
//! Data subscriptions are active only while a session is live: they are
//! registered on every `ConnectionSuccess` (so each reconnect re-subscribes)
//! and dropped on `ConnectionLost`. Dropping the handle removes every
//! listener it owns.

use std::sync::{Arc, Mutex, Weak};

use tokio::sync::watch;

use crate::application::bus::{EventBus, Subscription};
use crate::application::client::RealtimeClient;
use crate::domain::events::{ClientEvent, EventKind};
use crate::domain::notification::{Notification, NotificationFeed};
use crate::domain::order::{OfferBoard, OrderOffer};

struct FeedState {
    notifications: NotificationFeed,
    offers: OfferBoard,
}

struct FeedInner {
    bus: EventBus,
    state: Mutex<FeedState>,
    data_subs: Mutex<Vec<Subscription>>,
    // Bumped on every visible change; receivers re-read the snapshots.
    changed: watch::Sender<u64>,
}

impl FeedInner {
    fn subscribe_data(inner: &Arc<Self>) {
        let mut subs = inner.data_subs.lock().expect("feed: data_subs poisoned");
        if !subs.is_empty() {
            return;
        }

        let weak = Arc::downgrade(inner);
        subs.push(inner.bus.on(EventKind::NotificationUpdate, {
            let weak = Weak::clone(&weak);
            move |event| {
                let Some(inner) = weak.upgrade() else { return };
                if let ClientEvent::NotificationUpdate(notification) = event {
                    inner
                        .state
                        .lock()
                        .expect("feed: state poisoned")
                        .notifications
                        .push(notification.clone());
                    inner.bump();
                }
            }
        }));

        subs.push(inner.bus.on(EventKind::NewOrderOffer, {
            let weak = Weak::clone(&weak);
            move |event| {
                let Some(inner) = weak.upgrade() else { return };
                if let ClientEvent::NewOrderOffer(offer) = event {
                    inner
                        .state
                        .lock()
                        .expect("feed: state poisoned")
                        .offers
                        .push(offer.clone());
                    inner.bump();
                }
            }
        }));

        subs.push(inner.bus.on(EventKind::OrderStatusUpdate, {
            let weak = Weak::clone(&weak);
            move |event| {
                let Some(inner) = weak.upgrade() else { return };
                if let ClientEvent::OrderStatusUpdate(change) = event {
                    let pruned = inner
                        .state
                        .lock()
                        .expect("feed: state poisoned")
                        .offers
                        .prune(&change.order_id);
                    if pruned {
                        inner.bump();
                    }
                }
            }
        }));
    }

    fn unsubscribe_data(&self) {
        self.data_subs
            .lock()
            .expect("feed: data_subs poisoned")
            .clear();
    }

    fn bump(&self) {
        self.changed.send_modify(|n| *n += 1);
    }
}

/// Reactive view over notifications and open order offers.
pub struct NotificationFeedHandle {
    inner: Arc<FeedInner>,
    _lifecycle_subs: Vec<Subscription>,
}

impl NotificationFeedHandle {
    /// Attaches a feed to a client. `capacity` caps the notification list.
    pub fn attach(client: &RealtimeClient, capacity: usize) -> Self {
        let (changed, _) = watch::channel(0);
        let inner = Arc::new(FeedInner {
            bus: client.bus().clone(),
            state: Mutex::new(FeedState {
                notifications: NotificationFeed::new(capacity),
                offers: OfferBoard::new(),
            }),
            data_subs: Mutex::new(Vec::new()),
            changed,
        });

        let weak = Arc::downgrade(&inner);
        let success_sub = client.on(EventKind::ConnectionSuccess, {
            let weak = Weak::clone(&weak);
            move |_| {
                if let Some(inner) = weak.upgrade() {
                    FeedInner::subscribe_data(&inner);
                }
            }
        });
        let lost_sub = client.on(EventKind::ConnectionLost, {
            let weak = Weak::clone(&weak);
            move |_| {
                if let Some(inner) = weak.upgrade() {
                    inner.unsubscribe_data();
                }
            }
        });

        // Attaching to an already-live session subscribes immediately.
        if client.is_connected() {
            FeedInner::subscribe_data(&inner);
        }

        Self {
            inner,
            _lifecycle_subs: vec![success_sub, lost_sub],
        }
    }

    /// Notifications, newest first, at most `capacity` entries.
    pub fn notifications(&self) -> Vec<Notification> {
        self.inner
            .state
            .lock()
            .expect("feed: state poisoned")
            .notifications
            .snapshot()
    }

    /// Open order offers in arrival order.
    pub fn offers(&self) -> Vec<OrderOffer> {
        self.inner
            .state
            .lock()
            .expect("feed: state poisoned")
            .offers
            .snapshot()
    }

    /// Watch that ticks on every visible change.
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.inner.changed.subscribe()
    }

    /// True while data subscriptions are registered (session live).
    pub fn is_live(&self) -> bool {
        !self
            .inner
            .data_subs
            .lock()
            .expect("feed: data_subs poisoned")
            .is_empty()
    }
}

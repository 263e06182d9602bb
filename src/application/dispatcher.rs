//! Domain action dispatcher.
//!
//! Every action follows the same contract: build a typed payload, check the
//! connection state, and either hand the frame to the supervisor (returning
//! `true`) or drop it (returning `false`). Transmission is fire-and-forget,
//! at-most-once: no acknowledgement correlation, no retry, no queue while
//! disconnected. A caller that needs delivery re-issues the action after
//! reconnection.

use tokio::sync::{mpsc, watch};

use crate::application::wire::{
    CallAction, CallResponse, ClientFrame, DeclineOrder, LocationUpdate, MarkRead, OrderAction,
};
use crate::domain::connection::ConnectionState;
use crate::domain::events::OrderStatusChange;
use crate::domain::foundation::{CallId, ClientIdentity, CourierId, NotificationId, OrderId, RoomName};
use crate::domain::location::LocationReading;
use crate::domain::order::OrderStatus;

/// Handle for emitting domain actions over the active session.
///
/// Cheap to clone; all clones share the client's command channel.
#[derive(Clone)]
pub struct ActionDispatcher {
    cmd_tx: mpsc::UnboundedSender<ClientFrame>,
    state_rx: watch::Receiver<ConnectionState>,
}

impl ActionDispatcher {
    pub(crate) fn new(
        cmd_tx: mpsc::UnboundedSender<ClientFrame>,
        state_rx: watch::Receiver<ConnectionState>,
    ) -> Self {
        Self { cmd_tx, state_rx }
    }

    /// True while a live session exists.
    pub fn is_connected(&self) -> bool {
        self.state_rx.borrow().is_connected()
    }

    /// Reports the courier's position. Accepts either raw reading shape and
    /// normalizes before transmission.
    pub fn send_location(&self, courier_id: &CourierId, reading: LocationReading) -> bool {
        let fix = reading.normalize();
        self.dispatch(ClientFrame::UpdateLocation(LocationUpdate::new(
            courier_id.clone(),
            fix,
        )))
    }

    /// Accepts an open order offer.
    pub fn accept_order(&self, order_id: &OrderId, courier_id: &CourierId) -> bool {
        self.dispatch(ClientFrame::AcceptOrder(OrderAction {
            order_id: order_id.clone(),
            courier_id: courier_id.clone(),
        }))
    }

    /// Declines an open order offer, optionally with a reason.
    pub fn decline_order(
        &self,
        order_id: &OrderId,
        courier_id: &CourierId,
        reason: Option<String>,
    ) -> bool {
        self.dispatch(ClientFrame::DeclineOrder(DeclineOrder {
            order_id: order_id.clone(),
            courier_id: courier_id.clone(),
            reason,
        }))
    }

    /// Pushes an order status movement (store and support roles).
    pub fn update_order_status(&self, order_id: &OrderId, status: OrderStatus) -> bool {
        self.dispatch(ClientFrame::OrderStatusUpdate(OrderStatusChange {
            order_id: order_id.clone(),
            status,
        }))
    }

    /// Marks one notification as read.
    pub fn mark_notification_read(&self, notification_id: &NotificationId) -> bool {
        self.dispatch(ClientFrame::MarkNotificationRead(MarkRead {
            notification_id: notification_id.clone(),
        }))
    }

    /// Answers a call notification.
    pub fn respond_call_notification(
        &self,
        call_id: &CallId,
        action: CallAction,
        identity: &ClientIdentity,
    ) -> bool {
        self.dispatch(ClientFrame::RespondCallNotification(CallResponse {
            call_id: call_id.clone(),
            action,
            identity: identity.clone(),
        }))
    }

    /// Joins a broadcast room.
    pub fn join_room(&self, room: RoomName) -> bool {
        self.dispatch(ClientFrame::JoinRoom(room))
    }

    /// Leaves a broadcast room.
    pub fn leave_room(&self, room: RoomName) -> bool {
        self.dispatch(ClientFrame::LeaveRoom(room))
    }

    fn dispatch(&self, frame: ClientFrame) -> bool {
        if !self.state_rx.borrow().is_connected() {
            tracing::debug!(?frame, "dropping action while disconnected");
            return false;
        }
        self.cmd_tx.send(frame).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher(
        state: ConnectionState,
    ) -> (
        ActionDispatcher,
        mpsc::UnboundedReceiver<ClientFrame>,
        watch::Sender<ConnectionState>,
    ) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(state);
        (ActionDispatcher::new(cmd_tx, state_rx), cmd_rx, state_tx)
    }

    fn flat_reading() -> LocationReading {
        LocationReading::Flat {
            latitude: 1.0,
            longitude: 2.0,
            accuracy: None,
            timestamp: None,
        }
    }

    #[test]
    fn actions_return_false_when_not_connected() {
        for state in [
            ConnectionState::Disconnected,
            ConnectionState::Connecting,
            ConnectionState::Reconnecting,
            ConnectionState::Failed,
        ] {
            let (dispatcher, mut cmd_rx, _state_tx) = dispatcher(state);
            let courier = CourierId::from_string("c-1");
            let order = OrderId::from_string("o-1");

            assert!(!dispatcher.send_location(&courier, flat_reading()));
            assert!(!dispatcher.accept_order(&order, &courier));
            assert!(!dispatcher.decline_order(&order, &courier, None));
            assert!(!dispatcher.join_room(RoomName::new("r").unwrap()));

            // Nothing was queued.
            assert!(cmd_rx.try_recv().is_err());
        }
    }

    #[test]
    fn actions_transmit_when_connected() {
        let (dispatcher, mut cmd_rx, _state_tx) = dispatcher(ConnectionState::Connected);
        let courier = CourierId::from_string("c-1");
        let order = OrderId::from_string("o-1");

        assert!(dispatcher.accept_order(&order, &courier));
        match cmd_rx.try_recv().unwrap() {
            ClientFrame::AcceptOrder(action) => {
                assert_eq!(action.order_id.as_str(), "o-1");
                assert_eq!(action.courier_id.as_str(), "c-1");
            }
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[test]
    fn send_location_normalizes_before_transmission() {
        let (dispatcher, mut cmd_rx, _state_tx) = dispatcher(ConnectionState::Connected);
        let courier = CourierId::from_string("c-9");

        let nested: LocationReading = serde_json::from_str(
            r#"{ "coords": { "latitude": -23.5, "longitude": -46.6, "accuracy": 5.0 } }"#,
        )
        .unwrap();
        assert!(dispatcher.send_location(&courier, nested));

        match cmd_rx.try_recv().unwrap() {
            ClientFrame::UpdateLocation(update) => {
                assert_eq!(update.latitude, -23.5);
                assert_eq!(update.longitude, -46.6);
                assert_eq!(update.accuracy, Some(5.0));
                assert_eq!(update.courier_id.as_str(), "c-9");
            }
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[test]
    fn decline_order_carries_optional_reason() {
        let (dispatcher, mut cmd_rx, _state_tx) = dispatcher(ConnectionState::Connected);
        let courier = CourierId::from_string("c-1");
        let order = OrderId::from_string("o-1");

        assert!(dispatcher.decline_order(&order, &courier, Some("too far".to_string())));
        match cmd_rx.try_recv().unwrap() {
            ClientFrame::DeclineOrder(decline) => {
                assert_eq!(decline.reason.as_deref(), Some("too far"));
            }
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[test]
    fn room_actions_carry_the_room_name() {
        let (dispatcher, mut cmd_rx, _state_tx) = dispatcher(ConnectionState::Connected);
        assert!(dispatcher.join_room(RoomName::new("store:42").unwrap()));
        assert!(dispatcher.leave_room(RoomName::new("store:42").unwrap()));

        assert!(matches!(cmd_rx.try_recv().unwrap(), ClientFrame::JoinRoom(r) if r.as_str() == "store:42"));
        assert!(matches!(cmd_rx.try_recv().unwrap(), ClientFrame::LeaveRoom(r) if r.as_str() == "store:42"));
    }
}

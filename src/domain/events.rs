//! Typed client events delivered through the event bus.
//!
//! Every inbound wire event and every connection lifecycle transition is
//! expressed as one variant of [`ClientEvent`]. Subscribers register against
//! an [`EventKind`], so a callback's match on the payload is checked at
//! compile time instead of against a stringly-typed event name.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::connection::DisconnectReason;
use crate::domain::foundation::{CourierId, OrderId, Timestamp};
use crate::domain::notification::Notification;
use crate::domain::order::{OrderOffer, OrderStatus};

/// A courier position broadcast by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourierPosition {
    #[serde(rename = "motoboyId")]
    pub courier_id: CourierId,
    pub latitude: f64,
    pub longitude: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,

    pub timestamp: Timestamp,
}

/// A status movement for an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusChange {
    pub order_id: OrderId,
    pub status: OrderStatus,
}

/// Acknowledgement payload naming the order an action applied to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAck {
    pub order_id: OrderId,
}

/// Everything a subscriber can observe on the bus.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// A handshake completed and frames flow.
    ConnectionSuccess,

    /// The transport session ended.
    ConnectionLost { reason: DisconnectReason },

    /// The retry cap was exhausted; no further automatic attempt will run.
    ConnectionFailed { attempts: u32 },

    /// A session was re-established after an automatic recovery.
    ConnectionRestored,

    /// A notification was created or updated server-side.
    NotificationUpdate(Notification),

    /// A new delivery offer is open for this courier.
    NewOrderOffer(OrderOffer),

    /// An order moved to a new status.
    OrderStatusUpdate(OrderStatusChange),

    /// Another courier's position changed (store/support dashboards).
    CourierLocationUpdate(CourierPosition),

    /// The gateway answered a keep-alive.
    HeartbeatResponse,

    /// The gateway acknowledged an `acceptOrder` dispatch.
    AcceptOrderAck(OrderAck),

    /// The gateway acknowledged a `declineOrder` dispatch.
    DeclineOrderAck(OrderAck),

    /// The gateway acknowledged an `updateLocation` dispatch.
    LocationUpdateAck,
}

impl ClientEvent {
    /// The subscription key for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            ClientEvent::ConnectionSuccess => EventKind::ConnectionSuccess,
            ClientEvent::ConnectionLost { .. } => EventKind::ConnectionLost,
            ClientEvent::ConnectionFailed { .. } => EventKind::ConnectionFailed,
            ClientEvent::ConnectionRestored => EventKind::ConnectionRestored,
            ClientEvent::NotificationUpdate(_) => EventKind::NotificationUpdate,
            ClientEvent::NewOrderOffer(_) => EventKind::NewOrderOffer,
            ClientEvent::OrderStatusUpdate(_) => EventKind::OrderStatusUpdate,
            ClientEvent::CourierLocationUpdate(_) => EventKind::CourierLocationUpdate,
            ClientEvent::HeartbeatResponse => EventKind::HeartbeatResponse,
            ClientEvent::AcceptOrderAck(_) => EventKind::AcceptOrderAck,
            ClientEvent::DeclineOrderAck(_) => EventKind::DeclineOrderAck,
            ClientEvent::LocationUpdateAck => EventKind::LocationUpdateAck,
        }
    }
}

/// Discriminant of [`ClientEvent`], used as the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ConnectionSuccess,
    ConnectionLost,
    ConnectionFailed,
    ConnectionRestored,
    NotificationUpdate,
    NewOrderOffer,
    OrderStatusUpdate,
    CourierLocationUpdate,
    HeartbeatResponse,
    AcceptOrderAck,
    DeclineOrderAck,
    LocationUpdateAck,
}

impl EventKind {
    /// Event name as it appears in logs, matching the wire vocabulary.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::ConnectionSuccess => "connection:success",
            EventKind::ConnectionLost => "connection:lost",
            EventKind::ConnectionFailed => "connection:failed",
            EventKind::ConnectionRestored => "connection:restored",
            EventKind::NotificationUpdate => "notificationUpdate",
            EventKind::NewOrderOffer => "newOrderOffer",
            EventKind::OrderStatusUpdate => "orderStatusUpdate",
            EventKind::CourierLocationUpdate => "motoboyLocationUpdate",
            EventKind::HeartbeatResponse => "heartbeat:response",
            EventKind::AcceptOrderAck => "acceptOrder:success",
            EventKind::DeclineOrderAck => "declineOrder:success",
            EventKind::LocationUpdateAck => "locationUpdate:success",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::NotificationId;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(
            ClientEvent::ConnectionSuccess.kind(),
            EventKind::ConnectionSuccess
        );
        assert_eq!(
            ClientEvent::ConnectionLost {
                reason: DisconnectReason::ServerClose
            }
            .kind(),
            EventKind::ConnectionLost
        );
        assert_eq!(
            ClientEvent::LocationUpdateAck.kind(),
            EventKind::LocationUpdateAck
        );
    }

    #[test]
    fn kind_of_payload_variants() {
        let n = Notification {
            id: NotificationId::from_string("n-1"),
            title: "t".into(),
            body: "b".into(),
            order_id: None,
            created_at: Timestamp::now(),
            read: false,
        };
        assert_eq!(
            ClientEvent::NotificationUpdate(n).kind(),
            EventKind::NotificationUpdate
        );
    }

    #[test]
    fn courier_position_uses_motoboy_id_on_the_wire() {
        let json = r#"{
            "motoboyId": "c-1",
            "latitude": -23.5,
            "longitude": -46.6,
            "timestamp": "2025-03-01T12:00:00Z"
        }"#;
        let pos: CourierPosition = serde_json::from_str(json).unwrap();
        assert_eq!(pos.courier_id.as_str(), "c-1");

        let out = serde_json::to_string(&pos).unwrap();
        assert!(out.contains(r#""motoboyId":"c-1""#));
    }

    #[test]
    fn event_kind_display_uses_wire_vocabulary() {
        assert_eq!(EventKind::ConnectionLost.to_string(), "connection:lost");
        assert_eq!(
            EventKind::CourierLocationUpdate.to_string(),
            "motoboyLocationUpdate"
        );
    }
}

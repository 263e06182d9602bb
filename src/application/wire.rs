//! Wire protocol between the client and the realtime gateway.
//!
//! Frames are JSON objects of the form `{"event": <name>, "data": <payload>}`.
//! Event names are fixed by the gateway contract and must not drift; the
//! serde renames below are the contract.

use serde::{Deserialize, Serialize};

use crate::domain::events::{ClientEvent, CourierPosition, OrderAck, OrderStatusChange};
use crate::domain::foundation::{CallId, ClientIdentity, CourierId, NotificationId, OrderId, RoomName};
use crate::domain::location::LocationFix;
use crate::domain::notification::Notification;
use crate::domain::order::OrderOffer;

/// Outbound position payload for `updateLocation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdate {
    pub latitude: f64,
    pub longitude: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,

    /// RFC 3339 instant of the position fix.
    pub timestamp: String,

    #[serde(rename = "motoboyId")]
    pub courier_id: CourierId,
}

impl LocationUpdate {
    /// Builds the outbound payload from a normalized fix.
    pub fn new(courier_id: CourierId, fix: LocationFix) -> Self {
        Self {
            latitude: fix.latitude,
            longitude: fix.longitude,
            accuracy: fix.accuracy,
            timestamp: fix.taken_at.to_rfc3339(),
            courier_id,
        }
    }
}

/// Payload for `acceptOrder`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAction {
    pub order_id: OrderId,
    #[serde(rename = "motoboyId")]
    pub courier_id: CourierId,
}

/// Payload for `declineOrder`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclineOrder {
    pub order_id: OrderId,
    #[serde(rename = "motoboyId")]
    pub courier_id: CourierId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// How the client answered a call notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallAction {
    Accept,
    Decline,
}

/// Payload for `respondCallNotification`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallResponse {
    pub call_id: CallId,
    pub action: CallAction,
    pub identity: ClientIdentity,
}

/// Payload for `markNotificationRead`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkRead {
    pub notification_id: NotificationId,
}

/// Frames the client emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientFrame {
    #[serde(rename = "updateLocation")]
    UpdateLocation(LocationUpdate),

    #[serde(rename = "acceptOrder")]
    AcceptOrder(OrderAction),

    #[serde(rename = "declineOrder")]
    DeclineOrder(DeclineOrder),

    #[serde(rename = "respondCallNotification")]
    RespondCallNotification(CallResponse),

    #[serde(rename = "markNotificationRead")]
    MarkNotificationRead(MarkRead),

    #[serde(rename = "orderStatusUpdate")]
    OrderStatusUpdate(OrderStatusChange),

    /// Payload is the bare room name string.
    #[serde(rename = "joinRoom")]
    JoinRoom(RoomName),

    #[serde(rename = "leaveRoom")]
    LeaveRoom(RoomName),

    /// Keep-alive; carries no payload.
    #[serde(rename = "heartbeat")]
    Heartbeat,
}

/// Frames the gateway emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerFrame {
    #[serde(rename = "notificationUpdate")]
    NotificationUpdate(Notification),

    #[serde(rename = "newOrderOffer")]
    NewOrderOffer(OrderOffer),

    #[serde(rename = "orderStatusUpdate")]
    OrderStatusUpdate(OrderStatusChange),

    #[serde(rename = "motoboyLocationUpdate")]
    CourierLocationUpdate(CourierPosition),

    #[serde(rename = "heartbeat:response")]
    HeartbeatResponse,

    #[serde(rename = "acceptOrder:success")]
    AcceptOrderAck(OrderAck),

    #[serde(rename = "declineOrder:success")]
    DeclineOrderAck(OrderAck),

    #[serde(rename = "locationUpdate:success")]
    LocationUpdateAck,
}

impl ServerFrame {
    /// Maps an inbound frame to the bus event it becomes.
    pub fn into_event(self) -> ClientEvent {
        match self {
            ServerFrame::NotificationUpdate(n) => ClientEvent::NotificationUpdate(n),
            ServerFrame::NewOrderOffer(o) => ClientEvent::NewOrderOffer(o),
            ServerFrame::OrderStatusUpdate(c) => ClientEvent::OrderStatusUpdate(c),
            ServerFrame::CourierLocationUpdate(p) => ClientEvent::CourierLocationUpdate(p),
            ServerFrame::HeartbeatResponse => ClientEvent::HeartbeatResponse,
            ServerFrame::AcceptOrderAck(a) => ClientEvent::AcceptOrderAck(a),
            ServerFrame::DeclineOrderAck(a) => ClientEvent::DeclineOrderAck(a),
            ServerFrame::LocationUpdateAck => ClientEvent::LocationUpdateAck,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{OrderId, Timestamp};
    use crate::domain::order::OrderStatus;

    #[test]
    fn heartbeat_serializes_without_data() {
        let json = serde_json::to_string(&ClientFrame::Heartbeat).unwrap();
        assert_eq!(json, r#"{"event":"heartbeat"}"#);
    }

    #[test]
    fn join_room_payload_is_the_bare_room_string() {
        let frame = ClientFrame::JoinRoom(RoomName::new("store:42").unwrap());
        let json = serde_json::to_string(&frame).unwrap();
        assert_eq!(json, r#"{"event":"joinRoom","data":"store:42"}"#);
    }

    #[test]
    fn update_location_carries_the_wire_field_names() {
        let fix = LocationFix {
            latitude: -23.55,
            longitude: -46.63,
            accuracy: Some(8.0),
            taken_at: Timestamp::from_datetime("2025-03-01T12:00:00Z".parse().unwrap()),
        };
        let frame =
            ClientFrame::UpdateLocation(LocationUpdate::new(CourierId::from_string("c-1"), fix));
        let json = serde_json::to_string(&frame).unwrap();

        assert!(json.contains(r#""event":"updateLocation""#));
        assert!(json.contains(r#""motoboyId":"c-1""#));
        assert!(json.contains(r#""timestamp":"2025-03-01T12:00:00.000Z""#));
    }

    #[test]
    fn decline_order_omits_absent_reason() {
        let frame = ClientFrame::DeclineOrder(DeclineOrder {
            order_id: OrderId::from_string("o-1"),
            courier_id: CourierId::from_string("c-1"),
            reason: None,
        });
        let json = serde_json::to_string(&frame).unwrap();
        assert!(!json.contains("reason"));

        let frame = ClientFrame::DeclineOrder(DeclineOrder {
            order_id: OrderId::from_string("o-1"),
            courier_id: CourierId::from_string("c-1"),
            reason: Some("too far".to_string()),
        });
        let json = serde_json::to_string(&frame).unwrap();
        assert!(json.contains(r#""reason":"too far""#));
    }

    #[test]
    fn call_response_serializes_action_lowercase() {
        let frame = ClientFrame::RespondCallNotification(CallResponse {
            call_id: CallId::from_string("call-1"),
            action: CallAction::Accept,
            identity: ClientIdentity::new("U1").unwrap(),
        });
        let json = serde_json::to_string(&frame).unwrap();
        assert!(json.contains(r#""action":"accept""#));
        assert!(json.contains(r#""callId":"call-1""#));
    }

    #[test]
    fn server_status_update_parses_and_maps_to_event() {
        let json = r#"{"event":"orderStatusUpdate","data":{"orderId":"o-9","status":"in_transit"}}"#;
        let frame: ServerFrame = serde_json::from_str(json).unwrap();

        let event = frame.into_event();
        match event {
            ClientEvent::OrderStatusUpdate(change) => {
                assert_eq!(change.order_id.as_str(), "o-9");
                assert_eq!(change.status, OrderStatus::InTransit);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn server_ack_frames_parse_without_data() {
        let frame: ServerFrame =
            serde_json::from_str(r#"{"event":"heartbeat:response"}"#).unwrap();
        assert_eq!(frame, ServerFrame::HeartbeatResponse);

        let frame: ServerFrame =
            serde_json::from_str(r#"{"event":"locationUpdate:success"}"#).unwrap();
        assert_eq!(frame.into_event(), ClientEvent::LocationUpdateAck);
    }

    #[test]
    fn unknown_event_names_fail_to_parse() {
        let result = serde_json::from_str::<ServerFrame>(r#"{"event":"mystery","data":{}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn every_outbound_event_name_matches_the_contract() {
        let cases: Vec<(ClientFrame, &str)> = vec![
            (ClientFrame::Heartbeat, "heartbeat"),
            (
                ClientFrame::JoinRoom(RoomName::new("r").unwrap()),
                "joinRoom",
            ),
            (
                ClientFrame::LeaveRoom(RoomName::new("r").unwrap()),
                "leaveRoom",
            ),
            (
                ClientFrame::MarkNotificationRead(MarkRead {
                    notification_id: NotificationId::from_string("n-1"),
                }),
                "markNotificationRead",
            ),
            (
                ClientFrame::OrderStatusUpdate(OrderStatusChange {
                    order_id: OrderId::from_string("o-1"),
                    status: OrderStatus::Delivered,
                }),
                "orderStatusUpdate",
            ),
            (
                ClientFrame::AcceptOrder(OrderAction {
                    order_id: OrderId::from_string("o-1"),
                    courier_id: CourierId::from_string("c-1"),
                }),
                "acceptOrder",
            ),
        ];

        for (frame, name) in cases {
            let value: serde_json::Value =
                serde_json::from_str(&serde_json::to_string(&frame).unwrap()).unwrap();
            assert_eq!(value["event"], name);
        }
    }
}

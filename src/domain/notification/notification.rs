//! Notification payload as delivered by the gateway.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{NotificationId, OrderId, Timestamp};

/// A single notification pushed over the realtime session.
///
/// The client treats notifications as display data; the server remains the
/// source of truth. `read` is updated server-side when the client dispatches
/// `markNotificationRead`, then re-pushed as a `notificationUpdate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    pub body: String,

    /// Order this notification refers to, when order-related.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,

    pub created_at: Timestamp,

    #[serde(default)]
    pub read: bool,
}

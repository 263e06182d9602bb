//! Order offers pushed to couriers and the client-side offer board.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{OrderId, Timestamp};

/// Delivery lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Accepted,
    Preparing,
    ReadyForPickup,
    InTransit,
    Delivered,
    Cancelled,
}

/// An open delivery offer pushed to a courier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderOffer {
    pub order_id: OrderId,
    pub store_name: String,
    pub pickup_address: String,
    pub delivery_address: String,

    /// Straight-line distance to the pickup point, when the gateway knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,

    pub offered_at: Timestamp,
}

/// Client-side cache of open offers.
///
/// Unbounded, but pruned: any status movement for an order retires its offer,
/// since the order is no longer up for grabs (someone accepted it, the store
/// cancelled it, and so on). The server remains authoritative.
#[derive(Debug, Clone, Default)]
pub struct OfferBoard {
    offers: Vec<OrderOffer>,
}

impl OfferBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an offer. A second offer for the same order replaces the first.
    pub fn push(&mut self, offer: OrderOffer) {
        self.offers.retain(|o| o.order_id != offer.order_id);
        self.offers.push(offer);
    }

    /// Removes the offer for `order_id`, if present. Returns whether an
    /// offer was removed.
    pub fn prune(&mut self, order_id: &OrderId) -> bool {
        let before = self.offers.len();
        self.offers.retain(|o| &o.order_id != order_id);
        self.offers.len() != before
    }

    /// Open offers in arrival order.
    pub fn snapshot(&self) -> Vec<OrderOffer> {
        self.offers.clone()
    }

    pub fn len(&self) -> usize {
        self.offers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    pub fn clear(&mut self) {
        self.offers.clear();
    }
}

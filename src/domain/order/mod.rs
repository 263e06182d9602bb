//! Order offer domain types.

mod offer;

pub use offer::{OfferBoard, OrderOffer, OrderStatus};

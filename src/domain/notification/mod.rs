//! Notification domain types.

mod feed;
mod notification;

pub use feed::NotificationFeed;
pub use notification::Notification;

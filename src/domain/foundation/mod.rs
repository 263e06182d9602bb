//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types that form the
//! vocabulary of the Courier Link domain.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::ValidationError;
pub use ids::{CallId, ClientIdentity, CourierId, NotificationId, OrderId, RoomName};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;

//! Location provider adapters.

mod channel;
mod mock;

pub use channel::{ChannelLocationProvider, LocationSink};
pub use mock::MockLocationProvider;

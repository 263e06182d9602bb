//! Courier Link demo runner.
//!
//! Connects to the configured gateway, logs every event the session
//! produces, and reports location fixes when a position source is wired in.
//! Intended for manual verification against a running gateway:
//!
//! ```text
//! COURIER_LINK__CONNECTION__URL=ws://localhost:4000/realtime \
//! COURIER_LINK_IDENTITY=U1 COURIER_LINK_ROLE=motoboy courier-link
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use courier_link::adapters::location::ChannelLocationProvider;
use courier_link::adapters::transport::TungsteniteConnector;
use courier_link::application::{
    ClientSettings, LocationReporter, NotificationFeedHandle, RealtimeClient,
};
use courier_link::config::AppConfig;
use courier_link::domain::events::EventKind;
use courier_link::domain::foundation::{ClientIdentity, CourierId};
use courier_link::ports::Role;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.telemetry.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let identity = std::env::var("COURIER_LINK_IDENTITY").unwrap_or_else(|_| "demo".to_string());
    let identity = ClientIdentity::new(identity)?;
    let role: Role = std::env::var("COURIER_LINK_ROLE")
        .unwrap_or_else(|_| "motoboy".to_string())
        .parse()?;

    let connector = Arc::new(TungsteniteConnector::new(
        config.connection.url.clone(),
        config.connection.token.clone(),
    ));
    let client = RealtimeClient::new(ClientSettings::from(&config), connector);

    // Log every event kind as it arrives.
    for kind in [
        EventKind::ConnectionSuccess,
        EventKind::ConnectionLost,
        EventKind::ConnectionFailed,
        EventKind::ConnectionRestored,
        EventKind::NotificationUpdate,
        EventKind::NewOrderOffer,
        EventKind::OrderStatusUpdate,
        EventKind::CourierLocationUpdate,
        EventKind::HeartbeatResponse,
        EventKind::AcceptOrderAck,
        EventKind::DeclineOrderAck,
        EventKind::LocationUpdateAck,
    ] {
        client
            .on(kind, move |event| {
                tracing::info!(kind = %kind, ?event, "event");
            })
            .detach();
    }

    let feed = NotificationFeedHandle::attach(&client, config.feed.capacity);

    // Courier sessions report their position; the embedding shell publishes
    // readings into the sink. Without a publisher the reporter records
    // "unavailable" and keeps polling, which is the contract.
    let _reporter = if role == Role::Courier {
        let (provider, _sink) = ChannelLocationProvider::new();
        Some(LocationReporter::start(
            client.dispatcher(),
            Arc::new(provider),
            CourierId::from_string(identity.as_str()),
            Duration::from_secs(config.location.poll_interval_secs),
        ))
    } else {
        None
    };

    tracing::info!(url = %config.connection.url, role = %role, "connecting");
    client.connect(identity, role);

    tokio::signal::ctrl_c().await?;
    tracing::info!(
        notifications = feed.notifications().len(),
        offers = feed.offers().len(),
        "shutting down"
    );
    client.disconnect();
    Ok(())
}

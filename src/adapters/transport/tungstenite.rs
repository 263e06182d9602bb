//! WebSocket transport adapter backed by tokio-tungstenite.
//!
//! The handshake carries the identity and role as query parameters and the
//! optional bearer token in the `Authorization` header. Frames are JSON
//! text; protocol-level ping/pong is left to the library.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use secrecy::{ExposeSecret, SecretString};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::ports::{ConnectParams, Transport, TransportConnector, TransportError};

/// Connector for the platform's realtime gateway.
pub struct TungsteniteConnector {
    base_url: String,
    token: Option<SecretString>,
}

impl TungsteniteConnector {
    /// Creates a connector for `base_url` (a `ws://` or `wss://` endpoint).
    pub fn new(base_url: impl Into<String>, token: Option<SecretString>) -> Self {
        Self {
            base_url: base_url.into(),
            token,
        }
    }

    fn session_url(&self, params: &ConnectParams) -> String {
        let separator = if self.base_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}identity={}&role={}",
            self.base_url,
            separator,
            params.identity.as_str(),
            params.role.as_str()
        )
    }
}

#[async_trait]
impl TransportConnector for TungsteniteConnector {
    async fn connect(&self, params: &ConnectParams) -> Result<Box<dyn Transport>, TransportError> {
        let url = self.session_url(params);
        let mut request = url
            .into_client_request()
            .map_err(|e| TransportError::Handshake(e.to_string()))?;

        if let Some(token) = &self.token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| TransportError::Handshake(e.to_string()))?;
            request.headers_mut().insert(AUTHORIZATION, value);
        }

        let (stream, _response) = connect_async(request)
            .await
            .map_err(|e| TransportError::Handshake(e.to_string()))?;

        tracing::debug!(role = params.role.as_str(), "websocket session established");
        Ok(Box::new(WsTransport { inner: stream }))
    }
}

struct WsTransport {
    inner: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&mut self, frame: String) -> Result<(), TransportError> {
        self.inner
            .send(Message::Text(frame.into()))
            .await
            .map_err(|e| TransportError::Io(e.to_string()))
    }

    async fn recv(&mut self) -> Option<Result<String, TransportError>> {
        loop {
            match self.inner.next().await {
                Some(Ok(Message::Text(text))) => return Some(Ok(text.to_string())),
                // Control frames and binary payloads are not part of the
                // gateway protocol; skip them and keep reading.
                Some(Ok(Message::Ping(_)))
                | Some(Ok(Message::Pong(_)))
                | Some(Ok(Message::Binary(_)))
                | Some(Ok(Message::Frame(_))) => continue,
                Some(Ok(Message::Close(_))) => return None,
                Some(Err(e)) => return Some(Err(TransportError::Io(e.to_string()))),
                None => return None,
            }
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.inner
            .close(None)
            .await
            .map_err(|e| TransportError::Io(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ClientIdentity;
    use crate::ports::Role;

    fn params() -> ConnectParams {
        ConnectParams {
            identity: ClientIdentity::new("U1").unwrap(),
            role: Role::Courier,
        }
    }

    #[test]
    fn session_url_appends_identity_and_role() {
        let connector = TungsteniteConnector::new("ws://gateway.local/realtime", None);
        assert_eq!(
            connector.session_url(&params()),
            "ws://gateway.local/realtime?identity=U1&role=motoboy"
        );
    }

    #[test]
    fn session_url_extends_existing_query() {
        let connector = TungsteniteConnector::new("ws://gateway.local/realtime?v=2", None);
        assert_eq!(
            connector.session_url(&params()),
            "ws://gateway.local/realtime?v=2&identity=U1&role=motoboy"
        );
    }
}

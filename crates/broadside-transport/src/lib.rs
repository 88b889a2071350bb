//! Transport abstraction layer for Broadside.
//!
//! Provides the [`Connection`] trait: one persistent, bidirectional text
//! channel to the game server. The session layer is written against the
//! trait, so tests can swap the real WebSocket for a scripted connection.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket client via `tokio-tungstenite`
//! - `tls`: enables `wss://` endpoints (rustls with webpki roots)

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::WebSocketConnection;

use std::fmt;
use std::future::Future;

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A single connection that carries text frames to and from the server.
///
/// The methods return `impl Future + Send` rather than being plain
/// `async fn`s so the session can drive them from spawned Tokio tasks.
/// Implementors may still write `async fn` in their `impl` blocks.
pub trait Connection: Send + Sync + 'static {
    /// Sends one text frame.
    ///
    /// Fails with [`TransportError::ConnectionClosed`] once the connection
    /// has been closed by either side.
    fn send(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Receives the next text frame.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed. Only one
    /// caller should be receiving at a time.
    fn recv(
        &self,
    ) -> impl Future<Output = Result<Option<String>, TransportError>> + Send;

    /// Sends a normal-closure frame with `reason`. Closing an already
    /// closed connection is a no-op.
    fn close(
        &self,
        reason: &str,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Returns `true` until the connection is closed by either side.
    fn is_open(&self) -> bool;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}

/// Appends `token` to `endpoint` as the `token` query parameter.
///
/// The game server authenticates the WebSocket upgrade from this
/// parameter alone. Characters outside the URL "unreserved" set are
/// percent-encoded.
///
/// # Errors
/// Returns [`TransportError::InvalidEndpoint`] unless `endpoint` is a
/// `ws://` or `wss://` URL.
pub fn authorized_url(endpoint: &str, token: &str) -> Result<String, TransportError> {
    if !(endpoint.starts_with("ws://") || endpoint.starts_with("wss://")) {
        return Err(TransportError::InvalidEndpoint(format!(
            "expected a ws:// or wss:// URL, got {endpoint:?}"
        )));
    }

    let separator = if endpoint.contains('?') { '&' } else { '?' };
    Ok(format!("{endpoint}{separator}token={}", percent_encode(token)))
}

fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_new_and_into_inner() {
        let id = ConnectionId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_connection_id_display() {
        let id = ConnectionId::new(7);
        assert_eq!(id.to_string(), "conn-7");
    }

    #[test]
    fn test_authorized_url_appends_query() {
        let url = authorized_url("ws://localhost:3000", "abc.def").unwrap();
        assert_eq!(url, "ws://localhost:3000?token=abc.def");
    }

    #[test]
    fn test_authorized_url_extends_existing_query() {
        let url = authorized_url("wss://host/play?v=2", "t").unwrap();
        assert_eq!(url, "wss://host/play?v=2&token=t");
    }

    #[test]
    fn test_authorized_url_percent_encodes_token() {
        let url = authorized_url("ws://h", "a b+c/=").unwrap();
        assert_eq!(url, "ws://h?token=a%20b%2Bc%2F%3D");
    }

    #[test]
    fn test_authorized_url_rejects_http_scheme() {
        let result = authorized_url("http://localhost:3000", "t");
        assert!(matches!(result, Err(TransportError::InvalidEndpoint(_))));
    }
}

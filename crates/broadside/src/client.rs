//! `BroadsideClient` builder and session entry point.
//!
//! This is where an application starts. It ties together the layers:
//! config → identity → registry → session → transport.

use std::sync::Arc;

use broadside_session::{
    GameEvent, GameSession, Identity, SessionRegistry, StaticIdentity,
};
use broadside_transport::{TransportError, WebSocketConnection};
use tokio::sync::mpsc;

use crate::{BroadsideError, ClientConfig};

/// A session over the real WebSocket transport.
pub type LiveSession = GameSession<WebSocketConnection>;

/// Builder for a [`BroadsideClient`].
///
/// # Example
///
/// ```rust,no_run
/// use broadside::prelude::*;
///
/// # async fn run() -> Result<(), BroadsideError> {
/// let client = BroadsideClient::builder()
///     .endpoint("ws://127.0.0.1:3000")
///     .identity(StaticIdentity::new("alice", "token"))
///     .build()?;
/// let (session, mut events) = client.start_session().await?;
/// # Ok(())
/// # }
/// ```
pub struct BroadsideClientBuilder {
    config: ClientConfig,
    identity: Arc<dyn Identity>,
    registry: SessionRegistry,
}

impl BroadsideClientBuilder {
    /// Creates a builder with default settings and nobody logged in.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            identity: Arc::new(StaticIdentity::anonymous()),
            registry: SessionRegistry::new(),
        }
    }

    /// Sets the WebSocket endpoint of the game server.
    pub fn endpoint(mut self, url: &str) -> Self {
        self.config.ws_url = url.to_string();
        self
    }

    /// Sets the base URL of the HTTP API.
    pub fn api_url(mut self, url: &str) -> Self {
        self.config.api_url = url.to_string();
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets who is playing.
    pub fn identity(mut self, identity: impl Identity) -> Self {
        self.identity = Arc::new(identity);
        self
    }

    /// Shares an identity the application keeps updating (login, logout).
    pub fn shared_identity(mut self, identity: Arc<dyn Identity>) -> Self {
        self.identity = identity;
        self
    }

    /// Uses an existing registry, e.g. one shared with another client.
    pub fn registry(mut self, registry: SessionRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    /// Returns [`TransportError::InvalidEndpoint`] unless the endpoint is a
    /// `ws://` or `wss://` URL.
    pub fn build(self) -> Result<BroadsideClient, BroadsideError> {
        let url = self.config.ws_url.as_str();
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(TransportError::InvalidEndpoint(format!(
                "expected a ws:// or wss:// URL, got {url:?}"
            ))
            .into());
        }

        Ok(BroadsideClient {
            config: self.config,
            identity: self.identity,
            registry: self.registry,
        })
    }
}

impl Default for BroadsideClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A configured Broadside client.
///
/// Holds the identity and the session registry, so at most one game runs
/// at a time per client (or per shared registry).
pub struct BroadsideClient {
    config: ClientConfig,
    identity: Arc<dyn Identity>,
    registry: SessionRegistry,
}

impl BroadsideClient {
    /// Creates a new builder.
    pub fn builder() -> BroadsideClientBuilder {
        BroadsideClientBuilder::new()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Returns `true` while a game session holds the registry slot.
    pub fn has_active_session(&self) -> bool {
        self.registry.is_active()
    }

    /// Creates a session without connecting it.
    ///
    /// # Errors
    /// Fails if nobody is logged in or a session is already active.
    pub fn create_session(&self) -> Result<LiveSession, BroadsideError> {
        Ok(GameSession::create(
            &self.registry,
            Arc::clone(&self.identity),
        )?)
    }

    /// Creates a session, registers the event listener and connects.
    ///
    /// The listener is in place before the connection opens, so the first
    /// event received is `Connected` (or a transport `Error` if the server
    /// is unreachable).
    ///
    /// # Errors
    /// Fails if nobody is logged in, a session is already active, or the
    /// server cannot be reached. The registry slot is free again after any
    /// failure.
    pub async fn start_session(
        &self,
    ) -> Result<(LiveSession, mpsc::UnboundedReceiver<GameEvent>), BroadsideError> {
        let session = self.create_session()?;
        let events = session.set_listener();
        tracing::info!(session = %session.id(), endpoint = %self.config.ws_url, "starting game session");
        session.connect(&self.config.ws_url).await?;
        Ok((session, events))
    }
}

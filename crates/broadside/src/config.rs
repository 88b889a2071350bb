//! Client configuration.

/// Environment variable overriding [`ClientConfig::ws_url`].
pub const WS_URL_VAR: &str = "BROADSIDE_WS_URL";
/// Environment variable overriding [`ClientConfig::api_url`].
pub const API_URL_VAR: &str = "BROADSIDE_API_URL";

/// Where the game server lives.
///
/// Defaults point at a local development server. Use
/// [`ClientConfig::from_env`] to pick up deployment URLs, or set the
/// fields directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// WebSocket endpoint for game sessions (`ws://` or `wss://`).
    ///
    /// Default: `ws://127.0.0.1:3000`.
    pub ws_url: String,

    /// Base URL of the HTTP API serving login and the leaderboard.
    ///
    /// Default: `http://127.0.0.1:3000`.
    pub api_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ws_url: "ws://127.0.0.1:3000".to_string(),
            api_url: "http://127.0.0.1:3000".to_string(),
        }
    }
}

impl ClientConfig {
    /// Defaults, overridden by `BROADSIDE_WS_URL` and `BROADSIDE_API_URL`
    /// when set and non-empty.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through
    /// `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(ws_url) = value(WS_URL_VAR) {
            config.ws_url = ws_url;
        }
        if let Some(api_url) = value(API_URL_VAR) {
            config.api_url = api_url;
        }
        tracing::debug!(ws_url = %config.ws_url, api_url = %config.api_url, "client config loaded");
        config
    }

    /// URL of the leaderboard endpoint returning the top `limit` players.
    pub fn leaderboard_url(&self, limit: usize) -> String {
        format!("{}/leaderboard?limit={limit}", self.api_url.trim_end_matches('/'))
    }
}

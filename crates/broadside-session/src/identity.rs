//! The identity boundary.
//!
//! Broadside does not log anyone in. Credentials live with whatever
//! account service the application uses; the session only needs three
//! answers from it, captured by the [`Identity`] trait:
//!
//! - is anyone logged in?
//! - what token authenticates them to the game server?
//! - what username should the server report back?
//!
//! The session holds the identity behind an `Arc`, so a logout elsewhere
//! in the application is visible to it without copying credentials.

/// The currently logged-in user, as seen by a game session.
///
/// # Example
///
/// ```rust
/// use broadside_session::Identity;
///
/// struct EnvIdentity;
///
/// impl Identity for EnvIdentity {
///     fn is_authenticated(&self) -> bool {
///         self.token().is_some()
///     }
///     fn token(&self) -> Option<String> {
///         std::env::var("BROADSIDE_TOKEN").ok()
///     }
///     fn username(&self) -> Option<String> {
///         std::env::var("BROADSIDE_USER").ok()
///     }
/// }
/// ```
pub trait Identity: Send + Sync + 'static {
    /// Returns `true` if a user is logged in.
    fn is_authenticated(&self) -> bool;

    /// The bearer token sent as the `token` query parameter on connect.
    fn token(&self) -> Option<String>;

    /// The username the server is expected to confirm in
    /// `connection_success`.
    fn username(&self) -> Option<String>;
}

/// An [`Identity`] with fixed values.
///
/// Useful for command-line tools and tests. [`StaticIdentity::anonymous`]
/// is never authenticated.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    username: Option<String>,
    token: Option<String>,
}

impl StaticIdentity {
    /// A logged-in user.
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            token: Some(token.into()),
        }
    }

    /// Nobody logged in.
    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl Identity for StaticIdentity {
    fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn token(&self) -> Option<String> {
        self.token.clone()
    }

    fn username(&self) -> Option<String> {
        self.username.clone()
    }
}

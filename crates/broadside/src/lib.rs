//! # Broadside
//!
//! Client engine for two-player naval battles played over a WebSocket.
//!
//! Broadside runs the client side of a game: it queues for a match,
//! submits a fleet, takes turns firing at the opponent's grid and reports
//! everything that happens as [`GameEvent`](broadside_session::GameEvent)s
//! on a single channel. Rendering is left to the application.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use broadside::prelude::*;
//!
//! # async fn run() -> Result<(), BroadsideError> {
//! let client = BroadsideClient::builder()
//!     .config(ClientConfig::from_env())
//!     .identity(StaticIdentity::new("alice", "token"))
//!     .build()?;
//!
//! let (session, mut events) = client.start_session().await?;
//! while let Some(event) = events.recv().await {
//!     match event {
//!         GameEvent::GameStarted => {
//!             let mut fleet = FleetBuilder::new();
//!             for (row, class) in FLEET_CLASSES.into_iter().enumerate() {
//!                 fleet.place(class, 0, row as i32, Orientation::Horizontal)?;
//!             }
//!             session.submit_fleet(fleet.build()?)?;
//!         }
//!         GameEvent::YourTurn => {
//!             // pick a cell the target board has not resolved yet
//!         }
//!         GameEvent::GameEnded { .. } | GameEvent::Disconnected { .. } => break,
//!         _ => {}
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod logging;
mod stats;

pub use client::{BroadsideClient, BroadsideClientBuilder, LiveSession};
pub use config::{API_URL_VAR, ClientConfig, WS_URL_VAR};
pub use error::BroadsideError;
pub use logging::init_logging;
pub use stats::{LeaderboardEntry, StatsError, StatsService, WinRate, parse_leaderboard};

pub use broadside_fleet as fleet;
pub use broadside_protocol as protocol;
pub use broadside_session as session;
pub use broadside_transport as transport;

/// Everything needed to drive a game.
pub mod prelude {
    pub use crate::{
        BroadsideClient, BroadsideError, ClientConfig, LeaderboardEntry,
        LiveSession, StatsService, init_logging, parse_leaderboard,
    };
    pub use broadside_fleet::{
        Board, Cell, FLEET_CLASSES, Fleet, FleetBuilder, GRID_SIZE,
        Orientation, PlacementError, Ship, ShipClass,
    };
    pub use broadside_protocol::AttackOutcome;
    pub use broadside_session::{
        ActionError, DisconnectReason, ErrorKind, GameEvent, GameSession, Grid,
        Identity, Outcome, Phase, SessionError, SessionRegistry,
        StaticIdentity,
    };
}

//! Error types for the session layer.

use broadside_protocol::ProtocolError;
use broadside_transport::TransportError;

use crate::{Phase, SessionId};

/// Errors from creating, connecting or tearing down a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The identity provider reports no logged-in user.
    #[error("cannot start a game session without an authenticated user")]
    Unauthenticated,

    /// Another session already holds the registry slot. Only one game
    /// can be live at a time.
    #[error("session {0} is already active")]
    AlreadyActive(SessionId),

    /// The session already has a connection attached.
    #[error("session is already connected")]
    AlreadyConnected,

    /// The session has been torn down; create a new one.
    #[error("session is closed")]
    Closed,

    /// A transport-level failure (connect, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame could not be encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Why a player action was refused before anything was sent.
///
/// An `ActionError` never changes session state and never produces a
/// frame or an event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// Attacks are only allowed during [`Phase::MyTurn`].
    #[error("not your turn (phase: {phase})")]
    NotYourTurn { phase: Phase },

    /// The previous attack has not been answered yet.
    #[error("waiting for the result of the previous attack")]
    ShotPending,

    #[error("({x}, {y}) is outside the grid")]
    OutOfBounds { x: i32, y: i32 },

    /// The target cell already shows a hit, miss or wreck.
    #[error("({x}, {y}) has already been targeted")]
    AlreadyTargeted { x: i32, y: i32 },

    /// The action does not apply in the current phase.
    #[error("{action} is not allowed during {phase}")]
    WrongPhase { action: &'static str, phase: Phase },

    /// The server already accepted a fleet for this game.
    #[error("fleet already accepted")]
    FleetAlreadyAccepted,
}

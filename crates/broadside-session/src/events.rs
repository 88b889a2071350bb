//! Game events and the single-listener dispatcher.
//!
//! Everything the presentation layer needs to know arrives as a
//! [`GameEvent`] on one channel, in exactly the order the server frames
//! were decoded.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use broadside_fleet::Ship;
use broadside_protocol::AttackOutcome;
use tokio::sync::mpsc;

use crate::Outcome;

/// Which grid a destroyed ship was on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grid {
    /// One of our own ships.
    Own,
    /// One of the opponent's ships.
    Opponent,
}

/// Where an [`GameEvent::Error`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Connecting failed or the connection broke.
    Transport,
    /// A frame could not be decoded or carried impossible values.
    Protocol,
    /// The server rejected the connection (`connection_error`).
    Connection,
    /// The server rejected the submitted fleet.
    Validation,
    /// The server confirmed a different user than the one logged in.
    Identity,
    /// Any other server-reported problem (`error`, `friend_not_found`).
    Server,
}

/// Why a session ended without a winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisconnectReason {
    /// The player disconnected or left the queue.
    Local,
    /// The server reported the opponent gone.
    OpponentLeft,
    /// The transport closed or failed.
    ConnectionLost,
    /// The session was aborted after an identity mismatch.
    Aborted,
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "disconnected"),
            Self::OpponentLeft => write!(f, "opponent disconnected"),
            Self::ConnectionLost => write!(f, "connection lost"),
            Self::Aborted => write!(f, "session aborted"),
        }
    }
}

/// A game lifecycle notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// The transport is open and the player has been queued.
    Connected,
    /// Matchmaking queue size changed.
    QueueUpdate { players: u32 },
    /// Number of games in progress on the server changed.
    ActiveGames { games: u32 },
    /// An opponent was found; place ships now.
    GameStarted,
    ShipsAccepted,
    YourTurn,
    OpponentTurn,
    /// Result of our shot at the opponent's grid.
    AttackResult { x: i32, y: i32, outcome: AttackOutcome },
    /// The opponent's shot at our grid.
    OpponentAttack { x: i32, y: i32, outcome: AttackOutcome },
    ShipDestroyed { ship: Ship, grid: Grid },
    GameEnded { outcome: Outcome },
    Error { kind: ErrorKind, message: String },
    Disconnected { reason: DisconnectReason },
}

impl GameEvent {
    /// Shorthand for an [`GameEvent::Error`].
    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Error {
            kind,
            message: message.into(),
        }
    }
}

/// One-line summaries for status bars.
impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => write!(f, "Connected"),
            Self::QueueUpdate { players } => write!(f, "Players in queue: {players}"),
            Self::ActiveGames { games } => write!(f, "Active games: {games}"),
            Self::GameStarted => write!(f, "Game started"),
            Self::ShipsAccepted => write!(f, "Ships accepted"),
            Self::YourTurn => write!(f, "Your turn"),
            Self::OpponentTurn => write!(f, "Opponent's turn"),
            Self::AttackResult { outcome, .. } => write!(f, "{outcome}"),
            Self::OpponentAttack { outcome, .. } => write!(f, "Opponent's {outcome}"),
            Self::ShipDestroyed { .. } => write!(f, "Ship Destroyed"),
            Self::GameEnded { outcome: Outcome::Won } => write!(f, "You won!"),
            Self::GameEnded { outcome: Outcome::Lost } => write!(f, "You lost"),
            Self::Error { message, .. } => write!(f, "{message}"),
            Self::Disconnected { reason } => write!(f, "Disconnected: {reason}"),
        }
    }
}

// ---------------------------------------------------------------------------
// EventDispatcher
// ---------------------------------------------------------------------------

/// Delivers events to at most one listener.
///
/// [`set_listener`](Self::set_listener) hands out the receiving end of a
/// fresh unbounded channel. Setting a new listener replaces the old one,
/// whose receiver then yields `None`. Events dispatched while nobody
/// listens are dropped.
#[derive(Debug, Default)]
pub struct EventDispatcher {
    slot: Mutex<Option<mpsc::UnboundedSender<GameEvent>>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new listener, replacing any previous one.
    pub fn set_listener(&self) -> mpsc::UnboundedReceiver<GameEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(tx);
        rx
    }

    /// Removes the listener, if any.
    pub fn clear_listener(&self) {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).take();
    }

    /// Returns `true` if a listener is registered and still receiving.
    pub fn has_listener(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|tx| !tx.is_closed())
    }

    /// Sends `event` to the listener.
    ///
    /// A listener whose receiver was dropped is cleared.
    pub fn dispatch(&self, event: GameEvent) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(tx) = slot.as_ref() else {
            tracing::trace!(%event, "no listener, event dropped");
            return;
        };
        if tx.send(event).is_err() {
            tracing::debug!("listener went away, clearing it");
            *slot = None;
        }
    }
}

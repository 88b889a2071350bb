//! The game session state machine.
//!
//! [`GameMachine`] is pure: it owns the phase, the turn flag, the fleet
//! and both boards, and turns inputs (server frames, transport lifecycle,
//! player actions) into a [`Step`] describing what should happen next.
//! It never touches the network. [`GameSession`](crate::GameSession)
//! wraps it in a mutex and carries out each step, which keeps every
//! transition testable without sockets.

use broadside_fleet::{
    Board, Fleet, GRID_SIZE, Ship, check_bounds, in_bounds,
};
use broadside_protocol::{
    ClientMessage, Codec, JsonCodec, ProtocolError, ServerMessage,
    ShipDescriptor,
};

use crate::events::{DisconnectReason, ErrorKind, GameEvent, Grid};
use crate::{ActionError, Outcome, Phase};

/// Close-frame reasons sent to the server.
pub(crate) const CLOSE_CLIENT: &str = "Client disconnecting";
pub(crate) const CLOSE_LEAVE_QUEUE: &str = "Leaving queue";
pub(crate) const CLOSE_GAME_OVER: &str = "Game over";
pub(crate) const CLOSE_OPPONENT_LEFT: &str = "Opponent disconnected";
pub(crate) const CLOSE_ABORTED: &str = "Identity mismatch";
pub(crate) const CLOSE_LOST: &str = "Connection lost";

/// The effects of one transition, in the order they must be applied:
/// dispatch `events`, send `outbound`, then tear down if `close` is set.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Step {
    pub events: Vec<GameEvent>,
    pub outbound: Vec<ClientMessage>,
    /// Close-frame reason. When set, the session closes the transport and
    /// releases its registry slot after flushing `outbound`.
    pub close: Option<&'static str>,
}

impl Step {
    fn event(event: GameEvent) -> Self {
        Self {
            events: vec![event],
            ..Self::default()
        }
    }

    fn send(msg: ClientMessage) -> Self {
        Self {
            outbound: vec![msg],
            ..Self::default()
        }
    }

    /// Returns `true` if the step has no effect at all.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.outbound.is_empty() && self.close.is_none()
    }
}

/// Phase, turn and board state of one game session.
#[derive(Debug)]
pub struct GameMachine {
    phase: Phase,
    my_turn: bool,
    /// Username the server must confirm in `connection_success`.
    expected_username: Option<String>,
    fleet: Option<Fleet>,
    fleet_accepted: bool,
    /// Coordinates of an attack still waiting for `attack_result`.
    pending_shot: Option<(i32, i32)>,
    target: Board,
    home: Board,
    players_in_queue: Option<u32>,
    active_games: Option<u32>,
    last_summary: Option<String>,
    codec: JsonCodec,
}

impl GameMachine {
    /// A machine in [`Phase::Connecting`].
    pub fn new(expected_username: Option<String>) -> Self {
        Self {
            phase: Phase::Connecting,
            my_turn: false,
            expected_username,
            fleet: None,
            fleet_accepted: false,
            pending_shot: None,
            target: Board::new(),
            home: Board::new(),
            players_in_queue: None,
            active_games: None,
            last_summary: None,
            codec: JsonCodec,
        }
    }

    // -- Accessors --

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The turn flag: `true` between `your_turn` and the next
    /// `opponent_turn`.
    pub fn is_my_turn(&self) -> bool {
        self.my_turn
    }

    /// The last submitted fleet, with hits received so far.
    pub fn fleet(&self) -> Option<&Fleet> {
        self.fleet.as_ref()
    }

    /// Returns `true` once the server answered `ships_accepted`.
    pub fn fleet_accepted(&self) -> bool {
        self.fleet_accepted
    }

    /// What we know about the opponent's grid.
    pub fn target_board(&self) -> &Board {
        &self.target
    }

    /// Where the opponent has fired on our grid.
    pub fn home_board(&self) -> &Board {
        &self.home
    }

    pub fn players_in_queue(&self) -> Option<u32> {
        self.players_in_queue
    }

    pub fn active_games(&self) -> Option<u32> {
        self.active_games
    }

    /// Summary of the last shot-related event ("HIT", "Opponent's MISS",
    /// "Ship Destroyed").
    pub fn last_event_summary(&self) -> Option<&str> {
        self.last_summary.as_deref()
    }

    // -- Transport lifecycle --

    /// The transport opened: queue up for a match.
    pub fn on_connected(&mut self) -> Step {
        if self.phase != Phase::Connecting {
            tracing::debug!(phase = %self.phase, "connected outside Connecting, ignored");
            return Step::default();
        }
        self.transition(Phase::Queued);
        Step {
            events: vec![GameEvent::Connected],
            outbound: vec![ClientMessage::JoinQueue],
            close: None,
        }
    }

    /// Opening the transport failed. The session ends without a
    /// `Disconnected` event, since it never connected.
    pub fn on_connect_failed(&mut self, error: &str) -> Step {
        if self.phase != Phase::Connecting {
            return Step::default();
        }
        self.transition(Phase::Disconnected);
        Step {
            events: vec![GameEvent::error(
                ErrorKind::Transport,
                format!("Failed to connect: {error}"),
            )],
            outbound: Vec::new(),
            close: Some(CLOSE_LOST),
        }
    }

    /// The transport closed or failed.
    pub fn on_transport_lost(&mut self) -> Step {
        if self.phase.is_terminal() {
            return Step::default();
        }
        self.terminate(DisconnectReason::ConnectionLost, CLOSE_LOST)
    }

    /// Decodes one text frame and applies it.
    pub fn on_frame(&mut self, text: &str) -> Step {
        if self.phase.is_terminal() {
            tracing::debug!(phase = %self.phase, "frame after teardown ignored");
            return Step::default();
        }
        match self.codec.decode::<ServerMessage>(text) {
            Ok(msg) => self.on_message(msg),
            Err(e) => {
                tracing::warn!(error = %e, "undecodable frame");
                Step::event(GameEvent::error(
                    ErrorKind::Protocol,
                    format!("Failed to parse message: {e}"),
                ))
            }
        }
    }

    /// Applies one decoded server message.
    pub fn on_message(&mut self, msg: ServerMessage) -> Step {
        if self.phase.is_terminal() {
            return Step::default();
        }

        match msg {
            ServerMessage::ConnectionSuccess { username } => self.confirm_identity(username),

            ServerMessage::ConnectionError { error } => Step::event(GameEvent::error(
                ErrorKind::Connection,
                format!("Connection error: {error}"),
            )),

            ServerMessage::PlayersInQueue { count } => {
                self.players_in_queue = Some(count);
                Step::event(GameEvent::QueueUpdate { players: count })
            }

            ServerMessage::ActiveGames { count } => {
                self.active_games = Some(count);
                Step::event(GameEvent::ActiveGames { games: count })
            }

            ServerMessage::StartGame => {
                if self.phase != Phase::Queued {
                    tracing::debug!(phase = %self.phase, "start_game outside Queued, ignored");
                    return Step::default();
                }
                self.transition(Phase::Placement);
                Step::event(GameEvent::GameStarted)
            }

            ServerMessage::FriendNotFound { message } => Step::event(GameEvent::error(
                ErrorKind::Server,
                message.unwrap_or_else(|| "Friend not found".to_string()),
            )),

            ServerMessage::ShipsAccepted => {
                self.fleet_accepted = true;
                Step::event(GameEvent::ShipsAccepted)
            }

            ServerMessage::ShipsValidationError { error } => {
                // The rejected fleet is discarded; the player resubmits.
                self.fleet = None;
                self.fleet_accepted = false;
                Step::event(GameEvent::error(
                    ErrorKind::Validation,
                    format!("Ships validation error: {error}"),
                ))
            }

            ServerMessage::YourTurn => self.set_turn(true),

            ServerMessage::OpponentTurn => self.set_turn(false),

            ServerMessage::AttackResult { x, y, result } => {
                if !in_bounds(x, y) {
                    return out_of_grid("attack_result", x, y);
                }
                self.pending_shot = None;
                self.target.record_shot(x, y, result);
                let event = GameEvent::AttackResult { x, y, outcome: result };
                self.last_summary = Some(event.to_string());
                Step::event(event)
            }

            ServerMessage::OpponentAttack { x, y, result } => {
                if !in_bounds(x, y) {
                    return out_of_grid("opponent_attack", x, y);
                }
                self.home.record_shot(x, y, result);
                let event = GameEvent::OpponentAttack { x, y, outcome: result };
                self.last_summary = Some(event.to_string());
                let mut step = Step::event(event);

                if result.is_hit() {
                    if let Some(sunk) = self.hit_own_ship(x, y) {
                        self.home.mark_destroyed(&sunk);
                        let event = GameEvent::ShipDestroyed {
                            ship: sunk,
                            grid: Grid::Own,
                        };
                        self.last_summary = Some(event.to_string());
                        step.events.push(event);
                    }
                }
                step
            }

            // Only the attacker receives this, so it is always about the
            // opponent's grid.
            ServerMessage::ShipDestroyed { ship } => {
                let Some(mut wreck) = wreck_from(&ship) else {
                    return invalid_message(format!(
                        "ship_destroyed carries an impossible ship: {ship:?}"
                    ));
                };
                wreck.sink();
                self.target.mark_destroyed(&wreck);
                let event = GameEvent::ShipDestroyed {
                    ship: wreck,
                    grid: Grid::Opponent,
                };
                self.last_summary = Some(event.to_string());
                Step::event(event)
            }

            ServerMessage::YouWin => self.finish(Outcome::Won),

            ServerMessage::YouLose => self.finish(Outcome::Lost),

            ServerMessage::OpponentDisconnected => {
                self.terminate(DisconnectReason::OpponentLeft, CLOSE_OPPONENT_LEFT)
            }

            ServerMessage::Error { message } => {
                Step::event(GameEvent::error(ErrorKind::Server, message))
            }

            ServerMessage::Unknown { kind } => {
                tracing::debug!(%kind, "unknown message type ignored");
                Step::default()
            }
        }
    }

    // -- Player actions --

    /// Fires at `(x, y)` on the opponent's grid.
    ///
    /// # Errors
    /// Rejected without side effects unless the phase is exactly
    /// [`Phase::MyTurn`], no earlier shot is awaiting its result, and the
    /// cell is on the grid and not yet targeted.
    pub fn attack(&mut self, x: i32, y: i32) -> Result<Step, ActionError> {
        if self.phase != Phase::MyTurn {
            return Err(ActionError::NotYourTurn { phase: self.phase });
        }
        if self.pending_shot.is_some() {
            return Err(ActionError::ShotPending);
        }
        if !in_bounds(x, y) {
            return Err(ActionError::OutOfBounds { x, y });
        }
        if self.target.is_resolved(x, y) {
            return Err(ActionError::AlreadyTargeted { x, y });
        }

        self.pending_shot = Some((x, y));
        Ok(Step::send(ClientMessage::Attack { x, y }))
    }

    /// Submits `fleet`, replacing any earlier unaccepted submission.
    ///
    /// # Errors
    /// [`ActionError::WrongPhase`] outside [`Phase::Placement`],
    /// [`ActionError::FleetAlreadyAccepted`] once the server accepted one.
    pub fn submit_fleet(&mut self, fleet: Fleet) -> Result<Step, ActionError> {
        self.require(Phase::Placement, "submitting ships")?;
        if self.fleet_accepted {
            return Err(ActionError::FleetAlreadyAccepted);
        }

        let msg = ClientMessage::ShipsData {
            ships: fleet.placements(),
        };
        self.fleet = Some(fleet);
        Ok(Step::send(msg))
    }

    /// Re-sends `join_queue`.
    pub fn join_queue(&mut self) -> Result<Step, ActionError> {
        self.require(Phase::Queued, "joining the queue")?;
        Ok(Step::send(ClientMessage::JoinQueue))
    }

    /// Asks to be paired with `friend_username`.
    pub fn join_friend(&mut self, friend_username: &str) -> Result<Step, ActionError> {
        self.require(Phase::Queued, "joining a friend")?;
        Ok(Step::send(ClientMessage::JoinFriend {
            friend_username: friend_username.to_string(),
        }))
    }

    /// Sends `leave_queue`, then tears the session down.
    pub fn leave_queue(&mut self) -> Result<Step, ActionError> {
        self.require(Phase::Queued, "leaving the queue")?;
        let mut step = self.terminate(DisconnectReason::Local, CLOSE_LEAVE_QUEUE);
        step.outbound.push(ClientMessage::LeaveQueue);
        Ok(step)
    }

    /// Tears the session down at the player's request.
    ///
    /// Disconnecting an already finished session is a no-op.
    pub fn disconnect(&mut self) -> Step {
        if self.phase.is_terminal() {
            return Step::default();
        }
        self.terminate(DisconnectReason::Local, CLOSE_CLIENT)
    }

    // -- Internals --

    fn require(&self, phase: Phase, action: &'static str) -> Result<(), ActionError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(ActionError::WrongPhase {
                action,
                phase: self.phase,
            })
        }
    }

    fn transition(&mut self, to: Phase) {
        debug_assert!(
            self.phase == to || self.phase.can_transition_to(to),
            "illegal transition {} -> {to}",
            self.phase
        );
        tracing::debug!(from = %self.phase, %to, "phase transition");
        self.phase = to;
    }

    fn set_turn(&mut self, mine: bool) -> Step {
        if !self.phase.is_active() {
            tracing::debug!(phase = %self.phase, mine, "turn change outside a game, ignored");
            return Step::default();
        }
        self.my_turn = mine;
        self.pending_shot = None;
        if mine {
            self.transition(Phase::MyTurn);
            Step::event(GameEvent::YourTurn)
        } else {
            self.transition(Phase::OpponentTurn);
            Step::event(GameEvent::OpponentTurn)
        }
    }

    fn finish(&mut self, outcome: Outcome) -> Step {
        self.transition(Phase::Ended(outcome));
        self.my_turn = false;
        Step {
            events: vec![GameEvent::GameEnded { outcome }],
            outbound: Vec::new(),
            close: Some(CLOSE_GAME_OVER),
        }
    }

    fn terminate(&mut self, reason: DisconnectReason, close: &'static str) -> Step {
        self.transition(Phase::Disconnected);
        self.my_turn = false;
        Step {
            events: vec![GameEvent::Disconnected { reason }],
            outbound: Vec::new(),
            close: Some(close),
        }
    }

    fn confirm_identity(&mut self, username: Option<String>) -> Step {
        let Some(confirmed) = username else {
            return Step::default();
        };
        if self.expected_username.as_deref() == Some(confirmed.as_str()) {
            tracing::debug!(username = %confirmed, "server confirmed identity");
            return Step::default();
        }

        let expected = self.expected_username.as_deref().unwrap_or("<none>");
        tracing::error!(expected, %confirmed, "identity mismatch, aborting session");
        let message = format!("User instance mismatch: expected {expected}, got {confirmed}");
        let mut step = self.terminate(DisconnectReason::Aborted, CLOSE_ABORTED);
        step.events.insert(0, GameEvent::error(ErrorKind::Identity, message));
        step
    }

    /// Records a hit on our own fleet. Returns the ship if this hit sank it.
    fn hit_own_ship(&mut self, x: i32, y: i32) -> Option<Ship> {
        let fleet = self.fleet.as_mut()?;
        let already_sunk = fleet.ship_at(x, y)?.is_destroyed();
        let ship = fleet.receive_hit(x, y)?;
        (!already_sunk && ship.is_destroyed()).then(|| ship.clone())
    }
}

fn out_of_grid(kind: &str, x: i32, y: i32) -> Step {
    invalid_message(format!(
        "{kind} outside the {GRID_SIZE}x{GRID_SIZE} grid: ({x}, {y})"
    ))
}

/// A frame that decoded but breaks a protocol rule. Reported, never applied.
fn invalid_message(detail: String) -> Step {
    let err = ProtocolError::InvalidMessage(detail);
    tracing::warn!(error = %err, "rejected server message");
    Step::event(GameEvent::error(ErrorKind::Protocol, err.to_string()))
}

/// Builds the ship named in `ship_destroyed`, if it fits on the grid.
fn wreck_from(descriptor: &ShipDescriptor) -> Option<Ship> {
    if !(1..=GRID_SIZE as u32).contains(&descriptor.length) {
        return None;
    }
    let ship = Ship::from_descriptor(descriptor);
    check_bounds(&ship).ok().map(|()| ship)
}

//! The game session handle.
//!
//! A [`GameSession`] owns one connection to the game server and the
//! [`GameMachine`] that interprets it. Two Tokio tasks serve the
//! connection:
//!
//! ```text
//!              ┌──────────── reader task ◄──── conn.recv()
//!              │  (one frame at a time)
//!              ▼
//!   Mutex<Inner> ── machine.on_frame() ──► Step ──► events ──► listener
//!              ▲                              │
//!   actions ───┘                              └──► outbound ──► writer task ──► conn.send()
//! ```
//!
//! Every transition happens under one mutex and is applied before the
//! lock is released, so events reach the listener in the order frames
//! were received. Player actions are synchronous: they validate, update
//! state and queue frames for the writer without waiting on the network.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use broadside_fleet::{Board, Fleet};
use broadside_protocol::{ClientMessage, Codec, JsonCodec};
use broadside_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::events::{ErrorKind, EventDispatcher, GameEvent};
use crate::machine::{CLOSE_CLIENT, GameMachine, Step};
use crate::{
    ActionError, Identity, Phase, SessionError, SessionId, SessionLease,
    SessionRegistry,
};

/// Work for the writer task.
#[derive(Debug)]
enum Command {
    Send(String),
    Close(&'static str),
}

/// The live connection and the tasks serving it.
struct Link<C> {
    conn: Arc<C>,
    outbound: mpsc::UnboundedSender<Command>,
    reader: JoinHandle<()>,
}

struct Inner<C> {
    machine: GameMachine,
    link: Option<Link<C>>,
    lease: Option<SessionLease>,
}

struct Shared<C> {
    id: SessionId,
    inner: Mutex<Inner<C>>,
    events: EventDispatcher,
    identity: Arc<dyn Identity>,
    codec: JsonCodec,
}

/// One game, from matchmaking to the final result.
///
/// Created with [`GameSession::create`], which claims the registry slot,
/// then connected with [`GameSession::connect`] (or
/// [`GameSession::attach`] for any other [`Connection`]). Dropping the
/// handle tears the session down without emitting further events.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use broadside_session::{GameEvent, GameSession, SessionRegistry, StaticIdentity};
/// use broadside_transport::WebSocketConnection;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = SessionRegistry::new();
/// let identity = Arc::new(StaticIdentity::new("alice", "token"));
/// let session: GameSession<WebSocketConnection> = GameSession::create(&registry, identity)?;
/// let mut events = session.set_listener();
///
/// session.connect("ws://127.0.0.1:3000").await?;
/// while let Some(event) = events.recv().await {
///     println!("{event}");
///     if let GameEvent::GameEnded { .. } | GameEvent::Disconnected { .. } = event {
///         break;
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct GameSession<C: Connection> {
    shared: Arc<Shared<C>>,
}

impl<C: Connection> GameSession<C> {
    /// Creates a session for the logged-in user and claims the registry
    /// slot.
    ///
    /// # Errors
    /// - [`SessionError::Unauthenticated`] if nobody is logged in.
    /// - [`SessionError::AlreadyActive`] if another session is live.
    pub fn create(
        registry: &SessionRegistry,
        identity: Arc<dyn Identity>,
    ) -> Result<Self, SessionError> {
        let lease = registry.claim(identity.as_ref())?;
        let id = lease.id();
        let username = identity.username();
        tracing::info!(session = %id, user = ?username, "game session created");

        Ok(Self {
            shared: Arc::new(Shared {
                id,
                inner: Mutex::new(Inner {
                    machine: GameMachine::new(username),
                    link: None,
                    lease: Some(lease),
                }),
                events: EventDispatcher::new(),
                identity,
                codec: JsonCodec,
            }),
        })
    }

    /// Runs the session over an already open connection.
    ///
    /// Spawns the reader and writer tasks, so it must be called from
    /// within a Tokio runtime. The session moves to [`Phase::Queued`] and
    /// sends `join_queue`. A rejected connection is closed in the
    /// background.
    ///
    /// # Errors
    /// - [`SessionError::AlreadyConnected`] if a connection is attached.
    /// - [`SessionError::Closed`] if the session has been torn down.
    pub fn attach(&self, conn: C) -> Result<(), SessionError> {
        self.try_attach(conn).map_err(|(err, conn)| {
            tokio::spawn(async move {
                if let Err(e) = conn.close(CLOSE_CLIENT).await {
                    tracing::debug!(error = %e, "closing rejected connection failed");
                }
            });
            err
        })
    }

    /// Like [`GameSession::attach`], but hands a rejected connection back
    /// so the caller can close it.
    fn try_attach(&self, conn: C) -> Result<(), (SessionError, C)> {
        let mut inner = self.shared.lock();
        if inner.link.is_some() {
            return Err((SessionError::AlreadyConnected, conn));
        }
        if inner.machine.phase() != Phase::Connecting {
            return Err((SessionError::Closed, conn));
        }

        let conn = Arc::new(conn);
        tracing::info!(session = %self.shared.id, conn = %conn.id(), "connected");

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(write_loop(
            Arc::clone(&self.shared),
            Arc::clone(&conn),
            rx,
        ));
        let reader = tokio::spawn(read_loop(Arc::clone(&self.shared), Arc::clone(&conn)));
        inner.link = Some(Link {
            conn,
            outbound: tx,
            reader,
        });

        let step = inner.machine.on_connected();
        self.shared.apply(&mut inner, step);
        Ok(())
    }

    // -- Listener --

    /// Registers the event listener, replacing any previous one.
    pub fn set_listener(&self) -> mpsc::UnboundedReceiver<GameEvent> {
        self.shared.events.set_listener()
    }

    pub fn clear_listener(&self) {
        self.shared.events.clear_listener();
    }

    // -- Actions --

    /// Fires at `(x, y)` on the opponent's grid.
    ///
    /// # Errors
    /// See [`GameMachine::attack`]. A refused attack changes nothing.
    pub fn attack(&self, x: i32, y: i32) -> Result<(), ActionError> {
        self.shared.act(|m| m.attack(x, y))
    }

    /// Submits the whole fleet. Resubmitting after a validation error
    /// replaces the previous submission.
    pub fn submit_fleet(&self, fleet: Fleet) -> Result<(), ActionError> {
        self.shared.act(|m| m.submit_fleet(fleet))
    }

    pub fn join_queue(&self) -> Result<(), ActionError> {
        self.shared.act(GameMachine::join_queue)
    }

    /// Asks the server to pair this player with `friend_username`.
    pub fn join_friend(&self, friend_username: &str) -> Result<(), ActionError> {
        self.shared.act(|m| m.join_friend(friend_username))
    }

    /// Leaves matchmaking and ends the session.
    pub fn leave_queue(&self) -> Result<(), ActionError> {
        self.shared.act(GameMachine::leave_queue)
    }

    /// Ends the session. Safe to call any number of times; only the
    /// first call on a live session emits `Disconnected`.
    pub fn disconnect(&self) {
        let mut inner = self.shared.lock();
        let step = inner.machine.disconnect();
        self.shared.apply(&mut inner, step);
        self.shared.teardown(&mut inner, CLOSE_CLIENT);
    }

    // -- Accessors --

    pub fn id(&self) -> SessionId {
        self.shared.id
    }

    pub fn phase(&self) -> Phase {
        self.shared.lock().machine.phase()
    }

    pub fn is_my_turn(&self) -> bool {
        self.shared.lock().machine.is_my_turn()
    }

    /// Returns `true` while a connection is attached and open.
    pub fn is_connected(&self) -> bool {
        self.shared
            .lock()
            .link
            .as_ref()
            .is_some_and(|link| link.conn.is_open())
    }

    /// Snapshot of the opponent's grid as far as we know it.
    pub fn target_board(&self) -> Board {
        self.shared.lock().machine.target_board().clone()
    }

    /// Snapshot of the opponent's shots at our grid.
    pub fn home_board(&self) -> Board {
        self.shared.lock().machine.home_board().clone()
    }

    /// The submitted fleet, with hits received so far.
    pub fn fleet(&self) -> Option<Fleet> {
        self.shared.lock().machine.fleet().cloned()
    }

    pub fn last_event_summary(&self) -> Option<String> {
        self.shared
            .lock()
            .machine
            .last_event_summary()
            .map(str::to_owned)
    }

    pub fn players_in_queue(&self) -> Option<u32> {
        self.shared.lock().machine.players_in_queue()
    }

    pub fn active_games(&self) -> Option<u32> {
        self.shared.lock().machine.active_games()
    }
}

impl GameSession<WebSocketConnection> {
    /// Opens a WebSocket to `endpoint`, authenticated with the identity's
    /// token, and starts the session.
    ///
    /// On failure an [`ErrorKind::Transport`] event is dispatched, the
    /// session ends and the registry slot is released.
    ///
    /// # Errors
    /// - [`SessionError::Unauthenticated`] if the identity has no token.
    /// - [`SessionError::Transport`] if the connection cannot be opened.
    /// - Anything [`GameSession::attach`] returns.
    pub async fn connect(&self, endpoint: &str) -> Result<(), SessionError> {
        {
            let inner = self.shared.lock();
            if inner.link.is_some() {
                return Err(SessionError::AlreadyConnected);
            }
            if inner.machine.phase() != Phase::Connecting {
                return Err(SessionError::Closed);
            }
        }
        let token = self
            .shared
            .identity
            .token()
            .ok_or(SessionError::Unauthenticated)?;

        tracing::debug!(session = %self.shared.id, endpoint, "connecting");
        match WebSocketConnection::connect(endpoint, &token).await {
            Ok(conn) => match self.try_attach(conn) {
                Ok(()) => Ok(()),
                // Torn down or attached elsewhere during the handshake.
                Err((err, conn)) => {
                    tracing::debug!(session = %self.shared.id, error = %err, "dropping fresh connection");
                    if let Err(e) = conn.close(CLOSE_CLIENT).await {
                        tracing::debug!(error = %e, "closing fresh connection failed");
                    }
                    Err(err)
                }
            },
            Err(e) => {
                tracing::warn!(session = %self.shared.id, error = %e, "connect failed");
                let mut inner = self.shared.lock();
                let step = inner.machine.on_connect_failed(&e.to_string());
                self.shared.apply(&mut inner, step);
                Err(e.into())
            }
        }
    }
}

impl<C: Connection> std::fmt::Debug for GameSession<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("id", &self.shared.id)
            .field("phase", &self.phase())
            .finish()
    }
}

impl<C: Connection> Drop for GameSession<C> {
    fn drop(&mut self) {
        self.shared.events.clear_listener();
        self.disconnect();
    }
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

impl<C: Connection> Shared<C> {
    fn lock(&self) -> MutexGuard<'_, Inner<C>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn act<F>(&self, action: F) -> Result<(), ActionError>
    where
        F: FnOnce(&mut GameMachine) -> Result<Step, ActionError>,
    {
        let mut inner = self.lock();
        let step = action(&mut inner.machine)?;
        self.apply(&mut inner, step);
        Ok(())
    }

    /// Carries out a step: events, then frames, then teardown.
    fn apply(&self, inner: &mut Inner<C>, step: Step) {
        let Step {
            events,
            outbound,
            close,
        } = step;

        for event in events {
            self.events.dispatch(event);
        }

        for msg in outbound {
            if !self.enqueue(inner, &msg) {
                tracing::warn!(session = %self.id, kind = msg.kind(), "send on a closed connection");
                let lost = inner.machine.on_transport_lost();
                self.apply(inner, lost);
                break;
            }
        }

        if let Some(reason) = close {
            self.teardown(inner, reason);
        }
    }

    /// Queues `msg` for the writer. Returns `false` if there is no open
    /// connection to send it on.
    fn enqueue(&self, inner: &Inner<C>, msg: &ClientMessage) -> bool {
        let Some(link) = inner.link.as_ref().filter(|link| link.conn.is_open()) else {
            return false;
        };
        let text = match self.codec.encode(msg) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(session = %self.id, error = %e, "failed to encode frame");
                self.events
                    .dispatch(GameEvent::error(ErrorKind::Protocol, e.to_string()));
                return true;
            }
        };
        tracing::debug!(session = %self.id, kind = msg.kind(), "frame queued");
        link.outbound.send(Command::Send(text)).is_ok()
    }

    /// Drops the connection and releases the registry slot. Idempotent.
    fn teardown(&self, inner: &mut Inner<C>, reason: &'static str) {
        if let Some(link) = inner.link.take() {
            tracing::info!(session = %self.id, conn = %link.conn.id(), reason, "closing connection");
            // The writer flushes queued frames before closing.
            let _ = link.outbound.send(Command::Close(reason));
            link.reader.abort();
        }
        if let Some(lease) = inner.lease.take() {
            lease.release();
        }
    }

    /// Applies one inbound frame. Returns `false` once `conn` is no longer
    /// the session's connection.
    fn handle_frame(&self, conn: ConnectionId, text: &str) -> bool {
        let mut inner = self.lock();
        if !inner.is_linked(conn) {
            return false;
        }
        let step = inner.machine.on_frame(text);
        self.apply(&mut inner, step);
        inner.is_linked(conn)
    }

    /// The transport reported `conn` closed or broken.
    fn transport_lost(&self, conn: ConnectionId) {
        let mut inner = self.lock();
        if !inner.is_linked(conn) {
            return;
        }
        let step = inner.machine.on_transport_lost();
        self.apply(&mut inner, step);
        self.teardown(&mut inner, crate::machine::CLOSE_LOST);
    }
}

impl<C: Connection> Inner<C> {
    fn is_linked(&self, conn: ConnectionId) -> bool {
        self.link.as_ref().is_some_and(|link| link.conn.id() == conn)
    }
}

// ---------------------------------------------------------------------------
// Connection tasks
// ---------------------------------------------------------------------------

async fn read_loop<C: Connection>(shared: Arc<Shared<C>>, conn: Arc<C>) {
    let conn_id = conn.id();
    loop {
        match conn.recv().await {
            Ok(Some(text)) => {
                tracing::trace!(%conn_id, frame = %text, "frame received");
                if !shared.handle_frame(conn_id, &text) {
                    break;
                }
            }
            Ok(None) => {
                tracing::info!(%conn_id, "connection closed by server");
                shared.transport_lost(conn_id);
                break;
            }
            Err(e) => {
                tracing::warn!(%conn_id, error = %e, "recv failed");
                shared.transport_lost(conn_id);
                break;
            }
        }
    }
}

async fn write_loop<C: Connection>(
    shared: Arc<Shared<C>>,
    conn: Arc<C>,
    mut commands: mpsc::UnboundedReceiver<Command>,
) {
    let conn_id = conn.id();
    while let Some(command) = commands.recv().await {
        match command {
            Command::Send(text) => {
                if let Err(e) = conn.send(&text).await {
                    tracing::warn!(%conn_id, error = %e, "send failed");
                    shared.transport_lost(conn_id);
                    break;
                }
            }
            Command::Close(reason) => {
                if let Err(e) = conn.close(reason).await {
                    tracing::debug!(%conn_id, error = %e, "close failed");
                }
                break;
            }
        }
    }
}

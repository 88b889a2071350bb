//! Game sessions for Broadside.
//!
//! This crate runs one game of Broadside from the client's side:
//!
//! 1. **Identity**: who is playing ([`Identity`] trait)
//! 2. **Registry**: at most one live game per process ([`SessionRegistry`])
//! 3. **State machine**: phases, turns and boards ([`GameMachine`])
//! 4. **Session**: the connection-driven handle the UI talks to
//!    ([`GameSession`]), reporting everything as [`GameEvent`]s
//!
//! # How it fits in the stack
//!
//! ```text
//! Application (above)  ← renders boards, reacts to GameEvents
//!     ↕
//! Session Layer (this crate)  ← phases, turns, event ordering
//!     ↕
//! Fleet (beside)  ← ships, placement rules, boards
//!     ↕
//! Protocol + Transport (below)  ← JSON frames over a WebSocket
//! ```

mod error;
mod events;
mod identity;
mod machine;
mod phase;
mod registry;
mod session;

pub use error::{ActionError, SessionError};
pub use events::{DisconnectReason, ErrorKind, EventDispatcher, GameEvent, Grid};
pub use identity::{Identity, StaticIdentity};
pub use machine::{GameMachine, Step};
pub use phase::{Outcome, Phase};
pub use registry::{SessionId, SessionLease, SessionRegistry};
pub use session::GameSession;

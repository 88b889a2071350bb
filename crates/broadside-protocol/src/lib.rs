//! Wire protocol for Broadside.
//!
//! This crate defines the "language" the game client and server speak:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`ShipPlacement`],
//!   ...): the JSON frames that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages are
//!   converted to and from text frames.
//! - **Errors** ([`ProtocolError`]): what can go wrong along the way.
//!
//! # Architecture
//!
//! The protocol layer sits between the transport (raw text frames) and
//! the session (game phases). It knows nothing about connections or turns.
//!
//! ```text
//! Transport (text) → Protocol (ServerMessage) → Session (phase machine)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    AttackOutcome, ClientMessage, ServerMessage, ShipDescriptor, ShipPlacement,
    Tagged,
};

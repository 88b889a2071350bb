//! Unified error type for Broadside.

use broadside_fleet::PlacementError;
use broadside_protocol::ProtocolError;
use broadside_session::{ActionError, SessionError};
use broadside_transport::TransportError;

use crate::stats::StatsError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `broadside` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate.
/// The `#[from]` attribute on each variant generates the `From` impls,
/// so `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum BroadsideError {
    /// A transport-level error (connect, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (not logged in, already active, closed).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A player action refused in the current phase.
    #[error(transparent)]
    Action(#[from] ActionError),

    /// A ship placement or fleet that breaks the placement rules.
    #[error(transparent)]
    Placement(#[from] PlacementError),

    /// The stats service failed or returned an unreadable body.
    #[error(transparent)]
    Stats(#[from] StatsError),
}

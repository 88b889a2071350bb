//! Session phases.

/// How a finished game ended for this player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Won,
    Lost,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Won => write!(f, "Won"),
            Self::Lost => write!(f, "Lost"),
        }
    }
}

/// The lifecycle phase of a game session.
///
/// ```text
/// Connecting → Queued → Placement → MyTurn ⇄ OpponentTurn → Ended(Won|Lost)
///      │          │          │           │          │
///      └──────────┴──────────┴───────────┴──────────┴──→ Disconnected
/// ```
///
/// - **Connecting**: created, no transport yet.
/// - **Queued**: connected and waiting in matchmaking.
/// - **Placement**: an opponent was found; ships are being placed.
/// - **MyTurn** / **OpponentTurn**: the battle itself.
/// - **Ended**: the server declared a winner. Terminal.
/// - **Disconnected**: the session was torn down for any other reason.
///   Terminal.
///
/// Phases change only in response to server frames or transport
/// lifecycle, never on a timer. Terminal phases accept no actions and
/// ignore inbound frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Connecting,
    Queued,
    Placement,
    MyTurn,
    OpponentTurn,
    Ended(Outcome),
    Disconnected,
}

impl Phase {
    /// Returns `true` for [`Phase::Ended`] and [`Phase::Disconnected`].
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ended(_) | Self::Disconnected)
    }

    /// Returns `true` while connected and not finished.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::Queued | Self::Placement | Self::MyTurn | Self::OpponentTurn
        )
    }

    /// Returns `true` if moving from `self` to `target` is a legal
    /// transition.
    pub fn can_transition_to(self, target: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self, target) {
            (_, Self::Disconnected | Self::Ended(_)) => true,
            (Self::Connecting, Self::Queued) => true,
            (Self::Queued, Self::Placement) => true,
            (from, Self::MyTurn | Self::OpponentTurn) => from.is_active(),
            _ => false,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connecting => write!(f, "Connecting"),
            Self::Queued => write!(f, "Queued"),
            Self::Placement => write!(f, "Placement"),
            Self::MyTurn => write!(f, "MyTurn"),
            Self::OpponentTurn => write!(f, "OpponentTurn"),
            Self::Ended(outcome) => write!(f, "Ended({outcome})"),
            Self::Disconnected => write!(f, "Disconnected"),
        }
    }
}

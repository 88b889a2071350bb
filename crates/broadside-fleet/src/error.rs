//! Error types for fleet placement.
//!
//! The messages mirror what the game server answers in a
//! `ships_validation_error`, so a locally rejected fleet reads the same
//! as a server-rejected one.

/// Why a ship or fleet cannot be placed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    /// The bow lies outside the 10x10 grid.
    #[error("Ship coordinates out of bounds: ({x}, {y})")]
    OutOfBounds { x: i32, y: i32 },

    /// The bow is on the grid but the stern is not.
    #[error(
        "Ship extends beyond board {}: position ({x}, {y}), length {length}",
        axis(.horizontal)
    )]
    ExtendsBeyondBoard {
        x: i32,
        y: i32,
        length: u32,
        horizontal: bool,
    },

    /// Ship number `ship` (1-based) covers a cell already taken.
    #[error("Ship {ship} overlaps with another ship at position ({x},{y})")]
    Overlap { ship: usize, x: i32, y: i32 },

    /// The fleet does not have exactly five ships.
    #[error("Expected 5 ships, received {found}")]
    WrongShipCount { found: usize },

    /// A ship class is missing or duplicated.
    #[error("Expected {expected} {class}(s) of length {length}, got {found}")]
    WrongComposition {
        class: &'static str,
        length: u32,
        expected: usize,
        found: usize,
    },

    /// The builder already holds a ship of this class.
    #[error("{0} has already been placed")]
    ClassAlreadyPlaced(&'static str),
}

fn axis(horizontal: &bool) -> &'static str {
    if *horizontal { "horizontally" } else { "vertically" }
}

//! Ship and board model for Broadside.
//!
//! - [`Ship`]: position, orientation and per-segment hits.
//! - [`Fleet`] / [`FleetBuilder`]: the player's five ships, validated.
//! - [`Board`]: per-cell knowledge of a grid (unknown, miss, hit,
//!   destroyed).
//! - [`can_place`] / [`validate_fleet`]: local placement rules.
//!
//! The game server is authoritative; everything here exists so the
//! client can reject an obviously bad layout before sending it and render
//! the state of both grids.

mod board;
mod error;
mod fleet;
mod placement;
mod ship;

pub use board::{Board, Cell};
pub use error::PlacementError;
pub use fleet::{Fleet, FleetBuilder};
pub use placement::{can_place, check_bounds, validate_fleet};
pub use ship::{FLEET_CLASSES, GRID_SIZE, Orientation, Ship, ShipClass, in_bounds};

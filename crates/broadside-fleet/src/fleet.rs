//! The player's own fleet, and the builder used during placement.

use broadside_protocol::ShipPlacement;

use crate::placement::{can_place, check_bounds, validate_fleet};
use crate::ship::{FLEET_CLASSES, Orientation, Ship, ShipClass};
use crate::PlacementError;

// ---------------------------------------------------------------------------
// Fleet
// ---------------------------------------------------------------------------

/// A complete, valid fleet: one ship per class, all on the grid, no
/// overlaps.
///
/// The only ways to get one are [`Fleet::new`] and
/// [`FleetBuilder::build`], both of which validate, so holding a `Fleet`
/// means it can be submitted. Ship positions are fixed from then on; the
/// only mutation is recording the opponent's hits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fleet {
    ships: Vec<Ship>,
}

impl Fleet {
    /// Validates `ships` and wraps them.
    ///
    /// # Errors
    /// Returns the first [`PlacementError`] found.
    pub fn new(ships: Vec<Ship>) -> Result<Self, PlacementError> {
        validate_fleet(&ships)?;
        Ok(Self { ships })
    }

    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    /// The ship covering `(x, y)`, if any.
    pub fn ship_at(&self, x: i32, y: i32) -> Option<&Ship> {
        self.ships.iter().find(|ship| ship.is_at(x, y))
    }

    /// Records an opponent hit at `(x, y)` and returns the ship it landed
    /// on, or `None` if no ship covers the cell.
    pub fn receive_hit(&mut self, x: i32, y: i32) -> Option<&Ship> {
        let ship = self.ships.iter_mut().find(|ship| ship.is_at(x, y))?;
        ship.hit(x, y);
        Some(&*ship)
    }

    /// Returns `true` once every ship is destroyed.
    pub fn all_destroyed(&self) -> bool {
        self.ships.iter().all(Ship::is_destroyed)
    }

    /// The `ships` payload of a `ships_data` frame, in fleet order.
    pub fn placements(&self) -> Vec<ShipPlacement> {
        self.ships.iter().map(Ship::placement).collect()
    }
}

// ---------------------------------------------------------------------------
// FleetBuilder
// ---------------------------------------------------------------------------

/// Places ships one class at a time.
///
/// Ids are assigned in placement order starting at 0, which matches the
/// index the server uses in `ship_destroyed`.
///
/// ```rust
/// use broadside_fleet::{FleetBuilder, Orientation, ShipClass};
///
/// let mut builder = FleetBuilder::new();
/// builder.place(ShipClass::CARRIER, 0, 0, Orientation::Horizontal).unwrap();
/// builder.place(ShipClass::BATTLESHIP, 0, 1, Orientation::Horizontal).unwrap();
/// builder.place(ShipClass::CRUISER, 0, 2, Orientation::Horizontal).unwrap();
/// builder.place(ShipClass::SUBMARINE, 0, 3, Orientation::Horizontal).unwrap();
/// builder.place(ShipClass::DESTROYER, 0, 4, Orientation::Horizontal).unwrap();
/// let fleet = builder.build().unwrap();
/// assert_eq!(fleet.ships().len(), 5);
/// ```
#[derive(Debug, Default, Clone)]
pub struct FleetBuilder {
    placed: Vec<(ShipClass, Ship)>,
}

impl FleetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places a ship of `class` with its bow at `(x, y)`.
    ///
    /// # Errors
    /// - [`PlacementError::ClassAlreadyPlaced`] if `class` is already on
    ///   the grid.
    /// - [`PlacementError::OutOfBounds`] or
    ///   [`PlacementError::ExtendsBeyondBoard`] if it does not fit.
    /// - [`PlacementError::Overlap`] if it covers an occupied cell.
    pub fn place(
        &mut self,
        class: ShipClass,
        x: i32,
        y: i32,
        orientation: Orientation,
    ) -> Result<&Ship, PlacementError> {
        if self.placed.iter().any(|(c, _)| *c == class) {
            return Err(PlacementError::ClassAlreadyPlaced(class.name()));
        }

        let id = self.placed.len() as u32;
        let ship = Ship::new(id, x, y, class.length(), orientation);
        check_bounds(&ship)?;

        let existing: Vec<Ship> = self.ships().cloned().collect();
        if !can_place(y, x, class.length(), orientation.is_horizontal(), &existing) {
            let (ox, oy) = ship
                .cells()
                .find(|&(cx, cy)| existing.iter().any(|s| s.is_at(cx, cy)))
                .unwrap_or((x, y));
            return Err(PlacementError::Overlap {
                ship: self.placed.len() + 1,
                x: ox,
                y: oy,
            });
        }

        self.placed.push((class, ship));
        Ok(&self.placed[self.placed.len() - 1].1)
    }

    /// Removes the ship covering `(x, y)` and returns its class.
    ///
    /// Remaining ships are renumbered so ids stay contiguous.
    pub fn remove_at(&mut self, x: i32, y: i32) -> Option<ShipClass> {
        let index = self.placed.iter().position(|(_, ship)| ship.is_at(x, y))?;
        let (class, _) = self.placed.remove(index);
        self.renumber();
        Some(class)
    }

    /// Removes every placed ship.
    pub fn clear(&mut self) {
        self.placed.clear();
    }

    /// Ships placed so far, in placement order.
    pub fn ships(&self) -> impl Iterator<Item = &Ship> {
        self.placed.iter().map(|(_, ship)| ship)
    }

    /// Classes that still need a position, largest first.
    pub fn remaining(&self) -> Vec<ShipClass> {
        FLEET_CLASSES
            .into_iter()
            .filter(|class| !self.placed.iter().any(|(c, _)| c == class))
            .collect()
    }

    /// Returns `true` once every class has been placed.
    pub fn is_complete(&self) -> bool {
        self.remaining().is_empty()
    }

    /// Validates and returns the finished fleet.
    ///
    /// # Errors
    /// [`PlacementError::WrongShipCount`] while classes are missing.
    pub fn build(self) -> Result<Fleet, PlacementError> {
        Fleet::new(self.placed.into_iter().map(|(_, ship)| ship).collect())
    }

    fn renumber(&mut self) {
        for (id, (_, ship)) in self.placed.iter_mut().enumerate() {
            *ship = Ship::new(
                id as u32,
                ship.origin().0,
                ship.origin().1,
                ship.length(),
                ship.orientation(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_builder() -> FleetBuilder {
        let mut builder = FleetBuilder::new();
        for (row, class) in FLEET_CLASSES.into_iter().enumerate() {
            builder
                .place(class, 0, row as i32, Orientation::Horizontal)
                .unwrap();
        }
        builder
    }

    #[test]
    fn test_builder_assigns_ids_in_placement_order() {
        let fleet = full_builder().build().unwrap();
        let ids: Vec<u32> = fleet.ships().iter().map(Ship::id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_builder_rejects_duplicate_class() {
        let mut builder = FleetBuilder::new();
        builder
            .place(ShipClass::CRUISER, 0, 0, Orientation::Horizontal)
            .unwrap();
        let result = builder.place(ShipClass::CRUISER, 0, 5, Orientation::Horizontal);
        assert_eq!(result, Err(PlacementError::ClassAlreadyPlaced("Cruiser")));
    }

    #[test]
    fn test_builder_submarine_and_cruiser_are_distinct_classes() {
        let mut builder = FleetBuilder::new();
        builder
            .place(ShipClass::CRUISER, 0, 0, Orientation::Horizontal)
            .unwrap();
        assert!(
            builder
                .place(ShipClass::SUBMARINE, 0, 1, Orientation::Horizontal)
                .is_ok()
        );
    }

    #[test]
    fn test_builder_rejects_overlap_and_reports_cell() {
        let mut builder = FleetBuilder::new();
        builder
            .place(ShipClass::CARRIER, 0, 3, Orientation::Horizontal)
            .unwrap();
        let result = builder.place(ShipClass::DESTROYER, 2, 2, Orientation::Vertical);
        assert_eq!(result, Err(PlacementError::Overlap { ship: 2, x: 2, y: 3 }));
        assert_eq!(builder.ships().count(), 1);
    }

    #[test]
    fn test_builder_rejects_ship_past_edge() {
        let mut builder = FleetBuilder::new();
        let result = builder.place(ShipClass::BATTLESHIP, 3, 7, Orientation::Vertical);
        assert!(matches!(result, Err(PlacementError::ExtendsBeyondBoard { .. })));
    }

    #[test]
    fn test_builder_incomplete_build_fails() {
        let mut builder = FleetBuilder::new();
        builder
            .place(ShipClass::CARRIER, 0, 0, Orientation::Horizontal)
            .unwrap();
        assert_eq!(
            builder.remaining(),
            vec![
                ShipClass::BATTLESHIP,
                ShipClass::CRUISER,
                ShipClass::SUBMARINE,
                ShipClass::DESTROYER
            ]
        );
        assert_eq!(
            builder.build(),
            Err(PlacementError::WrongShipCount { found: 1 })
        );
    }

    #[test]
    fn test_builder_remove_at_frees_class_and_renumbers() {
        let mut builder = full_builder();
        assert_eq!(builder.remove_at(1, 1), Some(ShipClass::BATTLESHIP));
        assert_eq!(builder.remaining(), vec![ShipClass::BATTLESHIP]);
        let ids: Vec<u32> = builder.ships().map(Ship::id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert_eq!(builder.remove_at(9, 9), None);
    }

    #[test]
    fn test_builder_remove_at_extreme_coordinates_returns_none() {
        let mut builder = full_builder();
        assert_eq!(builder.remove_at(i32::MIN, 0), None);
        assert_eq!(builder.remove_at(0, i32::MIN), None);
        assert_eq!(builder.ships().count(), 5);

        let mut fleet = builder.build().unwrap();
        assert!(fleet.ship_at(i32::MIN, i32::MIN).is_none());
        assert!(fleet.receive_hit(i32::MAX, 4).is_none());
    }

    #[test]
    fn test_fleet_receive_hit_tracks_damage() {
        let mut fleet = full_builder().build().unwrap();

        // Destroyer sits on row 4, columns 0..2.
        assert!(fleet.receive_hit(0, 4).is_some());
        let ship = fleet.receive_hit(1, 4).expect("on destroyer");
        assert!(ship.is_destroyed());
        assert!(fleet.receive_hit(9, 9).is_none());
        assert!(!fleet.all_destroyed());
    }

    #[test]
    fn test_fleet_placements_are_in_fleet_order() {
        let fleet = full_builder().build().unwrap();
        let lengths: Vec<u32> = fleet.placements().iter().map(|p| p.length).collect();
        assert_eq!(lengths, vec![5, 4, 3, 3, 2]);
        assert!(fleet.placements().iter().all(|p| p.is_horizontal));
    }
}

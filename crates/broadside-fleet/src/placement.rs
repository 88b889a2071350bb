//! Local placement checks.
//!
//! These run before anything is sent so the player gets immediate
//! feedback. The server re-validates every fleet; nothing here is
//! authoritative.

use crate::ship::{FLEET_CLASSES, GRID_SIZE, Ship, in_bounds};
use crate::PlacementError;

/// Returns `true` if a ship of `length` can go at (`row`, `col`) without
/// leaving the grid or overlapping a ship in `existing`.
///
/// `row` is the `y` coordinate and `col` the `x` coordinate.
pub fn can_place(
    row: i32,
    col: i32,
    length: u32,
    horizontal: bool,
    existing: &[Ship],
) -> bool {
    if length == 0 || !in_bounds(col, row) {
        return false;
    }
    let start = if horizontal { col } else { row };
    if i64::from(start) + i64::from(length) > i64::from(GRID_SIZE) {
        return false;
    }
    let length = length as i32;

    (0..length).all(|i| {
        let (x, y) = if horizontal { (col + i, row) } else { (col, row + i) };
        !existing.iter().any(|ship| ship.is_at(x, y))
    })
}

/// Checks one ship against the grid edges.
pub fn check_bounds(ship: &Ship) -> Result<(), PlacementError> {
    let (x, y) = ship.origin();
    if !in_bounds(x, y) {
        return Err(PlacementError::OutOfBounds { x, y });
    }

    let horizontal = ship.orientation().is_horizontal();
    let start = if horizontal { x } else { y };
    if i64::from(start) + i64::from(ship.length()) > i64::from(GRID_SIZE) {
        return Err(PlacementError::ExtendsBeyondBoard {
            x,
            y,
            length: ship.length(),
            horizontal,
        });
    }
    Ok(())
}

/// Validates a complete fleet.
///
/// Checks run in the server's order: each ship's bounds, then the
/// composition (one ship per class), then overlaps.
pub fn validate_fleet(ships: &[Ship]) -> Result<(), PlacementError> {
    for ship in ships {
        check_bounds(ship)?;
    }

    if ships.len() != FLEET_CLASSES.len() {
        return Err(PlacementError::WrongShipCount { found: ships.len() });
    }

    // Cruiser and Submarine share a length, so count by length and
    // compare against how many classes have that length.
    for class in FLEET_CLASSES {
        let expected = FLEET_CLASSES
            .iter()
            .filter(|c| c.length() == class.length())
            .count();
        let found = ships
            .iter()
            .filter(|s| s.length() == class.length())
            .count();
        if found != expected {
            return Err(PlacementError::WrongComposition {
                class: class.name(),
                length: class.length(),
                expected,
                found,
            });
        }
    }

    let mut occupied = [[false; GRID_SIZE as usize]; GRID_SIZE as usize];
    for (index, ship) in ships.iter().enumerate() {
        for (x, y) in ship.cells() {
            let cell = &mut occupied[y as usize][x as usize];
            if *cell {
                return Err(PlacementError::Overlap {
                    ship: index + 1,
                    x,
                    y,
                });
            }
            *cell = true;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Orientation;

    fn standard_fleet() -> Vec<Ship> {
        // One ship per row, all horizontal from column 0.
        FLEET_CLASSES
            .iter()
            .enumerate()
            .map(|(i, class)| {
                Ship::new(i as u32, 0, i as i32 * 2, class.length(), Orientation::Horizontal)
            })
            .collect()
    }

    #[test]
    fn test_can_place_on_empty_grid() {
        assert!(can_place(0, 0, 5, true, &[]));
        assert!(can_place(0, 5, 5, true, &[]));
        assert!(can_place(5, 9, 5, false, &[]));
    }

    #[test]
    fn test_can_place_rejects_run_off_the_edge() {
        assert!(!can_place(0, 6, 5, true, &[]));
        assert!(!can_place(6, 0, 5, false, &[]));
        assert!(!can_place(-1, 0, 2, true, &[]));
        assert!(!can_place(0, 10, 2, false, &[]));
    }

    #[test]
    fn test_can_place_huge_length_is_rejected() {
        assert!(!can_place(0, 9, u32::MAX, true, &[]));
        assert!(!can_place(9, 0, i32::MAX as u32, false, &[]));
    }

    #[test]
    fn test_can_place_rejects_overlap() {
        let existing = [Ship::new(0, 2, 2, 3, Orientation::Vertical)];
        // Horizontal run through (2, 3).
        assert!(!can_place(3, 0, 4, true, &existing));
        // Adjacent is fine.
        assert!(can_place(3, 3, 4, true, &existing));
    }

    #[test]
    fn test_can_place_accepted_runs_stay_on_grid() {
        // Exhaustive over every origin, length and orientation.
        for row in -1..=GRID_SIZE {
            for col in -1..=GRID_SIZE {
                for length in 1..=5 {
                    for horizontal in [true, false] {
                        if !can_place(row, col, length, horizontal, &[]) {
                            continue;
                        }
                        let orientation = Orientation::from_horizontal(horizontal);
                        let ship = Ship::new(0, col, row, length, orientation);
                        assert!(ship.cells().all(|(x, y)| in_bounds(x, y)));
                        assert!(check_bounds(&ship).is_ok());
                    }
                }
            }
        }
    }

    #[test]
    fn test_validate_fleet_accepts_standard_layout() {
        assert_eq!(validate_fleet(&standard_fleet()), Ok(()));
    }

    #[test]
    fn test_validate_fleet_rejects_four_ships() {
        let mut ships = standard_fleet();
        ships.pop();
        assert_eq!(
            validate_fleet(&ships),
            Err(PlacementError::WrongShipCount { found: 4 })
        );
    }

    #[test]
    fn test_validate_fleet_rejects_wrong_lengths() {
        let mut ships = standard_fleet();
        // Replace the Destroyer (2) with a third length-3 ship.
        ships[4] = Ship::new(4, 0, 8, 3, Orientation::Horizontal);
        let err = validate_fleet(&ships).unwrap_err();
        assert!(matches!(
            err,
            PlacementError::WrongComposition { length: 3, expected: 2, found: 3, .. }
        ));
        assert_eq!(err.to_string(), "Expected 2 Cruiser(s) of length 3, got 3");
    }

    #[test]
    fn test_validate_fleet_rejects_overlap() {
        let mut ships = standard_fleet();
        // Destroyer placed vertically across the Carrier's row.
        ships[4] = Ship::new(4, 1, 0, 2, Orientation::Vertical);
        assert_eq!(
            validate_fleet(&ships),
            Err(PlacementError::Overlap { ship: 5, x: 1, y: 0 })
        );
    }

    #[test]
    fn test_validate_fleet_rejects_ship_off_the_edge() {
        let mut ships = standard_fleet();
        ships[0] = Ship::new(0, 7, 0, 5, Orientation::Horizontal);
        let err = validate_fleet(&ships).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Ship extends beyond board horizontally: position (7, 0), length 5"
        );
    }

    #[test]
    fn test_validate_fleet_rejects_negative_origin() {
        let mut ships = standard_fleet();
        ships[1] = Ship::new(1, -1, 2, 4, Orientation::Horizontal);
        assert_eq!(
            validate_fleet(&ships),
            Err(PlacementError::OutOfBounds { x: -1, y: 2 })
        );
    }
}

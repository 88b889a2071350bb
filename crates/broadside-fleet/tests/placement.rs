//! Placement properties checked across many layouts.
//!
//! Layouts are generated by walking every origin in a fixed order and
//! greedily placing each class wherever `can_place` allows. Shifting the
//! starting origin gives a different layout per iteration.

use std::collections::HashSet;

use broadside_fleet::{
    FLEET_CLASSES, Fleet, FleetBuilder, GRID_SIZE, Orientation, Ship, can_place,
    in_bounds, validate_fleet,
};

/// Greedy layout starting the scan at `offset` (0..100), alternating
/// orientation per class.
fn greedy_layout(offset: i32, flip: bool) -> Vec<Ship> {
    let mut ships: Vec<Ship> = Vec::new();
    for (index, class) in FLEET_CLASSES.iter().enumerate() {
        let horizontal = (index % 2 == 0) ^ flip;
        let placed = (0..GRID_SIZE * GRID_SIZE).find_map(|step| {
            let cell = (offset + step) % (GRID_SIZE * GRID_SIZE);
            let (row, col) = (cell / GRID_SIZE, cell % GRID_SIZE);
            can_place(row, col, class.length(), horizontal, &ships).then(|| {
                Ship::new(
                    index as u32,
                    col,
                    row,
                    class.length(),
                    Orientation::from_horizontal(horizontal),
                )
            })
        });
        ships.push(placed.expect("an empty-ish grid always has room"));
    }
    ships
}

#[test]
fn test_greedy_layouts_are_valid_fleets() {
    for offset in 0..GRID_SIZE * GRID_SIZE {
        for flip in [false, true] {
            let ships = greedy_layout(offset, flip);
            assert_eq!(validate_fleet(&ships), Ok(()), "offset {offset} flip {flip}");
        }
    }
}

#[test]
fn test_accepted_placements_never_share_or_leave_cells() {
    for offset in 0..GRID_SIZE * GRID_SIZE {
        let ships = greedy_layout(offset, offset % 2 == 0);
        let mut seen = HashSet::new();
        for ship in &ships {
            for (x, y) in ship.cells() {
                assert!(in_bounds(x, y));
                assert!(seen.insert((x, y)), "({x},{y}) occupied twice");
            }
        }
        assert_eq!(seen.len(), 5 + 4 + 3 + 3 + 2);
    }
}

#[test]
fn test_fleet_submittable_iff_lengths_match() {
    let candidates: [&[u32]; 5] = [
        &[5, 4, 3, 3, 2],
        &[5, 4, 3, 2, 2],
        &[5, 4, 3, 3],
        &[5, 4, 3, 3, 2, 2],
        &[4, 4, 3, 3, 2],
    ];
    for lengths in candidates {
        // One ship per row: never overlapping, always on the grid.
        let ships: Vec<Ship> = lengths
            .iter()
            .enumerate()
            .map(|(i, &len)| Ship::new(i as u32, 0, i as i32, len, Orientation::Horizontal))
            .collect();
        let expected = lengths == [5, 4, 3, 3, 2];
        assert_eq!(Fleet::new(ships).is_ok(), expected, "{lengths:?}");
    }
}

#[test]
fn test_builder_and_validator_agree() {
    for offset in (0..GRID_SIZE * GRID_SIZE).step_by(7) {
        let ships = greedy_layout(offset, false);
        let mut builder = FleetBuilder::new();
        for (class, ship) in FLEET_CLASSES.iter().zip(&ships) {
            let (x, y) = ship.origin();
            builder
                .place(*class, x, y, ship.orientation())
                .expect("greedy placement is legal");
        }
        let fleet = builder.build().expect("complete fleet");
        assert_eq!(fleet.ships(), ships.as_slice());
    }
}

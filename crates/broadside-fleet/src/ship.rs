//! Ship definitions and per-segment hit tracking.

use broadside_protocol::{ShipDescriptor, ShipPlacement};

/// Width and height of the square game grid.
pub const GRID_SIZE: i32 = 10;

/// Returns `true` if `(x, y)` lies on the grid.
pub fn in_bounds(x: i32, y: i32) -> bool {
    (0..GRID_SIZE).contains(&x) && (0..GRID_SIZE).contains(&y)
}

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Extends toward increasing `x` from the bow.
    Horizontal,
    /// Extends toward increasing `y` from the bow.
    Vertical,
}

impl Orientation {
    /// Maps the wire's `isHorizontal` flag to an orientation.
    pub fn from_horizontal(horizontal: bool) -> Self {
        if horizontal {
            Self::Horizontal
        } else {
            Self::Vertical
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Horizontal)
    }
}

/// Type of ship: name and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShipClass {
    name: &'static str,
    length: u32,
}

impl ShipClass {
    pub const CARRIER: Self = Self::new("Carrier", 5);
    pub const BATTLESHIP: Self = Self::new("Battleship", 4);
    pub const CRUISER: Self = Self::new("Cruiser", 3);
    pub const SUBMARINE: Self = Self::new("Submarine", 3);
    pub const DESTROYER: Self = Self::new("Destroyer", 2);

    /// Create a new ship class.
    pub const fn new(name: &'static str, length: u32) -> Self {
        Self { name, length }
    }

    /// Class name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of cells a ship of this class covers.
    pub fn length(&self) -> u32 {
        self.length
    }
}

/// The five classes every fleet contains exactly once, largest first.
pub const FLEET_CLASSES: [ShipClass; 5] = [
    ShipClass::CARRIER,
    ShipClass::BATTLESHIP,
    ShipClass::CRUISER,
    ShipClass::SUBMARINE,
    ShipClass::DESTROYER,
];

/// A ship placed on the grid, with one hit flag per segment.
///
/// Position, length and orientation never change after construction.
/// Hits are only ever set, never cleared, so a destroyed ship stays
/// destroyed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ship {
    id: u32,
    x: i32,
    y: i32,
    length: u32,
    orientation: Orientation,
    hits: Vec<bool>,
}

impl Ship {
    /// Creates an undamaged ship with its bow at `(x, y)`.
    ///
    /// No bounds check happens here; see
    /// [`can_place`](crate::can_place) and
    /// [`validate_fleet`](crate::validate_fleet).
    pub fn new(
        id: u32,
        x: i32,
        y: i32,
        length: u32,
        orientation: Orientation,
    ) -> Self {
        Self {
            id,
            x,
            y,
            length,
            orientation,
            hits: vec![false; length as usize],
        }
    }

    /// Rebuilds a ship from a server `ship_destroyed` descriptor.
    pub fn from_descriptor(descriptor: &ShipDescriptor) -> Self {
        Self::new(
            descriptor.id,
            descriptor.pos_x,
            descriptor.pos_y,
            descriptor.length,
            Orientation::from_horizontal(descriptor.is_horizontal),
        )
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Bow position as `(x, y)`.
    pub fn origin(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Per-segment hit flags, bow first.
    pub fn hits(&self) -> &[bool] {
        &self.hits
    }

    /// Index of the segment covering `(x, y)`, if this ship covers it.
    pub fn segment_at(&self, x: i32, y: i32) -> Option<usize> {
        let (along, across, start, fixed) = match self.orientation {
            Orientation::Horizontal => (x, y, self.x, self.y),
            Orientation::Vertical => (y, x, self.y, self.x),
        };
        if across != fixed {
            return None;
        }
        let offset = along.checked_sub(start)?;
        (0..self.length as i32)
            .contains(&offset)
            .then_some(offset as usize)
    }

    /// Returns `true` if the ship covers `(x, y)`.
    pub fn is_at(&self, x: i32, y: i32) -> bool {
        self.segment_at(x, y).is_some()
    }

    /// Registers a hit at `(x, y)`.
    ///
    /// Returns `true` if the shot landed on this ship. Hitting the same
    /// segment twice is harmless.
    pub fn hit(&mut self, x: i32, y: i32) -> bool {
        match self.segment_at(x, y) {
            Some(segment) => {
                self.hits[segment] = true;
                true
            }
            None => false,
        }
    }

    /// Marks every segment as hit.
    pub fn sink(&mut self) {
        self.hits.iter_mut().for_each(|hit| *hit = true);
    }

    /// A ship is destroyed once every segment has been hit.
    pub fn is_destroyed(&self) -> bool {
        self.hits.iter().all(|&hit| hit)
    }

    /// Cells covered by the ship, bow first.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..self.length as i32).map(move |i| match self.orientation {
            Orientation::Horizontal => (self.x.saturating_add(i), self.y),
            Orientation::Vertical => (self.x, self.y.saturating_add(i)),
        })
    }

    /// The wire form of this ship for `ships_data`.
    pub fn placement(&self) -> ShipPlacement {
        ShipPlacement {
            pos_x: self.x,
            pos_y: self.y,
            length: self.length,
            is_horizontal: self.orientation.is_horizontal(),
        }
    }
}

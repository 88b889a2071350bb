//! Grid state as the player sees it.
//!
//! A session keeps two boards: the *target* board (what we know about the
//! opponent's grid from our own shots) and the *home* board (where the
//! opponent has fired on us).

use std::fmt;

use broadside_protocol::AttackOutcome;

use crate::ship::{GRID_SIZE, Ship, in_bounds};

const N: usize = GRID_SIZE as usize;

/// What is known about a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    /// Not fired at yet.
    #[default]
    Unknown,
    Miss,
    Hit,
    /// Part of a ship the server reported destroyed.
    Destroyed,
}

impl Cell {
    /// Returns `true` once the cell has been fired at.
    pub fn is_resolved(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// A 10x10 grid of [`Cell`]s, indexed by `(x, y)`.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    cells: [[Cell; N]; N],
}

impl Board {
    /// An empty board, every cell [`Cell::Unknown`].
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Unknown; N]; N],
        }
    }

    /// The cell at `(x, y)`, or `None` off the grid.
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        in_bounds(x, y).then(|| self.cells[y as usize][x as usize])
    }

    /// Returns `true` if `(x, y)` is on the grid and already fired at.
    pub fn is_resolved(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_some_and(Cell::is_resolved)
    }

    /// Records a shot result at `(x, y)`.
    ///
    /// A cell already marked [`Cell::Destroyed`] keeps that mark. Returns
    /// `false` if `(x, y)` is off the grid.
    pub fn record_shot(&mut self, x: i32, y: i32, outcome: AttackOutcome) -> bool {
        let Some(cell) = self.cell_mut(x, y) else {
            return false;
        };
        if *cell != Cell::Destroyed {
            *cell = match outcome {
                AttackOutcome::Hit => Cell::Hit,
                AttackOutcome::Miss => Cell::Miss,
            };
        }
        true
    }

    /// Marks every on-grid cell of `ship` as [`Cell::Destroyed`] and
    /// returns how many cells were marked.
    pub fn mark_destroyed(&mut self, ship: &Ship) -> usize {
        let mut marked = 0;
        for (x, y) in ship.cells() {
            if let Some(cell) = self.cell_mut(x, y) {
                *cell = Cell::Destroyed;
                marked += 1;
            }
        }
        marked
    }

    /// Number of cells in `state`.
    pub fn count(&self, state: Cell) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|&&cell| cell == state)
            .count()
    }

    /// Rows from `y = 0` down, for rendering.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell; N]> {
        self.cells.iter()
    }

    fn cell_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        if in_bounds(x, y) {
            Some(&mut self.cells[y as usize][x as usize])
        } else {
            None
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders the grid as ten lines of `.` (unknown), `o` (miss), `x` (hit)
/// and `#` (destroyed).
impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for cell in row {
                let c = match cell {
                    Cell::Unknown => '.',
                    Cell::Miss => 'o',
                    Cell::Hit => 'x',
                    Cell::Destroyed => '#',
                };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

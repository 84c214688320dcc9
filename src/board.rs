//! Grid of cells tracking ship occupancy and shot results.
//!
//! Coordinates are `(x, y)` with `x` the column and `y` the row, both starting at zero.
//! Ships always lie horizontally: a ship of length `n` placed at `(x, y)` covers
//! `(x, y)..=(x + n - 1, y)`.
//!
//! Rendered states are indexed `[x][y]` and use these markers:
//! - `""` empty water
//! - `"<id>"` an intact ship cell, e.g. `"3"`
//! - `"<id>x"` a hit ship cell, e.g. `"3x"`
//! - `"o"` a miss

use serde::Serialize;

use crate::errors::{PlacementError, PlayerError};
use crate::rules::DEFAULT_BOARD_SIZE;

/// Identifies a ship. Equal to the ship's length.
pub type ShipId = usize;

/// Marker rendered for a missed shot.
pub const MISS_MARKER: &str = "o";

/// Suffix appended to a ship id for a hit cell.
pub const HIT_SUFFIX: &str = "x";

/// State of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Cell {
    /// Open water, not shot at.
    Empty,
    /// Part of a ship, not shot at.
    Occupied(ShipId),
    /// Part of a ship that has been shot.
    Hit(ShipId),
    /// Open water that has been shot.
    Miss,
}

impl Cell {
    /// Marker used when rendering the cell.
    pub fn marker(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Occupied(id) => id.to_string(),
            Cell::Hit(id) => format!("{id}{HIT_SUFFIX}"),
            Cell::Miss => MISS_MARKER.to_owned(),
        }
    }

    /// What an opponent is allowed to see of this cell: intact ships look like water.
    pub fn observed(&self) -> Cell {
        match self {
            Cell::Occupied(_) => Cell::Empty,
            other => *other,
        }
    }
}

/// Result of a shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Shot {
    /// Nothing was there.
    Miss,
    /// The shot struck the given ship.
    Hit(ShipId),
}

/// A square grid of [`Cell`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Create an empty `size`×`size` board.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![Cell::Empty; size * size],
        }
    }

    /// Grid width and height.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Cell at `(x, y)`, or `None` when outside the grid.
    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Opponent's view of the cell at `(x, y)`, see [`Cell::observed`].
    pub fn observe(&self, x: usize, y: usize) -> Option<Cell> {
        self.cell(x, y).map(|c| c.observed())
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.size && y < self.size).then(|| y * self.size + x)
    }

    /// Place ship `ship` (whose length is its id) with its leftmost cell at `(x, y)`.
    ///
    /// The board does not know which ships are still owed; that bookkeeping belongs to the
    /// [`Player`](crate::player::Player).
    ///
    /// # Errors
    /// [`PlacementError::OutOfBounds`] or [`PlacementError::Overlap`]. The board is left
    /// untouched on error.
    pub fn place_ship(&mut self, ship: ShipId, x: usize, y: usize) -> Result<(), PlacementError> {
        if ship == 0 {
            return Err(PlacementError::Unavailable(ship));
        }
        let end = x.checked_add(ship - 1).ok_or(PlacementError::OutOfBounds)?;
        if end >= self.size || y >= self.size {
            return Err(PlacementError::OutOfBounds);
        }
        let row = y * self.size;
        let span = row + x..=row + end;
        if self.cells[span.clone()].iter().any(|c| *c != Cell::Empty) {
            return Err(PlacementError::Overlap);
        }
        self.cells[span].fill(Cell::Occupied(ship));
        Ok(())
    }

    /// Shoot at `(x, y)`.
    ///
    /// Shooting a cell twice changes nothing and reports the same result again.
    ///
    /// # Errors
    /// [`PlayerError::InvalidTarget`] when `(x, y)` is outside the grid.
    pub fn take_shot(&mut self, x: usize, y: usize) -> Result<Shot, PlayerError> {
        let i = self.index(x, y).ok_or(PlayerError::InvalidTarget { x, y })?;
        let cell = &mut self.cells[i];
        let shot = match *cell {
            Cell::Empty => {
                *cell = Cell::Miss;
                Shot::Miss
            }
            Cell::Occupied(id) => {
                *cell = Cell::Hit(id);
                Shot::Hit(id)
            }
            Cell::Hit(id) => Shot::Hit(id),
            Cell::Miss => Shot::Miss,
        };
        Ok(shot)
    }

    /// Snapshot of the grid as markers, indexed `[x][y]`.
    pub fn current_state(&self) -> Vec<Vec<String>> {
        self.render(|c| c.marker())
    }

    /// Snapshot of the grid as the opponent sees it, indexed `[x][y]`.
    pub fn opponent_view(&self) -> Vec<Vec<String>> {
        self.render(|c| c.observed().marker())
    }

    fn render(&self, marker: impl Fn(&Cell) -> String) -> Vec<Vec<String>> {
        (0..self.size)
            .map(|x| {
                (0..self.size)
                    .map(|y| marker(&self.cells[y * self.size + x]))
                    .collect()
            })
            .collect()
    }

    /// `true` once every ship cell has been hit. Vacuously true for a board without ships.
    pub fn all_ships_sunk(&self) -> bool {
        !self.cells.iter().any(|c| matches!(c, Cell::Occupied(_)))
    }

    /// `true` when ship `ship` has been placed and all of its cells are hit.
    pub fn is_sunk(&self, ship: ShipId) -> bool {
        let mut placed = false;
        for cell in &self.cells {
            match cell {
                Cell::Occupied(id) if *id == ship => return false,
                Cell::Hit(id) if *id == ship => placed = true,
                _ => {}
            }
        }
        placed
    }

    /// Number of cells covered by ships, hit or not.
    pub fn ship_cells(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| matches!(c, Cell::Occupied(_) | Cell::Hit(_)))
            .count()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(DEFAULT_BOARD_SIZE)
    }
}

#[cfg(test)]
mod board_tests {
    use super::*;

    #[test]
    fn place_ship_covers_horizontal_run() {
        let mut board = Board::default();
        board.place_ship(3, 2, 4).unwrap();
        assert_eq!(board.cell(1, 4), Some(Cell::Empty));
        for x in 2..5 {
            assert_eq!(board.cell(x, 4), Some(Cell::Occupied(3)));
        }
        assert_eq!(board.cell(5, 4), Some(Cell::Empty));
        assert_eq!(board.ship_cells(), 3);
    }

    #[test]
    fn rejected_placements_leave_board_untouched() {
        let mut board = Board::new(5);
        board.place_ship(2, 1, 0).unwrap();
        let before = board.clone();

        assert_eq!(board.place_ship(3, 3, 0), Err(PlacementError::OutOfBounds));
        assert_eq!(board.place_ship(1, 0, 5), Err(PlacementError::OutOfBounds));
        assert_eq!(board.place_ship(2, usize::MAX, 0), Err(PlacementError::OutOfBounds));
        assert_eq!(board.place_ship(3, 0, 0), Err(PlacementError::Overlap));
        assert_eq!(board.place_ship(0, 0, 1), Err(PlacementError::Unavailable(0)));
        assert_eq!(board, before);
    }

    #[test]
    fn shots_mark_hits_and_misses() {
        let mut board = Board::default();
        board.place_ship(2, 0, 0).unwrap();

        assert_eq!(board.take_shot(0, 0), Ok(Shot::Hit(2)));
        assert_eq!(board.take_shot(5, 5), Ok(Shot::Miss));
        assert!(!board.is_sunk(2));
        assert!(!board.all_ships_sunk());

        assert_eq!(board.take_shot(1, 0), Ok(Shot::Hit(2)));
        assert!(board.is_sunk(2));
        assert!(board.all_ships_sunk());
    }

    #[test]
    fn reshooting_is_idempotent() {
        let mut board = Board::default();
        board.place_ship(1, 3, 3).unwrap();
        assert_eq!(board.take_shot(3, 3), Ok(Shot::Hit(1)));
        assert_eq!(board.take_shot(0, 0), Ok(Shot::Miss));
        let after_first = board.clone();

        assert_eq!(board.take_shot(3, 3), Ok(Shot::Hit(1)));
        assert_eq!(board.take_shot(0, 0), Ok(Shot::Miss));
        assert_eq!(board, after_first);
    }

    #[test]
    fn shots_off_the_board_are_rejected() {
        let mut board = Board::new(4);
        assert_eq!(
            board.take_shot(4, 0),
            Err(PlayerError::InvalidTarget { x: 4, y: 0 })
        );
        assert_eq!(board, Board::new(4));
    }

    #[test]
    fn state_is_indexed_by_column_then_row() {
        let mut board = Board::new(3);
        board.place_ship(2, 0, 1).unwrap();
        board.take_shot(0, 1).unwrap();
        board.take_shot(2, 2).unwrap();

        let state = board.current_state();
        assert_eq!(state[0][1], "2x");
        assert_eq!(state[1][1], "2");
        assert_eq!(state[2][2], "o");
        assert_eq!(state[0][0], "");

        let view = board.opponent_view();
        assert_eq!(view[0][1], "2x");
        assert_eq!(view[1][1], "");
        assert_eq!(view[2][2], "o");
    }

    #[test]
    fn empty_board_counts_as_sunk() {
        assert!(Board::default().all_ships_sunk());
        assert!(!Board::default().is_sunk(1));
    }
}

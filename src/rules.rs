//! Board size and fleet shared by both players of a game.

use anyhow::bail;

use crate::board::ShipId;

/// Width and height of the default board.
pub const DEFAULT_BOARD_SIZE: usize = 10;

/// Ship lengths every player must place on the default board. A ship's id is its length.
pub const DEFAULT_FLEET: [ShipId; 5] = [1, 2, 3, 4, 5];

/// Rules of a game: the grid size and the fleet each player places before the first shot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rules {
    board_size: usize,
    fleet: Vec<ShipId>,
}

impl Rules {
    /// Create rules for a `board_size`×`board_size` grid with the given fleet.
    ///
    /// # Errors
    /// Returned when the board is empty, the fleet is empty, a ship does not fit on a row,
    /// the fleet cannot be laid out in horizontal rows, or the turn limit overflows.
    pub fn new(board_size: usize, fleet: Vec<ShipId>) -> anyhow::Result<Self> {
        if board_size == 0 {
            bail!("board size must be at least 1");
        }
        if fleet.is_empty() {
            bail!("fleet must contain at least one ship");
        }
        if let Some(&ship) = fleet.iter().find(|&&s| s == 0 || s > board_size) {
            bail!("ship length {ship} does not fit a {board_size}x{board_size} board");
        }
        if board_size
            .checked_mul(board_size)
            .and_then(|cells| cells.checked_mul(fleet.len()))
            .is_none()
        {
            bail!("turn limit overflows for a {board_size}x{board_size} board");
        }
        if !fits_in_rows(&fleet, board_size) {
            bail!("fleet {fleet:?} cannot be laid out on a {board_size}x{board_size} board");
        }
        Ok(Self { board_size, fleet })
    }

    /// Grid width and height.
    pub fn board_size(&self) -> usize {
        self.board_size
    }

    /// Ship lengths to place, in order.
    pub fn fleet(&self) -> &[ShipId] {
        &self.fleet
    }

    /// Upper bound on the number of turns in a game.
    ///
    /// Two players that shoot a fresh cell every turn are done long before this bound;
    /// reaching it means at least one side is not playing.
    pub fn turn_limit(&self) -> usize {
        self.board_size * self.board_size * self.fleet.len()
    }
}

/// Whether every ship gets a spot in one of `board_size` rows of `board_size` cells.
///
/// Exact search, longest ships first. Rows left with the same free space are interchangeable,
/// so only one of them is tried.
fn fits_in_rows(fleet: &[ShipId], board_size: usize) -> bool {
    let mut ships = fleet.to_vec();
    ships.sort_unstable_by(|a, b| b.cmp(a));
    // a ship never spans two rows, so more rows than ships are never needed
    let mut free = vec![board_size; board_size.min(ships.len())];
    place_from(&ships, &mut free)
}

fn place_from(ships: &[ShipId], free: &mut [usize]) -> bool {
    let Some((&ship, rest)) = ships.split_first() else {
        return true;
    };
    for row in 0..free.len() {
        if free[row] < ship || free[..row].contains(&free[row]) {
            continue;
        }
        free[row] -= ship;
        let placed = place_from(rest, free);
        free[row] += ship;
        if placed {
            return true;
        }
    }
    false
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            fleet: DEFAULT_FLEET.to_vec(),
        }
    }
}

#[cfg(test)]
mod rules_tests {
    use super::*;

    #[test]
    fn default_rules() {
        let rules = Rules::default();
        assert_eq!(rules.board_size(), 10);
        assert_eq!(rules.fleet(), &[1, 2, 3, 4, 5]);
        assert_eq!(rules.turn_limit(), 500);
    }

    #[test]
    fn rejects_impossible_fleets() {
        assert!(Rules::new(0, vec![1]).is_err());
        assert!(Rules::new(5, vec![]).is_err());
        assert!(Rules::new(3, vec![4]).is_err());
        assert!(Rules::new(3, vec![0]).is_err());
        assert!(Rules::new(2, vec![2, 2, 1]).is_err());
        assert!(Rules::new(2, vec![2, 2]).is_ok());
    }

    #[test]
    fn fleet_must_pack_into_rows() {
        // 8 cells out of 9, but a 3-cell row only takes one ship of length 2
        assert!(Rules::new(3, vec![2, 2, 2, 2]).is_err());
        assert!(Rules::new(3, vec![2, 2, 2, 1, 1, 1]).is_ok());
        assert!(Rules::new(4, vec![3, 3, 2, 2, 2, 2, 1, 1]).is_ok());
        assert!(Rules::new(4, vec![3, 3, 3, 3, 3]).is_err());
        assert!(Rules::new(10, vec![5; 20]).is_ok());
        assert!(Rules::new(10, vec![6; 11]).is_err());
    }

    #[test]
    fn oversized_boards_are_rejected() {
        assert!(Rules::new(usize::MAX, vec![1]).is_err());
        assert!(Rules::new(1 << 15, vec![1, 2]).is_ok());
    }
}

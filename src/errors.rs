//! Errors raised when a player breaks the rules of the game.
//!
//! These are recoverable: the rejected call leaves the board and the player untouched, so the
//! caller (usually an AI) may try again with a corrected request.

use thiserror::Error;

use crate::board::ShipId;

/// Why a ship could not be placed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    /// Ship placement is over for this player.
    #[error("ship placement is over")]
    PlacementOver,
    /// The requested ship is not (or no longer) part of the remaining fleet.
    #[error("ship {0} is not available")]
    Unavailable(ShipId),
    /// At least one cell of the ship would be outside the grid.
    #[error("ship would leave the board")]
    OutOfBounds,
    /// At least one cell of the ship is already occupied.
    #[error("ship would overlap another ship")]
    Overlap,
}

/// Errors returned by [`Board`](crate::board::Board) and [`Player`](crate::player::Player)
/// operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PlayerError {
    /// A placement was rejected, see [`PlacementError`] for the reason.
    #[error("cannot place ship: {0}")]
    CannotPlaceShip(#[from] PlacementError),
    /// A shot was attempted while the turn belongs to the opponent, or a second shot was
    /// attempted in the same turn.
    #[error("not your turn")]
    NotYourTurn,
    /// A shot was aimed outside the grid. The turn is kept.
    #[error("({x}, {y}) is not on the board")]
    InvalidTarget {
        /// Column of the rejected shot.
        x: usize,
        /// Row of the rejected shot.
        y: usize,
    },
}

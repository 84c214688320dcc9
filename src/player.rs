//! A player: one board, the fleet still to place, an AI, and the turn state machine.
//!
//! ```text
//! PlacingShips -> Ready -> MyTurn <-> OpponentTurn -> Won | Lost
//! ```
//!
//! A player never stores its opponent. The [`Game`](crate::game::Game) owns both players and
//! hands the opponent in whenever a shot needs it.

use serde::Serialize;
use tracing::{debug, trace};

use crate::board::{Board, Cell, ShipId, Shot};
use crate::errors::{PlacementError, PlayerError};
use crate::game_interface::BattleshipsAi;
use crate::rules::Rules;

/// Where a player stands in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlayerState {
    /// Ships may be placed.
    PlacingShips,
    /// Placement is over, the game has not started.
    Ready,
    /// This player may shoot once.
    MyTurn,
    /// Waiting for the opponent to shoot.
    OpponentTurn,
    /// Game over, this player sank the opposing fleet.
    Won,
    /// Game over.
    Lost,
}

impl PlayerState {
    /// `true` for [`PlayerState::Won`] and [`PlayerState::Lost`].
    pub fn is_finished(&self) -> bool {
        matches!(self, PlayerState::Won | PlayerState::Lost)
    }
}

/// See the [module documentation](self).
pub struct Player {
    board: Board,
    ships_to_place: Vec<ShipId>,
    state: PlayerState,
    ai: Option<Box<dyn BattleshipsAi>>,
    placement_requested: bool,
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("state", &self.state)
            .field("ships_to_place", &self.ships_to_place)
            .field("placement_requested", &self.placement_requested)
            .field("board", &self.board)
            .finish_non_exhaustive()
    }
}

impl Player {
    /// Create a player with an empty board sized by `rules`, owing the whole fleet.
    pub fn new(rules: &Rules, ai: Box<dyn BattleshipsAi>) -> Self {
        Self {
            board: Board::new(rules.board_size()),
            ships_to_place: rules.fleet().to_vec(),
            state: PlayerState::PlacingShips,
            ai: Some(ai),
            placement_requested: false,
        }
    }

    /// This player's own board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Ships still owed, in fleet order.
    pub fn ships_to_place(&self) -> &[ShipId] {
        &self.ships_to_place
    }

    /// `true` once every ship of the fleet is on the board.
    pub fn fleet_complete(&self) -> bool {
        self.ships_to_place.is_empty()
    }

    /// Current state.
    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Place the ship of length `ship` with its leftmost cell at `(x, y)`.
    ///
    /// # Errors
    /// [`PlayerError::CannotPlaceShip`] when placement is over, the ship is not owed, or the
    /// board refuses it. Nothing changes on error.
    pub fn place_ship(&mut self, ship: ShipId, x: usize, y: usize) -> Result<(), PlayerError> {
        if self.state != PlayerState::PlacingShips {
            return Err(PlacementError::PlacementOver.into());
        }
        let owed = self
            .ships_to_place
            .iter()
            .position(|&s| s == ship)
            .ok_or(PlacementError::Unavailable(ship))?;
        self.board.place_ship(ship, x, y)?;
        self.ships_to_place.remove(owed);
        trace!(ship, x, y, "ship placed");
        Ok(())
    }

    /// Close the placement phase. Later calls do nothing.
    pub fn end_ship_placement(&mut self) {
        if self.state == PlayerState::PlacingShips {
            self.state = PlayerState::Ready;
        }
    }

    /// Let the AI place the fleet, then close the placement phase.
    ///
    /// The AI is consulted at most once in the lifetime of the player; later calls return
    /// `Ok(())` without calling it.
    ///
    /// # Errors
    /// Whatever the AI returned.
    pub fn request_ai_place_ships(&mut self) -> anyhow::Result<()> {
        if self.placement_requested {
            debug!("ship placement already requested");
            return Ok(());
        }
        self.placement_requested = true;

        let result = match self.ai.take() {
            Some(mut ai) => {
                let result = ai.place_ships(self);
                self.ai = Some(ai);
                result
            }
            None => Ok(()),
        };
        self.end_ship_placement();
        result
    }

    /// Shoot at `(x, y)` on `opponent`'s board and hand the turn over.
    ///
    /// # Errors
    /// [`PlayerError::NotYourTurn`] unless this player is in [`PlayerState::MyTurn`],
    /// [`PlayerError::InvalidTarget`] when `(x, y)` is off the board (the turn is kept).
    pub fn take_shot(
        &mut self,
        opponent: &mut Player,
        x: usize,
        y: usize,
    ) -> Result<Shot, PlayerError> {
        if self.state != PlayerState::MyTurn {
            return Err(PlayerError::NotYourTurn);
        }
        let shot = opponent.board.take_shot(x, y)?;
        trace!(x, y, ?shot, "shot taken");
        self.pass_turn(opponent);
        Ok(shot)
    }

    /// Let the AI take this turn's shot at `opponent`.
    ///
    /// # Errors
    /// [`PlayerError::NotYourTurn`] when it is not this player's turn, otherwise whatever the
    /// AI returned.
    pub fn request_ai_take_shot(&mut self, opponent: &mut Player) -> anyhow::Result<()> {
        if self.state != PlayerState::MyTurn {
            return Err(PlayerError::NotYourTurn.into());
        }
        let Some(mut ai) = self.ai.take() else {
            return Ok(());
        };
        let result = ai.take_shot(&mut Turn {
            player: self,
            opponent,
        });
        self.ai = Some(ai);
        result
    }

    /// Move from [`PlayerState::Ready`] to the first turn of the game.
    pub(crate) fn start_play(&mut self, shoots_first: bool) -> bool {
        if self.state != PlayerState::Ready {
            return false;
        }
        self.state = if shoots_first {
            PlayerState::MyTurn
        } else {
            PlayerState::OpponentTurn
        };
        true
    }

    /// Hand the turn to `opponent` without shooting.
    pub(crate) fn pass_turn(&mut self, opponent: &mut Player) {
        self.state = PlayerState::OpponentTurn;
        opponent.state = PlayerState::MyTurn;
    }

    pub(crate) fn finish(&mut self, won: bool) {
        self.state = if won {
            PlayerState::Won
        } else {
            PlayerState::Lost
        };
    }
}

/// The right to shoot once at the opponent, handed to [`BattleshipsAi::take_shot`].
///
/// Only the opponent's hits and misses are visible through it.
pub struct Turn<'a> {
    player: &'a mut Player,
    opponent: &'a mut Player,
}

impl Turn<'_> {
    /// Shoot at `(x, y)`. See [`Player::take_shot`].
    ///
    /// # Errors
    /// [`PlayerError::NotYourTurn`] on any shot after the first successful one.
    pub fn take_shot(&mut self, x: usize, y: usize) -> Result<Shot, PlayerError> {
        self.player.take_shot(self.opponent, x, y)
    }

    /// `true` once this turn's shot has been taken.
    pub fn has_shot(&self) -> bool {
        self.player.state != PlayerState::MyTurn
    }

    /// The shooting player's own board.
    pub fn board(&self) -> &Board {
        &self.player.board
    }

    /// Width and height of the opponent's board.
    pub fn board_size(&self) -> usize {
        self.opponent.board.size()
    }

    /// What is known about the opponent's cell at `(x, y)`: [`Cell::Empty`] until shot.
    pub fn observe(&self, x: usize, y: usize) -> Option<Cell> {
        self.opponent.board.observe(x, y)
    }

    /// Rendered view of the opponent's board, see [`Board::opponent_view`].
    pub fn opponent_view(&self) -> Vec<Vec<String>> {
        self.opponent.board.opponent_view()
    }

    /// `true` when the opponent's ship `ship` is sunk.
    pub fn is_sunk(&self, ship: ShipId) -> bool {
        self.opponent.board.is_sunk(ship)
    }
}

//! Ready-made AIs: something to play against, and predictable opponents for tests.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::board::Cell;
use crate::errors::PlayerError;
use crate::game_interface::BattleshipsAi;
use crate::player::{Player, Turn};

/// Name under which [`RandomAi`] is registered when the demo entry is enabled.
pub const DEMO_ENTRY_NAME: &str = "Internal Demo";

/// Attempts per ship before random placement gives up.
const PLACEMENT_ATTEMPTS: usize = 100;

/// Places one ship per row from the top-left corner, then shoots every cell in reading order.
///
/// Needs a board with at least as many rows as there are ships.
#[derive(Debug, Default, Clone, Copy)]
pub struct SweepAi {
    next: usize,
}

impl SweepAi {
    /// A sweeper starting at `(0, 0)`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl BattleshipsAi for SweepAi {
    fn place_ships(&mut self, player: &mut Player) -> anyhow::Result<()> {
        let ships = player.ships_to_place().to_vec();
        for (y, ship) in ships.into_iter().enumerate() {
            player.place_ship(ship, 0, y)?;
        }
        Ok(())
    }

    fn take_shot(&mut self, turn: &mut Turn<'_>) -> anyhow::Result<()> {
        let size = turn.board_size();
        while self.next < size * size {
            let (x, y) = (self.next % size, self.next / size);
            self.next += 1;
            if turn.observe(x, y) == Some(Cell::Empty) {
                turn.take_shot(x, y)?;
                return Ok(());
            }
        }
        Ok(())
    }
}

/// Places its fleet at random and shoots at random cells it has not tried yet.
#[derive(Debug)]
pub struct RandomAi {
    rng: SmallRng,
}

impl RandomAi {
    /// A random AI seeded from the thread RNG.
    pub fn new() -> Self {
        let mut seed_rng = rand::rng();
        Self {
            rng: SmallRng::from_rng(&mut seed_rng),
        }
    }

    /// A reproducible random AI.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomAi {
    fn default() -> Self {
        Self::new()
    }
}

impl BattleshipsAi for RandomAi {
    fn place_ships(&mut self, player: &mut Player) -> anyhow::Result<()> {
        let size = player.board().size();
        let ships = player.ships_to_place().to_vec();
        for ship in ships {
            for _ in 0..PLACEMENT_ATTEMPTS {
                let x = self.rng.random_range(0..=size - ship);
                let y = self.rng.random_range(0..size);
                match player.place_ship(ship, x, y) {
                    Ok(()) => break,
                    Err(PlayerError::CannotPlaceShip(_)) => continue,
                    Err(e) => return Err(e.into()),
                }
            }
        }
        if !player.fleet_complete() {
            debug!(missing = ?player.ships_to_place(), "random placement gave up");
        }
        Ok(())
    }

    fn take_shot(&mut self, turn: &mut Turn<'_>) -> anyhow::Result<()> {
        let size = turn.board_size();
        let untried: Vec<(usize, usize)> = (0..size)
            .flat_map(|x| (0..size).map(move |y| (x, y)))
            .filter(|&(x, y)| turn.observe(x, y) == Some(Cell::Empty))
            .collect();
        if untried.is_empty() {
            return Ok(());
        }
        let (x, y) = untried[self.rng.random_range(0..untried.len())];
        turn.take_shot(x, y)?;
        Ok(())
    }
}

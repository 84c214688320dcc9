//! Module defining the capability an AI must implement to enter a competition

use std::sync::Arc;

use crate::player::{Player, Turn};

/// What an AI should implement.
///
/// Both callbacks have a default implementation doing nothing, so an AI that never places
/// ships nor shoots is simply `impl BattleshipsAi for MyAi {}` (see [`NoOpAi`]).
///
/// Callbacks report failures through `anyhow`. Rule violations returned by the engine
/// ([`PlayerError`](crate::errors::PlayerError)) may be propagated with `?`: the game logs
/// them and carries on. Any other error, or a panic, forfeits the game.
pub trait BattleshipsAi {
    /// Place the fleet on `player`'s board with [`Player::place_ship`].
    ///
    /// Called once per game, before the first shot. Ships left unplaced when this returns
    /// forfeit the game.
    fn place_ships(&mut self, _player: &mut Player) -> anyhow::Result<()> {
        Ok(())
    }

    /// Shoot once with [`Turn::take_shot`].
    ///
    /// Returning without shooting passes the turn. A second shot in the same turn is
    /// rejected with [`NotYourTurn`](crate::errors::PlayerError::NotYourTurn).
    fn take_shot(&mut self, _turn: &mut Turn<'_>) -> anyhow::Result<()> {
        Ok(())
    }
}

impl<A: BattleshipsAi + ?Sized> BattleshipsAi for Box<A> {
    fn place_ships(&mut self, player: &mut Player) -> anyhow::Result<()> {
        (**self).place_ships(player)
    }

    fn take_shot(&mut self, turn: &mut Turn<'_>) -> anyhow::Result<()> {
        (**self).take_shot(turn)
    }
}

/// Produces a fresh AI for every game an entry plays.
///
/// How the factory was obtained (compiled in, loaded from a plugin, ...) is up to the
/// caller. The factory is shared between worker threads; the AI it returns is not.
pub type AiFactory = Arc<dyn Fn() -> Box<dyn BattleshipsAi> + Send + Sync>;

/// Wrap a constructor into an [`AiFactory`].
///
/// ```
/// use battleships_competition::game_interface::{factory, NoOpAi};
///
/// let make = factory(|| NoOpAi);
/// let _first = make();
/// let _second = make();
/// ```
pub fn factory<A, F>(constructor: F) -> AiFactory
where
    A: BattleshipsAi + 'static,
    F: Fn() -> A + Send + Sync + 'static,
{
    Arc::new(move || Box::new(constructor()) as Box<dyn BattleshipsAi>)
}

/// An AI that does nothing at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpAi;

impl BattleshipsAi for NoOpAi {}

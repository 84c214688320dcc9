//! # Battleships Competition
//!
//! A Battleships engine and a competition scheduler for AIs playing it, with per-callback
//! timeouts and isolation of misbehaving AIs.
//!
//! It provides:
//! - The game itself: [`Board`](crate::board::Board), [`Player`](crate::player::Player) and
//!   [`Game`](crate::game::Game)
//! - An AI capability interface, [`BattleshipsAi`](crate::game_interface::BattleshipsAi)
//! - An entry registry with game scheduling and scoring (`Competition`)
//! - Tournament logic via the `TournamentStrategy` trait, with `ChallengeTournament` and
//!   `RoundRobinTournament` built in
//!
//! Each game runs on its own thread. An AI that panics, returns an error, or takes longer than
//! the configured action timeout forfeits the game; the rest of the competition carries on.
//!
//! # Documentation Overview
//!
//! - For the rules of a single game, see the [`player`] and [`game`] modules.
//! - For registration, scheduling and scoring, see the [`competition`] module.
//! - For configuring competition behavior and execution limits, see
//!   [`Configuration`](crate::configuration::Configuration) and [`constraints`].
//! - To understand how games are paired, see the
//!   [`TournamentStrategy`](crate::tournament_strategy::TournamentStrategy) trait and its
//!   implementations.
//!
//! # Usage Example
//!
//! ```no_run
//! use std::time::Duration;
//! use battleships_competition::{anyhow, prelude::*};
//!
//! fn main() -> anyhow::Result<()> {
//!     let constraints = ConstraintsBuilder::new()
//!         .with_action_timeout(Duration::from_millis(100))
//!         .build()?;
//!
//!     // The demo entry is registered on creation, newcomers challenge it
//!     let config = Configuration::new().with_games_to_run(4);
//!     let competition = Competition::new(config, constraints)?;
//!
//!     let enrollment = competition.add("Sweeper", factory(SweepAi::new));
//!     println!("{} games played", enrollment.report.completed());
//!
//!     for entry in competition.entries() {
//!         println!("{}: {} wins, {} losses", entry.name, entry.wins, entry.losses);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Example AI
//!
//! An AI implements [`BattleshipsAi`](crate::game_interface::BattleshipsAi). It places its
//! fleet through the [`Player`](crate::player::Player) it is given, and shoots once per turn
//! through the [`Turn`](crate::player::Turn) handle:
//!
//! ```
//! use battleships_competition::{anyhow, prelude::*};
//!
//! struct Reader {
//!     next: usize,
//! }
//!
//! impl BattleshipsAi for Reader {
//!     fn place_ships(&mut self, player: &mut Player) -> anyhow::Result<()> {
//!         let ships = player.ships_to_place().to_vec();
//!         for (row, ship) in ships.into_iter().enumerate() {
//!             player.place_ship(ship, 0, row)?;
//!         }
//!         Ok(())
//!     }
//!
//!     fn take_shot(&mut self, turn: &mut Turn<'_>) -> anyhow::Result<()> {
//!         let size = turn.board_size();
//!         let (x, y) = (self.next % size, (self.next / size) % size);
//!         self.next += 1;
//!         turn.take_shot(x, y)?;
//!         Ok(())
//!     }
//! }
//!
//! let mut game = Game::new(
//!     Rules::default(),
//!     Box::new(Reader { next: 0 }),
//!     Box::new(RandomAi::seeded(1)),
//! );
//! let outcome = game.play();
//! println!("{outcome}");
//! ```
//!
//! ## AI Requirements
//!
//! - Place the whole fleet during `place_ships`, or forfeit
//! - Take at most one shot per `take_shot`; a second one is rejected with `NotYourTurn`
//! - Return within the configured action timeout
#![warn(missing_docs)]

pub use anyhow;
pub mod board;
pub mod competition;
pub mod configuration;
pub mod constraints;
pub mod demo;
pub mod entry;
pub mod errors;
pub mod game;
pub mod game_interface;
mod logger;
mod match_runner;
pub mod naming;
pub mod player;
pub mod rules;
mod tournament_scheduler;
pub mod tournament_strategy;

/// Commonly used types and traits for quick access.
///
/// Import this prelude to get started easily:
/// ```rust
/// use battleships_competition::prelude::*;
/// ```
///
/// Includes:
/// - [`Competition`](crate::competition::Competition)
/// - [`Configuration`](crate::configuration::Configuration)
/// - [`ConstraintsBuilder`](crate::constraints::ConstraintsBuilder)
/// - the game types and the AI interface
/// - the demo AIs
/// - all built-in [`Tournament strategies`](crate::tournament_strategy)
pub mod prelude {
    pub use crate::competition::{Competition, Enrollment, RunReport, ShutdownSignal};
    pub use crate::configuration::{Configuration, MatchupPolicy};
    pub use crate::constraints::ConstraintsBuilder;
    pub use crate::demo::{RandomAi, SweepAi};
    pub use crate::entry::{Entry, EntrySummary};
    pub use crate::errors::{PlacementError, PlayerError};
    pub use crate::game::{Game, GameOutcome, Side};
    pub use crate::game_interface::{factory, AiFactory, BattleshipsAi};
    pub use crate::player::{Player, PlayerState, Turn};
    pub use crate::rules::Rules;
    pub use crate::tournament_strategy::*;
}

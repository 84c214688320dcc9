//! One game between two players, from ship placement to the last shot.
//!
//! The game is synchronous: AI callbacks are called on the current thread and the game waits
//! for them. Faults inside a callback (a panic, an error that is not a rule violation, a
//! callback outliving its time budget) end the game as a forfeit for that side instead of
//! propagating. Watching for callbacks that never return is left to a supervisor, through
//! [`GameMonitor`].

use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::errors::PlayerError;
use crate::game_interface::BattleshipsAi;
use crate::player::{Player, PlayerState};
use crate::rules::Rules;

/// One of the two seats of a game. [`Side::First`] shoots first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    /// Shoots first.
    First,
    /// Shoots second.
    Second,
}

impl Side {
    /// The opposing side.
    pub fn other(self) -> Side {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }

    fn index(self) -> usize {
        match self {
            Side::First => 0,
            Side::Second => 1,
        }
    }
}

/// AI callback being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Callback {
    /// The entry's factory building a fresh AI.
    Construct,
    /// [`BattleshipsAi::place_ships`]
    PlaceShips,
    /// [`BattleshipsAi::take_shot`]
    TakeShot,
}

impl Display for Callback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Callback::Construct => write!(f, "constructor"),
            Callback::PlaceShips => write!(f, "place_ships"),
            Callback::TakeShot => write!(f, "take_shot"),
        }
    }
}

/// Why a side forfeited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Fault {
    /// A callback ran longer than its budget.
    Timeout {
        /// Offending callback.
        callback: Callback,
        /// Time spent in it when the fault was declared.
        elapsed: Duration,
    },
    /// A callback (or the AI constructor) panicked.
    Panicked(String),
    /// A callback returned an error that is not a rule violation.
    Error(String),
    /// Ships were still owed after placement.
    IncompleteFleet {
        /// Lengths left unplaced.
        missing: Vec<usize>,
    },
}

impl Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Fault::Timeout { callback, elapsed } => {
                write!(f, "{callback} timed out after {}ms", elapsed.as_millis())
            }
            Fault::Panicked(msg) => write!(f, "panicked: {msg}"),
            Fault::Error(msg) => write!(f, "error: {msg}"),
            Fault::IncompleteFleet { missing } => write!(f, "ships not placed: {missing:?}"),
        }
    }
}

/// How a game ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GameOutcome {
    /// `winner` sank the opposing fleet.
    Victory {
        /// Side that sank the other fleet.
        winner: Side,
        /// Turns played.
        turns: usize,
    },
    /// `offender` lost because of a fault.
    Forfeit {
        /// Side at fault.
        offender: Side,
        /// What went wrong.
        fault: Fault,
    },
    /// Both sides faulted before the first shot.
    DoubleForfeit {
        /// Fault of [`Side::First`].
        first: Fault,
        /// Fault of [`Side::Second`].
        second: Fault,
    },
    /// Nobody won within [`Rules::turn_limit`] turns.
    TurnLimit {
        /// Turns played.
        turns: usize,
    },
}

impl GameOutcome {
    /// Winning side, if any.
    pub fn winner(&self) -> Option<Side> {
        match self {
            GameOutcome::Victory { winner, .. } => Some(*winner),
            GameOutcome::Forfeit { offender, .. } => Some(offender.other()),
            GameOutcome::DoubleForfeit { .. } | GameOutcome::TurnLimit { .. } => None,
        }
    }

    /// Losing side, if there is exactly one.
    pub fn loser(&self) -> Option<Side> {
        self.winner().map(Side::other)
    }
}

impl Display for GameOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameOutcome::Victory { winner, turns } => {
                write!(f, "{winner:?} won in {turns} turns")
            }
            GameOutcome::Forfeit { offender, fault } => {
                write!(f, "{offender:?} forfeited ({fault})")
            }
            GameOutcome::DoubleForfeit { first, second } => {
                write!(f, "both forfeited (First {first}, Second {second})")
            }
            GameOutcome::TurnLimit { turns } => write!(f, "turn limit reached ({turns} turns)"),
        }
    }
}

/// Observes AI callbacks as the game runs them.
///
/// Both methods are called on the game's thread, right before and right after the callback.
pub trait GameMonitor {
    /// `side` is about to run `callback`.
    fn callback_started(&mut self, _side: Side, _callback: Callback) {}

    /// `side` returned (or panicked) from `callback` after `elapsed`.
    fn callback_finished(&mut self, _side: Side, _callback: Callback, _elapsed: Duration) {}
}

impl GameMonitor for () {}

/// Two players facing each other. See the [module documentation](self).
#[derive(Debug)]
pub struct Game {
    players: [Player; 2],
    rules: Rules,
    action_timeout: Option<Duration>,
    turns: usize,
}

impl Game {
    /// Create a game where `first` shoots first.
    pub fn new(rules: Rules, first: Box<dyn BattleshipsAi>, second: Box<dyn BattleshipsAi>) -> Self {
        Self {
            players: [Player::new(&rules, first), Player::new(&rules, second)],
            rules,
            action_timeout: None,
            turns: 0,
        }
    }

    /// Forfeit any side whose callback takes longer than `timeout`.
    ///
    /// The check happens once the callback returns; a callback that never returns needs a
    /// supervisor (see [`GameMonitor`]).
    pub fn with_action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout = Some(timeout);
        self
    }

    /// Player sitting at `side`.
    pub fn player(&self, side: Side) -> &Player {
        &self.players[side.index()]
    }

    /// Turns played so far.
    pub fn turns(&self) -> usize {
        self.turns
    }

    /// Play the game to the end.
    pub fn play(&mut self) -> GameOutcome {
        self.play_monitored(&mut ())
    }

    /// Play the game to the end, reporting every callback to `monitor`.
    #[instrument(skip_all)]
    pub fn play_monitored<M: GameMonitor + ?Sized>(&mut self, monitor: &mut M) -> GameOutcome {
        let first = self.place_ships(Side::First, monitor);
        let second = self.place_ships(Side::Second, monitor);
        match (first, second) {
            (Ok(()), Ok(())) => {}
            (Err(fault), Ok(())) => return self.forfeit(Side::First, fault),
            (Ok(()), Err(fault)) => return self.forfeit(Side::Second, fault),
            (Err(first), Err(second)) => {
                warn!(%first, %second, "both sides forfeit");
                for player in &mut self.players {
                    player.finish(false);
                }
                return GameOutcome::DoubleForfeit { first, second };
            }
        }

        for side in [Side::First, Side::Second] {
            self.players[side.index()].start_play(side == Side::First);
        }

        let mut current = Side::First;
        while self.turns < self.rules.turn_limit() {
            self.turns += 1;
            let turns = self.turns;
            if let Err(fault) = self.invoke(current, Callback::TakeShot, monitor) {
                return self.forfeit(current, fault);
            }

            let (player, opponent) = self.seats(current);
            if player.state() == PlayerState::MyTurn {
                debug!(side = ?current, turns, "no shot taken, turn passed");
                player.pass_turn(opponent);
            }
            if opponent.board().all_ships_sunk() {
                player.finish(true);
                opponent.finish(false);
                info!(winner = ?current, turns, "fleet sunk");
                return GameOutcome::Victory {
                    winner: current,
                    turns,
                };
            }
            current = current.other();
        }

        warn!(turns = self.turns, "turn limit reached");
        for player in &mut self.players {
            player.finish(false);
        }
        GameOutcome::TurnLimit { turns: self.turns }
    }

    /// `(side, opponent of side)`
    fn seats(&mut self, side: Side) -> (&mut Player, &mut Player) {
        let [first, second] = &mut self.players;
        match side {
            Side::First => (first, second),
            Side::Second => (second, first),
        }
    }

    /// Ask `side` for its fleet. Every side is asked, whatever the other one did.
    fn place_ships<M: GameMonitor + ?Sized>(
        &mut self,
        side: Side,
        monitor: &mut M,
    ) -> Result<(), Fault> {
        self.invoke(side, Callback::PlaceShips, monitor)?;
        let player = self.player(side);
        if player.fleet_complete() {
            Ok(())
        } else {
            Err(Fault::IncompleteFleet {
                missing: player.ships_to_place().to_vec(),
            })
        }
    }

    fn invoke<M: GameMonitor + ?Sized>(
        &mut self,
        side: Side,
        callback: Callback,
        monitor: &mut M,
    ) -> Result<(), Fault> {
        monitor.callback_started(side, callback);
        let started = Instant::now();
        let (player, opponent) = self.seats(side);
        let result = panic::catch_unwind(AssertUnwindSafe(|| match callback {
            Callback::PlaceShips => player.request_ai_place_ships(),
            Callback::TakeShot => player.request_ai_take_shot(opponent),
            Callback::Construct => Ok(()),
        }));
        let elapsed = started.elapsed();
        monitor.callback_finished(side, callback, elapsed);

        if self.action_timeout.is_some_and(|limit| elapsed > limit) {
            return Err(Fault::Timeout { callback, elapsed });
        }
        match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => match e.downcast_ref::<PlayerError>() {
                Some(rule) => {
                    warn!(?side, %callback, "rule violation: {rule}");
                    Ok(())
                }
                None => Err(Fault::Error(format!("{e:#}"))),
            },
            Err(payload) => Err(Fault::Panicked(panic_message(payload.as_ref()))),
        }
    }

    fn forfeit(&mut self, offender: Side, fault: Fault) -> GameOutcome {
        warn!(?offender, %fault, "forfeit");
        self.players[offender.index()].finish(false);
        self.players[offender.other().index()].finish(true);
        GameOutcome::Forfeit { offender, fault }
    }
}

/// Text carried by a panic payload, when there is one.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

//! Core logic for running a Battleships competition.
//!
//! This module defines the [`Competition`] type, which holds the registry of entries and
//! orchestrates games between them. Its responsibilities include:
//!
//! - Registering entries under unique names
//! - Scheduling games with a [`TournamentStrategy`]
//! - Enforcing time and parallelism limits via [`Constraints`]
//! - Recording every finished game on both entries
//!
//! # Behavior & Configuration
//!
//! Behavior is controlled by a [`Configuration`] object:
//!
//! - `policy` decides what [`Competition::add`] plays: the newcomer against every registered
//!   entry ([`MatchupPolicy::Challenge`]) or every pair again ([`MatchupPolicy::RoundRobin`]).
//! - `games_to_run` is the number of games per pair. The first player alternates.
//! - `demo_entry` registers [`RandomAi`] as `"Internal Demo"` when the competition is created.
//!
//! ## Names
//!
//! Names are unique. Adding `"X"` while `"X"` exists registers `"X Two"`, then `"X Three"`,
//! and so on. With `replace` the existing `"X"` is swapped for the new entry instead, with
//! fresh stats and a new id.
//!
//! ## Scoring
//!
//! - Victory: the winner gets a win, the loser a loss.
//! - Forfeit: the offender gets a loss and a forfeit, its opponent a win.
//! - Both sides forfeit before the first shot, or the turn limit is reached: both sides get a
//!   loss and a forfeit.
//!
//! Scores are applied as each game finishes, so [`Competition::entries`] is always consistent.
//! A game abandoned on shutdown changes nothing.
//!
//! # Example
//!
//! See crate-level documentation for an example on how to use the `Competition`.

use crate::configuration::{Configuration, MatchupPolicy};
use crate::constraints::Constraints;
use crate::demo::{RandomAi, DEMO_ENTRY_NAME};
use crate::entry::{Entry, EntrySummary, Stats};
use crate::game::{GameOutcome, Side};
use crate::game_interface::{factory, AiFactory};
use crate::logger::init_logger;
use crate::match_runner::{lingering_game_threads, run_match, MatchSettings, RunnerResult};
use crate::naming::disambiguate;
use crate::tournament_scheduler::TournamentScheduler;
use crate::tournament_strategy::{ChallengeTournament, RoundRobinTournament, TournamentStrategy};

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{RecvTimeoutError, Sender};
use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{info, instrument, trace, warn};

/// How often a running tournament looks at the shutdown signal.
const SHUTDOWN_POLL: Duration = Duration::from_millis(50);

/// Shared flag asking running tournaments to stop.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal(Arc<AtomicBool>);

impl ShutdownSignal {
    /// Ask every tournament of the competition to stop. Cannot be undone.
    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether [`trigger`](Self::trigger) was called.
    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One finished game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameRecord {
    /// Number of the game within its run, from 1.
    pub match_id: usize,
    /// Name of the entry that shot first.
    pub first: String,
    /// Name of the entry that shot second.
    pub second: String,
    /// How the game ended.
    pub outcome: GameOutcome,
}

/// What a tournament run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Finished games, in the order they finished. Every one of them was scored.
    pub games: Vec<GameRecord>,
    /// Games started but left unscored: abandoned on shutdown or lost without an outcome.
    pub abandoned: usize,
    /// Games never started because of a shutdown.
    pub skipped: usize,
}

impl RunReport {
    /// Number of scored games.
    pub fn completed(&self) -> usize {
        self.games.len()
    }
}

/// A freshly registered entry and the games it triggered.
#[derive(Debug)]
pub struct Enrollment {
    /// The registered entry. Its name may differ from the requested one.
    pub entry: Arc<Entry>,
    /// Games played because of the registration.
    pub report: RunReport,
}

#[derive(Debug, Default)]
struct Registry {
    entries: Vec<Arc<Entry>>,
    next_id: u32,
}

/// The entry registry and the machinery to make entries play.
///
/// `Competition` is `Sync`: entries can be added and tournaments run from several threads
/// at once, scores stay exact.
#[derive(Debug)]
pub struct Competition {
    config: Configuration,
    constraints: Constraints,
    registry: Mutex<Registry>,
    shutdown: ShutdownSignal,
}

impl Competition {
    /// Create a [`Competition`] with given [`Configuration`] and [`Constraints`].
    ///
    /// # Errors
    /// Returns an error if file logging is enabled but cannot be set up.
    #[instrument(skip_all)]
    pub fn new(config: Configuration, constraints: Constraints) -> anyhow::Result<Competition> {
        if config.log {
            init_logger()?;
        }

        trace!(?config, ?constraints);

        let competition = Competition {
            config,
            constraints,
            registry: Mutex::new(Registry::default()),
            shutdown: ShutdownSignal::default(),
        };
        if competition.config.demo_entry {
            competition.register(DEMO_ENTRY_NAME, factory(RandomAi::new));
        }
        Ok(competition)
    }

    /// Configuration in use.
    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// Limits in use.
    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Signal stopping every tournament of this competition.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Register an entry without playing any game. A taken name gets a suffix.
    pub fn register(&self, name: &str, factory: AiFactory) -> Arc<Entry> {
        self.register_with(name, factory, false)
    }

    /// Register an entry without playing any game.
    ///
    /// If `name` is taken, `replace` swaps the existing entry for the new one, otherwise the
    /// new entry gets a suffixed name.
    #[instrument(skip(self, factory))]
    pub fn register_with(&self, name: &str, factory: AiFactory, replace: bool) -> Arc<Entry> {
        let mut registry = self.lock_registry();
        let id = registry.next_id;
        registry.next_id += 1;

        if replace {
            if let Some(pos) = registry.entries.iter().position(|e| e.name == name) {
                let entry = Arc::new(Entry::new(id, name.to_owned(), factory));
                let old = std::mem::replace(&mut registry.entries[pos], entry.clone());
                info!(id, old_id = old.id, "entry replaced");
                return entry;
            }
        }

        let name = disambiguate(name, |n| registry.entries.iter().any(|e| e.name == n));
        let entry = Arc::new(Entry::new(id, name, factory));
        info!(id, name = %entry.name, "entry registered");
        registry.entries.push(entry.clone());
        entry
    }

    /// Register an entry, then play the games the [`MatchupPolicy`] calls for.
    pub fn add(&self, name: &str, factory: AiFactory) -> Enrollment {
        self.add_with(name, factory, false)
    }

    /// [`add`](Self::add), replacing an entry of the same name if `replace` is set.
    pub fn add_with(&self, name: &str, factory: AiFactory, replace: bool) -> Enrollment {
        let entry = self.register_with(name, factory, replace);
        let games = self.config.games_to_run;
        let report = match self.config.policy {
            MatchupPolicy::Challenge => self.run(ChallengeTournament::new(entry.clone(), games)),
            MatchupPolicy::RoundRobin => self.run(RoundRobinTournament::new(games)),
        };
        Enrollment { entry, report }
    }

    /// Every registered entry plays every other one, `games_to_run` games per pair.
    pub fn run_round_robin(&self) -> RunReport {
        self.run(RoundRobinTournament::new(self.config.games_to_run))
    }

    /// Play every game `tournament` asks for between the registered entries.
    ///
    /// Returns once every game is scored, or as soon as the shutdown signal is seen.
    #[instrument(skip_all)]
    pub fn run<T: TournamentStrategy>(&self, tournament: T) -> RunReport {
        let mut report = RunReport::default();
        if self.shutdown.is_triggered() {
            return report;
        }
        if self.config.verbose {
            disable_line_wrap();
        }

        // 1. create scheduler and communication channels
        let pairings = tournament.pairings(&self.roster());
        let mut scheduler =
            TournamentScheduler::new(pairings, self.constraints.max_concurrent_games);
        let (tx_result, rx_result) = mpsc::channel();

        // 2. create running matches shared vector (for printing purpose)
        let running = Arc::new(Mutex::new(vec![]));

        // 3. Init matches
        for m in scheduler.advance() {
            self.launch_match(m, tx_result.clone(), &running);
        }

        // 4. main loop
        while !scheduler.is_finished() {
            if self.shutdown.is_triggered() {
                let (abandoned, skipped) = scheduler.cancel();
                warn!(abandoned, skipped, "shutdown requested, tournament stopped");
                report.abandoned += abandoned;
                report.skipped += skipped;
                break;
            }
            // not finished <=> match running <=> result to receive
            let result = match rx_result.recv_timeout(SHUTDOWN_POLL) {
                Ok(result) => result,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    let (abandoned, skipped) = scheduler.cancel();
                    report.abandoned += abandoned;
                    report.skipped += skipped;
                    break;
                }
            };
            self.record(&result, &mut report);
            for new_match in scheduler.on_result(&result) {
                self.launch_match(new_match, tx_result.clone(), &running);
            }
        }

        if self.config.verbose {
            enable_line_wrap();
        }
        info!(
            completed = report.completed(),
            abandoned = report.abandoned,
            skipped = report.skipped,
            "tournament over"
        );
        report
    }

    /// Summaries of every entry, in registration order.
    pub fn entries(&self) -> Vec<EntrySummary> {
        self.lock_registry()
            .entries
            .iter()
            .map(|e| e.summary())
            .collect()
    }

    /// Entry registered as `name`.
    pub fn entry(&self, name: &str) -> Option<Arc<Entry>> {
        self.lock_registry()
            .entries
            .iter()
            .find(|e| e.name == name)
            .cloned()
    }

    /// Every registered entry, in registration order.
    pub fn roster(&self) -> Vec<Arc<Entry>> {
        self.lock_registry().entries.clone()
    }

    fn lock_registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, result: &RunnerResult, report: &mut RunReport) {
        let settings = &result.settings;
        match &result.outcome {
            Some(outcome) => {
                apply_outcome(&settings.first, &settings.second, outcome);
                report.games.push(GameRecord {
                    match_id: settings.id,
                    first: settings.first.name.clone(),
                    second: settings.second.name.clone(),
                    outcome: outcome.clone(),
                });
            }
            None => {
                warn!(game = %settings, "no outcome, game not scored");
                report.abandoned += 1;
            }
        }
    }

    fn launch_match(
        &self,
        match_settings: MatchSettings,
        tx_result: Sender<RunnerResult>,
        running: &Arc<Mutex<Vec<MatchSettings>>>,
    ) {
        let mutex = running.clone();

        let mut guard = mutex.lock().unwrap_or_else(PoisonError::into_inner);
        guard.push(match_settings.clone());
        if self.config.verbose {
            print_running_matches(&guard);
        }
        drop(guard);

        let lingering = lingering_game_threads();
        if lingering >= self.constraints.max_concurrent_games {
            warn!(
                lingering,
                max_concurrent_games = self.constraints.max_concurrent_games,
                "abandoned game threads outnumber the concurrency limit"
            );
        }

        let verbose = self.config.verbose;
        let rules = self.config.rules.clone();
        let action_timeout = self.constraints.action_time;
        std::thread::spawn(move || {
            let outcome = run_match(&match_settings, &rules, action_timeout);

            if verbose {
                print_runner_result(&match_settings, outcome.as_ref());
            }
            remove_running_match(&mutex, &match_settings);

            // the receiver is gone if the tournament was stopped
            let _ = tx_result.send(RunnerResult {
                settings: match_settings,
                outcome,
            });
        });
    }
}

/// Score one game on both entries. Stats are locked in id order.
fn apply_outcome(first: &Entry, second: &Entry, outcome: &GameOutcome) {
    if first.id == second.id {
        warn!(id = first.id, "entry played against itself, not scored");
        return;
    }
    let (mut first_stats, mut second_stats) = if first.id < second.id {
        let a = first.lock_stats();
        (a, second.lock_stats())
    } else {
        let b = second.lock_stats();
        (first.lock_stats(), b)
    };
    let (first_stats, second_stats) = (&mut *first_stats, &mut *second_stats);

    match outcome {
        GameOutcome::Victory { winner, .. } => {
            let (winner, loser) = seats(*winner, first_stats, second_stats);
            winner.wins += 1;
            loser.losses += 1;
        }
        GameOutcome::Forfeit { offender, .. } => {
            let (offender, other) = seats(*offender, first_stats, second_stats);
            offender.losses += 1;
            offender.forfeits += 1;
            other.wins += 1;
        }
        GameOutcome::DoubleForfeit { .. } | GameOutcome::TurnLimit { .. } => {
            for stats in [first_stats, second_stats] {
                stats.losses += 1;
                stats.forfeits += 1;
            }
        }
    }
}

/// `(side, other side)`
fn seats<'a>(
    side: Side,
    first: &'a mut Stats,
    second: &'a mut Stats,
) -> (&'a mut Stats, &'a mut Stats) {
    match side {
        Side::First => (first, second),
        Side::Second => (second, first),
    }
}

fn remove_running_match(mutex: &Mutex<Vec<MatchSettings>>, running: &MatchSettings) {
    let mut guard = mutex.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(pos) = guard.iter().position(|s| s == running) {
        guard.remove(pos);
    }
}

fn print_runner_result(match_settings: &MatchSettings, outcome: Option<&GameOutcome>) {
    let name = |side: Side| match side {
        Side::First => &match_settings.first.name,
        Side::Second => &match_settings.second.name,
    };
    let (result, errors) = match outcome {
        Some(GameOutcome::Victory { winner, turns }) => {
            (format!("{} won in {turns} turns", name(*winner)), String::new())
        }
        Some(GameOutcome::Forfeit { offender, fault }) => (
            format!("{} won", name(offender.other())),
            format!("{} {fault}", name(*offender)),
        ),
        Some(GameOutcome::DoubleForfeit { first, second }) => (
            "no winner".to_string(),
            format!(
                "{} {first}, {} {second}",
                name(Side::First),
                name(Side::Second)
            ),
        ),
        Some(GameOutcome::TurnLimit { turns }) => {
            ("draw".to_string(), format!("turn limit ({turns})"))
        }
        None => (String::new(), "abandoned".to_string()),
    };

    // clear line, green match, results, red errors, start of line
    println!(
        "\x1b[2K\x1b[32m{match_settings}: \x1b[39m{result} \x1b[31m{errors}\x1b[39m\x1b[0G"
    );
}

fn print_running_matches(running: &[MatchSettings]) {
    // clear, green, default, start of line
    print!(
        "\x1b[2K\x1b[32mRunning...:\x1b[39m {}\x1b[0G",
        running
            .iter()
            .map(MatchSettings::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
    let _ = std::io::Write::flush(&mut std::io::stdout());
}

fn disable_line_wrap() {
    print!("\x1b[?7l");
}

fn enable_line_wrap() {
    print!("\x1b[?7h");
}

#[cfg(test)]
mod competition_tests {
    use super::*;
    use crate::game::Fault;
    use crate::game_interface::NoOpAi;

    fn entry(id: u32) -> Entry {
        Entry::new(id, format!("E{id}"), factory(|| NoOpAi))
    }

    #[test]
    fn victory_scores_winner_and_loser() {
        let (a, b) = (entry(0), entry(1));
        apply_outcome(
            &b,
            &a,
            &GameOutcome::Victory {
                winner: Side::First,
                turns: 12,
            },
        );
        assert_eq!(b.stats().wins, 1);
        assert_eq!(a.stats().losses, 1);
        assert_eq!(a.stats().forfeits + b.stats().forfeits, 0);
    }

    #[test]
    fn forfeit_marks_the_offender() {
        let (a, b) = (entry(0), entry(1));
        apply_outcome(
            &a,
            &b,
            &GameOutcome::Forfeit {
                offender: Side::Second,
                fault: Fault::Panicked("boom".into()),
            },
        );
        assert_eq!(
            a.stats(),
            Stats {
                wins: 1,
                losses: 0,
                forfeits: 0
            }
        );
        assert_eq!(
            b.stats(),
            Stats {
                wins: 0,
                losses: 1,
                forfeits: 1
            }
        );
    }

    #[test]
    fn turn_limit_is_a_loss_for_both() {
        let (a, b) = (entry(0), entry(1));
        apply_outcome(&a, &b, &GameOutcome::TurnLimit { turns: 500 });
        for e in [&a, &b] {
            assert_eq!(
                e.stats(),
                Stats {
                    wins: 0,
                    losses: 1,
                    forfeits: 1
                }
            );
        }
    }

    #[test]
    fn double_forfeit_is_a_loss_for_both() {
        let (a, b) = (entry(0), entry(1));
        let missing = Fault::IncompleteFleet { missing: vec![5] };
        apply_outcome(
            &b,
            &a,
            &GameOutcome::DoubleForfeit {
                first: missing.clone(),
                second: missing,
            },
        );
        for e in [&a, &b] {
            assert_eq!(
                e.stats(),
                Stats {
                    wins: 0,
                    losses: 1,
                    forfeits: 1
                }
            );
        }
    }

    #[test]
    fn self_play_is_not_scored() {
        let a = entry(0);
        apply_outcome(&a, &a, &GameOutcome::TurnLimit { turns: 1 });
        assert_eq!(a.stats(), Stats::default());
    }

    #[test]
    fn shutdown_signal_is_shared() {
        let signal = ShutdownSignal::default();
        let clone = signal.clone();
        assert!(!signal.is_triggered());
        clone.trigger();
        assert!(signal.is_triggered());
    }
}

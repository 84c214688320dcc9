//! Tournament strategies used by the competition to decide which entries play each other.
//!
//! This module defines the [`TournamentStrategy`] trait and the built-in strategies used by
//! [`Competition`](crate::competition::Competition) to schedule games.
//!
//! # Provided Strategies
//! - [`ChallengeTournament`]: One entry plays every other entry. Used when an entry is added.
//! - [`RoundRobinTournament`]: Every entry plays every other entry. Quite slow.
//!
//! # Implementing a Custom Strategy
//! To implement a new tournament format, define your own type that implements
//! [`TournamentStrategy`] and hand it to
//! [`Competition::run`](crate::competition::Competition::run).
//!
//! Results are not fed back to the strategy: scores live on the entries themselves.

use std::sync::Arc;

use tracing::info;

use crate::entry::Entry;

/// A trait defining which games a tournament plays.
///
/// Each pairing is one game, the first entry of the tuple shoots first. Strategies must not
/// pair an entry with itself.
pub trait TournamentStrategy {
    /// Every game to play between entries of `roster`.
    fn pairings(&self, roster: &[Arc<Entry>]) -> Vec<(Arc<Entry>, Arc<Entry>)>;
}

/// `games` games between `a` and `b`, `a` shooting first in even games.
fn alternate(a: &Arc<Entry>, b: &Arc<Entry>, games: usize) -> Vec<(Arc<Entry>, Arc<Entry>)> {
    (0..games)
        .map(|i| {
            if i % 2 == 0 {
                (a.clone(), b.clone())
            } else {
                (b.clone(), a.clone())
            }
        })
        .collect()
}

/// One entry plays every other entry of the roster.
///
/// This is what happens when an entry is added: the newcomer challenges the field.
#[derive(Debug)]
pub struct ChallengeTournament {
    challenger: Arc<Entry>,
    games_per_pair: usize,
}

impl ChallengeTournament {
    /// `challenger` plays `games_per_pair` games against each other entry.
    ///
    /// The order of players alternates between games, the challenger shooting first in the
    /// first game of each pair.
    pub fn new(challenger: Arc<Entry>, games_per_pair: usize) -> Self {
        Self {
            challenger,
            games_per_pair,
        }
    }
}

impl TournamentStrategy for ChallengeTournament {
    fn pairings(&self, roster: &[Arc<Entry>]) -> Vec<(Arc<Entry>, Arc<Entry>)> {
        let pending: Vec<_> = roster
            .iter()
            .filter(|entry| entry.id != self.challenger.id)
            .flat_map(|entry| alternate(&self.challenger, entry, self.games_per_pair))
            .collect();
        info!(
            challenger = %self.challenger.name,
            games = pending.len(),
            "challenge scheduled"
        );
        pending
    }
}

/// A round-robin tournament where each entry plays against every other entry.
#[derive(Debug)]
pub struct RoundRobinTournament {
    games_per_pair: usize,
}

impl RoundRobinTournament {
    /// Creates a new Round Robin tournament.
    ///
    /// Each pair plays `games_per_pair` games, the order of players alternating between games.
    pub fn new(games_per_pair: usize) -> Self {
        Self { games_per_pair }
    }
}

impl TournamentStrategy for RoundRobinTournament {
    fn pairings(&self, roster: &[Arc<Entry>]) -> Vec<(Arc<Entry>, Arc<Entry>)> {
        let n = roster.len();
        let mut pending = vec![];
        for i in 0..n {
            for j in (i + 1)..n {
                if roster[i].id == roster[j].id {
                    continue;
                }
                pending.append(&mut alternate(&roster[i], &roster[j], self.games_per_pair));
            }
        }
        info!(entries = n, games = pending.len(), "round robin scheduled");
        pending
    }
}

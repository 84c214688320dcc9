//! Registered AI competitors and their cumulative results.

use std::{
    fmt,
    hash::Hash,
    sync::{Mutex, MutexGuard, PoisonError},
};

use serde::Serialize;

use crate::game_interface::{AiFactory, BattleshipsAi};

/// Cumulative results of an entry.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Games won, including games the opponent forfeited.
    pub wins: u32,
    /// Games lost, including forfeits.
    pub losses: u32,
    /// Losses caused by a fault of this entry (timeout, panic, incomplete fleet, turn limit).
    pub forfeits: u32,
}

impl Stats {
    /// Games with a recorded result.
    pub fn games(&self) -> u32 {
        self.wins + self.losses
    }
}

/// A registered AI competitor.
pub struct Entry {
    /// Unique within a competition, never reused.
    pub id: u32,
    /// Display name, unique among registered entries.
    pub name: String,
    factory: AiFactory,
    stats: Mutex<Stats>,
}

/// Plain view of an [`Entry`], for display and serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntrySummary {
    /// See [`Entry::id`].
    pub id: u32,
    /// See [`Entry::name`].
    pub name: String,
    /// See [`Stats::wins`].
    pub wins: u32,
    /// See [`Stats::losses`].
    pub losses: u32,
    /// See [`Stats::forfeits`].
    pub forfeits: u32,
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Entry {}

impl Hash for Entry {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Entry {
    pub(crate) fn new(id: u32, name: String, factory: AiFactory) -> Entry {
        Entry {
            id,
            name,
            factory,
            stats: Mutex::new(Stats::default()),
        }
    }

    /// Build a fresh AI for one game.
    pub fn new_ai(&self) -> Box<dyn BattleshipsAi> {
        (self.factory)()
    }

    /// Current results.
    pub fn stats(&self) -> Stats {
        *self.lock_stats()
    }

    /// Current results together with id and name.
    pub fn summary(&self) -> EntrySummary {
        let stats = self.stats();
        EntrySummary {
            id: self.id,
            name: self.name.clone(),
            wins: stats.wins,
            losses: stats.losses,
            forfeits: stats.forfeits,
        }
    }

    /// Stats are plain counters, a panic while holding the lock cannot leave them half
    /// written.
    pub(crate) fn lock_stats(&self) -> MutexGuard<'_, Stats> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

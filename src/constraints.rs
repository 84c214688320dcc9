//! Defines execution limits for games between AI entries.
//!
//! AIs run in-process, so the limits are about time and parallelism:
//!
//! - **Action timeout**: wall-clock budget of a single AI callback. A side whose callback
//!   exceeds it forfeits the game.
//! - **Concurrent games**: how many games run at once, each on its own thread.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use battleships_competition::constraints::ConstraintsBuilder;
//!
//! let constraints = ConstraintsBuilder::new()
//!     .with_action_timeout(Duration::from_millis(200))
//!     .with_max_concurrent_games(4)
//!     .build()
//!     .unwrap();
//! ```
//!
//! You may also construct constraints from environment variables using
//! [`ConstraintsBuilder::from_env()`] for runtime configurability.

use std::{env, time::Duration};

use anyhow::bail;

/// Budget of one AI callback when nothing else is configured.
pub const DEFAULT_ACTION_TIMEOUT: Duration = Duration::from_secs(1);

/// A builder for the limits applied while games run.
///
/// By default callbacks get [`DEFAULT_ACTION_TIMEOUT`] and as many games run concurrently as
/// there are physical CPUs on the host machine.
#[derive(Debug, Default)]
pub struct ConstraintsBuilder {
    action_time: Option<Duration>,
    max_concurrent_games: Option<usize>,
}

impl ConstraintsBuilder {
    /// Creates a new `ConstraintsBuilder` with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `ConstraintsBuilder` configured from environment variables.
    ///
    /// Read environment variables are:
    /// - `ACTION_TIMEOUT_MS` (u64): timeout per AI callback in milliseconds
    /// - `MAX_CONCURRENT_GAMES` (usize): number of games running at once
    #[must_use]
    pub fn from_env() -> Self {
        fn parse_usize(var: &str) -> Option<usize> {
            env::var(var).ok()?.parse().ok()
        }

        fn parse_duration_millis(var: &str) -> Option<Duration> {
            env::var(var)
                .ok()?
                .parse::<u64>()
                .ok()
                .map(Duration::from_millis)
        }

        ConstraintsBuilder {
            action_time: parse_duration_millis("ACTION_TIMEOUT_MS"),
            max_concurrent_games: parse_usize("MAX_CONCURRENT_GAMES"),
        }
    }

    /// Sets the maximum duration allowed for a single AI callback.
    #[must_use]
    pub fn with_action_timeout(self, duration: Duration) -> Self {
        Self {
            action_time: Some(duration),
            ..self
        }
    }

    /// Sets the number of games allowed to run at the same time.
    #[must_use]
    pub fn with_max_concurrent_games(self, max: usize) -> Self {
        Self {
            max_concurrent_games: Some(max),
            ..self
        }
    }

    /// Consumes the builder and returns the constructed `Constraints`.
    ///
    /// # Errors
    ///
    /// Returned when constraints are impossible: a zero timeout or zero concurrent games.
    pub fn build(self) -> anyhow::Result<Constraints> {
        let action_time = self.action_time.unwrap_or(DEFAULT_ACTION_TIMEOUT);
        if action_time.is_zero() {
            bail!("action timeout must be greater than zero");
        }
        let max_concurrent_games = self
            .max_concurrent_games
            .unwrap_or_else(|| num_cpus::get_physical().max(1));
        if max_concurrent_games == 0 {
            bail!("at least one game must be allowed to run");
        }
        Ok(Constraints {
            action_time,
            max_concurrent_games,
        })
    }
}

/// Obtained using `ConstraintsBuilder`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constraints {
    pub(crate) action_time: Duration,
    pub(crate) max_concurrent_games: usize,
}

impl Constraints {
    /// create a ConstraintsBuilder
    pub fn builder() -> ConstraintsBuilder {
        ConstraintsBuilder::new()
    }

    /// Budget of one AI callback.
    pub fn action_timeout(&self) -> Duration {
        self.action_time
    }

    /// Number of games running at once.
    pub fn max_concurrent_games(&self) -> usize {
        self.max_concurrent_games
    }
}

impl Default for Constraints {
    fn default() -> Self {
        Constraints {
            action_time: DEFAULT_ACTION_TIMEOUT,
            max_concurrent_games: num_cpus::get_physical().max(1),
        }
    }
}

#[cfg(test)]
mod constraints_tests {
    use super::*;

    #[test]
    fn defaults() {
        let constraints = ConstraintsBuilder::new().build().unwrap();
        assert_eq!(constraints.action_timeout(), DEFAULT_ACTION_TIMEOUT);
        assert!(constraints.max_concurrent_games() >= 1);
    }

    #[test]
    fn rejects_impossible_limits() {
        assert!(ConstraintsBuilder::new()
            .with_action_timeout(Duration::ZERO)
            .build()
            .is_err());
        assert!(ConstraintsBuilder::new()
            .with_max_concurrent_games(0)
            .build()
            .is_err());
    }

    #[test]
    fn overrides() {
        let constraints = Constraints::builder()
            .with_action_timeout(Duration::from_millis(50))
            .with_max_concurrent_games(3)
            .build()
            .unwrap();
        assert_eq!(constraints.action_timeout(), Duration::from_millis(50));
        assert_eq!(constraints.max_concurrent_games(), 3);
    }
}

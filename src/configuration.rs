//! Config for the competition behaviors
//!
//! This module provides configuration options for controlling what the competition does when
//! entries are added.
//!
//! Configuration can be created programmatically using [`Configuration::new()`] or by reading
//! environment variables using [`Configuration::from_env()`].
//!
//! # Environment Variables
//!
//! The following environment variables can be used to override configuration values. All
//! values are optional. Flags are case-insensitive; set them to `"true"` to enable them.
//!
//! - `GAMES_TO_RUN`: Games played per pair of entries (default: `10`)
//! - `COMPETITION_STRATEGY`: `challenge` or `round-robin` (default: `challenge`)
//! - `COMPETITION_VERBOSE`: Print game results to stdout (default: `false`)
//! - `COMPETITION_LOG`: Enable logging to a file (default: `false`)
//! - `COMPETITION_DEMO_ENTRY`: Register the built-in demo AI on creation (default: `true`)

use std::str::FromStr;

use anyhow::bail;
use tracing::warn;

use crate::rules::Rules;

/// Games played per pair when nothing else is configured.
pub const DEFAULT_GAMES_TO_RUN: usize = 10;

/// Which games are played when an entry is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchupPolicy {
    /// The new entry plays every entry already registered.
    #[default]
    Challenge,
    /// Every pair of registered entries plays again.
    RoundRobin,
}

impl FromStr for MatchupPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "challenge" => Ok(MatchupPolicy::Challenge),
            "round-robin" | "round_robin" | "roundrobin" => Ok(MatchupPolicy::RoundRobin),
            other => bail!("unknown matchup policy '{other}'"),
        }
    }
}

/// Configuration for competition behaviors.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub(crate) verbose: bool,
    pub(crate) log: bool,
    pub(crate) games_to_run: usize,
    pub(crate) policy: MatchupPolicy,
    pub(crate) demo_entry: bool,
    pub(crate) rules: Rules,
}

impl Configuration {
    /// Create a new configuration with default parameters.
    ///
    /// By default:
    /// - Game results are not printed to stdout.
    /// - Logging to file is disabled.
    /// - Every pair plays [`DEFAULT_GAMES_TO_RUN`] games.
    /// - A new entry challenges every registered entry.
    /// - The demo AI is registered when the competition is created.
    /// - Games use the default [`Rules`].
    pub fn new() -> Self {
        Self {
            verbose: false,
            log: false,
            games_to_run: DEFAULT_GAMES_TO_RUN,
            policy: MatchupPolicy::Challenge,
            demo_entry: true,
            rules: Rules::default(),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// The following environment variables are recognized:
    /// - `GAMES_TO_RUN`: games per pair (default: `10`)
    /// - `COMPETITION_STRATEGY`: `challenge` or `round-robin` (default: `challenge`)
    /// - `COMPETITION_VERBOSE`: if set to `"true"`, enables verbose output (default: `false`)
    /// - `COMPETITION_LOG`: if set to `"true"`, enables logging to file (default: `false`)
    /// - `COMPETITION_DEMO_ENTRY`: if set to `"true"`, registers the demo AI (default: `true`)
    ///
    /// Unparsable values are reported with a warning and replaced by the default.
    pub fn from_env() -> Self {
        fn get_env_flag(var: &str, default: bool) -> bool {
            match std::env::var(var) {
                Ok(val) => val.eq_ignore_ascii_case("true"),
                Err(_) => default,
            }
        }

        fn get_env_parsed<T: FromStr>(var: &str, default: T) -> T {
            let Ok(val) = std::env::var(var) else {
                return default;
            };
            val.parse().unwrap_or_else(|_| {
                warn!("ignoring invalid {var}='{val}'");
                default
            })
        }

        Self {
            verbose: get_env_flag("COMPETITION_VERBOSE", false),
            log: get_env_flag("COMPETITION_LOG", false),
            games_to_run: get_env_parsed("GAMES_TO_RUN", DEFAULT_GAMES_TO_RUN),
            policy: get_env_parsed("COMPETITION_STRATEGY", MatchupPolicy::Challenge),
            demo_entry: get_env_flag("COMPETITION_DEMO_ENTRY", true),
            rules: Rules::default(),
        }
    }

    /// Enable or disable printing game results.
    pub fn with_verbose(mut self, value: bool) -> Self {
        self.verbose = value;
        self
    }

    /// Enable or disable logging to file.
    pub fn with_log(mut self, value: bool) -> Self {
        self.log = value;
        self
    }

    /// Set the number of games each pair plays. The first player alternates between games.
    pub fn with_games_to_run(mut self, value: usize) -> Self {
        self.games_to_run = value;
        self
    }

    /// Choose which games are played when an entry is added.
    pub fn with_policy(mut self, value: MatchupPolicy) -> Self {
        self.policy = value;
        self
    }

    /// Enable or disable registering the demo AI on creation.
    pub fn with_demo_entry(mut self, value: bool) -> Self {
        self.demo_entry = value;
        self
    }

    /// Set the board size and fleet used by every game.
    pub fn with_rules(mut self, rules: Rules) -> Self {
        self.rules = rules;
        self
    }

    /// Games played per pair.
    pub fn games_to_run(&self) -> usize {
        self.games_to_run
    }

    /// Rules used by every game.
    pub fn rules(&self) -> &Rules {
        &self.rules
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

#![allow(dead_code)]

use std::collections::VecDeque;
use std::thread;
use std::time::Duration;

use anyhow::anyhow;
use battleships_competition::board::ShipId;
use battleships_competition::prelude::*;
use tracing::{Level, Metadata};
use tracing_subscriber::{
    fmt,
    layer::{Context, Filter, SubscriberExt},
    Layer, Registry,
};

struct WarnAndAbove;
impl<S> Filter<S> for WarnAndAbove {
    fn enabled(&self, meta: &Metadata<'_>, _cx: &Context<'_, S>) -> bool {
        meta.level() <= &Level::WARN
    }
}

/// Print forfeits and other warnings while a test runs. Only the first call installs it.
pub fn init_debug_logger() {
    let format = fmt::format()
        .without_time()
        .with_ansi(true)
        .with_level(true)
        .with_thread_names(true)
        .with_target(false);

    let reg = Registry::default().with(
        fmt::layer()
            .event_format(format)
            .with_test_writer()
            .with_filter(WarnAndAbove),
    );

    let _ = tracing::subscriber::set_global_default(reg);
}

/// Places the given ships, then shoots the given cells one per turn and passes afterwards.
#[derive(Debug, Default, Clone)]
pub struct Script {
    pub placements: Vec<(ShipId, usize, usize)>,
    pub shots: VecDeque<(usize, usize)>,
}

impl Script {
    pub fn placing(placements: &[(ShipId, usize, usize)]) -> Self {
        Self {
            placements: placements.to_vec(),
            shots: VecDeque::new(),
        }
    }

    pub fn shooting(mut self, shots: &[(usize, usize)]) -> Self {
        self.shots.extend(shots.iter().copied());
        self
    }
}

impl BattleshipsAi for Script {
    fn place_ships(&mut self, player: &mut Player) -> anyhow::Result<()> {
        for &(ship, x, y) in &self.placements {
            player.place_ship(ship, x, y)?;
        }
        Ok(())
    }

    fn take_shot(&mut self, turn: &mut Turn<'_>) -> anyhow::Result<()> {
        if let Some((x, y)) = self.shots.pop_front() {
            turn.take_shot(x, y)?;
        }
        Ok(())
    }
}

/// Places its fleet properly, then panics when asked to shoot.
pub struct Panicker;

impl BattleshipsAi for Panicker {
    fn place_ships(&mut self, player: &mut Player) -> anyhow::Result<()> {
        SweepAi::new().place_ships(player)
    }

    fn take_shot(&mut self, _turn: &mut Turn<'_>) -> anyhow::Result<()> {
        panic!("lost at sea")
    }
}

/// Places its fleet properly, then sleeps instead of shooting.
pub struct Sleeper(pub Duration);

impl BattleshipsAi for Sleeper {
    fn place_ships(&mut self, player: &mut Player) -> anyhow::Result<()> {
        SweepAi::new().place_ships(player)
    }

    fn take_shot(&mut self, _turn: &mut Turn<'_>) -> anyhow::Result<()> {
        thread::sleep(self.0);
        Ok(())
    }
}

/// Places its fleet properly, then fails with an error that is not a rule violation.
pub struct Failing;

impl BattleshipsAi for Failing {
    fn place_ships(&mut self, player: &mut Player) -> anyhow::Result<()> {
        SweepAi::new().place_ships(player)
    }

    fn take_shot(&mut self, _turn: &mut Turn<'_>) -> anyhow::Result<()> {
        Err(anyhow!("radar offline"))
    }
}

/// Places its fleet properly and never shoots.
pub struct Passive;

impl BattleshipsAi for Passive {
    fn place_ships(&mut self, player: &mut Player) -> anyhow::Result<()> {
        SweepAi::new().place_ships(player)
    }
}

/// Configuration without the demo entry, for tests that control the whole roster.
pub fn quiet_config(games_to_run: usize) -> Configuration {
    Configuration::new()
        .with_demo_entry(false)
        .with_games_to_run(games_to_run)
}

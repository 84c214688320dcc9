use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, instrument, trace, warn};

use crate::entry::Entry;
use crate::game::{panic_message, Callback, Fault, Game, GameMonitor, GameOutcome, Side};
use crate::game_interface::BattleshipsAi;
use crate::rules::Rules;

/// One scheduled game.
#[derive(Debug, Clone)]
pub(crate) struct MatchSettings {
    pub id: usize,
    /// Shoots first.
    pub first: Arc<Entry>,
    pub second: Arc<Entry>,
}

impl PartialEq for MatchSettings {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Display for MatchSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[#{} {} VS {}]",
            self.id, self.first.name, self.second.name
        )
    }
}

/// `outcome` is `None` when the game ended without a result to apply.
#[derive(Debug)]
pub(crate) struct RunnerResult {
    pub settings: MatchSettings,
    pub outcome: Option<GameOutcome>,
}

enum Progress {
    Started {
        side: Side,
        callback: Callback,
        at: Instant,
    },
    Finished,
    Done(GameOutcome),
}

struct ChannelMonitor {
    tx: Sender<Progress>,
}

impl GameMonitor for ChannelMonitor {
    fn callback_started(&mut self, side: Side, callback: Callback) {
        let _ = self.tx.send(Progress::Started {
            side,
            callback,
            at: Instant::now(),
        });
    }

    fn callback_finished(&mut self, _side: Side, _callback: Callback, _elapsed: Duration) {
        let _ = self.tx.send(Progress::Finished);
    }
}

/// Game threads given up on by their supervisor and still running.
static LINGERING_GAME_THREADS: AtomicUsize = AtomicUsize::new(0);

/// Number of abandoned game threads that have not returned yet.
pub(crate) fn lingering_game_threads() -> usize {
    LINGERING_GAME_THREADS.load(Ordering::SeqCst)
}

/// Play one game on its own thread and wait for its outcome.
///
/// A callback (AI constructors included) still running `action_timeout` after it started
/// forfeits its side. The game thread is then left behind: whatever it produces later is
/// dropped.
#[instrument(skip_all, fields(game = %settings))]
pub(crate) fn run_match(
    settings: &MatchSettings,
    rules: &Rules,
    action_timeout: Duration,
) -> Option<GameOutcome> {
    let (tx, rx) = mpsc::channel();
    let first = settings.first.clone();
    let second = settings.second.clone();
    let rules = rules.clone();

    let spawned = thread::Builder::new()
        .name(format!("game-{}", settings.id))
        .spawn(move || {
            let mut monitor = ChannelMonitor { tx };
            let outcome = play(&first, &second, rules, action_timeout, &mut monitor);
            if monitor.tx.send(Progress::Done(outcome)).is_err() {
                LINGERING_GAME_THREADS.fetch_sub(1, Ordering::SeqCst);
                debug!("abandoned game thread returned");
            }
        });
    if let Err(e) = spawned {
        warn!("could not spawn game thread: {e}");
        return None;
    }

    let mut running: Option<(Side, Callback, Instant)> = None;
    loop {
        let deadline = running.and_then(|(_, _, at)| at.checked_add(action_timeout));
        let event = match deadline {
            Some(deadline) => {
                match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                    Ok(event) => event,
                    Err(RecvTimeoutError::Timeout) => {
                        let Some((side, callback, at)) = running else {
                            continue;
                        };
                        let elapsed = at.elapsed();
                        let lingering = LINGERING_GAME_THREADS.fetch_add(1, Ordering::SeqCst) + 1;
                        warn!(
                            ?side,
                            %callback,
                            ?elapsed,
                            lingering,
                            "callback did not return, game abandoned"
                        );
                        return Some(GameOutcome::Forfeit {
                            offender: side,
                            fault: Fault::Timeout { callback, elapsed },
                        });
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            None => match rx.recv() {
                Ok(event) => event,
                Err(_) => break,
            },
        };
        match event {
            Progress::Started { side, callback, at } => {
                trace!(?side, %callback, "callback started");
                running = Some((side, callback, at));
            }
            Progress::Finished => running = None,
            Progress::Done(outcome) => {
                debug!(%outcome, "game over");
                return Some(outcome);
            }
        }
    }

    warn!("game thread ended without an outcome");
    None
}

/// Build both AIs and play.
fn play(
    first: &Entry,
    second: &Entry,
    rules: Rules,
    action_timeout: Duration,
    monitor: &mut ChannelMonitor,
) -> GameOutcome {
    let first_ai = match build_ai(Side::First, first, action_timeout, monitor) {
        Ok(ai) => ai,
        Err(forfeit) => return forfeit,
    };
    let second_ai = match build_ai(Side::Second, second, action_timeout, monitor) {
        Ok(ai) => ai,
        Err(forfeit) => return forfeit,
    };

    Game::new(rules, first_ai, second_ai)
        .with_action_timeout(action_timeout)
        .play_monitored(monitor)
}

/// Run the entry's factory like any other callback: a panic or a late return forfeits `side`.
fn build_ai(
    side: Side,
    entry: &Entry,
    action_timeout: Duration,
    monitor: &mut ChannelMonitor,
) -> Result<Box<dyn BattleshipsAi>, GameOutcome> {
    monitor.callback_started(side, Callback::Construct);
    let started = Instant::now();
    let built = panic::catch_unwind(AssertUnwindSafe(|| entry.new_ai()));
    let elapsed = started.elapsed();
    monitor.callback_finished(side, Callback::Construct, elapsed);

    let fault = match built {
        Ok(_) if elapsed > action_timeout => Fault::Timeout {
            callback: Callback::Construct,
            elapsed,
        },
        Ok(ai) => return Ok(ai),
        Err(payload) => Fault::Panicked(panic_message(payload.as_ref())),
    };
    warn!(?side, %fault, "AI constructor failed");
    Err(GameOutcome::Forfeit {
        offender: side,
        fault,
    })
}

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use battleships_competition::game::{Callback, Fault};
use battleships_competition::prelude::*;

mod common;
use common::{Failing, Panicker, Passive, Script, Sleeper};

#[test]
fn shooting_the_only_ship_wins() {
    let rules = Rules::new(10, vec![1]).unwrap();
    let b = Script::placing(&[(1, 5, 5)]).shooting(&[(0, 0)]);
    let a = Script::placing(&[(1, 0, 0)]);
    let mut game = Game::new(rules, Box::new(b), Box::new(a));

    let outcome = game.play();
    assert_eq!(
        outcome,
        GameOutcome::Victory {
            winner: Side::First,
            turns: 1
        }
    );
    let a_board = game.player(Side::Second).board();
    assert_eq!(a_board.current_state()[0][0], "1x");
    assert!(a_board.all_ships_sunk());
    assert_eq!(game.player(Side::First).state(), PlayerState::Won);
    assert_eq!(game.player(Side::Second).state(), PlayerState::Lost);
}

#[test]
fn second_shot_in_a_turn_is_refused() {
    struct DoubleShot {
        view_after_second_shot: Arc<Mutex<Option<(PlayerError, Vec<Vec<String>>)>>>,
        turns: usize,
    }
    impl BattleshipsAi for DoubleShot {
        fn place_ships(&mut self, player: &mut Player) -> anyhow::Result<()> {
            player.place_ship(2, 5, 5)?;
            Ok(())
        }

        fn take_shot(&mut self, turn: &mut Turn<'_>) -> anyhow::Result<()> {
            self.turns += 1;
            if self.turns > 1 {
                turn.take_shot(1, 0)?;
                return Ok(());
            }
            turn.take_shot(0, 0)?;
            let refused = turn.take_shot(1, 0).unwrap_err();
            *self.view_after_second_shot.lock().unwrap() = Some((refused, turn.opponent_view()));
            Err(refused.into())
        }
    }

    let slot = Arc::new(Mutex::new(None));
    let rules = Rules::new(10, vec![2]).unwrap();
    let shooter = DoubleShot {
        view_after_second_shot: slot.clone(),
        turns: 0,
    };
    let target = Script::placing(&[(2, 0, 0)]);
    let mut game = Game::new(rules, Box::new(shooter), Box::new(target));

    let outcome = game.play();

    let (refused, view) = slot.lock().unwrap().take().unwrap();
    assert_eq!(refused, PlayerError::NotYourTurn);
    assert_eq!(view[0][0], "2x");
    assert_eq!(view[1][0], "");
    // the refused shot is tolerated, the next turn finishes the ship
    assert_eq!(
        outcome,
        GameOutcome::Victory {
            winner: Side::First,
            turns: 3
        }
    );
}

#[test]
fn invalid_target_keeps_the_turn() {
    struct OffBoardFirst;
    impl BattleshipsAi for OffBoardFirst {
        fn place_ships(&mut self, player: &mut Player) -> anyhow::Result<()> {
            player.place_ship(1, 9, 9)?;
            Ok(())
        }

        fn take_shot(&mut self, turn: &mut Turn<'_>) -> anyhow::Result<()> {
            let refused = turn.take_shot(10, 0).unwrap_err();
            assert_eq!(refused, PlayerError::InvalidTarget { x: 10, y: 0 });
            assert!(!turn.has_shot());
            turn.take_shot(0, 0)?;
            Ok(())
        }
    }

    let rules = Rules::new(10, vec![1]).unwrap();
    let mut game = Game::new(
        rules,
        Box::new(OffBoardFirst),
        Box::new(Script::placing(&[(1, 0, 0)])),
    );
    assert_eq!(game.play().winner(), Some(Side::First));
}

#[test]
fn incomplete_fleet_forfeits() {
    let mut game = Game::new(
        Rules::default(),
        Box::new(Passive),
        Box::new(Script::placing(&[(1, 0, 0), (2, 0, 1)])),
    );
    assert_eq!(
        game.play(),
        GameOutcome::Forfeit {
            offender: Side::Second,
            fault: Fault::IncompleteFleet {
                missing: vec![3, 4, 5]
            },
        }
    );
}

/// Counts placement requests and places nothing.
struct EmptyHanded(Arc<AtomicUsize>);

impl BattleshipsAi for EmptyHanded {
    fn place_ships(&mut self, _player: &mut Player) -> anyhow::Result<()> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn both_sides_are_asked_to_place_before_anyone_forfeits() {
    let first_calls = Arc::new(AtomicUsize::new(0));
    let second_calls = Arc::new(AtomicUsize::new(0));
    let mut game = Game::new(
        Rules::default(),
        Box::new(EmptyHanded(first_calls.clone())),
        Box::new(EmptyHanded(second_calls.clone())),
    );

    let outcome = game.play();
    let missing = Fault::IncompleteFleet {
        missing: vec![1, 2, 3, 4, 5],
    };
    assert_eq!(
        outcome,
        GameOutcome::DoubleForfeit {
            first: missing.clone(),
            second: missing,
        }
    );
    assert_eq!(outcome.winner(), None);
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    assert_eq!(game.player(Side::First).state(), PlayerState::Lost);
    assert_eq!(game.player(Side::Second).state(), PlayerState::Lost);
}

#[test]
fn second_side_places_even_when_the_first_fails() {
    let calls = Arc::new(AtomicUsize::new(0));
    struct PanicOnPlacement;
    impl BattleshipsAi for PanicOnPlacement {
        fn place_ships(&mut self, _player: &mut Player) -> anyhow::Result<()> {
            panic!("no ships today")
        }
    }
    let mut game = Game::new(
        Rules::default(),
        Box::new(PanicOnPlacement),
        Box::new(EmptyHanded(calls.clone())),
    );
    assert_eq!(
        game.play(),
        GameOutcome::DoubleForfeit {
            first: Fault::Panicked("no ships today".into()),
            second: Fault::IncompleteFleet {
                missing: vec![1, 2, 3, 4, 5]
            },
        }
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn panicking_ai_forfeits() {
    let mut game = Game::new(Rules::default(), Box::new(Passive), Box::new(Panicker));
    assert_eq!(
        game.play(),
        GameOutcome::Forfeit {
            offender: Side::Second,
            fault: Fault::Panicked("lost at sea".into()),
        }
    );
}

#[test]
fn failing_ai_forfeits() {
    let mut game = Game::new(Rules::default(), Box::new(Failing), Box::new(Passive));
    match game.play() {
        GameOutcome::Forfeit {
            offender: Side::First,
            fault: Fault::Error(msg),
        } => assert!(msg.contains("radar offline")),
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn slow_callback_forfeits_once_it_returns() {
    let mut game = Game::new(
        Rules::default(),
        Box::new(Passive),
        Box::new(Sleeper(Duration::from_millis(60))),
    )
    .with_action_timeout(Duration::from_millis(20));
    match game.play() {
        GameOutcome::Forfeit {
            offender: Side::Second,
            fault:
                Fault::Timeout {
                    callback: Callback::TakeShot,
                    elapsed,
                },
        } => assert!(elapsed >= Duration::from_millis(60)),
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn passive_players_hit_the_turn_limit() {
    let rules = Rules::new(3, vec![1, 2]).unwrap();
    let limit = rules.turn_limit();
    let mut game = Game::new(rules, Box::new(Passive), Box::new(Passive));
    assert_eq!(game.play(), GameOutcome::TurnLimit { turns: limit });
    assert_eq!(game.turns(), 18);
    assert_eq!(game.player(Side::First).state(), PlayerState::Lost);
    assert_eq!(game.player(Side::Second).state(), PlayerState::Lost);
}

#[test]
fn outcomes_serialize_for_display() {
    let outcome = GameOutcome::Forfeit {
        offender: Side::Second,
        fault: Fault::Panicked("lost at sea".into()),
    };
    assert_eq!(
        serde_json::to_value(&outcome).unwrap(),
        serde_json::json!({
            "Forfeit": {"offender": "Second", "fault": {"Panicked": "lost at sea"}}
        })
    );
}

use tracing::trace;

use crate::entry::Entry;
use crate::match_runner::{MatchSettings, RunnerResult};
use std::collections::VecDeque;
use std::sync::Arc;

pub(crate) struct TournamentScheduler {
    pending_matches: VecDeque<MatchSettings>,
    max_running: usize,
    running_matches: usize,
}

impl TournamentScheduler {
    /// Matches are numbered from 1 in pairing order.
    pub fn new(pairings: Vec<(Arc<Entry>, Arc<Entry>)>, max_running: usize) -> Self {
        let pending_matches = pairings
            .into_iter()
            .enumerate()
            .map(|(i, (first, second))| MatchSettings {
                id: i + 1,
                first,
                second,
            })
            .collect();
        TournamentScheduler {
            pending_matches,
            max_running: max_running.max(1),
            running_matches: 0,
        }
    }

    /// Matches to launch now, as many as free slots allow.
    pub fn advance(&mut self) -> Vec<MatchSettings> {
        let mut matches_to_run = vec![];
        while self.running_matches < self.max_running {
            let Some(next) = self.pending_matches.pop_front() else {
                break;
            };
            matches_to_run.push(next);
            self.running_matches += 1;
        }
        trace!(
            launched = matches_to_run.len(),
            pending = self.pending_matches.len(),
            "advance"
        );
        matches_to_run
    }

    pub fn on_result(&mut self, result: &RunnerResult) -> Vec<MatchSettings> {
        trace!(game = %result.settings, "result received");
        self.running_matches = self.running_matches.saturating_sub(1);
        self.advance()
    }

    /// All matches ran and finished
    pub fn is_finished(&self) -> bool {
        self.pending_matches.is_empty() && self.running_matches == 0
    }

    /// Drop pending matches and stop waiting for running ones.
    ///
    /// Returns `(running, pending)` as they were before cancelling.
    pub fn cancel(&mut self) -> (usize, usize) {
        let counts = (self.running_matches, self.pending_matches.len());
        self.pending_matches.clear();
        self.running_matches = 0;
        counts
    }
}

#[cfg(test)]
mod scheduler_tests {
    use super::*;
    use crate::game_interface::{factory, NoOpAi};

    fn pairings(n: usize) -> Vec<(Arc<Entry>, Arc<Entry>)> {
        let a = Arc::new(Entry::new(0, "A".into(), factory(|| NoOpAi)));
        let b = Arc::new(Entry::new(1, "B".into(), factory(|| NoOpAi)));
        (0..n).map(|_| (a.clone(), b.clone())).collect()
    }

    fn result(settings: MatchSettings) -> RunnerResult {
        RunnerResult {
            settings,
            outcome: None,
        }
    }

    #[test]
    fn respects_concurrency_limit() {
        let mut scheduler = TournamentScheduler::new(pairings(5), 2);
        let first_wave = scheduler.advance();
        assert_eq!(
            first_wave.iter().map(|m| m.id).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert!(scheduler.advance().is_empty());

        let mut launched = first_wave.len();
        let mut in_flight: VecDeque<_> = first_wave.into();
        while let Some(done) = in_flight.pop_front() {
            let next = scheduler.on_result(&result(done));
            assert!(next.len() <= 1);
            launched += next.len();
            in_flight.extend(next);
        }
        assert_eq!(launched, 5);
        assert!(scheduler.is_finished());
    }

    #[test]
    fn empty_tournament_is_finished() {
        let mut scheduler = TournamentScheduler::new(vec![], 4);
        assert!(scheduler.advance().is_empty());
        assert!(scheduler.is_finished());
    }

    #[test]
    fn cancel_reports_dropped_matches() {
        let mut scheduler = TournamentScheduler::new(pairings(5), 2);
        let _ = scheduler.advance();
        assert_eq!(scheduler.cancel(), (2, 3));
        assert!(scheduler.is_finished());
    }
}

use std::collections::HashSet;

use tracing::info;

use crate::storage::{CounterField, CounterStore};
use crate::types::{ItemCounters, ItemStatistics, Tournament};

impl ItemStatistics {
    pub fn from_counters(item_id: impl Into<String>, counters: &ItemCounters) -> ItemStatistics {
        let win_rate = if counters.appearances == 0 {
            0.0
        } else {
            counters.wins as f64 / counters.appearances as f64
        };
        ItemStatistics {
            item_id: item_id.into(),
            appearances: counters.appearances,
            wins: counters.wins,
            losses: counters.losses,
            championship_wins: counters.championship_wins,
            win_rate,
        }
    }
}

/// Folds one tournament's completed matches into a counter store.
///
/// Owns the processed-match set for its tournament, so `fold` can be re-run
/// over the full match list after every vote without double-counting; only
/// matches not yet seen are applied. Bye sides never touch the counters.
pub struct StatsRecorder {
    tournament_id: String,
    processed: HashSet<String>,
    champion_recorded: bool,
}

impl StatsRecorder {
    pub fn new(tournament_id: impl Into<String>) -> StatsRecorder {
        StatsRecorder {
            tournament_id: tournament_id.into(),
            processed: HashSet::new(),
            champion_recorded: false,
        }
    }

    /// Apply every newly completed match, returning how many were folded in.
    pub fn fold(&mut self, tournament: &Tournament, store: &dyn CounterStore) -> usize {
        let mut folded = 0;
        for m in &tournament.matches {
            if !m.completed || self.processed.contains(&m.id) {
                continue;
            }
            let Some(winner) = m.winner.as_ref() else {
                continue;
            };
            store.increment(&winner.id, CounterField::Appearances, 1);
            store.increment(&winner.id, CounterField::Wins, 1);
            if let Some(loser) = m.loser() {
                if !loser.is_bye() {
                    store.increment(&loser.id, CounterField::Appearances, 1);
                    store.increment(&loser.id, CounterField::Losses, 1);
                }
            }
            self.processed.insert(m.id.clone());
            folded += 1;
        }

        if tournament.completed && !self.champion_recorded {
            if let Some(champion) = tournament.champion.as_ref() {
                store.increment(&champion.id, CounterField::ChampionshipWins, 1);
                self.champion_recorded = true;
                info!(
                    "tournament {} complete: champion {}",
                    self.tournament_id, champion.id
                );
            }
        }
        folded
    }

    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }
}

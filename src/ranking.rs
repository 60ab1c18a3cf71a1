use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::pool::normalize_title;
use crate::types::{GlobalRankingEntry, ItemStatistics};

// Score weights: breadth of exposure, consistency, and decisive wins each
// pull on a separate scale. Tunable, but keep the shape.
const PARTICIPANT_WEIGHT: f64 = 0.3;
const CONSISTENCY_WEIGHT: f64 = 0.4;
const TOURNAMENT_WEIGHT: f64 = 50.0;
const CHAMPIONSHIP_WEIGHT: f64 = 100.0;

/// One tournament's contribution to the global ranking: its per-item
/// statistics plus the tournament-level fields the fold needs.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentRankingSource {
    pub tournament_id: String,
    pub participant_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub is_public: bool,
    pub entries: Vec<RankedItemStats>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedItemStats {
    pub display_title: String,
    pub stats: ItemStatistics,
}

struct Bucket {
    display_title: String,
    total_wins: u64,
    total_losses: u64,
    total_appearances: u64,
    total_championships: u64,
    total_participants: u64,
    tournament_count: u32,
    categories: BTreeSet<String>,
}

impl Bucket {
    fn new(display_title: String) -> Bucket {
        Bucket {
            display_title,
            total_wins: 0,
            total_losses: 0,
            total_appearances: 0,
            total_championships: 0,
            total_participants: 0,
            tournament_count: 0,
            categories: BTreeSet::new(),
        }
    }
}

/// Rebuild the site-wide ranking from a full snapshot of per-tournament
/// statistics. Non-public tournaments are skipped; identically named items
/// across tournaments merge by normalized title. Pure batch recompute —
/// there is no incremental path, a full rebuild is the unit of consistency.
pub fn recompute_rankings(sources: &[TournamentRankingSource]) -> Vec<GlobalRankingEntry> {
    let mut buckets: HashMap<String, Bucket> = HashMap::new();

    for source in sources {
        if !source.is_public {
            continue;
        }
        // Tournament-level contributions (participants, tournament count,
        // category) apply once per title per tournament, even if the same
        // title occurs under several item ids in one tournament.
        let mut seen_here: HashSet<String> = HashSet::new();
        for entry in &source.entries {
            let key = normalize_title(&entry.display_title);
            if key.is_empty() {
                continue;
            }
            let bucket = buckets
                .entry(key.clone())
                .or_insert_with(|| Bucket::new(entry.display_title.trim().to_string()));
            bucket.total_wins += entry.stats.wins;
            bucket.total_losses += entry.stats.losses;
            bucket.total_appearances += entry.stats.appearances;
            bucket.total_championships += entry.stats.championship_wins;
            if seen_here.insert(key) {
                bucket.tournament_count += 1;
                bucket.total_participants += source.participant_count as u64;
                if let Some(category) = source.category.as_ref() {
                    bucket.categories.insert(category.clone());
                }
            }
        }
    }

    let mut entries: Vec<GlobalRankingEntry> = buckets
        .into_iter()
        .map(|(key, bucket)| {
            let win_rate = if bucket.total_appearances == 0 {
                0.0
            } else {
                round2(bucket.total_wins as f64 / bucket.total_appearances as f64 * 100.0)
            };
            let popularity_score = round2(
                bucket.total_participants as f64 * PARTICIPANT_WEIGHT
                    + win_rate * bucket.total_appearances as f64 * CONSISTENCY_WEIGHT
                    + bucket.tournament_count as f64 * TOURNAMENT_WEIGHT
                    + bucket.total_championships as f64 * CHAMPIONSHIP_WEIGHT,
            );
            GlobalRankingEntry {
                key,
                display_title: bucket.display_title,
                total_wins: bucket.total_wins,
                total_losses: bucket.total_losses,
                total_appearances: bucket.total_appearances,
                total_championships: bucket.total_championships,
                total_participants: bucket.total_participants,
                tournament_count: bucket.tournament_count,
                categories: bucket.categories,
                win_rate,
                popularity_score,
                rank: 0,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.popularity_score
            .partial_cmp(&a.popularity_score)
            .unwrap_or(Ordering::Equal)
            .then(
                b.win_rate
                    .partial_cmp(&a.win_rate)
                    .unwrap_or(Ordering::Equal),
            )
            .then(b.total_appearances.cmp(&a.total_appearances))
    });
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.rank = index as u32 + 1;
    }

    info!(
        "recomputed global rankings: {} entries from {} tournaments",
        entries.len(),
        sources.len()
    );
    entries
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(item_id: &str, wins: u64, losses: u64, championships: u64) -> ItemStatistics {
        let appearances = wins + losses;
        ItemStatistics {
            item_id: item_id.to_string(),
            appearances,
            wins,
            losses,
            championship_wins: championships,
            win_rate: if appearances == 0 {
                0.0
            } else {
                wins as f64 / appearances as f64
            },
        }
    }

    fn source(
        id: &str,
        participants: u32,
        category: Option<&str>,
        entries: Vec<(&str, ItemStatistics)>,
    ) -> TournamentRankingSource {
        TournamentRankingSource {
            tournament_id: id.to_string(),
            participant_count: participants,
            category: category.map(|c| c.to_string()),
            is_public: true,
            entries: entries
                .into_iter()
                .map(|(title, stats)| RankedItemStats {
                    display_title: title.to_string(),
                    stats,
                })
                .collect(),
        }
    }

    #[test]
    fn test_merges_by_normalized_title() {
        let sources = vec![
            source("t1", 8, Some("animals"), vec![(" Cat ", stats("a", 2, 1, 0))]),
            source("t2", 4, Some("pets"), vec![("cat", stats("x", 1, 1, 1))]),
        ];
        let rankings = recompute_rankings(&sources);
        assert_eq!(rankings.len(), 1);
        let entry = &rankings[0];
        assert_eq!(entry.key, "cat");
        assert_eq!(entry.display_title, "Cat");
        assert_eq!(entry.tournament_count, 2);
        assert_eq!(entry.total_wins, 3);
        assert_eq!(entry.total_losses, 2);
        assert_eq!(entry.total_appearances, 5);
        assert_eq!(entry.total_championships, 1);
        assert_eq!(entry.total_participants, 12);
        assert_eq!(
            entry.categories.iter().cloned().collect::<Vec<_>>(),
            vec!["animals", "pets"]
        );
        assert_eq!(entry.rank, 1);
    }

    #[test]
    fn test_non_public_tournaments_skipped() {
        let mut hidden = source("t1", 8, None, vec![("Cat", stats("a", 2, 0, 1))]);
        hidden.is_public = false;
        assert!(recompute_rankings(&[hidden]).is_empty());
    }

    #[test]
    fn test_popularity_formula() {
        // 10 participants, 3-1 record: win_rate 75.00,
        // popularity = 10*0.3 + 75*4*0.4 + 1*50 + 0*100 = 173.
        let sources = vec![source("t1", 10, None, vec![("Cat", stats("a", 3, 1, 0))])];
        let rankings = recompute_rankings(&sources);
        assert!((rankings[0].win_rate - 75.0).abs() < 1e-9);
        assert!((rankings[0].popularity_score - 173.0).abs() < 1e-9);
    }

    #[test]
    fn test_popularity_monotone_in_each_input() {
        let base = recompute_rankings(&[source("t1", 10, None, vec![("A", stats("a", 2, 2, 0))])]);

        let more_participants =
            recompute_rankings(&[source("t1", 20, None, vec![("A", stats("a", 2, 2, 0))])]);
        assert!(more_participants[0].popularity_score > base[0].popularity_score);

        let more_championships =
            recompute_rankings(&[source("t1", 10, None, vec![("A", stats("a", 2, 2, 3))])]);
        assert!(more_championships[0].popularity_score > base[0].popularity_score);

        let more_tournaments = recompute_rankings(&[
            source("t1", 10, None, vec![("A", stats("a", 2, 2, 0))]),
            source("t2", 0, None, vec![("A", stats("x", 0, 0, 0))]),
        ]);
        assert!(more_tournaments[0].popularity_score > base[0].popularity_score);

        let better_consistency =
            recompute_rankings(&[source("t1", 10, None, vec![("A", stats("a", 3, 1, 0))])]);
        assert!(better_consistency[0].popularity_score > base[0].popularity_score);
    }

    #[test]
    fn test_tie_break_chain() {
        // Equal popularity (250): 5-0 in 5 appearances vs 5-5 in 10.
        // win_rate 100 * 5 * 0.4 = 200 == win_rate 50 * 10 * 0.4; +50 each.
        let sources = vec![
            source("t1", 0, None, vec![("Steady", stats("a", 5, 5, 0))]),
            source("t2", 0, None, vec![("Sharp", stats("b", 5, 0, 0))]),
        ];
        let rankings = recompute_rankings(&sources);
        assert_eq!(rankings[0].display_title, "Sharp");
        assert_eq!(rankings[1].display_title, "Steady");
        assert_eq!(rankings[0].popularity_score, rankings[1].popularity_score);

        // Equal popularity and win_rate (both 0): more appearances first.
        let sources = vec![
            source("t1", 0, None, vec![("Busy", stats("a", 0, 5, 0))]),
            source("t2", 0, None, vec![("Idle", stats("b", 0, 2, 0))]),
        ];
        let rankings = recompute_rankings(&sources);
        assert_eq!(rankings[0].display_title, "Busy");
        assert_eq!(rankings[1].display_title, "Idle");
    }

    #[test]
    fn test_ranks_are_dense_and_one_based() {
        let sources = vec![source(
            "t1",
            4,
            None,
            vec![
                ("A", stats("a", 3, 0, 1)),
                ("B", stats("b", 1, 1, 0)),
                ("C", stats("c", 0, 2, 0)),
            ],
        )];
        let rankings = recompute_rankings(&sources);
        let ranks: Vec<u32> = rankings.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_duplicate_title_within_one_tournament() {
        let sources = vec![source(
            "t1",
            4,
            Some("animals"),
            vec![("Cat", stats("a", 1, 0, 0)), (" cat", stats("b", 0, 1, 0))],
        )];
        let rankings = recompute_rankings(&sources);
        assert_eq!(rankings.len(), 1);
        let entry = &rankings[0];
        // Counters sum, but the tournament itself counts once.
        assert_eq!(entry.total_appearances, 2);
        assert_eq!(entry.tournament_count, 1);
        assert_eq!(entry.total_participants, 4);
        assert_eq!(entry.categories.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(recompute_rankings(&[]).is_empty());
    }

    #[test]
    fn test_end_to_end_pipeline() {
        use crate::bracket::{build_bracket, BracketOptions};
        use crate::stats::StatsRecorder;
        use crate::storage::{CounterStore, InMemoryCounterStore};
        use crate::types::Item;

        let options = BracketOptions {
            shuffle: false,
            ..BracketOptions::default()
        };

        // Two independent tournaments that both feature a cat, under
        // different item ids and title spellings.
        let play_out = |id: &str, titles: &[&str]| {
            let items: Vec<Item> = titles
                .iter()
                .enumerate()
                .map(|(i, title)| Item::new(format!("{id}-i{i}"), *title))
                .collect();
            let mut t = build_bracket(id, items, &options).unwrap().auto_advance_byes();
            while let Some(current) = t.current_match() {
                let pick = current.item_a.clone();
                t = t.select_winner(&pick).auto_advance_byes();
            }
            t
        };

        let first = play_out("t1", &[" Cat ", "Dog", "Bird", "Fish"]);
        let second = play_out("t2", &["cat", "Hamster"]);

        let source_for = |t: &crate::types::Tournament, store: &InMemoryCounterStore| {
            TournamentRankingSource {
                tournament_id: t.id.clone(),
                participant_count: t.participant_count(),
                category: None,
                is_public: true,
                entries: store
                    .snapshot()
                    .into_iter()
                    .map(|(item_id, counters)| {
                        let title = t
                            .items
                            .iter()
                            .find(|item| item.id == item_id)
                            .map(|item| item.title.clone())
                            .unwrap_or_default();
                        RankedItemStats {
                            display_title: title,
                            stats: ItemStatistics::from_counters(item_id, &counters),
                        }
                    })
                    .collect(),
            }
        };

        let first_store = InMemoryCounterStore::new();
        StatsRecorder::new("t1").fold(&first, &first_store);
        let second_store = InMemoryCounterStore::new();
        StatsRecorder::new("t2").fold(&second, &second_store);

        let sources = vec![
            source_for(&first, &first_store),
            source_for(&second, &second_store),
        ];
        let rankings = recompute_rankings(&sources);

        let cat = rankings.iter().find(|e| e.key == "cat").unwrap();
        assert_eq!(cat.tournament_count, 2);
        assert_eq!(cat.total_participants, 6);
        // Champion of both: 2 wins in t1, 2 in t2 (bye included), no losses.
        assert_eq!(cat.total_championships, 2);
        assert_eq!(cat.total_wins, 4);
        assert_eq!(cat.total_losses, 0);
        assert_eq!(cat.rank, 1);
    }
}

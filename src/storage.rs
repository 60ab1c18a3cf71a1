use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::types::{GlobalRankingEntry, Item, ItemCounters, Match, Tournament};

// ── Ports ──────────────────────────────────────────────────────────────
//
// The engine has no wire protocol of its own; the surrounding request
// handlers reach persistence through these traits. The in-memory
// implementations below back tests and single-process embeddings.

/// Read-only supplier of a tournament's candidate list.
pub trait ItemSource: Send + Sync {
    fn items(&self, tournament_id: &str) -> Option<Vec<Item>>;
}

/// Append-only audit log of completed matches.
pub trait MatchSink: Send + Sync {
    fn record(&self, records: &[MatchRecord]);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CounterField {
    Appearances,
    Wins,
    Losses,
    ChampionshipWins,
}

/// Shared per-item counters, incremented concurrently by every live
/// bracket. Increments MUST be atomic — a read-modify-write here is a
/// lost-update race under simultaneous votes for the same item.
pub trait CounterStore: Send + Sync {
    fn increment(&self, item_id: &str, field: CounterField, delta: u64);
    fn read(&self, item_id: &str) -> ItemCounters;
    fn snapshot(&self) -> Vec<(String, ItemCounters)>;
}

/// Receives the fully recomputed ranking. Full replace, never a merge.
pub trait RankingSink: Send + Sync {
    fn replace_all(&self, entries: Vec<GlobalRankingEntry>);
    fn entries(&self) -> Vec<GlobalRankingEntry>;
}

// ── Match audit records ────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub tournament_id: String,
    pub round: u32,
    pub match_number: u32,
    pub item_a_id: String,
    pub item_b_id: String,
    pub winner_id: String,
}

impl MatchRecord {
    pub fn from_match(tournament_id: &str, m: &Match) -> Option<MatchRecord> {
        let winner = m.winner.as_ref()?;
        Some(MatchRecord {
            tournament_id: tournament_id.to_string(),
            round: m.round,
            match_number: m.match_number,
            item_a_id: m.item_a.id.clone(),
            item_b_id: m.item_b.id.clone(),
            winner_id: winner.id.clone(),
        })
    }
}

/// Audit rows for every decided match of a tournament, bye resolutions
/// included (statistics exclude byes on their own).
pub fn completed_match_records(tournament: &Tournament) -> Vec<MatchRecord> {
    tournament
        .matches
        .iter()
        .filter(|m| m.completed)
        .filter_map(|m| MatchRecord::from_match(&tournament.id, m))
        .collect()
}

// ── In-memory implementations ──────────────────────────────────────────

#[derive(Default)]
struct AtomicCounters {
    appearances: AtomicU64,
    wins: AtomicU64,
    losses: AtomicU64,
    championship_wins: AtomicU64,
}

impl AtomicCounters {
    fn cell(&self, field: CounterField) -> &AtomicU64 {
        match field {
            CounterField::Appearances => &self.appearances,
            CounterField::Wins => &self.wins,
            CounterField::Losses => &self.losses,
            CounterField::ChampionshipWins => &self.championship_wins,
        }
    }

    fn load(&self) -> ItemCounters {
        ItemCounters {
            appearances: self.appearances.load(Ordering::Relaxed),
            wins: self.wins.load(Ordering::Relaxed),
            losses: self.losses.load(Ordering::Relaxed),
            championship_wins: self.championship_wins.load(Ordering::Relaxed),
        }
    }
}

/// Counter store backed by per-item atomics. `fetch_add` makes concurrent
/// increments on the same row lost-update-free; the outer lock only guards
/// the id-to-row map.
#[derive(Default)]
pub struct InMemoryCounterStore {
    counters: RwLock<HashMap<String, Arc<AtomicCounters>>>,
}

impl InMemoryCounterStore {
    pub fn new() -> InMemoryCounterStore {
        InMemoryCounterStore::default()
    }

    fn row(&self, item_id: &str) -> Arc<AtomicCounters> {
        {
            let map = self.counters.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(found) = map.get(item_id) {
                return Arc::clone(found);
            }
        }
        let mut map = self
            .counters
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(map.entry(item_id.to_string()).or_default())
    }
}

impl CounterStore for InMemoryCounterStore {
    fn increment(&self, item_id: &str, field: CounterField, delta: u64) {
        self.row(item_id).cell(field).fetch_add(delta, Ordering::Relaxed);
    }

    fn read(&self, item_id: &str) -> ItemCounters {
        let map = self.counters.read().unwrap_or_else(PoisonError::into_inner);
        map.get(item_id)
            .map(|row| row.load())
            .unwrap_or_default()
    }

    fn snapshot(&self) -> Vec<(String, ItemCounters)> {
        let map = self.counters.read().unwrap_or_else(PoisonError::into_inner);
        map.iter().map(|(id, row)| (id.clone(), row.load())).collect()
    }
}

#[derive(Default)]
pub struct InMemoryItemSource {
    lists: Mutex<HashMap<String, Vec<Item>>>,
}

impl InMemoryItemSource {
    pub fn new() -> InMemoryItemSource {
        InMemoryItemSource::default()
    }

    pub fn insert(&self, tournament_id: impl Into<String>, items: Vec<Item>) {
        let mut lists = self.lists.lock().unwrap_or_else(PoisonError::into_inner);
        lists.insert(tournament_id.into(), items);
    }
}

impl ItemSource for InMemoryItemSource {
    fn items(&self, tournament_id: &str) -> Option<Vec<Item>> {
        let lists = self.lists.lock().unwrap_or_else(PoisonError::into_inner);
        lists.get(tournament_id).cloned()
    }
}

#[derive(Default)]
pub struct InMemoryMatchSink {
    records: Mutex<Vec<MatchRecord>>,
}

impl InMemoryMatchSink {
    pub fn new() -> InMemoryMatchSink {
        InMemoryMatchSink::default()
    }

    pub fn records(&self) -> Vec<MatchRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl MatchSink for InMemoryMatchSink {
    fn record(&self, records: &[MatchRecord]) {
        let mut stored = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        stored.extend_from_slice(records);
    }
}

#[derive(Default)]
pub struct InMemoryRankingSink {
    entries: Mutex<Vec<GlobalRankingEntry>>,
}

impl InMemoryRankingSink {
    pub fn new() -> InMemoryRankingSink {
        InMemoryRankingSink::default()
    }
}

impl RankingSink for InMemoryRankingSink {
    fn replace_all(&self, entries: Vec<GlobalRankingEntry>) {
        let mut stored = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        *stored = entries;
    }

    fn entries(&self) -> Vec<GlobalRankingEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

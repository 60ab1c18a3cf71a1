use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ── Constants ──────────────────────────────────────────────────────────

/// Title of the synthetic placeholder item used to pad brackets.
pub const BYE_TITLE: &str = "BYE";
/// Id prefix reserved for synthetic bye items.
pub const BYE_ID_PREFIX: &str = "bye-";

pub const MIN_BRACKET_SIZE: usize = 4;
pub const MAX_BRACKET_SIZE: usize = 128;

// ── Items ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Item {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Item {
        Item {
            id: id.into(),
            title: title.into(),
            image_ref: None,
            description: None,
        }
    }

    /// Synthetic bye used to pad a bracket to a power of two. Byes auto-lose
    /// every match and never enter statistics.
    pub fn bye(number: usize) -> Item {
        Item::new(format!("{BYE_ID_PREFIX}{number}"), BYE_TITLE)
    }

    pub fn is_bye(&self) -> bool {
        self.title == BYE_TITLE
    }
}

// ── Matches ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    pub round: u32,
    pub match_number: u32,
    pub item_a: Item,
    pub item_b: Item,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Item>,
    pub completed: bool,
}

impl Match {
    pub fn new(round: u32, match_number: u32, item_a: Item, item_b: Item) -> Match {
        Match {
            id: Match::id_for(round, match_number),
            round,
            match_number,
            item_a,
            item_b,
            winner: None,
            completed: false,
        }
    }

    /// Match ids are derived from position, so matches are addressable
    /// without a separate index.
    pub fn id_for(round: u32, match_number: u32) -> String {
        format!("r{round}m{match_number}")
    }

    pub fn has_side(&self, item: &Item) -> bool {
        self.item_a.id == item.id || self.item_b.id == item.id
    }

    pub fn is_bye_match(&self) -> bool {
        self.item_a.is_bye() || self.item_b.is_bye()
    }

    pub fn loser(&self) -> Option<&Item> {
        let winner = self.winner.as_ref()?;
        if self.item_a.id == winner.id {
            Some(&self.item_b)
        } else {
            Some(&self.item_a)
        }
    }
}

// ── Tournaments ────────────────────────────────────────────────────────

/// One bracket instance. The engine never mutates a tournament in place;
/// every transition clones into a new value (undo relies on this).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub is_public: bool,
    /// Padded, shuffled seeding order. Length is always a power of two.
    pub items: Vec<Item>,
    pub total_rounds: u32,
    pub current_round: u32,
    pub current_match_number: u32,
    pub matches: Vec<Match>,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub champion: Option<Item>,
}

impl Tournament {
    pub fn bracket_size(&self) -> usize {
        self.items.len()
    }

    /// Real (non-bye) participant count.
    pub fn participant_count(&self) -> u32 {
        self.items.iter().filter(|item| !item.is_bye()).count() as u32
    }

    pub fn matches_in_round(&self, round: u32) -> impl Iterator<Item = &Match> {
        self.matches.iter().filter(move |m| m.round == round)
    }

    pub fn completed_match_count(&self) -> usize {
        self.matches.iter().filter(|m| m.completed).count()
    }
}

// ── Statistics ─────────────────────────────────────────────────────────

/// Raw per-item counters as stored by a `CounterStore`. Counts only ever
/// increase for the lifetime of a tournament.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemCounters {
    pub appearances: u64,
    pub wins: u64,
    pub losses: u64,
    pub championship_wins: u64,
}

/// Per-item, per-tournament record derived from `ItemCounters`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStatistics {
    pub item_id: String,
    pub appearances: u64,
    pub wins: u64,
    pub losses: u64,
    pub championship_wins: u64,
    pub win_rate: f64,
}

// ── Global ranking ─────────────────────────────────────────────────────

/// One row of the site-wide leaderboard. Identity across tournaments is the
/// normalized display title, not the item id, so identically named items
/// from unrelated tournaments merge into one entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalRankingEntry {
    pub key: String,
    pub display_title: String,
    pub total_wins: u64,
    pub total_losses: u64,
    pub total_appearances: u64,
    pub total_championships: u64,
    pub total_participants: u64,
    pub tournament_count: u32,
    pub categories: BTreeSet<String>,
    /// 0-100 percentage.
    pub win_rate: f64,
    pub popularity_score: f64,
    /// 1-based, dense; ties do not share a rank.
    pub rank: u32,
}

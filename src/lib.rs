//! Core library of a tournament-bracket voting site: build a single-elimination
//! bracket from a list of items, record one pick at a time (with undo), and fold
//! completed matches into per-item statistics and a cross-tournament ranking.

pub mod types;
pub mod error;
pub mod pool;
pub mod bracket;
pub mod progress;
pub mod stats;
pub mod ranking;
pub mod storage;

pub use bracket::{build_bracket, BracketOptions};
pub use error::BracketError;
pub use progress::{progress_percent, round_name};
pub use ranking::{recompute_rankings, RankedItemStats, TournamentRankingSource};
pub use stats::StatsRecorder;
pub use storage::{
    completed_match_records, CounterField, CounterStore, InMemoryCounterStore, InMemoryItemSource,
    InMemoryMatchSink, InMemoryRankingSink, ItemSource, MatchRecord, MatchSink, RankingSink,
};
pub use types::{GlobalRankingEntry, Item, ItemCounters, ItemStatistics, Match, Tournament};

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::BracketError;
use crate::pool::normalize_items;
use crate::types::{Item, Match, Tournament, MAX_BRACKET_SIZE, MIN_BRACKET_SIZE};

// ── Construction options ───────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BracketOptions {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_public: bool,
    /// Explicit bracket size (power of two, 4-128). Defaults to the smallest
    /// power of two that holds the pool, minimum 4.
    pub target_size: Option<usize>,
    /// Disable to keep the caller's item order (deterministic seeding).
    pub shuffle: bool,
    /// Reproducible shuffle. Unset means a fresh thread-local RNG.
    pub seed: Option<u64>,
}

impl Default for BracketOptions {
    fn default() -> Self {
        BracketOptions {
            title: String::new(),
            description: None,
            category: None,
            is_public: true,
            target_size: None,
            shuffle: true,
            seed: None,
        }
    }
}

impl BracketOptions {
    pub fn from_json_str(raw: &str) -> Result<BracketOptions, BracketError> {
        Ok(serde_json::from_str(raw)?)
    }
}

// ── Constructor ────────────────────────────────────────────────────────

/// Build a tournament in its initial state: normalize the pool, shuffle,
/// pad with byes to a power of two, and lay out round-1 pairings.
///
/// Byes are distributed one per pairing (the last pairings each take a
/// single bye as their second side), never stacked, so no round-1 match is
/// ever bye-vs-bye. Shuffling happens before padding, so no item is
/// deterministically favored with a free first round.
pub fn build_bracket(
    id: impl Into<String>,
    items: Vec<Item>,
    options: &BracketOptions,
) -> Result<Tournament, BracketError> {
    let mut pool = normalize_items(items);
    if pool.len() < 2 {
        return Err(BracketError::TooFewItems { got: pool.len() });
    }

    let size = match options.target_size {
        Some(size) => {
            if !size.is_power_of_two() || size < MIN_BRACKET_SIZE || size > MAX_BRACKET_SIZE {
                return Err(BracketError::InvalidBracketSize { size });
            }
            if size < pool.len() {
                return Err(BracketError::UndersizedBracket {
                    size,
                    got: pool.len(),
                });
            }
            size
        }
        None => {
            let size = auto_bracket_size(pool.len());
            if size > MAX_BRACKET_SIZE {
                return Err(BracketError::InvalidBracketSize { size });
            }
            size
        }
    };

    let byes = size - pool.len();
    if byes > size / 2 {
        return Err(BracketError::DegenerateBracket {
            real: pool.len(),
            size,
        });
    }

    if options.shuffle {
        match options.seed {
            Some(seed) => pool.shuffle(&mut ChaCha8Rng::seed_from_u64(seed)),
            None => pool.shuffle(&mut rand::thread_rng()),
        }
    }

    // Seeding order: full real pairings first, then one real-vs-bye pairing
    // per remaining bye.
    let tail = pool.split_off(pool.len() - byes);
    let mut seeded = pool;
    seeded.reserve(byes * 2);
    for (i, item) in tail.into_iter().enumerate() {
        seeded.push(item);
        seeded.push(Item::bye(i + 1));
    }

    let total_rounds = size.trailing_zeros();
    let matches = seeded
        .chunks(2)
        .enumerate()
        .map(|(i, pair)| Match::new(1, i as u32 + 1, pair[0].clone(), pair[1].clone()))
        .collect::<Vec<_>>();

    let id = id.into();
    debug!(
        "built bracket {id}: size {size}, {byes} byes, {total_rounds} rounds"
    );

    Ok(Tournament {
        id,
        title: options.title.clone(),
        description: options.description.clone(),
        category: options.category.clone(),
        is_public: options.is_public,
        items: seeded,
        total_rounds,
        current_round: 1,
        current_match_number: 1,
        matches,
        completed: false,
        champion: None,
    })
}

fn auto_bracket_size(count: usize) -> usize {
    count.max(MIN_BRACKET_SIZE).next_power_of_two()
}

// ── Advancement state machine ──────────────────────────────────────────

impl Tournament {
    /// The match awaiting a decision: first incomplete match of the current
    /// round. `None` once the tournament is complete.
    pub fn current_match(&self) -> Option<&Match> {
        if self.completed {
            return None;
        }
        self.matches
            .iter()
            .find(|m| m.round == self.current_round && !m.completed)
    }

    /// Record a winner for the current match. Invalid input — no current
    /// match, or a winner that is not one of its two sides — is a no-op
    /// returning the unchanged state; callers check for no-progress instead
    /// of catching errors.
    pub fn select_winner(&self, winner: &Item) -> Tournament {
        let Some(idx) = self.current_match_index() else {
            return self.clone();
        };
        let m = &self.matches[idx];
        if !m.has_side(winner) {
            debug!(
                "ignored winner {} for match {}: not a participant",
                winner.id, m.id
            );
            return self.clone();
        }
        let chosen = if m.item_a.id == winner.id {
            m.item_a.clone()
        } else {
            m.item_b.clone()
        };
        self.with_match_completed(idx, chosen)
    }

    /// Resolve every pending match of the current round that has exactly one
    /// bye side in favor of the non-bye side, cascading into freshly built
    /// rounds. Idempotent; callers re-invoke after every `select_winner`.
    pub fn auto_advance_byes(&self) -> Tournament {
        let mut next = self.clone();
        let mut safety = 0;
        loop {
            safety += 1;
            if safety > 1000 {
                break;
            }
            let round = next.current_round;
            let Some(idx) = next.matches.iter().position(|m| {
                m.round == round
                    && !m.completed
                    && m.is_bye_match()
                    && !(m.item_a.is_bye() && m.item_b.is_bye())
            }) else {
                break;
            };
            let m = &next.matches[idx];
            let advancing = if m.item_a.is_bye() {
                m.item_b.clone()
            } else {
                m.item_a.clone()
            };
            next = next.with_match_completed(idx, advancing);
        }
        next
    }

    fn current_match_index(&self) -> Option<usize> {
        if self.completed {
            return None;
        }
        self.matches
            .iter()
            .position(|m| m.round == self.current_round && !m.completed)
    }

    fn with_match_completed(&self, idx: usize, winner: Item) -> Tournament {
        let mut next = self.clone();
        {
            let m = &mut next.matches[idx];
            m.winner = Some(winner.clone());
            m.completed = true;
        }

        let round_done = next
            .matches_in_round(next.current_round)
            .all(|m| m.completed);
        if !round_done {
            let pointer = next.current_match().map(|m| m.match_number);
            if let Some(number) = pointer {
                next.current_match_number = number;
            }
            return next;
        }

        if next.current_round == next.total_rounds {
            next.completed = true;
            next.champion = Some(winner.clone());
            debug!("bracket {} complete, champion {}", next.id, winner.id);
            return next;
        }

        // Pair the finished round's winners into the next round. Byes can
        // never win a match, but filter them anyway.
        let winners: Vec<Item> = next
            .matches_in_round(next.current_round)
            .filter_map(|m| m.winner.clone())
            .filter(|w| !w.is_bye())
            .collect();
        let round = next.current_round + 1;
        for (i, pair) in winners.chunks(2).enumerate() {
            if let [a, b] = pair {
                next.matches
                    .push(Match::new(round, i as u32 + 1, a.clone(), b.clone()));
            }
        }
        next.current_round = round;
        next.current_match_number = 1;
        debug!("bracket {} advanced to round {round}", next.id);
        next
    }

    // ── Undo ───────────────────────────────────────────────────────────

    /// Revert the most recently recorded decision and discard every round
    /// built as a consequence. Bye auto-resolutions are not decisions and
    /// are skipped (reverting one would be instantly re-applied). `None`
    /// when nothing has been decided yet. Single-step; chain calls to walk
    /// further back.
    pub fn undo_last_match(&self) -> Option<Tournament> {
        let idx = self
            .matches
            .iter()
            .rposition(|m| m.completed && !m.is_bye_match())?;
        let mut next = self.clone();
        let round = next.matches[idx].round;
        let match_number = next.matches[idx].match_number;
        next.matches[idx].winner = None;
        next.matches[idx].completed = false;
        next.matches.retain(|m| m.round <= round);
        next.current_round = round;
        next.current_match_number = match_number;
        next.completed = false;
        next.champion = None;
        Some(next)
    }
}

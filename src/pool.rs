use std::collections::HashSet;

use crate::types::{Item, BYE_TITLE};

/// Shape a raw candidate list for bracket construction: drop entries with
/// blank ids or titles, drop anything claiming the bye sentinel title, and
/// dedup by id. Identity is the id, not the title — two differently-id'd
/// items with the same title are distinct candidates. First occurrence wins
/// and the remaining order is preserved.
pub fn normalize_items(items: Vec<Item>) -> Vec<Item> {
    let mut seen: HashSet<String> = HashSet::new();
    items
        .into_iter()
        .filter(|item| !item.id.trim().is_empty() && !item.title.trim().is_empty())
        .filter(|item| item.title.trim() != BYE_TITLE)
        .filter(|item| seen.insert(item.id.clone()))
        .collect()
}

/// Cross-tournament grouping key: trimmed, case-folded title. The global
/// ranking merges by name, since the same subject shows up in independently
/// created tournaments under fresh item ids.
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

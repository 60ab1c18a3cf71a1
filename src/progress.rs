use crate::types::Tournament;

/// Human-readable round label derived from how many rounds remain.
pub fn round_name(round: u32, total_rounds: u32) -> String {
    let remaining = total_rounds.saturating_sub(round) + 1;
    match remaining {
        1 => "Final".to_string(),
        2 => "Semifinal".to_string(),
        3 => "Quarterfinal".to_string(),
        4 => "Round of 16".to_string(),
        5 => "Round of 32".to_string(),
        6 => "Round of 64".to_string(),
        _ => format!("Round of {}", 1u64 << remaining),
    }
}

/// Completion percentage over the fixed total match count of a
/// single-elimination bracket (`size - 1`), independent of byes — resolved
/// bye matches count as completed.
pub fn progress_percent(tournament: &Tournament) -> f64 {
    let total = tournament.bracket_size().saturating_sub(1);
    if total == 0 {
        return 0.0;
    }
    let completed = tournament.completed_match_count();
    completed as f64 / total as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::{build_bracket, BracketOptions};
    use crate::types::Item;

    fn build(count: usize) -> Tournament {
        let items: Vec<Item> = (0..count)
            .map(|i| Item::new(format!("i{i}"), format!("Item {i}")))
            .collect();
        let options = BracketOptions {
            shuffle: false,
            ..BracketOptions::default()
        };
        build_bracket("t1", items, &options).unwrap()
    }

    #[test]
    fn test_round_names() {
        assert_eq!(round_name(2, 2), "Final");
        assert_eq!(round_name(1, 2), "Semifinal");
        assert_eq!(round_name(1, 3), "Quarterfinal");
        assert_eq!(round_name(1, 4), "Round of 16");
        assert_eq!(round_name(1, 5), "Round of 32");
        assert_eq!(round_name(1, 6), "Round of 64");
        assert_eq!(round_name(1, 7), "Round of 128");
        assert_eq!(round_name(3, 7), "Round of 32");
    }

    #[test]
    fn test_progress_over_playout() {
        let t = build(4);
        assert_eq!(progress_percent(&t), 0.0);
        let t = t.select_winner(&t.matches[0].item_a.clone());
        assert!((progress_percent(&t) - 100.0 / 3.0).abs() < 1e-9);
        let t = t.select_winner(&t.matches[1].item_a.clone());
        let t = t.select_winner(&t.matches[2].item_a.clone());
        assert_eq!(progress_percent(&t), 100.0);
    }

    #[test]
    fn test_bye_matches_count_toward_progress() {
        let t = build(3).auto_advance_byes();
        // One of three total matches resolved by the bye.
        assert!((progress_percent(&t) - 100.0 / 3.0).abs() < 1e-9);
    }
}

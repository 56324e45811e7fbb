//! Scoring module - streaks, combo decomposition and score breakdown
//!
//! Rules:
//! - A turn "clears" when it removes at least one figure cell or blocker.
//! - The clear streak survives while fewer than `window` no-clear turns pass.
//! - Combo level = multi-group bonus (`lines + zones - 1`) + streak bonus (`streak - 1`).
//! - Plain cell score is suppressed whenever a line or zone cleared.

use crate::config::ScoringConfig;

/// Running clear-streak bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreakState {
    pub clear_streak: u32,
    pub turns_since_last_clear: u32,
}

impl StreakState {
    /// Whether a clear now would extend the current streak.
    pub fn is_alive(&self, window: u32) -> bool {
        self.clear_streak > 0 && self.turns_since_last_clear < window.max(1)
    }

    /// Streak value a clear on this turn would produce.
    pub fn next_on_clear(&self, window: u32) -> u32 {
        if self.is_alive(window) {
            self.clear_streak + 1
        } else {
            1
        }
    }

    /// Apply one turn's outcome.
    pub fn register(&mut self, had_clear: bool, window: u32) {
        let window = window.max(1);
        if had_clear {
            self.clear_streak = self.next_on_clear(window);
            self.turns_since_last_clear = 0;
        } else {
            self.turns_since_last_clear = self.turns_since_last_clear.saturating_add(1);
            if self.turns_since_last_clear >= window {
                self.clear_streak = 0;
            }
        }
    }
}

/// Combo for clearing more than one group in a single turn.
pub fn combo_from_multi(lines: u32, zones: u32) -> u32 {
    (lines + zones).saturating_sub(1)
}

/// Combo for chaining clears across turns.
pub fn combo_from_streak(had_clear: bool, streak: u32) -> u32 {
    if had_clear && streak >= 2 {
        streak - 1
    } else {
        0
    }
}

/// What was removed during one turn, as scoring sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClearCounts {
    pub cleared_cells: u32,
    pub cleared_blockers: u32,
    pub lines: u32,
    pub zones: u32,
}

/// Score calculation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreBreakdown {
    pub from_cells: u32,
    pub from_blockers: u32,
    pub from_lines: u32,
    pub from_zones: u32,
    pub combo_bonus: u32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.from_cells
            .saturating_add(self.from_blockers)
            .saturating_add(self.from_lines)
            .saturating_add(self.from_zones)
            .saturating_add(self.combo_bonus)
    }
}

/// Calculate the score breakdown for one turn. Every product saturates.
///
/// `cell_rate_override` replaces the configured per-cell rate (bombs score a
/// flat 1 per cell).
pub fn calculate_score(
    rates: &ScoringConfig,
    counts: ClearCounts,
    combo_level: u32,
    cell_rate_override: Option<u32>,
) -> ScoreBreakdown {
    let any_group = counts.lines + counts.zones > 0;
    let cell_rate = cell_rate_override.unwrap_or(rates.per_cleared_cell);

    ScoreBreakdown {
        from_cells: if any_group {
            0
        } else {
            counts.cleared_cells.saturating_mul(cell_rate)
        },
        from_blockers: counts.cleared_blockers.saturating_mul(rates.per_cleared_blocker),
        from_lines: counts.lines.saturating_mul(rates.per_line),
        from_zones: counts.zones.saturating_mul(rates.per_zone),
        combo_bonus: combo_level.saturating_mul(rates.per_combo_level),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streak_counts_up_on_consecutive_clears() {
        let mut s = StreakState::default();
        let mut seen = Vec::new();
        for _ in 0..3 {
            s.register(true, 3);
            seen.push((s.clear_streak, combo_from_streak(true, s.clear_streak)));
        }
        assert_eq!(seen, vec![(1, 0), (2, 1), (3, 2)]);
    }

    #[test]
    fn test_streak_survives_short_gaps() {
        let mut s = StreakState::default();
        s.register(true, 3);
        s.register(false, 3);
        s.register(false, 3);
        assert_eq!(s.clear_streak, 1);
        s.register(true, 3);
        assert_eq!(s.clear_streak, 2);
    }

    #[test]
    fn test_streak_resets_after_window() {
        let mut s = StreakState::default();
        s.register(true, 3);
        for _ in 0..3 {
            s.register(false, 3);
        }
        assert_eq!(s.clear_streak, 0);
        assert!(!s.is_alive(3));
        s.register(true, 3);
        assert_eq!(s.clear_streak, 1);
    }

    #[test]
    fn test_window_zero_behaves_like_one() {
        let mut s = StreakState::default();
        s.register(true, 0);
        s.register(false, 0);
        assert_eq!(s.clear_streak, 0);
    }

    #[test]
    fn test_combo_from_multi() {
        assert_eq!(combo_from_multi(0, 0), 0);
        assert_eq!(combo_from_multi(1, 0), 0);
        assert_eq!(combo_from_multi(2, 0), 1);
        assert_eq!(combo_from_multi(1, 2), 2);
    }

    #[test]
    fn test_combo_from_streak_needs_clear() {
        assert_eq!(combo_from_streak(false, 5), 0);
        assert_eq!(combo_from_streak(true, 1), 0);
        assert_eq!(combo_from_streak(true, 4), 3);
    }

    #[test]
    fn test_cell_score_suppressed_by_groups() {
        let rates = ScoringConfig::default();
        let counts = ClearCounts {
            cleared_cells: 9,
            cleared_blockers: 1,
            lines: 1,
            zones: 0,
        };
        let s = calculate_score(&rates, counts, 0, None);
        assert_eq!(s.from_cells, 0);
        assert_eq!(s.from_blockers, 5);
        assert_eq!(s.from_lines, 10);
        assert_eq!(s.total(), 15);
    }

    #[test]
    fn test_cell_rate_override() {
        let rates = ScoringConfig {
            per_cleared_cell: 4,
            ..ScoringConfig::default()
        };
        let counts = ClearCounts {
            cleared_cells: 3,
            ..ClearCounts::default()
        };
        assert_eq!(calculate_score(&rates, counts, 0, None).from_cells, 12);
        assert_eq!(calculate_score(&rates, counts, 0, Some(1)).from_cells, 3);
    }

    #[test]
    fn test_combo_bonus() {
        let rates = ScoringConfig::default();
        let counts = ClearCounts {
            lines: 2,
            zones: 1,
            ..ClearCounts::default()
        };
        let s = calculate_score(&rates, counts, 2, None);
        assert_eq!(s.from_lines, 20);
        assert_eq!(s.from_zones, 15);
        assert_eq!(s.combo_bonus, 30);
        assert_eq!(s.total(), 65);
    }

    #[test]
    fn test_huge_rates_saturate() {
        let rates = ScoringConfig {
            per_line: u32::MAX,
            per_combo_level: u32::MAX / 2,
            per_cleared_blocker: u32::MAX,
            ..ScoringConfig::default()
        };
        let counts = ClearCounts {
            lines: 2,
            cleared_blockers: 3,
            ..ClearCounts::default()
        };
        let s = calculate_score(&rates, counts, 4, None);
        assert_eq!(s.from_lines, u32::MAX);
        assert_eq!(s.from_blockers, u32::MAX);
        assert_eq!(s.combo_bonus, u32::MAX);
        assert_eq!(s.total(), u32::MAX);
    }
}

//! Move suggestion.
//!
//! Brute force: every offered shape at every legal origin is simulated on a
//! scratch copy of the board's occupancy, resolved with the same clear
//! detection as real turns, and ranked by a fixed lexicographic order. The
//! first candidate in enumeration order (slot, then y, then x) wins ties.

use std::cmp::Ordering;
use std::sync::Arc;

use block_album_core::clear::{self, ClearGrid};
use block_album_core::scoring::{self, ClearCounts};
use block_album_core::{Board, ShapeDefinition, TurnEngine};
use rand::Rng;

use crate::types::Cell;

const MASS_EPSILON: f32 = 1e-4;

/// The recommended move and the estimates that ranked it.
#[derive(Debug, Clone, PartialEq)]
pub struct HintSuggestion {
    pub slot: usize,
    pub shape: Arc<ShapeDefinition>,
    pub origin: Cell,
    pub lines_cleared: u32,
    pub zones_cleared: u32,
    pub proximity_gain: i64,
    pub leftover_cells: u32,
    pub estimated_score: u32,
    pub combo_level: u32,
    pub mass_penalty: f32,
    pub center_penalty: i32,
}

impl HintSuggestion {
    /// Board cells the suggested placement would cover.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.shape.cells().iter().map(move |&offset| self.origin + offset)
    }
}

/// Occupancy copy used for simulation.
struct FillGrid {
    size: i32,
    filled: Vec<bool>,
}

impl FillGrid {
    fn from_board(board: &Board) -> Self {
        Self {
            size: board.size(),
            filled: board.cells().map(|c| board.is_occupied(c)).collect(),
        }
    }

    fn set(&mut self, cell: Cell) {
        if cell.x >= 0 && cell.x < self.size && cell.y >= 0 && cell.y < self.size {
            self.filled[(cell.y * self.size + cell.x) as usize] = true;
        }
    }
}

impl ClearGrid for FillGrid {
    fn size(&self) -> i32 {
        self.size
    }

    fn is_filled_for_clear(&self, cell: Cell) -> bool {
        if cell.x < 0 || cell.x >= self.size || cell.y < 0 || cell.y >= self.size {
            return false;
        }
        self.filled[(cell.y * self.size + cell.x) as usize]
    }
}

/// Weight of a row, column or zone by how close it is to full.
fn group_weight(filled: i64, full: i64) -> i64 {
    match full - filled {
        0 => 1000,
        1 => 300,
        2 => 120,
        3 => 45,
        _ => filled,
    }
}

/// Sum of group weights over every row, column and zone tile (partial tiles included).
fn proximity<G: ClearGrid>(grid: &G, zone: i32) -> i64 {
    let size = grid.size();
    let count = |cells: &mut dyn Iterator<Item = Cell>| -> i64 {
        cells.filter(|&c| grid.is_filled_for_clear(c)).count() as i64
    };

    let mut total = 0;
    for i in 0..size {
        total += group_weight(count(&mut (0..size).map(|x| Cell::new(x, i))), size as i64);
        total += group_weight(count(&mut (0..size).map(|y| Cell::new(i, y))), size as i64);
    }

    let zone = zone.max(1);
    let full = (zone * zone) as i64;
    let mut zy = 0;
    while zy < size {
        let mut zx = 0;
        while zx < size {
            let y_end = (zy + zone).min(size);
            let x_end = (zx + zone).min(size);
            let mut tile = (zy..y_end).flat_map(|y| (zx..x_end).map(move |x| Cell::new(x, y)));
            total += group_weight(count(&mut tile), full);
            zx += zone;
        }
        zy += zone;
    }
    total
}

fn occupied_centroid(board: &Board) -> Option<(f32, f32)> {
    let mut n = 0usize;
    let (mut sx, mut sy) = (0i64, 0i64);
    for c in board.cells().filter(|&c| board.is_occupied(c)) {
        n += 1;
        sx += c.x as i64;
        sy += c.y as i64;
    }
    if n == 0 {
        return None;
    }
    Some((sx as f32 / n as f32, sy as f32 / n as f32))
}

/// Rank `a` against `b`; `Greater` means `a` is the better move.
fn compare(a: &HintSuggestion, b: &HintSuggestion) -> Ordering {
    let a_line = a.lines_cleared > 0;
    let b_line = b.lines_cleared > 0;
    if a_line != b_line {
        return a_line.cmp(&b_line);
    }
    if a.lines_cleared != b.lines_cleared {
        return a.lines_cleared.cmp(&b.lines_cleared);
    }
    // Gain is measured from the same pre-placement board for every candidate,
    // so comparing the post-placement proximity would add nothing.
    if !a_line && a.proximity_gain != b.proximity_gain {
        return a.proximity_gain.cmp(&b.proximity_gain);
    }
    if a.leftover_cells != b.leftover_cells {
        return b.leftover_cells.cmp(&a.leftover_cells);
    }
    if a.estimated_score != b.estimated_score {
        return a.estimated_score.cmp(&b.estimated_score);
    }
    if a.combo_level != b.combo_level {
        return a.combo_level.cmp(&b.combo_level);
    }
    if (a.mass_penalty - b.mass_penalty).abs() > MASS_EPSILON {
        return b
            .mass_penalty
            .partial_cmp(&a.mass_penalty)
            .unwrap_or(Ordering::Equal);
    }
    if a.zones_cleared != b.zones_cleared {
        return a.zones_cleared.cmp(&b.zones_cleared);
    }
    b.center_penalty.cmp(&a.center_penalty)
}

/// Find the best move for the offered shapes, or `None` if nothing fits.
pub fn suggest<R: Rng>(
    engine: &TurnEngine<R>,
    slots: &[Option<Arc<ShapeDefinition>>],
) -> Option<HintSuggestion> {
    let board = engine.board();
    let size = board.size();
    let zone = engine.zone_size();
    let rates = &engine.config().scoring;
    let streak = engine.streak();
    let window = rates.streak_window();

    let base_grid = FillGrid::from_board(board);
    let base_proximity = proximity(&base_grid, zone);
    let centroid = occupied_centroid(board);

    let mut best: Option<HintSuggestion> = None;
    for (slot, shape) in slots.iter().enumerate() {
        let Some(shape) = shape else {
            continue;
        };
        for origin in board.cells() {
            if !board.can_place(shape.cells(), origin) {
                continue;
            }

            let mut grid = FillGrid {
                size,
                filled: base_grid.filled.clone(),
            };
            let placed: Vec<Cell> = shape.cells().iter().map(|&o| origin + o).collect();
            for &c in &placed {
                grid.set(c);
            }

            let resolution = clear::resolve(&grid, zone);
            let cleared_cells = resolution
                .cells
                .iter()
                .filter(|&&c| !board.is_blocked_on_occupied(c))
                .count() as u32;
            let cleared_blockers = resolution
                .cells
                .iter()
                .filter(|&&c| board.is_blocked(c))
                .count() as u32;
            let had_clear = !resolution.is_empty();

            let next_streak = if had_clear {
                streak.next_on_clear(window)
            } else {
                0
            };
            let combo_level = scoring::combo_from_multi(resolution.lines_cleared, resolution.zones_cleared)
                + scoring::combo_from_streak(had_clear, next_streak);
            let estimated_score = scoring::calculate_score(
                rates,
                ClearCounts {
                    cleared_cells,
                    cleared_blockers,
                    lines: resolution.lines_cleared,
                    zones: resolution.zones_cleared,
                },
                combo_level,
                None,
            )
            .total();

            let leftover_cells = placed
                .iter()
                .filter(|c| !resolution.cells.contains(c))
                .count() as u32;

            let mass_penalty = match centroid {
                Some((cx, cy)) => {
                    let sum: f32 = placed
                        .iter()
                        .map(|c| (c.x as f32 - cx).abs() + (c.y as f32 - cy).abs())
                        .sum();
                    sum / placed.len().max(1) as f32
                }
                None => 0.0,
            };

            // Doubled coordinates keep the half-cell center of even boards exact.
            let center_penalty: i32 = placed
                .iter()
                .map(|c| ((2 * c.x - (size - 1)).abs() + (2 * c.y - (size - 1)).abs()) / 2)
                .sum();

            let candidate = HintSuggestion {
                slot,
                shape: Arc::clone(shape),
                origin,
                lines_cleared: resolution.lines_cleared,
                zones_cleared: resolution.zones_cleared,
                proximity_gain: proximity(&grid, zone) - base_proximity,
                leftover_cells,
                estimated_score,
                combo_level,
                mass_penalty,
                center_penalty,
            };

            let better = match &best {
                Some(current) => compare(&candidate, current) == Ordering::Greater,
                None => true,
            };
            if better {
                best = Some(candidate);
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use block_album_core::{BlockerConfig, EngineConfig, ShapeLibrary};

    fn engine() -> TurnEngine {
        let cfg = EngineConfig {
            blockers: BlockerConfig {
                enabled: false,
                ..BlockerConfig::default()
            },
            ..EngineConfig::default()
        };
        TurnEngine::new(cfg, 5).unwrap()
    }

    fn slot(id: &str) -> Option<Arc<ShapeDefinition>> {
        ShapeLibrary::global().find(id).cloned()
    }

    #[test]
    fn test_group_weights() {
        assert_eq!(group_weight(9, 9), 1000);
        assert_eq!(group_weight(8, 9), 300);
        assert_eq!(group_weight(7, 9), 120);
        assert_eq!(group_weight(6, 9), 45);
        assert_eq!(group_weight(5, 9), 5);
        assert_eq!(group_weight(0, 9), 0);
    }

    #[test]
    fn test_empty_board_proximity_is_zero() {
        let e = engine();
        assert_eq!(proximity(&FillGrid::from_board(e.board()), 3), 0);
    }

    #[test]
    fn test_no_slots_no_hint() {
        let e = engine();
        assert!(suggest(&e, &[None, None]).is_none());
    }

    #[test]
    fn test_prefers_line_clear() {
        let mut e = engine();
        // Row 4 missing only (8, 4); a dot there clears it.
        for x in 0..8 {
            assert!(e.place(&[Cell::new(0, 0)], Cell::new(x, 4)).is_some());
        }
        let hint = suggest(&e, &[slot("dot_00")]).unwrap();
        assert_eq!(hint.origin, Cell::new(8, 4));
        assert_eq!(hint.lines_cleared, 1);
        assert_eq!(hint.leftover_cells, 0);
    }

    #[test]
    fn test_suggestion_is_always_placeable() {
        let mut e = engine();
        e.place(&[Cell::new(0, 0), Cell::new(1, 0)], Cell::new(3, 3)).unwrap();
        let slots = [slot("l4_00"), slot("square2_00"), slot("line3_00")];
        let hint = suggest(&e, &slots).unwrap();
        assert!(e.can_place(hint.shape.cells(), hint.origin));
        assert_eq!(hint.cells().count(), hint.shape.len());
    }

    #[test]
    fn test_empty_board_prefers_center() {
        let e = engine();
        let hint = suggest(&e, &[slot("dot_00")]).unwrap();
        assert_eq!(hint.origin, Cell::new(4, 4));
        assert_eq!(hint.center_penalty, 0);
    }

    #[test]
    fn test_compare_line_beats_proximity() {
        let base = HintSuggestion {
            slot: 0,
            shape: slot("dot_00").unwrap(),
            origin: Cell::new(0, 0),
            lines_cleared: 0,
            zones_cleared: 0,
            proximity_gain: 5000,
            leftover_cells: 1,
            estimated_score: 0,
            combo_level: 0,
            mass_penalty: 0.0,
            center_penalty: 0,
        };
        let line = HintSuggestion {
            lines_cleared: 1,
            proximity_gain: -200,
            ..base.clone()
        };
        assert_eq!(compare(&line, &base), Ordering::Greater);

        let closer = HintSuggestion {
            mass_penalty: 0.00001,
            center_penalty: 3,
            ..base.clone()
        };
        assert_eq!(compare(&base, &closer), Ordering::Greater);
    }

    #[test]
    fn test_compare_more_lines_beats_fewer_leftover() {
        let one = HintSuggestion {
            slot: 0,
            shape: slot("dot_00").unwrap(),
            origin: Cell::new(0, 0),
            lines_cleared: 1,
            zones_cleared: 0,
            proximity_gain: 0,
            leftover_cells: 0,
            estimated_score: 40,
            combo_level: 0,
            mass_penalty: 0.0,
            center_penalty: 0,
        };
        let two = HintSuggestion {
            lines_cleared: 2,
            leftover_cells: 2,
            estimated_score: 35,
            ..one.clone()
        };
        assert_eq!(compare(&two, &one), Ordering::Greater);
        assert_eq!(compare(&one, &two), Ordering::Less);
    }

    #[test]
    fn test_suggest_prefers_double_clear() {
        let mut e = engine();
        let dot = [Cell::new(0, 0)];
        // Rows 0 and 1 miss only x = 8; row 4 misses only x = 0.
        for x in 0..8 {
            e.place(&dot, Cell::new(x, 0)).unwrap();
            e.place(&dot, Cell::new(x, 1)).unwrap();
        }
        for x in 1..9 {
            e.place(&dot, Cell::new(x, 4)).unwrap();
        }
        let hint = suggest(&e, &[slot("dot_00"), slot("line2_01")]).unwrap();
        assert_eq!(hint.lines_cleared, 2);
        assert_eq!(hint.slot, 1);
        assert_eq!(hint.origin, Cell::new(8, 0));
    }
}

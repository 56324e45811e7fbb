//! Board module - grid occupancy and blocker state
//!
//! The board is an N x N grid (N = 9 by default) stored as three flat
//! row-major arrays: `occupied` (a piece cell is present), `blocked` (an
//! obstacle is present) and `blocked_on_occupied` (both at once).
//! Coordinates: (x, y) with (0, 0) at the bottom-left, index = y * N + x.
//!
//! The board holds no scoring or turn logic. It only answers local legality
//! questions and applies the blocker interaction rule when cells are cleared.

use crate::config::ConfigError;
use crate::types::Cell;

/// Counts produced by [`Board::clear_cells_with_blocker_rules`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClearOutcome {
    pub cleared_occupied_cells: u32,
    pub cleared_blockers: u32,
    /// Figure cells that survived because a blocker on top of them was destroyed.
    pub preserved_occupied_cells: u32,
}

impl ClearOutcome {
    pub fn is_empty(&self) -> bool {
        self.cleared_occupied_cells == 0 && self.cleared_blockers == 0
    }
}

/// The game board - N x N cells using flat array storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: i32,
    occupied: Vec<bool>,
    blocked: Vec<bool>,
    blocked_on_occupied: Vec<bool>,
}

impl Board {
    /// Create a new empty board. A non-positive size is a configuration error.
    pub fn new(size: i32) -> Result<Self, ConfigError> {
        if size <= 0 {
            return Err(ConfigError::NonPositiveBoardSize(size));
        }
        let len = (size as usize) * (size as usize);
        Ok(Self {
            size,
            occupied: vec![false; len],
            blocked: vec![false; len],
            blocked_on_occupied: vec![false; len],
        })
    }

    /// Side length of the board
    pub fn size(&self) -> i32 {
        self.size
    }

    /// Number of cells on the board
    pub fn cell_count(&self) -> usize {
        self.occupied.len()
    }

    /// Calculate flat index from a cell
    #[inline(always)]
    fn index(&self, cell: Cell) -> Option<usize> {
        if !self.in_bounds(cell) {
            return None;
        }
        Some((cell.y as usize) * (self.size as usize) + (cell.x as usize))
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.size && cell.y >= 0 && cell.y < self.size
    }

    /// Check if a piece cell is present. Out of bounds is never occupied.
    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.index(cell).map_or(false, |i| self.occupied[i])
    }

    /// Check if a blocker is present. Out of bounds is never blocked.
    pub fn is_blocked(&self, cell: Cell) -> bool {
        self.index(cell).map_or(false, |i| self.blocked[i])
    }

    pub fn is_blocked_on_occupied(&self, cell: Cell) -> bool {
        self.index(cell).map_or(false, |i| self.blocked_on_occupied[i])
    }

    /// Whether the cell counts towards a full row, column or zone.
    ///
    /// Fullness counts occupancy only; a blocker on an empty cell does not fill it.
    pub fn is_filled_for_clear(&self, cell: Cell) -> bool {
        self.is_occupied(cell)
    }

    /// Set occupancy at a cell. Returns false if out of bounds.
    pub fn set_occupied(&mut self, cell: Cell, value: bool) -> bool {
        match self.index(cell) {
            Some(i) => {
                self.occupied[i] = value;
                self.refresh_flag(i);
                true
            }
            None => false,
        }
    }

    /// Put a blocker on a cell. Returns false if out of bounds.
    pub fn place_blocker(&mut self, cell: Cell) -> bool {
        self.set_blocked(cell, true)
    }

    /// Remove the blocker from a cell. Returns false if out of bounds.
    pub fn clear_blocker(&mut self, cell: Cell) -> bool {
        self.set_blocked(cell, false)
    }

    fn set_blocked(&mut self, cell: Cell, value: bool) -> bool {
        match self.index(cell) {
            Some(i) => {
                self.blocked[i] = value;
                self.refresh_flag(i);
                true
            }
            None => false,
        }
    }

    #[inline(always)]
    fn refresh_flag(&mut self, i: usize) {
        self.blocked_on_occupied[i] = self.blocked[i] && self.occupied[i];
    }

    /// Check whether every `origin + offset` cell is in bounds, empty and unblocked.
    pub fn can_place(&self, offsets: &[Cell], origin: Cell) -> bool {
        offsets.iter().all(|&offset| {
            let cell = origin + offset;
            match self.index(cell) {
                Some(i) => !self.occupied[i] && !self.blocked[i],
                None => false,
            }
        })
    }

    /// Occupy every `origin + offset` cell.
    ///
    /// Re-validates first; on failure nothing changes and false is returned.
    pub fn place(&mut self, offsets: &[Cell], origin: Cell) -> bool {
        if !self.can_place(offsets, origin) {
            return false;
        }
        for &offset in offsets {
            self.set_occupied(origin + offset, true);
        }
        true
    }

    /// Check if a row is completely occupied
    pub fn is_row_full(&self, y: i32) -> bool {
        if y < 0 || y >= self.size {
            return false;
        }
        (0..self.size).all(|x| self.is_filled_for_clear(Cell::new(x, y)))
    }

    /// Check if a column is completely occupied
    pub fn is_column_full(&self, x: i32) -> bool {
        if x < 0 || x >= self.size {
            return false;
        }
        (0..self.size).all(|y| self.is_filled_for_clear(Cell::new(x, y)))
    }

    /// Clear cells, letting a destroyed blocker protect the figure cell under it.
    ///
    /// For each in-bounds cell: a blocker is removed and counted; if it sat on a
    /// figure cell that cell stays occupied (counted as preserved). Without a
    /// blocker an occupied cell is cleared and counted.
    pub fn clear_cells_with_blocker_rules<'a, I>(&mut self, cells: I) -> ClearOutcome
    where
        I: IntoIterator<Item = &'a Cell>,
    {
        let mut outcome = ClearOutcome::default();
        for &cell in cells {
            let Some(i) = self.index(cell) else {
                continue;
            };

            if self.blocked[i] {
                let protected_figure = self.blocked_on_occupied[i];
                self.blocked[i] = false;
                self.refresh_flag(i);
                outcome.cleared_blockers += 1;
                if protected_figure {
                    outcome.preserved_occupied_cells += 1;
                    continue;
                }
            }

            if self.occupied[i] {
                self.occupied[i] = false;
                self.refresh_flag(i);
                outcome.cleared_occupied_cells += 1;
            }
        }
        outcome
    }

    /// Remove all pieces and blockers
    pub fn clear_all(&mut self) {
        self.occupied.fill(false);
        self.blocked.fill(false);
        self.blocked_on_occupied.fill(false);
    }

    /// Number of blockers currently sitting on figure cells
    pub fn count_blocked_on_occupied(&self) -> usize {
        self.blocked_on_occupied.iter().filter(|&&b| b).count()
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied.iter().filter(|&&b| b).count()
    }

    /// Iterate all cells in row-major order, bottom row first.
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let size = self.size;
        (0..size).flat_map(move |y| (0..size).map(move |x| Cell::new(x, y)))
    }

    /// All blocked cells in row-major order
    pub fn blocked_cells(&self) -> Vec<Cell> {
        self.cells().filter(|&c| self.is_blocked(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Board {
        Board::new(9).unwrap()
    }

    #[test]
    fn test_board_new_is_empty() {
        let b = board();
        assert_eq!(b.size(), 9);
        assert_eq!(b.cell_count(), 81);
        assert!(b.cells().all(|c| !b.is_occupied(c) && !b.is_blocked(c)));
    }

    #[test]
    fn test_board_rejects_non_positive_size() {
        assert_eq!(Board::new(0), Err(ConfigError::NonPositiveBoardSize(0)));
        assert_eq!(Board::new(-3), Err(ConfigError::NonPositiveBoardSize(-3)));
    }

    #[test]
    fn test_out_of_bounds_queries_are_false() {
        let mut b = board();
        assert!(!b.is_occupied(Cell::new(-1, 0)));
        assert!(!b.is_blocked(Cell::new(9, 9)));
        assert!(!b.set_occupied(Cell::new(9, 0), true));
        assert!(!b.place_blocker(Cell::new(0, -1)));
    }

    #[test]
    fn test_can_place_and_place() {
        let mut b = board();
        let shape = [Cell::new(0, 0), Cell::new(1, 0)];
        assert!(b.can_place(&shape, Cell::new(7, 0)));
        assert!(!b.can_place(&shape, Cell::new(8, 0)));

        assert!(b.place(&shape, Cell::new(3, 4)));
        assert!(b.is_occupied(Cell::new(3, 4)));
        assert!(b.is_occupied(Cell::new(4, 4)));
        assert!(!b.can_place(&shape, Cell::new(2, 4)));
    }

    #[test]
    fn test_failed_place_changes_nothing() {
        let mut b = board();
        b.place_blocker(Cell::new(1, 0));
        let before = b.clone();
        assert!(!b.place(&[Cell::new(0, 0), Cell::new(1, 0)], Cell::new(0, 0)));
        assert_eq!(b, before);
    }

    #[test]
    fn test_blocked_on_occupied_tracks_both_grids() {
        let mut b = board();
        let c = Cell::new(2, 2);
        b.set_occupied(c, true);
        assert!(!b.is_blocked_on_occupied(c));
        b.place_blocker(c);
        assert!(b.is_blocked_on_occupied(c));
        assert_eq!(b.count_blocked_on_occupied(), 1);
        b.set_occupied(c, false);
        assert!(!b.is_blocked_on_occupied(c));
        b.set_occupied(c, true);
        b.clear_blocker(c);
        assert!(!b.is_blocked_on_occupied(c));
    }

    #[test]
    fn test_row_fullness_ignores_blockers() {
        let mut b = board();
        for x in 0..8 {
            b.set_occupied(Cell::new(x, 0), true);
        }
        b.place_blocker(Cell::new(8, 0));
        assert!(!b.is_row_full(0));
        b.set_occupied(Cell::new(8, 0), true);
        assert!(b.is_row_full(0));
        assert!(!b.is_row_full(9));
    }

    #[test]
    fn test_column_full() {
        let mut b = board();
        for y in 0..9 {
            b.set_occupied(Cell::new(4, y), true);
        }
        assert!(b.is_column_full(4));
        assert!(!b.is_column_full(3));
    }

    #[test]
    fn test_clear_with_blocker_rules_preserves_figure_under_blocker() {
        let mut b = board();
        let row: Vec<Cell> = (0..9).map(|x| Cell::new(x, 0)).collect();
        for &c in &row {
            b.set_occupied(c, true);
        }
        b.place_blocker(Cell::new(4, 0));

        let outcome = b.clear_cells_with_blocker_rules(&row);
        assert_eq!(outcome.cleared_blockers, 1);
        assert_eq!(outcome.preserved_occupied_cells, 1);
        assert_eq!(outcome.cleared_occupied_cells, 8);
        assert!(b.is_occupied(Cell::new(4, 0)));
        assert!(!b.is_blocked(Cell::new(4, 0)));
        assert!(!b.is_occupied(Cell::new(3, 0)));
    }

    #[test]
    fn test_clear_removes_blocker_on_empty_cell() {
        let mut b = board();
        b.place_blocker(Cell::new(0, 0));
        let outcome = b.clear_cells_with_blocker_rules(&[Cell::new(0, 0), Cell::new(20, 0)]);
        assert_eq!(outcome.cleared_blockers, 1);
        assert_eq!(outcome.cleared_occupied_cells, 0);
        assert_eq!(outcome.preserved_occupied_cells, 0);
        assert!(!b.is_blocked(Cell::new(0, 0)));
    }

    #[test]
    fn test_clear_all() {
        let mut b = board();
        b.set_occupied(Cell::new(1, 1), true);
        b.place_blocker(Cell::new(1, 1));
        b.clear_all();
        assert_eq!(b.occupied_count(), 0);
        assert!(b.blocked_cells().is_empty());
        assert_eq!(b.count_blocked_on_occupied(), 0);
    }

    #[test]
    fn test_cells_are_row_major_from_bottom() {
        let b = Board::new(2).unwrap();
        let cells: Vec<Cell> = b.cells().collect();
        assert_eq!(
            cells,
            vec![Cell::new(0, 0), Cell::new(1, 0), Cell::new(0, 1), Cell::new(1, 1)]
        );
    }
}

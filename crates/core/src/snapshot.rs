use serde::Serialize;

use crate::board::Board;
use crate::types::Cell;

/// What a renderer should draw in one board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellState {
    #[default]
    Empty,
    Filled,
    Blocker,
    /// A blocker sitting on a figure cell.
    BlockerOnFigure,
}

/// Row-major copy of the board (bottom row first).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub struct BoardSnapshot {
    pub size: i32,
    pub cells: Vec<CellState>,
}

impl BoardSnapshot {
    pub fn from_board(board: &Board) -> Self {
        let cells = board
            .cells()
            .map(|c| match (board.is_occupied(c), board.is_blocked(c)) {
                (true, true) => CellState::BlockerOnFigure,
                (false, true) => CellState::Blocker,
                (true, false) => CellState::Filled,
                (false, false) => CellState::Empty,
            })
            .collect();
        Self {
            size: board.size(),
            cells,
        }
    }

    pub fn get(&self, cell: Cell) -> Option<CellState> {
        if cell.x < 0 || cell.x >= self.size || cell.y < 0 || cell.y >= self.size {
            return None;
        }
        self.cells
            .get((cell.y * self.size + cell.x) as usize)
            .copied()
    }

    /// Whether a shape fits at `origin` on this copy of the board.
    pub fn can_place(&self, shape: &[Cell], origin: Cell) -> bool {
        shape
            .iter()
            .all(|&offset| self.get(origin + offset) == Some(CellState::Empty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_maps_cell_states() {
        let mut board = Board::new(3).unwrap();
        board.set_occupied(Cell::new(0, 0), true);
        board.place_blocker(Cell::new(1, 0));
        board.set_occupied(Cell::new(2, 0), true);
        board.place_blocker(Cell::new(2, 0));

        let snap = BoardSnapshot::from_board(&board);
        assert_eq!(snap.get(Cell::new(0, 0)), Some(CellState::Filled));
        assert_eq!(snap.get(Cell::new(1, 0)), Some(CellState::Blocker));
        assert_eq!(snap.get(Cell::new(2, 0)), Some(CellState::BlockerOnFigure));
        assert_eq!(snap.get(Cell::new(0, 1)), Some(CellState::Empty));
        assert_eq!(snap.get(Cell::new(3, 0)), None);
    }

    #[test]
    fn test_snapshot_can_place_matches_board() {
        let mut board = Board::new(4).unwrap();
        board.place_blocker(Cell::new(1, 1));
        let snap = BoardSnapshot::from_board(&board);
        let shape = [Cell::new(0, 0), Cell::new(1, 0)];
        for origin in board.cells() {
            assert_eq!(snap.can_place(&shape, origin), board.can_place(&shape, origin));
        }
    }
}

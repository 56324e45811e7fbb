//! Clear resolution - which cells a turn removes
//!
//! A pure scan over any [`ClearGrid`]: full rows, then full columns, then
//! non-overlapping `zone x zone` tiles starting at (0, 0). A trailing partial
//! tile is never checked. The same scan runs on the live board and on the
//! scratch grids the hint search simulates with.

use std::collections::BTreeSet;

use crate::board::Board;
use crate::types::Cell;

/// Read-only view of a square grid for clear detection.
pub trait ClearGrid {
    fn size(&self) -> i32;
    fn is_filled_for_clear(&self, cell: Cell) -> bool;
}

impl ClearGrid for Board {
    fn size(&self) -> i32 {
        Board::size(self)
    }

    fn is_filled_for_clear(&self, cell: Cell) -> bool {
        Board::is_filled_for_clear(self, cell)
    }
}

/// Cells to clear plus the group counts that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClearResolution {
    pub cells: BTreeSet<Cell>,
    /// Full rows plus full columns.
    pub lines_cleared: u32,
    pub zones_cleared: u32,
}

impl ClearResolution {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Resolve which cells clear on `grid`. `zone_size` is floored at 1.
pub fn resolve<G: ClearGrid + ?Sized>(grid: &G, zone_size: i32) -> ClearResolution {
    let size = grid.size();
    let zone = zone_size.max(1);
    let mut out = ClearResolution::default();

    for y in 0..size {
        if (0..size).all(|x| grid.is_filled_for_clear(Cell::new(x, y))) {
            out.lines_cleared += 1;
            out.cells.extend((0..size).map(|x| Cell::new(x, y)));
        }
    }

    for x in 0..size {
        if (0..size).all(|y| grid.is_filled_for_clear(Cell::new(x, y))) {
            out.lines_cleared += 1;
            out.cells.extend((0..size).map(|y| Cell::new(x, y)));
        }
    }

    let mut zy = 0;
    while zy + zone <= size {
        let mut zx = 0;
        while zx + zone <= size {
            let tile = || (zy..zy + zone).flat_map(move |y| (zx..zx + zone).map(move |x| Cell::new(x, y)));
            if tile().all(|c| grid.is_filled_for_clear(c)) {
                out.zones_cleared += 1;
                out.cells.extend(tile());
            }
            zx += zone;
        }
        zy += zone;
    }

    out
}

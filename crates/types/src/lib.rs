//! Core types module - shared data structures and constants
//!
//! This crate defines the value types passed between the rules engine, the
//! match session and the terminal front-end. Everything here is plain data:
//! no randomness, no I/O, no board state.
//!
//! # Coordinates
//!
//! The board is always square. A [`Cell`] is an `(x, y)` pair with `(0, 0)`
//! at the logical bottom-left corner, `x` growing to the right and `y` growing
//! upwards. Out-of-bounds cells are representable (shape offsets are added to
//! arbitrary origins) and every board query treats them as absent.
//!
//! # Defaults
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_BOARD_SIZE` | 9 | Side length of the square board |
//! | `DEFAULT_ZONE_SIZE` | 3 | Side length of a clearable zone tile |
//! | `DEFAULT_TRAY_SLOTS` | 3 | Shapes offered to the player at once |
//! | `FULL_POOL_TIER` | 13 | Variety tier that returns the whole shape library |
//!
//! # Examples
//!
//! ```
//! use block_album_types::{BombKind, Cell, TurnResult};
//!
//! let origin = Cell::new(2, 3);
//! assert_eq!(origin + Cell::new(1, 0), Cell::new(3, 3));
//! assert_eq!(BombKind::from_str("area"), Some(BombKind::Area3x3));
//! assert!(!TurnResult::default().placement_succeeded);
//! ```

use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Default board side length.
pub const DEFAULT_BOARD_SIZE: i32 = 9;

/// Default zone tile side length.
pub const DEFAULT_ZONE_SIZE: i32 = 3;

/// Default number of tray slots.
pub const DEFAULT_TRAY_SLOTS: usize = 3;

/// Lowest variety tier.
pub const MIN_VARIETY_TIER: i32 = 1;

/// Highest weighted variety tier. Tiers above this return the full library.
pub const MAX_WEIGHTED_TIER: i32 = 12;

/// Variety tier that returns the full, unweighted shape library.
pub const FULL_POOL_TIER: i32 = 13;

/// A grid coordinate (or a shape offset).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev (king-move) distance.
    pub fn chebyshev(self, other: Cell) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Manhattan distance.
    pub fn manhattan(self, other: Cell) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl Add for Cell {
    type Output = Cell;

    fn add(self, rhs: Cell) -> Cell {
        Cell::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Self {
        Cell::new(x, y)
    }
}

/// Direct-clear bomb variants.
///
/// - **Horizontal**: clears the whole row of the target
/// - **Vertical**: clears the whole column of the target
/// - **Area3x3**: clears the 3x3 neighbourhood around the target, clipped to the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BombKind {
    Horizontal,
    Vertical,
    Area3x3,
}

impl BombKind {
    /// Parse bomb kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use block_album_types::BombKind;
    ///
    /// assert_eq!(BombKind::from_str("H"), Some(BombKind::Horizontal));
    /// assert_eq!(BombKind::from_str("vertical"), Some(BombKind::Vertical));
    /// assert_eq!(BombKind::from_str("nuke"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "h" | "horizontal" => Some(BombKind::Horizontal),
            "v" | "vertical" => Some(BombKind::Vertical),
            "area" | "area3x3" => Some(BombKind::Area3x3),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BombKind::Horizontal => "horizontal",
            BombKind::Vertical => "vertical",
            BombKind::Area3x3 => "area3x3",
        }
    }
}

/// What produced a [`TurnResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnSource {
    /// Board was reset; the result carries no turn.
    #[default]
    Reset,
    /// A shape was placed from the tray.
    Placement,
    /// A booster bomb cleared cells directly.
    Bomb(BombKind),
}

/// Immutable record of one resolved turn.
///
/// Produced by the rules engine and consumed by observers (HUD feed, goal
/// tracking). `total_score` and `power_charge` are the running values after
/// the turn; `turn` is the turn counter after the turn was consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TurnResult {
    pub source: TurnSource,
    pub placement_succeeded: bool,
    pub placed_cells: u32,
    pub cleared_cells: u32,
    pub cleared_blockers: u32,
    pub preserved_cells: u32,
    pub lines_cleared: u32,
    pub zones_cleared: u32,
    pub combo_level: u32,
    pub combo_from_multi: u32,
    pub combo_from_streak: u32,
    pub clear_streak: u32,
    pub score_gained: u32,
    pub score_from_cells: u32,
    pub score_from_blockers: u32,
    pub score_from_lines: u32,
    pub score_from_zones: u32,
    pub combo_bonus: u32,
    pub total_score: u32,
    pub power_gained: u32,
    pub power_charge: u32,
    pub power_max: u32,
    pub turn: u32,
}

impl TurnResult {
    /// Whether anything was removed from the board this turn.
    pub fn had_clear(&self) -> bool {
        self.cleared_cells > 0 || self.cleared_blockers > 0
    }

    /// Line and zone groups cleared together.
    pub fn groups_cleared(&self) -> u32 {
        self.lines_cleared + self.zones_cleared
    }
}

/// Player commands produced by the input layer.
///
/// These commands are used by the terminal front-end and by tests that drive a
/// session without a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    /// Move the board cursor by one cell
    MoveCursor { dx: i32, dy: i32 },
    /// Select a tray slot (0-based)
    SelectSlot(usize),
    /// Place the selected shape at the cursor
    Place,
    /// Trigger a bomb at the cursor
    Bomb(BombKind),
    /// Replace every tray shape (swap booster)
    Swap,
    /// Show the suggested move
    Hint,
    /// Use the once-per-run second chance after a loss
    SecondChance,
    /// Start the next run (advancing the level after a win)
    NextRun,
    /// Restart the current level
    Restart,
}

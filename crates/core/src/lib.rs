//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains the rules of the block-placement puzzle: board state,
//! placement legality, line/zone clearing, scoring, combo and streak
//! accounting, power charge, and the blocker lifecycle. It has **no
//! dependencies** on rendering, input, or I/O, making it:
//!
//! - **Deterministic**: a seed fully determines blocker placement and tray draws
//! - **Testable**: every rule is covered by unit tests next to the code
//! - **Portable**: the terminal front-end is only one possible caller
//!
//! # Module Structure
//!
//! - [`board`]: N x N occupancy and blocker grids with the blocker clear rule
//! - [`clear`]: full row / column / zone detection over any [`clear::ClearGrid`]
//! - [`shapes`]: canonical shape library and weighted variety-tier pools
//! - [`scoring`]: streak bookkeeping, combo decomposition and score breakdown
//! - [`blockers`]: blocker spawn, drift, destruction and respawn
//! - [`engine`]: [`TurnEngine`], one atomic turn per command plus listeners
//! - [`tray`]: the shapes currently offered to the player
//! - [`goals`]: score goals and level progression
//! - [`config`]: serde-backed configuration with validation
//! - [`snapshot`]: renderer-facing board copies
//!
//! # Game Rules
//!
//! - **Placement**: a shape fits when every cell is in bounds, empty and unblocked
//! - **Clears**: full rows, full columns and aligned 3x3 zones clear together
//! - **Blockers**: destroying a blocker protects the figure cell beneath it
//! - **Combos**: several groups in one turn, or clears on consecutive turns
//! - **Power**: combo levels charge power, which boosters spend
//!
//! # Example
//!
//! ```
//! use block_album_core::{EngineConfig, TurnEngine};
//! use block_album_types::Cell;
//!
//! let mut engine = TurnEngine::new(EngineConfig::default(), 12345).unwrap();
//! let dot = [Cell::new(0, 0)];
//! let origin = engine
//!     .board()
//!     .cells()
//!     .find(|&c| engine.can_place(&dot, c))
//!     .unwrap();
//!
//! let result = engine.place(&dot, origin).unwrap();
//! assert!(result.placement_succeeded);
//! assert_eq!(engine.turn_count(), 1);
//! ```

pub mod blockers;
pub mod board;
pub mod clear;
pub mod config;
pub mod engine;
pub mod goals;
pub mod scoring;
pub mod shapes;
pub mod snapshot;
pub mod tray;

pub use block_album_types as types;

// Re-export commonly used types for convenience
pub use blockers::{Blocker, BlockerField};
pub use board::{Board, ClearOutcome};
pub use clear::{resolve as resolve_clears, ClearGrid, ClearResolution};
pub use config::{BlockerConfig, ConfigError, EngineConfig, PowerConfig, ScoringConfig};
pub use engine::{EngineEvent, ListenerId, RuntimeState, TurnEngine};
pub use goals::{GoalTracker, LevelConfig, LevelProgression, ProgressionConfig};
pub use scoring::{calculate_score, ClearCounts, ScoreBreakdown, StreakState};
pub use shapes::{ShapeDefinition, ShapeLibrary};
pub use snapshot::{BoardSnapshot, CellState};
pub use tray::{PieceTray, DEFAULT_REFILL_ATTEMPTS};

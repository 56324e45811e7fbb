//! Engine configuration.
//!
//! Every option has a default matching the shipped game balance. All structs
//! deserialize with `#[serde(default)]` so a partial JSON document only
//! overrides the keys it names.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{DEFAULT_BOARD_SIZE, DEFAULT_ZONE_SIZE};

/// Configuration problems detected before a match starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("board size must be positive, got {0}")]
    NonPositiveBoardSize(i32),
    #[error("piece tray needs at least one slot")]
    EmptyTray,
    #[error("level {index} is invalid: {reason}")]
    InvalidLevel { index: usize, reason: String },
}

/// Score rates and streak window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub per_cleared_cell: u32,
    pub per_cleared_blocker: u32,
    pub per_line: u32,
    pub per_zone: u32,
    pub per_combo_level: u32,
    /// No-clear turns after which the clear streak is lost. Values below 1 act as 1.
    pub streak_reset_on_no_clear_turn: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            per_cleared_cell: 1,
            per_cleared_blocker: 5,
            per_line: 10,
            per_zone: 15,
            per_combo_level: 15,
            streak_reset_on_no_clear_turn: 3,
        }
    }
}

impl ScoringConfig {
    /// Streak window, floored at 1.
    pub fn streak_window(&self) -> u32 {
        self.streak_reset_on_no_clear_turn.max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerConfig {
    pub max: u32,
    pub per_combo_level: u32,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            max: 100,
            per_combo_level: 20,
        }
    }
}

/// Blocker lifecycle tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockerConfig {
    pub enabled: bool,
    pub count: u32,
    pub move_every_turns: u32,
    pub respawn_delay_turns: u32,
    /// How many blockers may sit on figure cells at the same time.
    pub max_on_figure_cells: u32,
    /// 0 disables the separation rule.
    pub min_chebyshev_distance: i32,
}

impl Default for BlockerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            count: 2,
            move_every_turns: 2,
            respawn_delay_turns: 10,
            max_on_figure_cells: 1,
            min_chebyshev_distance: 0,
        }
    }
}

/// Rules engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub board_size: i32,
    pub zone_size: i32,
    pub scoring: ScoringConfig,
    pub power: PowerConfig,
    pub blockers: BlockerConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            zone_size: DEFAULT_ZONE_SIZE,
            scoring: ScoringConfig::default(),
            power: PowerConfig::default(),
            blockers: BlockerConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_size <= 0 {
            return Err(ConfigError::NonPositiveBoardSize(self.board_size));
        }
        Ok(())
    }

    /// Zone tile size, floored at 1.
    pub fn effective_zone_size(&self) -> i32 {
        self.zone_size.max(1)
    }
}

//! Goals and level progression
//!
//! [`GoalTracker`] watches turn results and completes once the running score
//! reaches the target. [`LevelProgression`] derives each level's target score
//! and shape variety tier from an explicit level table or a generation rule.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::types::{TurnResult, FULL_POOL_TIER, MAX_WEIGHTED_TIER, MIN_VARIETY_TIER};

/// Default score target for a run.
pub const DEFAULT_TARGET_SCORE: u32 = 1200;

/// Score-target goal for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalTracker {
    base_target: u32,
    target: u32,
    completed: bool,
    last_observed_turn: u32,
}

impl GoalTracker {
    pub fn new(target_score: u32) -> Self {
        let target = target_score.max(1);
        Self {
            base_target: target,
            target,
            completed: false,
            last_observed_turn: 0,
        }
    }

    pub fn target_score(&self) -> u32 {
        self.target
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Restore the base target and clear completion.
    pub fn reset(&mut self) {
        self.target = self.base_target;
        self.completed = false;
        self.last_observed_turn = 0;
    }

    /// Set the target; with `update_base` it also survives later resets.
    pub fn set_target_score(&mut self, value: u32, update_base: bool) {
        self.target = value.max(1);
        if update_base {
            self.base_target = self.target;
        }
    }

    /// Score goals have no turn limit, so extra turns are never granted.
    pub fn grant_extra_turns(&mut self, _turns: u32) -> bool {
        false
    }

    /// Feed a resolved turn. Returns true if the goal completed on this turn.
    pub fn observe(&mut self, result: &TurnResult) -> bool {
        if self.completed || !result.placement_succeeded {
            return false;
        }
        if result.turn <= self.last_observed_turn {
            return false;
        }
        self.last_observed_turn = result.turn;

        if result.total_score >= self.target {
            self.completed = true;
            info!(
                "goal reached on turn {}: {}/{}",
                result.turn, result.total_score, self.target
            );
            return true;
        }
        false
    }

    pub fn status_label(&self, score: u32) -> String {
        format!("Score {}/{}", score.min(self.target), self.target)
    }
}

impl Default for GoalTracker {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_SCORE)
    }
}

/// One explicit level entry. A `variety_tier` of 0 means "derive from the ramp".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub target_score: u32,
    #[serde(default)]
    pub variety_tier: i32,
}

/// Level table or generation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    pub levels: Vec<LevelConfig>,
    pub generated_level_count: u32,
    pub generated_start_target_score: u32,
    pub generated_step_target_score: u32,
    /// Every level uses the first level's target.
    pub use_fixed_target_score: bool,
    pub variety_increase_every_levels: u32,
    pub full_pool_starts_at_level: u32,
    pub loop_after_last_level: bool,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            levels: Vec::new(),
            generated_level_count: 40,
            generated_start_target_score: 1000,
            generated_step_target_score: 0,
            use_fixed_target_score: true,
            variety_increase_every_levels: 2,
            full_pool_starts_at_level: 25,
            loop_after_last_level: false,
        }
    }
}

impl ProgressionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, level) in self.levels.iter().enumerate() {
            if level.target_score == 0 {
                return Err(ConfigError::InvalidLevel {
                    index,
                    reason: "target score must be positive".to_string(),
                });
            }
            if level.variety_tier > FULL_POOL_TIER {
                warn!(
                    "level {} variety tier {} above {}, clamping",
                    index, level.variety_tier, FULL_POOL_TIER
                );
            }
        }
        Ok(())
    }
}

/// Current position in the level sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelProgression {
    config: ProgressionConfig,
    current_index: usize,
}

impl LevelProgression {
    pub fn new(config: ProgressionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            current_index: 0,
        })
    }

    pub fn config(&self) -> &ProgressionConfig {
        &self.config
    }

    pub fn level_count(&self) -> usize {
        if self.config.levels.is_empty() {
            self.config.generated_level_count.max(1) as usize
        } else {
            self.config.levels.len()
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// 1-based level number.
    pub fn current_level_number(&self) -> usize {
        self.current_index + 1
    }

    pub fn current_target_score(&self) -> u32 {
        self.target_score_for(self.current_index)
    }

    pub fn current_variety_tier(&self) -> i32 {
        self.variety_tier_for(self.current_index)
    }

    pub fn target_score_for(&self, index: usize) -> u32 {
        let cfg = &self.config;
        let target = if cfg.use_fixed_target_score {
            cfg.levels
                .first()
                .map_or(cfg.generated_start_target_score, |l| l.target_score)
        } else if let Some(level) = cfg.levels.get(index) {
            level.target_score
        } else {
            cfg.generated_start_target_score
                .saturating_add(cfg.generated_step_target_score.saturating_mul(index as u32))
        };
        target.max(1)
    }

    pub fn variety_tier_for(&self, index: usize) -> i32 {
        if let Some(level) = self.config.levels.get(index) {
            if level.variety_tier > 0 {
                return level.variety_tier.clamp(MIN_VARIETY_TIER, FULL_POOL_TIER);
            }
        }
        self.ramp_tier(index + 1)
    }

    fn ramp_tier(&self, level_number: usize) -> i32 {
        let full_from = self.config.full_pool_starts_at_level.max(2) as usize;
        if level_number >= full_from {
            return FULL_POOL_TIER;
        }
        let every = self.config.variety_increase_every_levels.max(1) as usize;
        let tier = 1 + (level_number.saturating_sub(1) / every) as i32;
        tier.clamp(MIN_VARIETY_TIER, MAX_WEIGHTED_TIER)
    }

    /// Step to the next level; wraps or holds at the end.
    pub fn advance(&mut self) {
        let last = self.level_count() - 1;
        if self.current_index < last {
            self.current_index += 1;
        } else if self.config.loop_after_last_level {
            self.current_index = 0;
        }
    }

    /// Decide the level for the next run.
    pub fn prepare_for_new_run(&mut self, previous_was_win: bool) {
        if previous_was_win {
            self.advance();
            info!(
                "advancing to level {}/{}",
                self.current_level_number(),
                self.level_count()
            );
        }
    }

    pub fn level_label(&self) -> String {
        format!("Level {}/{}", self.current_level_number(), self.level_count())
    }

    pub fn variety_label(&self) -> String {
        match self.current_variety_tier() {
            t if t >= FULL_POOL_TIER => "Pool FULL".to_string(),
            t => format!("Pool T{}", t),
        }
    }
}

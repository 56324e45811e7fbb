//! Match session: one run of the puzzle on top of a [`TurnEngine`].
//!
//! The session owns the tray, the score goal, level progression and booster
//! charges. It never listens to the engine; after each command it reads the
//! engine's last turn result and re-evaluates the run state.

use std::sync::Arc;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use block_album_core::{
    BoardSnapshot, ConfigError, EngineConfig, GoalTracker, LevelProgression, PieceTray,
    ProgressionConfig, ShapeDefinition, ShapeLibrary, TurnEngine, DEFAULT_REFILL_ATTEMPTS,
};

use crate::boosters::{BoosterConfig, BoosterKind, BoosterStatus, Boosters};
use crate::error::SessionError;
use crate::hint::{self, HintSuggestion};
use crate::types::{BombKind, Cell, TurnResult, DEFAULT_TRAY_SLOTS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub engine: EngineConfig,
    pub progression: ProgressionConfig,
    pub boosters: BoosterConfig,
    pub tray_slots: usize,
    pub refill_attempts: usize,
    pub second_chance_enabled: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            progression: ProgressionConfig::default(),
            boosters: BoosterConfig::default(),
            tray_slots: DEFAULT_TRAY_SLOTS,
            refill_attempts: DEFAULT_REFILL_ATTEMPTS,
            second_chance_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossReason {
    NoValidMoves,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Playing,
    Won,
    Lost(LossReason),
}

impl RunState {
    pub fn is_playing(self) -> bool {
        self == RunState::Playing
    }
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub board: BoardSnapshot,
    pub zone_size: i32,
    pub tray: Vec<Option<Arc<ShapeDefinition>>>,
    pub score: u32,
    pub power_charge: u32,
    pub power_max: u32,
    pub turn_count: u32,
    pub turns_until_blocker_move: u32,
    pub target_score: u32,
    pub goal_label: String,
    pub level_label: String,
    pub variety_label: String,
    pub boosters: [BoosterStatus; 4],
    pub run_state: RunState,
    pub second_chance_available: bool,
    pub last_turn: TurnResult,
}

#[derive(Debug)]
pub struct MatchSession {
    config: SessionConfig,
    engine: TurnEngine,
    tray: PieceTray,
    goal: GoalTracker,
    progression: LevelProgression,
    boosters: Boosters,
    run_state: RunState,
    second_chance_used: bool,
}

impl MatchSession {
    /// Start the first run at level 1.
    pub fn new(config: SessionConfig, seed: u64) -> Result<Self, ConfigError> {
        let progression = LevelProgression::new(config.progression.clone())?;
        let mut engine = TurnEngine::new(config.engine.clone(), seed)?;
        let pool = ShapeLibrary::global().pool_for_variety_tier(progression.current_variety_tier());
        let mut tray = PieceTray::new(config.tray_slots, pool)?;
        let goal = GoalTracker::new(progression.current_target_score());
        let boosters = Boosters::new(config.boosters.clone());

        let (board, rng) = engine.board_and_rng();
        tray.refill_until_any_valid_move(board, rng, config.refill_attempts);

        let mut session = Self {
            config,
            engine,
            tray,
            goal,
            progression,
            boosters,
            run_state: RunState::Playing,
            second_chance_used: false,
        };
        info!(
            "session started: seed {}, {}, target {}",
            seed,
            session.progression.level_label(),
            session.goal.target_score()
        );
        session.evaluate();
        Ok(session)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn engine(&self) -> &TurnEngine {
        &self.engine
    }

    /// Mutable engine access, e.g. to subscribe listeners.
    pub fn engine_mut(&mut self) -> &mut TurnEngine {
        &mut self.engine
    }

    pub fn tray(&self) -> &PieceTray {
        &self.tray
    }

    pub fn goal(&self) -> &GoalTracker {
        &self.goal
    }

    pub fn progression(&self) -> &LevelProgression {
        &self.progression
    }

    pub fn boosters(&self) -> &Boosters {
        &self.boosters
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn second_chance_available(&self) -> bool {
        self.config.second_chance_enabled
            && !self.second_chance_used
            && matches!(self.run_state, RunState::Lost(_))
    }

    fn ensure_playing(&self) -> Result<(), SessionError> {
        if self.run_state.is_playing() {
            Ok(())
        } else {
            Err(SessionError::RunOver)
        }
    }

    fn slot_shape(&self, slot: usize) -> Result<Arc<ShapeDefinition>, SessionError> {
        if slot >= self.tray.slot_count() {
            return Err(SessionError::SlotOutOfRange(slot));
        }
        self.tray
            .slot(slot)
            .cloned()
            .ok_or(SessionError::SlotEmpty(slot))
    }

    // --- commands ---

    /// Place the shape from a tray slot with its anchor at `origin`.
    pub fn place_from_tray(&mut self, slot: usize, origin: Cell) -> Result<TurnResult, SessionError> {
        self.ensure_playing()?;
        let shape = self.slot_shape(slot)?;
        let result = self
            .engine
            .place(shape.cells(), origin)
            .ok_or(SessionError::IllegalPlacement)?;

        self.tray.consume(slot, self.engine.rng_mut());
        self.after_turn(&result);
        Ok(result)
    }

    /// Fire a bomb booster at `target`.
    pub fn use_bomb(&mut self, kind: BombKind, target: Cell) -> Result<TurnResult, SessionError> {
        self.ensure_playing()?;
        let booster = BoosterKind::Bomb(kind);
        let cost = self.boosters.check(booster, self.engine.power_charge())?;
        if !self.engine.bomb_would_affect(kind, target) {
            return Err(SessionError::NothingToClear);
        }
        if !self.engine.spend_power(cost) {
            return Err(SessionError::InsufficientPower {
                needed: cost,
                available: self.engine.power_charge(),
            });
        }

        let result = self
            .engine
            .apply_bomb(kind, target)
            .ok_or(SessionError::NothingToClear)?;
        self.boosters.consume(booster);
        debug!("{} used at ({}, {}), cost {}", booster.label(), target.x, target.y, cost);
        self.after_turn(&result);
        Ok(result)
    }

    /// Spend the swap booster to redraw every tray slot.
    pub fn swap_tray(&mut self) -> Result<(), SessionError> {
        self.ensure_playing()?;
        let cost = self
            .boosters
            .check(BoosterKind::Swap, self.engine.power_charge())?;
        if !self.engine.spend_power(cost) {
            return Err(SessionError::InsufficientPower {
                needed: cost,
                available: self.engine.power_charge(),
            });
        }
        self.tray.refill(self.engine.rng_mut());
        self.boosters.consume(BoosterKind::Swap);
        debug!("tray swapped, cost {}", cost);
        self.evaluate();
        Ok(())
    }

    /// Best move for the current tray. Only offered once a turn has been played.
    pub fn suggest_hint(&self) -> Option<HintSuggestion> {
        if !self.run_state.is_playing() || self.engine.turn_count() == 0 {
            return None;
        }
        hint::suggest(&self.engine, self.tray.slots())
    }

    /// Revive a lost run once: redraw the tray, opening a cell if nothing fits.
    /// A failed attempt leaves the second chance available.
    pub fn try_second_chance(&mut self) -> Result<(), SessionError> {
        if !self.second_chance_available() {
            return Err(SessionError::SecondChanceUnavailable);
        }

        let attempts = self.config.refill_attempts;
        let (board, rng) = self.engine.board_and_rng();
        let mut found = self.tray.refill_until_any_valid_move(board, rng, attempts);
        if !found && self.engine.force_open_cell().is_some() {
            let (board, rng) = self.engine.board_and_rng();
            found = self.tray.refill_until_any_valid_move(board, rng, attempts);
        }

        if !found {
            info!("second chance failed: no move after opening a cell");
            return Err(SessionError::SecondChanceUnavailable);
        }
        info!("second chance used");
        self.second_chance_used = true;
        self.run_state = RunState::Playing;
        self.evaluate();
        Ok(())
    }

    /// Start the same level over.
    pub fn restart(&mut self) {
        self.engine.clear_board();
        let (board, rng) = self.engine.board_and_rng();
        self.tray
            .refill_until_any_valid_move(board, rng, self.config.refill_attempts);
        self.goal.reset();
        self.boosters.reset();
        self.second_chance_used = false;
        self.run_state = RunState::Playing;
        info!(
            "run restarted: {}, target {}",
            self.progression.level_label(),
            self.goal.target_score()
        );
        self.evaluate();
    }

    /// Apply progression for the finished run and begin the next one.
    pub fn start_next_run(&mut self) {
        let won = self.run_state == RunState::Won;
        self.progression.prepare_for_new_run(won);
        self.goal
            .set_target_score(self.progression.current_target_score(), true);
        let tier = self.progression.current_variety_tier();
        self.tray
            .set_pool(ShapeLibrary::global().pool_for_variety_tier(tier));
        self.restart();
    }

    fn after_turn(&mut self, result: &TurnResult) {
        self.goal.observe(result);
        self.evaluate();
    }

    /// Update the run state from the goal and the tray.
    fn evaluate(&mut self) {
        if !self.run_state.is_playing() {
            return;
        }
        if self.goal.is_completed() {
            self.run_state = RunState::Won;
            info!(
                "run won with {} points on turn {}",
                self.engine.score(),
                self.engine.turn_count()
            );
        } else if !self.tray.has_any_valid_move(self.engine.board()) {
            self.run_state = RunState::Lost(LossReason::NoValidMoves);
            info!(
                "run lost: no valid moves, {} points on turn {}",
                self.engine.score(),
                self.engine.turn_count()
            );
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let power = self.engine.power_charge();
        SessionSnapshot {
            board: self.engine.board_snapshot(),
            zone_size: self.engine.zone_size(),
            tray: self.tray.slots().to_vec(),
            score: self.engine.score(),
            power_charge: power,
            power_max: self.engine.power_max(),
            turn_count: self.engine.turn_count(),
            turns_until_blocker_move: self.engine.turns_until_blocker_move(),
            target_score: self.goal.target_score(),
            goal_label: self.goal.status_label(self.engine.score()),
            level_label: self.progression.level_label(),
            variety_label: self.progression.variety_label(),
            boosters: self.boosters.statuses(power),
            run_state: self.run_state,
            second_chance_available: self.second_chance_available(),
            last_turn: *self.engine.last_turn_result(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use block_album_core::BlockerConfig;

    fn quiet_config() -> SessionConfig {
        let mut cfg = SessionConfig::default();
        cfg.engine.blockers = BlockerConfig {
            enabled: false,
            ..BlockerConfig::default()
        };
        cfg
    }

    fn session() -> MatchSession {
        MatchSession::new(quiet_config(), 42).unwrap()
    }

    fn lib_shape(id: &str) -> Arc<ShapeDefinition> {
        Arc::clone(ShapeLibrary::global().find(id).unwrap())
    }

    #[test]
    fn test_new_session_is_playing_with_full_tray() {
        let s = session();
        assert_eq!(s.run_state(), RunState::Playing);
        assert_eq!(s.tray().slot_count(), 3);
        assert!(s.tray().slots().iter().all(Option::is_some));
        assert_eq!(s.goal().target_score(), 1000);
        assert!(!s.second_chance_available());
    }

    #[test]
    fn test_place_from_tray_consumes_slot() {
        let mut s = session();
        s.tray.set_slot(0, lib_shape("dot_00"));
        let result = s.place_from_tray(0, Cell::new(0, 0)).unwrap();
        assert!(result.placement_succeeded);
        assert_eq!(result.placed_cells, 1);
        assert!(s.engine().is_occupied(Cell::new(0, 0)));
        assert!(s.tray().slot(0).is_some());
        assert_eq!(s.snapshot().last_turn, result);
    }

    #[test]
    fn test_place_rejections_leave_state() {
        let mut s = session();
        assert_eq!(
            s.place_from_tray(9, Cell::new(0, 0)),
            Err(SessionError::SlotOutOfRange(9))
        );
        s.tray.set_slot(0, lib_shape("line3_00"));
        assert_eq!(
            s.place_from_tray(0, Cell::new(8, 0)),
            Err(SessionError::IllegalPlacement)
        );
        assert_eq!(s.engine().turn_count(), 0);
    }

    #[test]
    fn test_bomb_needs_power() {
        let mut s = session();
        s.tray.set_slot(0, lib_shape("dot_00"));
        s.place_from_tray(0, Cell::new(4, 4)).unwrap();
        assert_eq!(
            s.use_bomb(BombKind::Area3x3, Cell::new(4, 4)),
            Err(SessionError::InsufficientPower {
                needed: 30,
                available: 0
            })
        );
        assert!(s.engine().is_occupied(Cell::new(4, 4)));
    }

    #[test]
    fn test_swap_without_power_is_refused() {
        let mut s = session();
        let before: Vec<_> = s.tray().slots().to_vec();
        assert!(matches!(
            s.swap_tray(),
            Err(SessionError::InsufficientPower { needed: 50, .. })
        ));
        assert_eq!(s.tray().slots(), &before[..]);
    }

    #[test]
    fn test_hint_needs_a_played_turn() {
        let mut s = session();
        assert!(s.suggest_hint().is_none());
        s.tray.set_slot(0, lib_shape("dot_00"));
        s.place_from_tray(0, Cell::new(0, 0)).unwrap();
        let hint = s.suggest_hint().unwrap();
        assert!(s.engine().can_place(hint.shape.cells(), hint.origin));
    }

    #[test]
    fn test_goal_completion_wins_and_blocks_commands() {
        let mut cfg = quiet_config();
        cfg.progression.generated_start_target_score = 1;
        let mut s = MatchSession::new(cfg, 1).unwrap();
        // A full row is the quickest way to score.
        for x in 0..9 {
            s.tray.set_slot(0, lib_shape("dot_00"));
            s.place_from_tray(0, Cell::new(x, 0)).unwrap();
        }
        assert_eq!(s.run_state(), RunState::Won);
        s.tray.set_slot(0, lib_shape("dot_00"));
        assert_eq!(
            s.place_from_tray(0, Cell::new(0, 5)),
            Err(SessionError::RunOver)
        );

        s.start_next_run();
        assert_eq!(s.progression().current_level_number(), 2);
        assert_eq!(s.run_state(), RunState::Playing);
        assert_eq!(s.engine().score(), 0);
    }

    #[test]
    fn test_loss_and_second_chance() {
        let mut s = session();
        // A checkerboard never completes a line or zone, and no 2x2 square fits in it.
        for c in s.engine().board().cells().collect::<Vec<_>>() {
            if (c.x + c.y) % 2 == 0 {
                assert!(s.engine.place(&[Cell::new(0, 0)], c).is_some());
            }
        }
        assert_eq!(s.engine().score(), 0);
        let square = lib_shape("square2_00");
        for i in 0..3 {
            s.tray.set_slot(i, Arc::clone(&square));
        }
        s.tray.set_pool(&[Arc::clone(&square)]);
        s.evaluate();
        assert_eq!(s.run_state(), RunState::Lost(LossReason::NoValidMoves));
        assert!(s.second_chance_available());
        assert!(s.snapshot().second_chance_available);

        // Opening one cell still leaves a filled diagonal in every 2x2 window.
        let filled = s.engine().board().occupied_count();
        assert_eq!(
            s.try_second_chance(),
            Err(SessionError::SecondChanceUnavailable)
        );
        assert_eq!(s.engine().board().occupied_count(), filled - 1);
        assert_eq!(s.run_state(), RunState::Lost(LossReason::NoValidMoves));

        // A failed attempt does not spend it; the player may try again.
        assert!(s.second_chance_available());
        assert!(s.snapshot().second_chance_available);

        s.restart();
        assert_eq!(s.run_state(), RunState::Playing);
        s.tray.set_slot(0, lib_shape("dot_00"));
        assert!(s.place_from_tray(0, Cell::new(0, 0)).is_ok());
        assert_eq!(
            s.try_second_chance(),
            Err(SessionError::SecondChanceUnavailable)
        );
    }

    #[test]
    fn test_second_chance_revives_run() {
        let mut s = session();
        s.tray.set_pool(&[lib_shape("dot_00")]);
        for c in s.engine().board().cells().collect::<Vec<_>>() {
            if (c.x + c.y) % 2 == 0 {
                s.engine.place(&[Cell::new(0, 0)], c);
            }
        }
        // The run is lost with a tray of squares; dots in the pool revive it.
        let square = lib_shape("square2_00");
        for i in 0..3 {
            s.tray.set_slot(i, Arc::clone(&square));
        }
        s.evaluate();
        assert!(matches!(s.run_state(), RunState::Lost(_)));
        assert_eq!(s.try_second_chance(), Ok(()));
        assert_eq!(s.run_state(), RunState::Playing);
        assert_eq!(
            s.try_second_chance(),
            Err(SessionError::SecondChanceUnavailable)
        );
    }

    #[test]
    fn test_restart_resets_run() {
        let mut s = session();
        s.tray.set_slot(0, lib_shape("dot_00"));
        s.place_from_tray(0, Cell::new(1, 1)).unwrap();
        s.restart();
        assert_eq!(s.engine().turn_count(), 0);
        assert_eq!(s.engine().board().occupied_count(), 0);
        assert_eq!(s.run_state(), RunState::Playing);
        assert_eq!(s.progression().current_level_number(), 1);
    }

    #[test]
    fn test_partial_session_json() {
        let cfg: SessionConfig =
            serde_json::from_str(r#"{"tray_slots":2,"engine":{"board_size":7}}"#).unwrap();
        assert_eq!(cfg.tray_slots, 2);
        assert_eq!(cfg.engine.board_size, 7);
        assert!(cfg.second_chance_enabled);
        let s = MatchSession::new(cfg, 3).unwrap();
        assert_eq!(s.snapshot().tray.len(), 2);
    }
}

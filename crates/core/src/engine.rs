//! Turn engine - one match worth of board, score, streak, power and blockers
//!
//! Every public command is a single atomic turn: it either fully resolves or
//! is rejected before any mutation. A resolved turn produces an immutable
//! [`TurnResult`], stored as the last result and delivered to every
//! registered listener as [`EngineEvent::TurnResolved`], followed by
//! [`EngineEvent::RuntimeStateChanged`].
//!
//! Randomness (blocker spawn, drift and respawn, tray draws by the owner)
//! comes from one generator owned by the engine. With the default
//! `ChaCha8Rng` a seed fully determines a match.

use std::collections::BTreeSet;
use std::fmt;

use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::blockers::BlockerField;
use crate::board::{Board, ClearOutcome};
use crate::clear;
use crate::config::{ConfigError, EngineConfig};
use crate::scoring::{self, ClearCounts, StreakState};
use crate::snapshot::BoardSnapshot;
use crate::types::{BombKind, Cell, TurnResult, TurnSource};

/// Score, power and turn counters outside of a full turn result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuntimeState {
    pub score: u32,
    pub power_charge: u32,
    pub power_max: u32,
    pub turn_count: u32,
    pub turns_until_blocker_move: u32,
}

/// Notifications delivered to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    TurnResolved(TurnResult),
    RuntimeStateChanged(RuntimeState),
}

/// Handle returned by [`TurnEngine::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&EngineEvent)>;

/// Inputs to a single turn resolution.
#[derive(Debug, Clone, Copy)]
struct TurnInput {
    source: TurnSource,
    placed_cells: u32,
    lines: u32,
    zones: u32,
    outcome: ClearOutcome,
    consume_turn: bool,
    grant_power: bool,
    cell_rate_override: Option<u32>,
}

/// The rules engine for one match.
pub struct TurnEngine<R = ChaCha8Rng> {
    config: EngineConfig,
    board: Board,
    blockers: BlockerField,
    rng: R,
    score: u32,
    turn_count: u32,
    streak: StreakState,
    power_charge: u32,
    last_result: TurnResult,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener_id: u64,
}

impl TurnEngine<ChaCha8Rng> {
    /// Create an engine seeded with `seed`. Blockers are spawned immediately.
    pub fn new(config: EngineConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> TurnEngine<R> {
    /// Create an engine with an injected generator.
    pub fn with_rng(config: EngineConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let board = Board::new(config.board_size)?;
        let blockers = BlockerField::new(config.blockers.clone());
        let mut engine = Self {
            config,
            board,
            blockers,
            rng,
            score: 0,
            turn_count: 0,
            streak: StreakState::default(),
            power_charge: 0,
            last_result: TurnResult::default(),
            listeners: Vec::new(),
            next_listener_id: 0,
        };
        engine.blockers.spawn_initial(&mut engine.board, &mut engine.rng);
        Ok(engine)
    }

    // --- queries ---

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_size(&self) -> i32 {
        self.board.size()
    }

    pub fn zone_size(&self) -> i32 {
        self.config.effective_zone_size()
    }

    pub fn blockers(&self) -> &BlockerField {
        &self.blockers
    }

    pub fn can_place(&self, shape: &[Cell], origin: Cell) -> bool {
        self.board.can_place(shape, origin)
    }

    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.board.is_occupied(cell)
    }

    pub fn is_blocked(&self, cell: Cell) -> bool {
        self.board.is_blocked(cell)
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn power_charge(&self) -> u32 {
        self.power_charge
    }

    pub fn power_max(&self) -> u32 {
        self.config.power.max
    }

    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    pub fn streak(&self) -> StreakState {
        self.streak
    }

    pub fn turns_until_blocker_move(&self) -> u32 {
        self.blockers.turns_until_move(self.turn_count)
    }

    pub fn last_turn_result(&self) -> &TurnResult {
        &self.last_result
    }

    pub fn runtime_state(&self) -> RuntimeState {
        RuntimeState {
            score: self.score,
            power_charge: self.power_charge,
            power_max: self.config.power.max,
            turn_count: self.turn_count,
            turns_until_blocker_move: self.turns_until_blocker_move(),
        }
    }

    pub fn board_snapshot(&self) -> BoardSnapshot {
        BoardSnapshot::from_board(&self.board)
    }

    /// The engine's generator, shared with the owner for tray draws.
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Board plus generator, for callers that draw against the current board.
    pub fn board_and_rng(&mut self) -> (&Board, &mut R) {
        (&self.board, &mut self.rng)
    }

    // --- observers ---

    /// Register a listener for turn and runtime-state events.
    pub fn subscribe(&mut self, listener: impl FnMut(&EngineEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    fn emit(&mut self, event: EngineEvent) {
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }

    fn publish_runtime_state(&mut self) {
        let state = self.runtime_state();
        self.emit(EngineEvent::RuntimeStateChanged(state));
    }

    // --- commands ---

    /// Place a shape and resolve the turn. `None` if the placement is illegal.
    pub fn place(&mut self, shape: &[Cell], origin: Cell) -> Option<TurnResult> {
        if !self.board.place(shape, origin) {
            return None;
        }

        let resolution = clear::resolve(&self.board, self.zone_size());
        let mut outcome = ClearOutcome::default();
        if !resolution.is_empty() {
            outcome = self.board.clear_cells_with_blocker_rules(&resolution.cells);
            self.blockers.mark_destroyed(&resolution.cells);
        }

        Some(self.resolve_turn(TurnInput {
            source: TurnSource::Placement,
            placed_cells: shape.len() as u32,
            lines: resolution.lines_cleared,
            zones: resolution.zones_cleared,
            outcome,
            consume_turn: true,
            grant_power: true,
            cell_rate_override: None,
        }))
    }

    /// Cells a bomb would hit, clipped to the board. `None` for an
    /// out-of-range row or column.
    pub fn bomb_cells(&self, kind: BombKind, target: Cell) -> Option<BTreeSet<Cell>> {
        let size = self.board.size();
        match kind {
            BombKind::Horizontal => {
                if target.y < 0 || target.y >= size {
                    return None;
                }
                Some((0..size).map(|x| Cell::new(x, target.y)).collect())
            }
            BombKind::Vertical => {
                if target.x < 0 || target.x >= size {
                    return None;
                }
                Some((0..size).map(|y| Cell::new(target.x, y)).collect())
            }
            BombKind::Area3x3 => Some(
                (-1..=1)
                    .flat_map(|dy| (-1..=1).map(move |dx| target + Cell::new(dx, dy)))
                    .filter(|&c| self.board.in_bounds(c))
                    .collect(),
            ),
        }
    }

    /// Whether a bomb at `target` would clear anything.
    pub fn bomb_would_affect(&self, kind: BombKind, target: Cell) -> bool {
        self.bomb_cells(kind, target).map_or(false, |cells| {
            cells
                .iter()
                .any(|&c| self.board.is_occupied(c) || self.board.is_blocked(c))
        })
    }

    /// Clear a full row. See [`TurnEngine::apply_bomb`].
    pub fn apply_bomb_horizontal(&mut self, row: i32) -> Option<TurnResult> {
        self.apply_bomb(BombKind::Horizontal, Cell::new(0, row))
    }

    /// Clear a full column. See [`TurnEngine::apply_bomb`].
    pub fn apply_bomb_vertical(&mut self, column: i32) -> Option<TurnResult> {
        self.apply_bomb(BombKind::Vertical, Cell::new(column, 0))
    }

    /// Clear the 3x3 neighbourhood of `center`. See [`TurnEngine::apply_bomb`].
    pub fn apply_bomb_area(&mut self, center: Cell) -> Option<TurnResult> {
        self.apply_bomb(BombKind::Area3x3, center)
    }

    /// Direct clear. Scores a flat 1 per cell, consumes a turn, never grants
    /// power. `None` (state unchanged) if the target is out of range or
    /// nothing would be cleared. Power is not checked here.
    pub fn apply_bomb(&mut self, kind: BombKind, target: Cell) -> Option<TurnResult> {
        let cells = self.bomb_cells(kind, target)?;
        if cells.is_empty() {
            return None;
        }

        let outcome = self.board.clear_cells_with_blocker_rules(&cells);
        if outcome.is_empty() {
            return None;
        }
        self.blockers.mark_destroyed(&cells);

        Some(self.resolve_turn(TurnInput {
            source: TurnSource::Bomb(kind),
            placed_cells: 0,
            lines: 0,
            zones: 0,
            outcome,
            consume_turn: true,
            grant_power: false,
            cell_rate_override: Some(1),
        }))
    }

    /// Spend power. Zero always succeeds; insufficient power changes nothing.
    pub fn spend_power(&mut self, amount: u32) -> bool {
        if amount == 0 {
            return true;
        }
        if self.power_charge < amount {
            return false;
        }
        self.power_charge -= amount;
        self.publish_runtime_state();
        true
    }

    /// Reset the match: empty board, zero counters, fresh blockers.
    pub fn clear_board(&mut self) {
        self.board.clear_all();
        self.score = 0;
        self.turn_count = 0;
        self.streak = StreakState::default();
        self.power_charge = 0;
        self.blockers.spawn_initial(&mut self.board, &mut self.rng);

        self.last_result = TurnResult::default();
        let result = self.last_result;
        self.emit(EngineEvent::TurnResolved(result));
        self.publish_runtime_state();
    }

    /// Open one random filled cell (figure or blocker) without resolving a turn.
    pub fn force_open_cell(&mut self) -> Option<Cell> {
        let candidates: Vec<Cell> = self
            .board
            .cells()
            .filter(|&c| self.board.is_occupied(c) || self.board.is_blocked(c))
            .collect();
        if candidates.is_empty() {
            return None;
        }

        let cell = candidates[self.rng.gen_range(0..candidates.len())];
        if self.board.is_blocked(cell) {
            self.board.clear_blocker(cell);
            self.blockers.mark_destroyed_at(cell);
        }
        self.board.set_occupied(cell, false);
        debug!("force-opened cell ({}, {})", cell.x, cell.y);
        Some(cell)
    }

    fn resolve_turn(&mut self, input: TurnInput) -> TurnResult {
        let window = self.config.scoring.streak_window();
        let had_clear = !input.outcome.is_empty();
        self.streak.register(had_clear, window);

        let combo_from_multi = scoring::combo_from_multi(input.lines, input.zones);
        let combo_from_streak = scoring::combo_from_streak(had_clear, self.streak.clear_streak);
        let combo_level = combo_from_multi + combo_from_streak;

        let counts = ClearCounts {
            cleared_cells: input.outcome.cleared_occupied_cells,
            cleared_blockers: input.outcome.cleared_blockers,
            lines: input.lines,
            zones: input.zones,
        };
        let breakdown = scoring::calculate_score(
            &self.config.scoring,
            counts,
            combo_level,
            input.cell_rate_override,
        );
        let score_gained = breakdown.total();
        self.score = self.score.saturating_add(score_gained);

        let power_max = self.config.power.max;
        let mut power_gained = 0;
        if input.grant_power {
            power_gained = combo_level.saturating_mul(self.config.power.per_combo_level);
            self.power_charge = self.power_charge.saturating_add(power_gained).min(power_max);
        }

        let mut result = TurnResult {
            source: input.source,
            placement_succeeded: true,
            placed_cells: input.placed_cells,
            cleared_cells: input.outcome.cleared_occupied_cells,
            cleared_blockers: input.outcome.cleared_blockers,
            preserved_cells: input.outcome.preserved_occupied_cells,
            lines_cleared: input.lines,
            zones_cleared: input.zones,
            combo_level,
            combo_from_multi,
            combo_from_streak,
            clear_streak: self.streak.clear_streak,
            score_gained,
            score_from_cells: breakdown.from_cells,
            score_from_blockers: breakdown.from_blockers,
            score_from_lines: breakdown.from_lines,
            score_from_zones: breakdown.from_zones,
            combo_bonus: breakdown.combo_bonus,
            total_score: self.score,
            power_gained,
            power_charge: self.power_charge,
            power_max,
            turn: self.turn_count,
        };

        if input.consume_turn {
            self.turn_count += 1;
            self.blockers
                .tick_movement(&mut self.board, self.turn_count, &mut self.rng);
            self.blockers.tick_respawns(&mut self.board, &mut self.rng);
            result.turn = self.turn_count;
        }

        debug!(
            "turn {} resolved: {:?} lines={} zones={} combo={} +{} (total {})",
            result.turn,
            result.source,
            result.lines_cleared,
            result.zones_cleared,
            result.combo_level,
            result.score_gained,
            result.total_score
        );

        self.last_result = result;
        self.emit(EngineEvent::TurnResolved(result));
        self.publish_runtime_state();
        result
    }
}

impl<R> fmt::Debug for TurnEngine<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TurnEngine")
            .field("board_size", &self.board.size())
            .field("score", &self.score)
            .field("turn_count", &self.turn_count)
            .field("streak", &self.streak)
            .field("power_charge", &self.power_charge)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

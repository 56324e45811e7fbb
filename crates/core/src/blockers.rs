//! Blocker lifecycle - spawn, drift, destruction and respawn
//!
//! Blockers are obstacles that sit on board cells. They spawn at match start,
//! drift one step (8-neighbourhood) every few turns preferring figure cells,
//! are destroyed when a clear covers them, and respawn after a cooldown.
//!
//! Every target cell goes through the same legality check, see
//! [`BlockerField::can_use_target`]. When no legal cell exists the fallback is
//! always "stay in place" (movement) or "stay inactive" (spawn/respawn).

use std::collections::{BTreeSet, HashSet};

use arrayvec::ArrayVec;
use log::{debug, trace};
use rand::Rng;

use crate::board::Board;
use crate::config::BlockerConfig;
use crate::types::Cell;

/// Neighbour offsets in scan order.
pub const NEIGHBOUR_OFFSETS: [Cell; 8] = [
    Cell::new(-1, -1),
    Cell::new(0, -1),
    Cell::new(1, -1),
    Cell::new(-1, 0),
    Cell::new(1, 0),
    Cell::new(-1, 1),
    Cell::new(0, 1),
    Cell::new(1, 1),
];

/// A single obstacle. `position` is `Some` exactly while the blocker is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Blocker {
    pub position: Option<Cell>,
    pub cooldown_turns: u32,
}

impl Blocker {
    pub fn is_active(&self) -> bool {
        self.position.is_some()
    }
}

/// The engine-owned set of blockers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockerField {
    config: BlockerConfig,
    blockers: Vec<Blocker>,
}

impl BlockerField {
    pub fn new(config: BlockerConfig) -> Self {
        Self {
            config,
            blockers: Vec::new(),
        }
    }

    pub fn config(&self) -> &BlockerConfig {
        &self.config
    }

    pub fn blockers(&self) -> &[Blocker] {
        &self.blockers
    }

    pub fn active_count(&self) -> usize {
        self.blockers.iter().filter(|b| b.is_active()).count()
    }

    /// Remove every blocker from the board and spawn a fresh set.
    ///
    /// A blocker that finds no legal cell stays inactive with cooldown 0, so
    /// the next respawn tick retries it.
    pub fn spawn_initial<R: Rng + ?Sized>(&mut self, board: &mut Board, rng: &mut R) {
        for cell in board.blocked_cells() {
            board.clear_blocker(cell);
        }
        self.blockers.clear();

        if !self.config.enabled {
            return;
        }

        let count = (self.config.count as usize).min(board.cell_count());
        let no_reservations = HashSet::new();
        for _ in 0..count {
            let mut blocker = Blocker::default();
            if let Some(cell) = self.random_cell(board, &no_reservations, rng) {
                board.place_blocker(cell);
                blocker.position = Some(cell);
            }
            self.blockers.push(blocker);
        }
        debug!(
            "spawned {}/{} blockers",
            self.active_count(),
            self.blockers.len()
        );
    }

    /// Deactivate every blocker whose cell was cleared.
    ///
    /// The board cell itself is cleared by the board's clear rules; this only
    /// updates the lifecycle state and starts the respawn cooldown.
    pub fn mark_destroyed(&mut self, cleared: &BTreeSet<Cell>) {
        let cooldown = self.config.respawn_delay_turns + 1;
        for blocker in &mut self.blockers {
            if let Some(pos) = blocker.position {
                if cleared.contains(&pos) {
                    blocker.position = None;
                    blocker.cooldown_turns = cooldown;
                    debug!("blocker at ({}, {}) destroyed", pos.x, pos.y);
                }
            }
        }
    }

    /// Deactivate the blocker at `cell`, if any.
    pub fn mark_destroyed_at(&mut self, cell: Cell) {
        let cleared: BTreeSet<Cell> = [cell].into_iter().collect();
        self.mark_destroyed(&cleared);
    }

    /// Whether blockers move on the given (already incremented) turn count.
    pub fn should_move(&self, turn_count: u32) -> bool {
        self.config.enabled
            && self.config.move_every_turns > 0
            && turn_count % self.config.move_every_turns == 0
    }

    /// Turns until the next movement tick; 0 when blockers never move.
    pub fn turns_until_move(&self, turn_count: u32) -> u32 {
        let every = self.config.move_every_turns;
        if !self.config.enabled || every == 0 {
            return 0;
        }
        match turn_count % every {
            0 => every,
            m => every - m,
        }
    }

    /// Move every active blocker one step if this turn is a movement turn.
    pub fn tick_movement<R: Rng + ?Sized>(&mut self, board: &mut Board, turn_count: u32, rng: &mut R) {
        if !self.should_move(turn_count) {
            return;
        }

        let no_reservations = HashSet::new();
        for i in 0..self.blockers.len() {
            let Some(current) = self.blockers[i].position else {
                continue;
            };
            board.clear_blocker(current);

            let mut onto_figure: ArrayVec<Cell, 8> = ArrayVec::new();
            let mut onto_empty: ArrayVec<Cell, 8> = ArrayVec::new();
            for offset in NEIGHBOUR_OFFSETS {
                let candidate = current + offset;
                if !self.can_use_target(board, candidate, &no_reservations) {
                    continue;
                }
                if board.is_occupied(candidate) {
                    onto_figure.push(candidate);
                } else {
                    onto_empty.push(candidate);
                }
            }

            let next = if !onto_figure.is_empty() {
                onto_figure[rng.gen_range(0..onto_figure.len())]
            } else if !onto_empty.is_empty() {
                onto_empty[rng.gen_range(0..onto_empty.len())]
            } else {
                current
            };

            board.place_blocker(next);
            self.blockers[i].position = Some(next);
            trace!(
                "blocker moved ({}, {}) -> ({}, {})",
                current.x,
                current.y,
                next.x,
                next.y
            );
        }
    }

    /// Count down inactive blockers and respawn those whose cooldown ran out.
    pub fn tick_respawns<R: Rng + ?Sized>(&mut self, board: &mut Board, rng: &mut R) {
        if !self.config.enabled {
            return;
        }

        let mut reserved: HashSet<Cell> = self.blockers.iter().filter_map(|b| b.position).collect();

        for i in 0..self.blockers.len() {
            if self.blockers[i].is_active() {
                continue;
            }
            let blocker = &mut self.blockers[i];
            if blocker.cooldown_turns > 0 {
                blocker.cooldown_turns -= 1;
            }
            if blocker.cooldown_turns > 0 {
                continue;
            }

            match self.random_cell(board, &reserved, rng) {
                Some(cell) => {
                    board.place_blocker(cell);
                    reserved.insert(cell);
                    self.blockers[i].position = Some(cell);
                    debug!("blocker respawned at ({}, {})", cell.x, cell.y);
                }
                None => trace!("no legal respawn cell, blocker stays inactive"),
            }
        }
    }

    /// Shared legality rule for spawn, movement and respawn targets.
    pub fn can_use_target(&self, board: &Board, candidate: Cell, reserved: &HashSet<Cell>) -> bool {
        if !board.in_bounds(candidate) || board.is_blocked(candidate) || reserved.contains(&candidate) {
            return false;
        }

        if board.is_occupied(candidate)
            && board.count_blocked_on_occupied() >= self.config.max_on_figure_cells as usize
        {
            return false;
        }

        let min_distance = self.config.min_chebyshev_distance;
        if min_distance > 0 {
            let too_close = |other: &Cell| candidate.chebyshev(*other) <= min_distance;
            if board.blocked_cells().iter().any(too_close) || reserved.iter().any(too_close) {
                return false;
            }
        }

        true
    }

    /// Random legal cell: `N*N*2` uniform attempts, then a row-major scan.
    pub fn random_cell<R: Rng + ?Sized>(
        &self,
        board: &Board,
        reserved: &HashSet<Cell>,
        rng: &mut R,
    ) -> Option<Cell> {
        let size = board.size();
        let attempts = board.cell_count() * 2;
        for _ in 0..attempts {
            let candidate = Cell::new(rng.gen_range(0..size), rng.gen_range(0..size));
            if self.can_use_target(board, candidate, reserved) {
                return Some(candidate);
            }
        }

        board
            .cells()
            .find(|&c| self.can_use_target(board, c, reserved))
    }
}

//! Piece tray - the shapes currently offered to the player
//!
//! Each slot holds one shape drawn uniformly from the current pool. Because a
//! tier pool is a multiset, uniform draws over it realize the tier weights.
//! The tray borrows the engine's generator for every draw so a seeded match
//! stays reproducible.

use std::sync::Arc;

use rand::Rng;

use crate::board::Board;
use crate::config::ConfigError;
use crate::shapes::{ShapeDefinition, ShapeLibrary};
use crate::types::Cell;

/// Default number of refills tried before declaring a board stuck.
pub const DEFAULT_REFILL_ATTEMPTS: usize = 80;

#[derive(Debug, Clone)]
pub struct PieceTray {
    slots: Vec<Option<Arc<ShapeDefinition>>>,
    pool: Vec<Arc<ShapeDefinition>>,
}

impl PieceTray {
    /// Create an empty tray. Slots stay empty until the first refill.
    pub fn new(slot_count: usize, pool: &[Arc<ShapeDefinition>]) -> Result<Self, ConfigError> {
        if slot_count == 0 {
            return Err(ConfigError::EmptyTray);
        }
        let mut tray = Self {
            slots: vec![None; slot_count],
            pool: Vec::new(),
        };
        tray.set_pool(pool);
        Ok(tray)
    }

    /// Switch the draw pool. An empty pool falls back to the full library.
    pub fn set_pool(&mut self, pool: &[Arc<ShapeDefinition>]) {
        self.pool = if pool.is_empty() {
            ShapeLibrary::global().shapes().to_vec()
        } else {
            pool.to_vec()
        };
    }

    pub fn pool(&self) -> &[Arc<ShapeDefinition>] {
        &self.pool
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn slot(&self, index: usize) -> Option<&Arc<ShapeDefinition>> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn slots(&self) -> &[Option<Arc<ShapeDefinition>>] {
        &self.slots
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Arc<ShapeDefinition>> {
        if self.pool.is_empty() {
            return None;
        }
        Some(Arc::clone(&self.pool[rng.gen_range(0..self.pool.len())]))
    }

    /// Replace every slot with a fresh draw.
    pub fn refill<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for i in 0..self.slots.len() {
            self.slots[i] = self.draw(rng);
        }
    }

    /// Take the shape out of a slot and immediately draw its replacement.
    pub fn consume<R: Rng + ?Sized>(&mut self, index: usize, rng: &mut R) -> Option<Arc<ShapeDefinition>> {
        let taken = self.slots.get_mut(index)?.take()?;
        self.slots[index] = self.draw(rng);
        Some(taken)
    }

    /// Put a specific shape into a slot.
    pub fn set_slot(&mut self, index: usize, shape: Arc<ShapeDefinition>) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                *slot = Some(shape);
                true
            }
            None => false,
        }
    }

    /// Whether any offered shape fits anywhere on the board.
    pub fn has_any_valid_move(&self, board: &Board) -> bool {
        self.slots
            .iter()
            .flatten()
            .any(|shape| first_fit(board, shape.cells()).is_some())
    }

    /// Refill until some shape fits, up to `max_attempts` refills.
    pub fn refill_until_any_valid_move<R: Rng + ?Sized>(
        &mut self,
        board: &Board,
        rng: &mut R,
        max_attempts: usize,
    ) -> bool {
        for _ in 0..max_attempts.max(1) {
            self.refill(rng);
            if self.has_any_valid_move(board) {
                return true;
            }
        }
        false
    }
}

/// First origin (row-major from the bottom) where `shape` fits.
pub fn first_fit(board: &Board, shape: &[Cell]) -> Option<Cell> {
    board.cells().find(|&origin| board.can_place(shape, origin))
}

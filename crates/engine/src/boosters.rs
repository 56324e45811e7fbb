//! Booster charges and power costs.
//!
//! A booster needs a charge and enough power. The session validates both,
//! spends the power, applies the effect and only then takes the charge.

use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::types::BombKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoosterKind {
    Swap,
    Bomb(BombKind),
}

impl BoosterKind {
    pub const ALL: [BoosterKind; 4] = [
        BoosterKind::Swap,
        BoosterKind::Bomb(BombKind::Horizontal),
        BoosterKind::Bomb(BombKind::Vertical),
        BoosterKind::Bomb(BombKind::Area3x3),
    ];

    fn index(self) -> usize {
        match self {
            BoosterKind::Swap => 0,
            BoosterKind::Bomb(BombKind::Horizontal) => 1,
            BoosterKind::Bomb(BombKind::Vertical) => 2,
            BoosterKind::Bomb(BombKind::Area3x3) => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BoosterKind::Swap => "Swap",
            BoosterKind::Bomb(BombKind::Horizontal) => "Bomb H",
            BoosterKind::Bomb(BombKind::Vertical) => "Bomb V",
            BoosterKind::Bomb(BombKind::Area3x3) => "Bomb Area",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoosterConfig {
    pub swap_charges: u32,
    pub swap_cost: u32,
    pub bomb_horizontal_charges: u32,
    pub bomb_horizontal_cost: u32,
    pub bomb_vertical_charges: u32,
    pub bomb_vertical_cost: u32,
    pub bomb_area_charges: u32,
    pub bomb_area_cost: u32,
}

impl Default for BoosterConfig {
    fn default() -> Self {
        Self {
            swap_charges: 1,
            swap_cost: 50,
            bomb_horizontal_charges: 1,
            bomb_horizontal_cost: 20,
            bomb_vertical_charges: 1,
            bomb_vertical_cost: 20,
            bomb_area_charges: 1,
            bomb_area_cost: 30,
        }
    }
}

impl BoosterConfig {
    pub fn charges_for(&self, kind: BoosterKind) -> u32 {
        match kind {
            BoosterKind::Swap => self.swap_charges,
            BoosterKind::Bomb(BombKind::Horizontal) => self.bomb_horizontal_charges,
            BoosterKind::Bomb(BombKind::Vertical) => self.bomb_vertical_charges,
            BoosterKind::Bomb(BombKind::Area3x3) => self.bomb_area_charges,
        }
    }

    pub fn cost_for(&self, kind: BoosterKind) -> u32 {
        match kind {
            BoosterKind::Swap => self.swap_cost,
            BoosterKind::Bomb(BombKind::Horizontal) => self.bomb_horizontal_cost,
            BoosterKind::Bomb(BombKind::Vertical) => self.bomb_vertical_cost,
            BoosterKind::Bomb(BombKind::Area3x3) => self.bomb_area_cost,
        }
    }
}

/// HUD view of one booster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoosterStatus {
    pub kind: BoosterKind,
    pub charges: u32,
    pub cost: u32,
    pub ready: bool,
}

#[derive(Debug, Clone)]
pub struct Boosters {
    config: BoosterConfig,
    charges: [u32; 4],
}

impl Boosters {
    pub fn new(config: BoosterConfig) -> Self {
        let mut boosters = Self {
            config,
            charges: [0; 4],
        };
        boosters.reset();
        boosters
    }

    pub fn config(&self) -> &BoosterConfig {
        &self.config
    }

    pub fn charges(&self, kind: BoosterKind) -> u32 {
        self.charges[kind.index()]
    }

    pub fn cost(&self, kind: BoosterKind) -> u32 {
        self.config.cost_for(kind)
    }

    /// Charge and power check, without side effects.
    pub fn check(&self, kind: BoosterKind, power: u32) -> Result<u32, SessionError> {
        if self.charges(kind) == 0 {
            return Err(SessionError::NoCharges(kind));
        }
        let needed = self.cost(kind);
        if power < needed {
            return Err(SessionError::InsufficientPower {
                needed,
                available: power,
            });
        }
        Ok(needed)
    }

    /// Take one charge. Returns false if none were left.
    pub fn consume(&mut self, kind: BoosterKind) -> bool {
        let slot = &mut self.charges[kind.index()];
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    /// Restore the configured charges.
    pub fn reset(&mut self) {
        for kind in BoosterKind::ALL {
            self.charges[kind.index()] = self.config.charges_for(kind);
        }
    }

    pub fn statuses(&self, power: u32) -> [BoosterStatus; 4] {
        BoosterKind::ALL.map(|kind| BoosterStatus {
            kind,
            charges: self.charges(kind),
            cost: self.cost(kind),
            ready: self.check(kind, power).is_ok(),
        })
    }
}

impl Default for Boosters {
    fn default() -> Self {
        Self::new(BoosterConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AREA: BoosterKind = BoosterKind::Bomb(BombKind::Area3x3);

    #[test]
    fn test_default_charges_and_costs() {
        let b = Boosters::default();
        assert_eq!(b.charges(BoosterKind::Swap), 1);
        assert_eq!(b.cost(BoosterKind::Swap), 50);
        assert_eq!(b.cost(BoosterKind::Bomb(BombKind::Horizontal)), 20);
        assert_eq!(b.cost(BoosterKind::Bomb(BombKind::Vertical)), 20);
        assert_eq!(b.cost(AREA), 30);
    }

    #[test]
    fn test_check_order() {
        let mut b = Boosters::default();
        assert_eq!(
            b.check(AREA, 10),
            Err(SessionError::InsufficientPower {
                needed: 30,
                available: 10
            })
        );
        assert_eq!(b.check(AREA, 30), Ok(30));
        assert!(b.consume(AREA));
        assert_eq!(b.check(AREA, 100), Err(SessionError::NoCharges(AREA)));
        assert!(!b.consume(AREA));
    }

    #[test]
    fn test_reset_restores_charges() {
        let mut b = Boosters::default();
        for kind in BoosterKind::ALL {
            b.consume(kind);
        }
        assert!(b.statuses(100).iter().all(|s| s.charges == 0 && !s.ready));
        b.reset();
        assert!(b.statuses(100).iter().all(|s| s.charges == 1 && s.ready));
    }

    #[test]
    fn test_partial_config_json() {
        let cfg: BoosterConfig = serde_json::from_str(r#"{"swap_charges":3}"#).unwrap();
        assert_eq!(cfg.swap_charges, 3);
        assert_eq!(cfg.bomb_area_cost, 30);
    }
}

//! Shape library - canonical placeable shapes and variety-tier pools
//!
//! Eight hand-authored base polyominoes are expanded by four 90 degree
//! rotations and a horizontal mirror of each rotation. Every variant is
//! normalized (min x/y translated to 0, cells sorted by (y, x)) and
//! deduplicated by its exact cell signature, so the build is a pure function
//! of the base list and its iteration order.
//!
//! Variety tiers 1..=12 return weighted multisets (a shape repeated k times is
//! k times as likely to be drawn); tier 13 and above return the full library.

use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use crate::types::{Cell, FULL_POOL_TIER, MAX_WEIGHTED_TIER, MIN_VARIETY_TIER};

/// An identified, normalized set of cell offsets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShapeDefinition {
    id: String,
    cells: Vec<Cell>,
}

impl ShapeDefinition {
    pub fn new(id: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            id: id.into(),
            cells,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Base shape id (`"l4"` for `"l4_03"`).
    pub fn base_id(&self) -> &str {
        extract_base_id(&self.id)
    }

    /// Bounding box as (width, height).
    pub fn extent(&self) -> (i32, i32) {
        let w = self.cells.iter().map(|c| c.x).max().map_or(0, |m| m + 1);
        let h = self.cells.iter().map(|c| c.y).max().map_or(0, |m| m + 1);
        (w, h)
    }
}

/// Strip a trailing `_NN` variant suffix. Ids without an all-digit suffix are
/// returned unchanged.
pub fn extract_base_id(id: &str) -> &str {
    match id.rfind('_') {
        Some(split) if split > 0 && split + 1 < id.len() => {
            let suffix = &id[split + 1..];
            if suffix.bytes().all(|b| b.is_ascii_digit()) {
                &id[..split]
            } else {
                id
            }
        }
        _ => id,
    }
}

fn shape(id: &str, cells: &[(i32, i32)]) -> ShapeDefinition {
    ShapeDefinition::new(id, cells.iter().map(|&c| Cell::from(c)).collect())
}

/// The base polyominoes, in expansion order.
pub fn base_shapes() -> Vec<ShapeDefinition> {
    vec![
        shape("dot", &[(0, 0)]),
        shape("line2", &[(0, 0), (1, 0)]),
        shape("line3", &[(0, 0), (1, 0), (2, 0)]),
        shape("square2", &[(0, 0), (1, 0), (0, 1), (1, 1)]),
        shape("l3", &[(0, 0), (0, 1), (1, 0)]),
        shape("l4", &[(0, 0), (0, 1), (0, 2), (1, 0)]),
        shape("t4", &[(0, 0), (1, 0), (2, 0), (1, 1)]),
        shape("z4", &[(0, 0), (1, 0), (1, 1), (2, 1)]),
    ]
}

/// Larger shapes kept for future content. Never part of a tier pool.
pub fn reserved_base_shapes() -> Vec<ShapeDefinition> {
    vec![
        shape("u5", &[(0, 0), (0, 1), (1, 1), (2, 1), (2, 0)]),
        shape("plus5", &[(1, 0), (0, 1), (1, 1), (2, 1), (1, 2)]),
        shape("w5", &[(0, 0), (1, 0), (1, 1), (2, 1), (2, 2)]),
        shape("v5", &[(0, 0), (0, 1), (0, 2), (1, 0), (2, 0)]),
        shape("p5", &[(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)]),
        shape("i4", &[(0, 0), (1, 0), (2, 0), (3, 0)]),
        shape("i5", &[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]),
    ]
}

fn rotate(cells: &[Cell], turns: usize) -> Vec<Cell> {
    let mut out = cells.to_vec();
    for _ in 0..turns {
        for c in &mut out {
            *c = Cell::new(c.y, -c.x);
        }
    }
    out
}

fn mirror(cells: &[Cell]) -> Vec<Cell> {
    cells.iter().map(|c| Cell::new(-c.x, c.y)).collect()
}

/// Translate so min x/y are 0, then sort by (y, x).
pub fn normalize(cells: &[Cell]) -> Vec<Cell> {
    let min_x = cells.iter().map(|c| c.x).min().unwrap_or(0);
    let min_y = cells.iter().map(|c| c.y).min().unwrap_or(0);
    let mut out: Vec<Cell> = cells
        .iter()
        .map(|c| Cell::new(c.x - min_x, c.y - min_y))
        .collect();
    out.sort_by_key(|c| (c.y, c.x));
    out
}

/// Expand base shapes into deduplicated rotation/mirror variants.
///
/// Ids are `{base}_{NN}` with NN counting accepted variants of that base.
pub fn build_canonical_shapes(bases: &[ShapeDefinition]) -> Vec<ShapeDefinition> {
    let mut seen: HashSet<Vec<Cell>> = HashSet::new();
    let mut out = Vec::new();

    for base in bases {
        let mut variant_index = 0usize;
        for turns in 0..4 {
            let rotated = rotate(base.cells(), turns);
            let mirrored = mirror(&rotated);
            for variant in [rotated, mirrored] {
                let normalized = normalize(&variant);
                if seen.insert(normalized.clone()) {
                    out.push(ShapeDefinition::new(
                        format!("{}_{:02}", base.id(), variant_index),
                        normalized,
                    ));
                    variant_index += 1;
                }
            }
        }
    }

    out
}

/// Sampling weight of a base shape at a weighted tier (1..=12).
///
/// Linear interpolation between two endpoints over `t = (tier - 1) / 11`,
/// rounded, floored at 1 once the shape is unlocked. 0 means excluded.
pub fn tier_weight(base_id: &str, tier: i32) -> u32 {
    let tier = tier.clamp(MIN_VARIETY_TIER, MAX_WEIGHTED_TIER);
    let t = (tier - 1) as f32 / (MAX_WEIGHTED_TIER - 1) as f32;
    let ramp = |from: f32, to: f32| -> u32 {
        let v = (from + (to - from) * t).round();
        (v as i64).max(1) as u32
    };

    match base_id {
        "dot" if tier > 5 => 0,
        "dot" => ramp(10.0, 1.0),
        "line2" if tier > 8 => 0,
        "line2" => ramp(9.0, 2.0),
        "line3" => ramp(8.0, 4.0),
        "square2" => ramp(7.0, 5.0),
        "l3" if tier < 2 => 0,
        "l3" => ramp(2.0, 7.0),
        "l4" if tier < 3 => 0,
        "l4" => ramp(1.0, 7.0),
        "t4" if tier < 5 => 0,
        "t4" => ramp(1.0, 7.0),
        "z4" if tier < 7 => 0,
        "z4" => ramp(1.0, 6.0),
        _ => 1,
    }
}

/// Canonical shapes plus cached tier pools.
#[derive(Debug, Clone)]
pub struct ShapeLibrary {
    shapes: Vec<Arc<ShapeDefinition>>,
    reserved: Vec<Arc<ShapeDefinition>>,
    /// Index 0 is tier 1.
    tier_pools: Vec<Vec<Arc<ShapeDefinition>>>,
}

static GLOBAL_LIBRARY: OnceLock<ShapeLibrary> = OnceLock::new();

impl ShapeLibrary {
    /// Build a library from scratch.
    pub fn build() -> Self {
        let shapes: Vec<Arc<ShapeDefinition>> = build_canonical_shapes(&base_shapes())
            .into_iter()
            .map(Arc::new)
            .collect();
        let reserved = build_canonical_shapes(&reserved_base_shapes())
            .into_iter()
            .map(Arc::new)
            .collect();

        let tier_pools = (MIN_VARIETY_TIER..=MAX_WEIGHTED_TIER)
            .map(|tier| {
                let mut pool = Vec::new();
                for shape in &shapes {
                    let weight = tier_weight(shape.base_id(), tier);
                    for _ in 0..weight {
                        pool.push(Arc::clone(shape));
                    }
                }
                pool
            })
            .collect();

        Self {
            shapes,
            reserved,
            tier_pools,
        }
    }

    /// Process-wide library, built on first use.
    pub fn global() -> &'static ShapeLibrary {
        GLOBAL_LIBRARY.get_or_init(ShapeLibrary::build)
    }

    pub fn shapes(&self) -> &[Arc<ShapeDefinition>] {
        &self.shapes
    }

    pub fn reserved_shapes(&self) -> &[Arc<ShapeDefinition>] {
        &self.reserved
    }

    pub fn find(&self, id: &str) -> Option<&Arc<ShapeDefinition>> {
        self.shapes.iter().find(|s| s.id() == id)
    }

    /// Weighted pool for a variety tier. Tier 13+ (or an empty pool) yields
    /// the full library; tiers below 1 act as tier 1.
    pub fn pool_for_variety_tier(&self, tier: i32) -> &[Arc<ShapeDefinition>] {
        if tier >= FULL_POOL_TIER {
            return &self.shapes;
        }
        let idx = (tier.clamp(MIN_VARIETY_TIER, MAX_WEIGHTED_TIER) - MIN_VARIETY_TIER) as usize;
        match self.tier_pools.get(idx) {
            Some(pool) if !pool.is_empty() => pool,
            _ => &self.shapes,
        }
    }
}

impl Default for ShapeLibrary {
    fn default() -> Self {
        Self::build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(lib: &ShapeLibrary) -> Vec<String> {
        lib.shapes().iter().map(|s| s.id().to_string()).collect()
    }

    #[test]
    fn test_canonical_shape_count() {
        let lib = ShapeLibrary::build();
        assert_eq!(lib.shapes().len(), 26);
        let count = |base: &str| lib.shapes().iter().filter(|s| s.base_id() == base).count();
        assert_eq!(count("dot"), 1);
        assert_eq!(count("line2"), 2);
        assert_eq!(count("square2"), 1);
        assert_eq!(count("l3"), 4);
        assert_eq!(count("l4"), 8);
        assert_eq!(count("t4"), 4);
        assert_eq!(count("z4"), 4);
    }

    #[test]
    fn test_ids_number_variants_per_base() {
        let lib = ShapeLibrary::build();
        let ids = ids(&lib);
        assert_eq!(ids[0], "dot_00");
        assert_eq!(ids[1], "line2_00");
        assert_eq!(ids[2], "line2_01");
        assert!(ids.contains(&"l4_07".to_string()));
        assert!(!ids.contains(&"l4_08".to_string()));
    }

    #[test]
    fn test_variants_are_normalized() {
        let lib = ShapeLibrary::build();
        for s in lib.shapes() {
            assert_eq!(s.cells().iter().map(|c| c.x).min(), Some(0), "{}", s.id());
            assert_eq!(s.cells().iter().map(|c| c.y).min(), Some(0), "{}", s.id());
            assert_eq!(s.cells(), normalize(s.cells()).as_slice());
        }
    }

    #[test]
    fn test_vertical_line_variant() {
        let lib = ShapeLibrary::build();
        let v = lib.find("line2_01").unwrap();
        assert_eq!(v.cells(), &[Cell::new(0, 0), Cell::new(0, 1)]);
        assert_eq!(v.extent(), (1, 2));
    }

    #[test]
    fn test_extract_base_id() {
        assert_eq!(extract_base_id("l4_03"), "l4");
        assert_eq!(extract_base_id("square2_00"), "square2");
        assert_eq!(extract_base_id("plain"), "plain");
        assert_eq!(extract_base_id("odd_name"), "odd_name");
        assert_eq!(extract_base_id("trailing_"), "trailing_");
    }

    #[test]
    fn test_tier_weight_curve() {
        assert_eq!(tier_weight("dot", 1), 10);
        assert_eq!(tier_weight("dot", 5), 7);
        assert_eq!(tier_weight("dot", 6), 0);
        assert_eq!(tier_weight("line2", 8), 5);
        assert_eq!(tier_weight("line2", 9), 0);
        assert_eq!(tier_weight("line3", 12), 4);
        assert_eq!(tier_weight("l3", 1), 0);
        assert_eq!(tier_weight("l3", 2), 2);
        assert_eq!(tier_weight("l4", 3), 2);
        assert_eq!(tier_weight("t4", 4), 0);
        assert_eq!(tier_weight("z4", 12), 6);
        assert_eq!(tier_weight("mystery", 4), 1);
    }

    #[test]
    fn test_tier_one_pool_excludes_locked_shapes() {
        let lib = ShapeLibrary::build();
        let pool = lib.pool_for_variety_tier(1);
        assert!(pool.iter().all(|s| matches!(s.base_id(), "dot" | "line2" | "line3" | "square2")));
        let dots = pool.iter().filter(|s| s.base_id() == "dot").count();
        assert_eq!(dots, 10);
    }

    #[test]
    fn test_full_tier_and_clamping() {
        let lib = ShapeLibrary::build();
        assert_eq!(lib.pool_for_variety_tier(13).len(), 26);
        assert_eq!(lib.pool_for_variety_tier(99).len(), 26);
        assert_eq!(
            lib.pool_for_variety_tier(-4).len(),
            lib.pool_for_variety_tier(1).len()
        );
    }

    #[test]
    fn test_reserved_shapes_stay_out_of_pools() {
        let lib = ShapeLibrary::build();
        assert!(!lib.reserved_shapes().is_empty());
        for tier in 1..=13 {
            assert!(lib
                .pool_for_variety_tier(tier)
                .iter()
                .all(|s| !s.id().starts_with("i5") && !s.id().starts_with("plus5")));
        }
    }

    #[test]
    fn test_reserved_catalogue_order_and_ids() {
        let lib = ShapeLibrary::build();
        let mut bases: Vec<&str> = Vec::new();
        for shape in lib.reserved_shapes() {
            if bases.last() != Some(&shape.base_id()) {
                bases.push(shape.base_id());
            }
        }
        assert_eq!(bases, vec!["u5", "plus5", "w5", "v5", "p5", "i4", "i5"]);
        assert_eq!(lib.reserved_shapes().len(), 25);
        assert_eq!(lib.reserved_shapes()[0].id(), "u5_00");

        let w5 = lib.reserved_shapes().iter().find(|s| s.id() == "w5_00").unwrap();
        assert_eq!(
            w5.cells(),
            &[
                Cell::new(0, 0),
                Cell::new(1, 0),
                Cell::new(1, 1),
                Cell::new(2, 1),
                Cell::new(2, 2)
            ]
        );
    }

    #[test]
    fn test_global_library_is_shared() {
        let a = ShapeLibrary::global() as *const ShapeLibrary;
        let b = ShapeLibrary::global() as *const ShapeLibrary;
        assert_eq!(a, b);
    }
}

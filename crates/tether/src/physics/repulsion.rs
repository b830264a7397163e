//! Radius-limited inverse-square repulsion.
//!
//! Nodes are bucketed into square cells whose side equals the repulsion radius, so every
//! neighbour within range lives in the 3x3 block around a node's own cell. The per-pair force
//! is the same as the all-pairs form: `strength / d^2` along the normalized separation, nothing
//! at `d == 0` or `d > radius`.

use crate::geom::{Vec2, normalize};
use rustc_hash::FxHashMap as HashMap;

#[derive(Debug, Clone)]
pub struct BucketGrid {
    cell: f64,
    buckets: HashMap<(i64, i64), Vec<usize>>,
}

impl BucketGrid {
    /// Returns `None` when repulsion cannot act at all (no nodes, or a degenerate radius).
    pub fn build(positions: &[Vec2], radius: f64) -> Option<Self> {
        if positions.is_empty() || !(radius.is_finite() && radius > 0.0) {
            return None;
        }
        let mut buckets: HashMap<(i64, i64), Vec<usize>> = HashMap::default();
        for (idx, p) in positions.iter().enumerate() {
            buckets.entry(cell_of(*p, radius)).or_default().push(idx);
        }
        Some(Self {
            cell: radius,
            buckets,
        })
    }

    fn neighbours(&self, p: Vec2) -> impl Iterator<Item = usize> + '_ {
        let (cx, cy) = cell_of(p, self.cell);
        // Cells saturate at the i64 range; inclusive ranges keep the block free of repeats there.
        let rows = move || cy.saturating_sub(1)..=cy.saturating_add(1);
        (cx.saturating_sub(1)..=cx.saturating_add(1))
            .flat_map(move |x| rows().map(move |y| (x, y)))
            .filter_map(|key| self.buckets.get(&key))
            .flatten()
            .copied()
    }

    /// Total repulsion felt by `positions[idx]` from every other position.
    pub fn force_on(&self, idx: usize, positions: &[Vec2], strength: f64) -> Vec2 {
        let p = positions[idx];
        self.neighbours(p)
            .filter(|&other| other != idx)
            .fold(Vec2::zero(), |acc, other| {
                acc + pair_force(p, positions[other], self.cell, strength)
            })
    }
}

fn cell_of(p: Vec2, size: f64) -> (i64, i64) {
    ((p.x / size).floor() as i64, (p.y / size).floor() as i64)
}

/// Force pushing a node at `p` away from a node at `other`.
pub fn pair_force(p: Vec2, other: Vec2, radius: f64, strength: f64) -> Vec2 {
    let separation = p - other;
    let dist_sq = separation.square_length();
    if dist_sq == 0.0 || dist_sq > radius * radius {
        return Vec2::zero();
    }
    normalize(separation) * (strength / dist_sq)
}

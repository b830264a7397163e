//! Bounded spring simulation.
//!
//! The host owns one [`SimulationState`] and calls [`step_physics`] once per animation frame.
//! Layout output enters only through [`SimulationState::sync_targets`], which re-aims springs
//! without moving anything, so switching layouts never teleports a node.

pub mod constraints;
pub mod repulsion;

pub use constraints::{Constraints, ForceWeights, Preset};

use crate::geom::{Vec2, clamp, normalize, snap_to_grid};
use crate::graph::{Frame, GraphNode};
use indexmap::IndexMap;
use repulsion::BucketGrid;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::collections::BTreeMap;

/// Integration is normalized against a 60Hz frame.
pub const REFERENCE_FRAME_MS: f64 = 16.666;
/// Longest frame integrated in one go; a stalled host resumes without a jolt.
pub const MAX_FRAME_MS: f64 = 48.0;

const VELOCITY_DAMPING: f64 = 0.82;
const BOUNDARY_DAMPING: f64 = 0.6;
const FRAME_MAGNET_SCALE: f64 = 0.15;
const SETTLE_OFFSET_FACTOR: f64 = 0.4;
const SETTLE_SPEED: f64 = 0.08;
const MOVING_SPEED: f64 = 0.02;
const MOVING_DISTANCE_SQ: f64 = 4.0;

/// Ids currently held by a pointer.
pub type DragSet = FxHashSet<String>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationEntry {
    pub position: Vec2,
    pub velocity: Vec2,
    pub target: Vec2,
}

impl SimulationEntry {
    pub fn at_rest(point: Vec2) -> Self {
        Self {
            position: point,
            velocity: Vec2::zero(),
            target: point,
        }
    }

    pub fn offset(&self) -> Vec2 {
        self.position - self.target
    }

    pub fn is_settled(&self) -> bool {
        self.position == self.target && self.velocity == Vec2::zero()
    }

    fn rest_on_target(&mut self) {
        self.position = self.target;
        self.velocity = Vec2::zero();
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimulationState {
    entries: IndexMap<String, SimulationEntry>,
    /// Ids pinned by [`SimulationState::pin`] whose drag is still active. Layout sync leaves them
    /// alone; a tick that no longer lists an id as dragging unpins it.
    pinned: FxHashSet<String>,
}

impl SimulationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// One entry per node, resting on its committed position snapped to the grid.
    pub fn initialize(nodes: &[GraphNode], grid_snap: f64) -> Self {
        let mut state = Self::new();
        for n in nodes {
            state
                .entries
                .entry(n.id.clone())
                .or_insert_with(|| SimulationEntry::at_rest(snap_to_grid(n.position, grid_snap)));
        }
        state
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&SimulationEntry> {
        self.entries.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SimulationEntry)> {
        self.entries.iter().map(|(id, e)| (id.as_str(), e))
    }

    /// Current simulated positions, for a renderer.
    pub fn positions(&self) -> BTreeMap<String, Vec2> {
        self.entries
            .iter()
            .map(|(id, e)| (id.clone(), e.position))
            .collect()
    }

    pub fn is_settled(&self) -> bool {
        self.entries.values().all(SimulationEntry::is_settled)
    }

    pub fn remove(&mut self, id: &str) -> Option<SimulationEntry> {
        self.pinned.remove(id);
        self.entries.shift_remove(id)
    }

    /// Re-aims every listed node at its new (snapped) target.
    ///
    /// Existing positions and velocities are untouched; unseen ids start at rest on their target.
    /// Nodes pinned by an active drag keep the drag point as their target.
    pub fn sync_targets(&mut self, targets: &BTreeMap<String, Vec2>, grid_snap: f64) {
        for (id, target) in targets {
            let target = snap_to_grid(*target, grid_snap);
            if self.pinned.contains(id) {
                continue;
            }
            match self.entries.get_mut(id) {
                Some(entry) => entry.target = target,
                None => {
                    self.entries
                        .insert(id.clone(), SimulationEntry::at_rest(target));
                }
            }
        }
    }

    /// Holds `id` exactly at `point` (typically the pointer position during a drag).
    pub fn pin(&mut self, id: &str, point: Vec2) {
        let entry = self
            .entries
            .entry(id.to_string())
            .or_insert_with(|| SimulationEntry::at_rest(point));
        entry.target = point;
        entry.rest_on_target();
        self.pinned.insert(id.to_string());
    }

    /// Ends a drag: the drag point, snapped to the grid, becomes the node's target and is
    /// returned as the position the host should commit.
    pub fn release(&mut self, id: &str, grid_snap: f64) -> Option<Vec2> {
        self.pinned.remove(id);
        let entry = self.entries.get_mut(id)?;
        let committed = snap_to_grid(entry.target, grid_snap);
        entry.target = committed;
        Some(committed)
    }
}

pub struct StepInput<'a> {
    pub state: &'a mut SimulationState,
    pub nodes: &'a [GraphNode],
    pub constraints: &'a Constraints,
    pub delta_ms: f64,
    pub dragging_ids: &'a DragSet,
    pub frames: &'a [Frame],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    /// Locked or dragged: sits on its target and only acts as an obstacle.
    Anchored,
    Free,
}

/// Advances the simulation by one frame. Returns whether anything is still moving.
pub fn step_physics(input: StepInput<'_>) -> bool {
    let StepInput {
        state,
        nodes,
        constraints,
        delta_ms,
        dragging_ids,
        frames,
    } = input;

    if nodes.is_empty() {
        return false;
    }
    let grid = constraints.grid_snap;

    let active: FxHashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    state.entries.retain(|id, _| active.contains(id.as_str()));
    state
        .pinned
        .retain(|id| active.contains(id.as_str()) && dragging_ids.contains(id));

    let mut slots: Vec<(usize, Role, &GraphNode)> = Vec::with_capacity(active.len());
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    for n in nodes {
        if !seen.insert(n.id.as_str()) {
            continue;
        }
        let dragged = dragging_ids.contains(&n.id);
        let ix = match state.entries.get_index_of(n.id.as_str()) {
            Some(ix) => ix,
            None => {
                let entry = SimulationEntry::at_rest(snap_to_grid(n.position, grid));
                state.entries.insert_full(n.id.clone(), entry).0
            }
        };
        let entry = &mut state.entries[ix];
        // A dragged node tracks the pointer exactly; everything else aims at a grid point.
        if !dragged {
            entry.target = snap_to_grid(entry.target, grid);
        }
        let role = if n.locked || dragged {
            entry.rest_on_target();
            Role::Anchored
        } else {
            Role::Free
        };
        slots.push((ix, role, n));
    }

    if !constraints.physics_enabled {
        for entry in state.entries.values_mut() {
            entry.rest_on_target();
        }
        return false;
    }

    let positions: Vec<Vec2> = slots
        .iter()
        .map(|(ix, _, _)| state.entries[*ix].position)
        .collect();
    let weights = constraints.weights;
    let buckets = if weights.repulsion != 0.0 {
        BucketGrid::build(&positions, constraints.repulsion_radius)
    } else {
        None
    };
    let centroids: FxHashMap<&str, Vec2> = frames
        .iter()
        .map(|f| (f.id.as_str(), f.centroid()))
        .collect();

    let dt = clamp(delta_ms, 0.0, MAX_FRAME_MS) / REFERENCE_FRAME_MS;
    let max_offset = constraints.max_offset.max(0.0);

    let mut moving = 0usize;
    for (slot, (ix, role, node)) in slots.iter().enumerate() {
        if *role == Role::Anchored {
            continue;
        }
        let entry = &mut state.entries[*ix];
        let position = positions[slot];

        let mut force = (entry.target - position) * weights.spring;
        if let Some(centroid) = node.frame_id.as_deref().and_then(|f| centroids.get(f)) {
            force += (*centroid - position) * (weights.frame_magnet * FRAME_MAGNET_SCALE);
        }
        if let Some(buckets) = &buckets {
            force += buckets.force_on(slot, &positions, weights.repulsion);
        }

        entry.velocity = (entry.velocity + force * dt) * VELOCITY_DAMPING;
        entry.position += entry.velocity * dt;

        let mut offset = entry.offset();
        if offset.length() > max_offset {
            offset = normalize(offset) * max_offset;
            entry.position = entry.target + offset;
            entry.velocity *= BOUNDARY_DAMPING;
        }

        let speed = entry.velocity.length();
        if offset.length() < SETTLE_OFFSET_FACTOR * grid && speed < SETTLE_SPEED {
            entry.rest_on_target();
        } else if speed > MOVING_SPEED || offset.square_length() > MOVING_DISTANCE_SQ {
            moving += 1;
        }
    }

    tracing::trace!(nodes = slots.len(), moving, dt, "physics tick");
    moving > 0
}

#![forbid(unsafe_code)]

//! Grid-aligned layout and bounded spring physics for interactive node-link diagrams.
//!
//! `tether` splits positioning into two halves. [`compute_layout`] is a pure function from a
//! graph snapshot to grid-snapped target positions. [`step_physics`] animates an owned
//! [`SimulationState`] toward those targets one frame at a time, never letting a node stray
//! further than [`Constraints::max_offset`] from where it belongs.

pub mod config;
pub mod error;
pub mod geom;
pub mod graph;
pub mod layout;
pub mod physics;

pub use config::EngineConfig;
pub use error::{Error, Result};
pub use geom::{Size, Vec2, vec2};
pub use graph::{Diagram, Frame, GraphEdge, GraphNode, NodeKind, RelationKind};
pub use layout::{GroupKey, LayoutMode, LayoutOptions, LayoutResult, compute_layout};
pub use physics::{
    Constraints, DragSet, ForceWeights, Preset, SimulationEntry, SimulationState, StepInput,
    step_physics,
};

use std::collections::BTreeMap;

pub fn initialize_physics_state(nodes: &[GraphNode], grid_snap: f64) -> SimulationState {
    SimulationState::initialize(nodes, grid_snap)
}

/// The only way layout output should reach the simulation.
pub fn sync_physics_targets(
    state: &mut SimulationState,
    layout_positions: &BTreeMap<String, Vec2>,
    grid_snap: f64,
) {
    state.sync_targets(layout_positions, grid_snap);
}

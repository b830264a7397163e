//! Deterministic target layout.
//!
//! [`compute_layout`] is pure: the same nodes, edges, mode and options always produce the same
//! [`LayoutResult`]. Results carry no identity beyond node ids, so callers are free to throw
//! them away and recompute whenever the graph changes.

pub mod columns;
pub mod layering;

use crate::geom::Vec2;
use crate::graph::{GraphEdge, GraphNode, NodeKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LayoutMode {
    #[default]
    FlowGrid,
    /// Same placement as [`LayoutMode::FlowGrid`].
    ByCausality,
    ByTags,
    ByTypes,
    ByTime,
}

impl LayoutMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FlowGrid => "flowGrid",
            Self::ByCausality => "byCausality",
            Self::ByTags => "byTags",
            Self::ByTypes => "byTypes",
            Self::ByTime => "byTime",
        }
    }
}

impl std::str::FromStr for LayoutMode {
    type Err = std::convert::Infallible;

    /// Unknown names resolve to the flow layout.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        Ok(match normalized.as_str() {
            "flowgrid" | "flow" => Self::FlowGrid,
            "bycausality" | "causality" => Self::ByCausality,
            "bytags" | "tags" => Self::ByTags,
            "bytypes" | "types" => Self::ByTypes,
            "bytime" | "time" => Self::ByTime,
            _ => Self::FlowGrid,
        })
    }
}

impl std::fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LayoutMode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LayoutMode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.parse::<LayoutMode>() {
            Ok(mode) => Ok(mode),
            Err(never) => match never {},
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutOptions {
    pub grid_size: f64,
    pub column_spacing: f64,
    pub row_spacing: f64,
    pub margin: f64,
    /// Rows per column before `byTime` wraps. Zero is treated as one.
    pub max_nodes_per_column: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            grid_size: 20.0,
            column_spacing: 260.0,
            row_spacing: 140.0,
            margin: 40.0,
            max_nodes_per_column: 8,
        }
    }
}

/// Identifies one column of a layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupKey {
    Layer(usize),
    Tag(String),
    Untagged,
    Kind(NodeKind),
    TimeColumn(usize),
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Layer(layer) => write!(f, "layer-{layer}"),
            Self::Tag(tag) => write!(f, "tag:{tag}"),
            Self::Untagged => f.write_str("untagged"),
            Self::Kind(kind) => write!(f, "kind:{kind}"),
            Self::TimeColumn(column) => write!(f, "time-{column}"),
        }
    }
}

impl Serialize for GroupKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult {
    /// Grid-snapped target for every node.
    pub positions: BTreeMap<String, Vec2>,
    /// Columns in placement order, each listing its nodes top to bottom.
    pub groups: IndexMap<GroupKey, Vec<String>>,
    pub layers: BTreeMap<String, usize>,
}

impl LayoutResult {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn position(&self, id: &str) -> Option<Vec2> {
        self.positions.get(id).copied()
    }

    pub fn layer(&self, id: &str) -> Option<usize> {
        self.layers.get(id).copied()
    }
}

pub fn compute_layout(
    mode: LayoutMode,
    nodes: &[GraphNode],
    edges: &[GraphEdge],
    options: &LayoutOptions,
) -> LayoutResult {
    if nodes.is_empty() {
        return LayoutResult::default();
    }

    let layers = layering::assign_layers(nodes, edges);
    let unique = columns::unique_nodes(nodes);
    let column_groups = match mode {
        LayoutMode::FlowGrid | LayoutMode::ByCausality => columns::by_layer(&unique, &layers),
        LayoutMode::ByTags => columns::by_tag(&unique),
        LayoutMode::ByTypes => columns::by_kind(&unique),
        LayoutMode::ByTime => columns::by_time(&unique, options.max_nodes_per_column),
    };

    let (positions, groups) = columns::place(column_groups, mode, options);

    tracing::debug!(
        mode = %mode,
        nodes = unique.len(),
        edges = edges.len(),
        columns = groups.len(),
        "computed layout"
    );

    let layers = unique
        .iter()
        .map(|n| (n.id.clone(), layers.get(n.id.as_str()).copied().unwrap_or(0)))
        .collect();

    LayoutResult {
        positions,
        groups,
        layers,
    }
}

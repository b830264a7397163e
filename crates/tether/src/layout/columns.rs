//! Column grouping and grid placement.

use super::{GroupKey, LayoutMode, LayoutOptions};
use crate::geom::{Vec2, snap_scalar, vec2};
use crate::graph::{GraphNode, NodeKind};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
use std::collections::BTreeMap;

pub type Column<'a> = (GroupKey, Vec<&'a GraphNode>);

/// Drops repeated ids; the first occurrence of each id is the one laid out.
pub fn unique_nodes(nodes: &[GraphNode]) -> Vec<&GraphNode> {
    let mut seen: HashSet<&str> = HashSet::default();
    nodes.iter().filter(|n| seen.insert(n.id.as_str())).collect()
}

pub fn by_layer<'a>(nodes: &[&'a GraphNode], layers: &HashMap<&str, usize>) -> Vec<Column<'a>> {
    let mut grouped: BTreeMap<usize, Vec<&GraphNode>> = BTreeMap::new();
    for &n in nodes {
        let layer = layers.get(n.id.as_str()).copied().unwrap_or(0);
        grouped.entry(layer).or_default().push(n);
    }
    grouped
        .into_iter()
        .map(|(layer, members)| (GroupKey::Layer(layer), members))
        .collect()
}

/// Tag columns in alphabetical order, then the untagged column if anything lacks a tag.
pub fn by_tag<'a>(nodes: &[&'a GraphNode]) -> Vec<Column<'a>> {
    let mut tagged: BTreeMap<&str, Vec<&GraphNode>> = BTreeMap::new();
    let mut untagged: Vec<&GraphNode> = Vec::new();
    for &n in nodes {
        match n.primary_tag() {
            Some(tag) => tagged.entry(tag).or_default().push(n),
            None => untagged.push(n),
        }
    }

    let mut columns: Vec<Column<'a>> = tagged
        .into_iter()
        .map(|(tag, members)| (GroupKey::Tag(tag.to_string()), members))
        .collect();
    if !untagged.is_empty() {
        columns.push((GroupKey::Untagged, untagged));
    }
    columns
}

pub fn by_kind<'a>(nodes: &[&'a GraphNode]) -> Vec<Column<'a>> {
    NodeKind::CANONICAL
        .into_iter()
        .filter_map(|kind| {
            let members: Vec<&GraphNode> =
                nodes.iter().copied().filter(|n| n.kind == kind).collect();
            (!members.is_empty()).then_some((GroupKey::Kind(kind), members))
        })
        .collect()
}

/// Creation order, wrapped into columns of `max_rows`.
pub fn by_time<'a>(nodes: &[&'a GraphNode], max_rows: usize) -> Vec<Column<'a>> {
    let mut ordered: Vec<&GraphNode> = nodes.to_vec();
    ordered.sort_by_key(|n| n.created_at);
    ordered
        .chunks(max_rows.max(1))
        .enumerate()
        .map(|(i, chunk)| (GroupKey::TimeColumn(i), chunk.to_vec()))
        .collect()
}

/// Assigns grid-snapped coordinates column by column.
///
/// Flow columns sit at their layer index; every other scheme uses the column's ordinal. Except
/// for `byTime`, members are stably re-ordered by their current `y` so recomputation keeps the
/// visual stacking the user already sees.
pub fn place(
    columns: Vec<Column<'_>>,
    mode: LayoutMode,
    options: &LayoutOptions,
) -> (BTreeMap<String, Vec2>, IndexMap<GroupKey, Vec<String>>) {
    let grid = options.grid_size;
    let mut positions: BTreeMap<String, Vec2> = BTreeMap::new();
    let mut groups: IndexMap<GroupKey, Vec<String>> = IndexMap::with_capacity(columns.len());

    for (ordinal, (key, mut members)) in columns.into_iter().enumerate() {
        if mode != LayoutMode::ByTime {
            members.sort_by(|a, b| a.position.y.total_cmp(&b.position.y));
        }

        let column = match key {
            GroupKey::Layer(layer) => layer,
            _ => ordinal,
        };
        let x = snap_scalar(options.margin + column as f64 * options.column_spacing, grid);
        for (row, n) in members.iter().enumerate() {
            let y = snap_scalar(options.margin + row as f64 * options.row_spacing, grid);
            positions.insert(n.id.clone(), vec2(x, y));
        }

        groups.insert(key, members.into_iter().map(|n| n.id.clone()).collect());
    }

    (positions, groups)
}

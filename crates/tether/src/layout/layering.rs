//! Topological layering over directional relations.
//!
//! A single Kahn pass: sources start at layer 0 and every processed node pushes `layer + 1` onto
//! its successors, keeping the maximum seen. Nodes that are never relaxed (cycles, isolated
//! nodes, nodes only joined by layering-inert links) stay at layer 0.

use crate::graph::{GraphEdge, GraphNode};
use rustc_hash::FxHashMap as HashMap;
use std::collections::VecDeque;

pub fn assign_layers<'a>(nodes: &'a [GraphNode], edges: &[GraphEdge]) -> HashMap<&'a str, usize> {
    let mut index: HashMap<&str, usize> = HashMap::default();
    let mut ids: Vec<&'a str> = Vec::with_capacity(nodes.len());
    for n in nodes {
        if !index.contains_key(n.id.as_str()) {
            index.insert(n.id.as_str(), ids.len());
            ids.push(n.id.as_str());
        }
    }

    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); ids.len()];
    let mut indegree: Vec<usize> = vec![0; ids.len()];
    let mut skipped = 0usize;
    for e in edges.iter().filter(|e| e.relation.is_directional()) {
        let (Some(&s), Some(&t)) = (index.get(e.source.as_str()), index.get(e.target.as_str()))
        else {
            skipped += 1;
            continue;
        };
        successors[s].push(t);
        indegree[t] += 1;
    }
    if skipped > 0 {
        tracing::debug!(skipped, "ignored directional edges with unknown endpoints");
    }

    let mut layer: Vec<usize> = vec![0; ids.len()];
    let mut queue: VecDeque<usize> = (0..ids.len()).filter(|&i| indegree[i] == 0).collect();
    while let Some(u) = queue.pop_front() {
        let next = layer[u] + 1;
        for &v in &successors[u] {
            layer[v] = layer[v].max(next);
            indegree[v] -= 1;
            if indegree[v] == 0 {
                queue.push_back(v);
            }
        }
    }

    ids.into_iter().zip(layer).collect()
}

#[cfg(test)]
mod tests {
    use super::assign_layers;
    use crate::geom::vec2;
    use crate::graph::{GraphEdge, GraphNode, RelationKind};

    fn nodes(ids: &[&str]) -> Vec<GraphNode> {
        ids.iter()
            .map(|id| GraphNode::new(*id, vec2(0.0, 0.0)))
            .collect()
    }

    fn edge(source: &str, target: &str, relation: RelationKind) -> GraphEdge {
        GraphEdge::new(format!("{source}->{target}"), source, target, relation).unwrap()
    }

    #[test]
    fn diamond_takes_longest_predecessor() {
        let ns = nodes(&["a", "b", "c", "d"]);
        let es = vec![
            edge("a", "b", RelationKind::Causal),
            edge("b", "c", RelationKind::Dependency),
            edge("a", "d", RelationKind::Support),
            edge("c", "d", RelationKind::Composition),
        ];
        let layers = assign_layers(&ns, &es);
        assert_eq!(layers["a"], 0);
        assert_eq!(layers["b"], 1);
        assert_eq!(layers["c"], 2);
        assert_eq!(layers["d"], 3);
    }

    #[test]
    fn links_do_not_layer() {
        let ns = nodes(&["a", "b"]);
        let es = vec![edge("a", "b", RelationKind::Link)];
        let layers = assign_layers(&ns, &es);
        assert_eq!(layers["a"], 0);
        assert_eq!(layers["b"], 0);
    }

    #[test]
    fn cycles_fall_back_to_layer_zero() {
        let ns = nodes(&["a", "b", "c"]);
        let es = vec![
            edge("a", "b", RelationKind::Causal),
            edge("b", "a", RelationKind::Causal),
            edge("c", "c", RelationKind::Extension),
        ];
        let layers = assign_layers(&ns, &es);
        assert_eq!(layers["a"], 0);
        assert_eq!(layers["b"], 0);
        assert_eq!(layers["c"], 0);
    }

    #[test]
    fn unknown_endpoints_are_skipped() {
        let ns = nodes(&["a", "b"]);
        let es = vec![
            edge("ghost", "b", RelationKind::Causal),
            edge("a", "b", RelationKind::Causal),
        ];
        let layers = assign_layers(&ns, &es);
        assert_eq!(layers["b"], 1);
    }
}

use crate::error::{Error, Result};
use crate::geom::{Size, Vec2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Note,
    Idea,
    Task,
    Tag,
}

impl NodeKind {
    /// Column order used when grouping by kind.
    pub const CANONICAL: [NodeKind; 4] = [Self::Note, Self::Idea, Self::Task, Self::Tag];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Idea => "idea",
            Self::Task => "task",
            Self::Tag => "tag",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Causal,
    Support,
    Extension,
    Composition,
    Dependency,
    /// Generic association. Drawn, but ignored by layering.
    #[default]
    Link,
}

impl RelationKind {
    pub const ALL: [RelationKind; 6] = [
        Self::Causal,
        Self::Support,
        Self::Extension,
        Self::Composition,
        Self::Dependency,
        Self::Link,
    ];

    /// Whether edges of this kind take part in topological layering.
    pub const fn is_directional(self) -> bool {
        match self {
            Self::Causal | Self::Support | Self::Extension | Self::Composition | Self::Dependency => {
                true
            }
            Self::Link => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    /// Last committed position (what the host persisted), not the simulated one.
    pub position: Vec2,
    #[serde(default)]
    pub kind: NodeKind,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Creation time in milliseconds since the Unix epoch.
    #[serde(default)]
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<String>,
    #[serde(default)]
    pub locked: bool,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, position: Vec2) -> Self {
        Self {
            id: id.into(),
            position,
            kind: NodeKind::default(),
            tags: Vec::new(),
            created_at: 0,
            frame_id: None,
            locked: false,
        }
    }

    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_created_at(mut self, created_at: i64) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_frame(mut self, frame_id: impl Into<String>) -> Self {
        self.frame_id = Some(frame_id.into());
        self
    }

    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    /// The tag that decides tag grouping. Blank tags count as no tag.
    pub fn primary_tag(&self) -> Option<&str> {
        self.tags
            .first()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub relation: RelationKind,
}

impl GraphEdge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        relation: RelationKind,
    ) -> Result<Self> {
        let edge = Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            relation,
        };
        if edge.source.is_empty() || edge.target.is_empty() {
            return Err(Error::MissingEndpoint { edge_id: edge.id });
        }
        Ok(edge)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub id: String,
    /// Top-left corner.
    pub position: Vec2,
    pub size: Size,
}

impl Frame {
    pub fn new(id: impl Into<String>, position: Vec2, size: Size) -> Self {
        Self {
            id: id.into(),
            position,
            size,
        }
    }

    pub fn centroid(&self) -> Vec2 {
        self.position + self.size.to_vector() / 2.0
    }
}

/// One snapshot of everything the engine looks at.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagram {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
    #[serde(default)]
    pub frames: Vec<Frame>,
}

impl Diagram {
    pub fn validate(&self) -> Result<()> {
        match self.dangling_edges().next() {
            Some(e) => Err(Error::MissingEndpoint {
                edge_id: e.id.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Edges whose source or target is not a node of this diagram.
    pub fn dangling_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        let node_exists: std::collections::BTreeSet<&str> =
            self.nodes.iter().map(|n| n.id.as_str()).collect();
        self.edges.iter().filter(move |e| {
            !node_exists.contains(e.source.as_str()) || !node_exists.contains(e.target.as_str())
        })
    }
}

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;

/// Stable, opaque node identifier supplied by the host
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        NodeId(id.to_string())
    }
}

/// How well the learner knows a concept (drives node color)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ConceptStatus {
    Known,
    Fuzzy,
    Unknown,
    New,
    /// Anything the host sent that we don't recognise
    Unrated,
}

impl From<String> for ConceptStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            "known" => ConceptStatus::Known,
            "fuzzy" => ConceptStatus::Fuzzy,
            "unknown" => ConceptStatus::Unknown,
            "new" => ConceptStatus::New,
            _ => ConceptStatus::Unrated,
        }
    }
}

/// A single knowledge concept as handed over by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    pub id: NodeId,
    pub label: String,
    pub status: ConceptStatus,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Relative visual weight (>= 0), feeds the glow size
    #[serde(default)]
    pub val: f32,
}

impl Concept {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        status: ConceptStatus,
        category: impl Into<String>,
    ) -> Self {
        Concept {
            id: NodeId::new(id),
            label: label.into(),
            status,
            category: category.into(),
            description: None,
            val: 0.0,
        }
    }
}

/// Connection between two concepts. Order is kept for semantic queries,
/// rendering treats it as undirected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    pub source: NodeId,
    pub target: NodeId,
}

impl Link {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Link {
            source: NodeId::new(source),
            target: NodeId::new(target),
        }
    }

    pub fn touches(&self, id: &str) -> bool {
        self.source.as_str() == id || self.target.as_str() == id
    }
}

/// Immutable graph data the host replaces wholesale on change
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<Concept>,
    pub links: Vec<Link>,
}

#[derive(Debug)]
pub enum SnapshotError {
    Parse(serde_json::Error),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Parse(err) => write!(f, "Malformed graph snapshot: {}", err),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Parse(err) => Some(err),
        }
    }
}

impl GraphSnapshot {
    pub fn new(nodes: Vec<Concept>, links: Vec<Link>) -> Self {
        GraphSnapshot { nodes, links }
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(json).map_err(SnapshotError::Parse)
    }

    /// Distinct categories, sorted so the same set always yields the same list
    pub fn categories(&self) -> Vec<String> {
        self.nodes
            .iter()
            .map(|node| node.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn find(&self, id: &str) -> Option<&Concept> {
        self.nodes.iter().find(|node| node.id.as_str() == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Concept> {
        self.nodes.iter_mut().find(|node| node.id.as_str() == id)
    }
}

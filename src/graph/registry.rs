use super::layout::CategoryLayout;
use super::snapshot::{ConceptStatus, GraphSnapshot, NodeId};
use bevy::log::{info, warn};
use bevy::math::Vec3;
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Per-node simulation record, rebuilt from scratch on every snapshot
#[derive(Debug, Clone)]
pub struct NodeRecord {
    pub id: NodeId,
    pub label: String,
    pub status: ConceptStatus,
    pub category: String,
    pub description: Option<String>,
    pub val: f32,
    /// Position in scene-group space
    pub position: Vec3,
    pub velocity: Vec3,
    /// Derived from the hidden-category set each tick, never carried across rebuilds
    pub visible: bool,
}

impl NodeRecord {
    /// Glow diameter before pulse/emphasis is applied
    pub fn base_glow_size(&self) -> f32 {
        5.0 + self.val * 0.1
    }
}

/// An edge resolved to registry indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRecord {
    pub source: usize,
    pub target: usize,
    /// True iff both endpoints are visible
    pub visible: bool,
}

impl EdgeRecord {
    pub fn touches(&self, index: usize) -> bool {
        self.source == index || self.target == index
    }
}

/// Input data the registry refused. Never fatal; the rest of the snapshot loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryWarning {
    DuplicateNode(NodeId),
    UnknownEndpoint {
        source: NodeId,
        target: NodeId,
        missing: NodeId,
    },
}

impl fmt::Display for RegistryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryWarning::DuplicateNode(id) => {
                write!(f, "Node {} appears twice, keeping the first", id)
            }
            RegistryWarning::UnknownEndpoint {
                source,
                target,
                missing,
            } => write!(
                f,
                "Link {}-{} dropped: node {} does not exist",
                source, target, missing
            ),
        }
    }
}

impl std::error::Error for RegistryWarning {}

/// Owns the mutable simulation state for one mounted graph view
#[derive(Debug, Default)]
pub struct Registry {
    nodes: Vec<NodeRecord>,
    index: HashMap<NodeId, usize>,
    edges: Vec<EdgeRecord>,
}

impl Registry {
    /// Throw away all simulation state and materialise `snapshot`.
    ///
    /// Nodes are seeded uniformly within `jitter` of their category anchor
    /// with zero velocity. Links that name an unknown node are dropped.
    pub fn rebuild(
        &mut self,
        snapshot: &GraphSnapshot,
        layout: &CategoryLayout,
        rng: &mut impl Rng,
    ) -> Vec<RegistryWarning> {
        self.clear();

        let jitter = layout.preset().jitter;
        let mut warnings = Vec::new();

        for concept in &snapshot.nodes {
            if self.index.contains_key(&concept.id) {
                warnings.push(RegistryWarning::DuplicateNode(concept.id.clone()));
                continue;
            }

            let offset = if jitter > 0.0 {
                Vec3::new(
                    rng.random_range(-jitter..=jitter),
                    rng.random_range(-jitter..=jitter),
                    rng.random_range(-jitter..=jitter),
                )
            } else {
                Vec3::ZERO
            };

            self.index.insert(concept.id.clone(), self.nodes.len());
            self.nodes.push(NodeRecord {
                id: concept.id.clone(),
                label: concept.label.clone(),
                status: concept.status,
                category: concept.category.clone(),
                description: concept.description.clone(),
                val: concept.val.max(0.0),
                position: layout.anchor(&concept.category) + offset,
                velocity: Vec3::ZERO,
                visible: true,
            });
        }

        for link in &snapshot.links {
            let source = self.index.get(&link.source).copied();
            let target = self.index.get(&link.target).copied();

            match (source, target) {
                (Some(source), Some(target)) => self.edges.push(EdgeRecord {
                    source,
                    target,
                    visible: true,
                }),
                _ => {
                    let missing = if source.is_none() {
                        link.source.clone()
                    } else {
                        link.target.clone()
                    };
                    warnings.push(RegistryWarning::UnknownEndpoint {
                        source: link.source.clone(),
                        target: link.target.clone(),
                        missing,
                    });
                }
            }
        }

        for warning in &warnings {
            warn!("{}", warning);
        }
        info!(
            "Registry rebuilt: {} nodes, {} edges ({} inputs dropped)",
            self.nodes.len(),
            self.edges.len(),
            warnings.len()
        );

        warnings
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.edges.clear();
    }

    /// Recompute node and edge visibility from the hidden-category set
    pub fn refresh_visibility(&mut self, hidden: &HashSet<String>) {
        for node in &mut self.nodes {
            node.visible = !hidden.contains(&node.category);
        }
        for edge in &mut self.edges {
            edge.visible = self.nodes[edge.source].visible && self.nodes[edge.target].visible;
        }
    }

    pub fn find(&self, id: &str) -> Option<&NodeRecord> {
        self.index.get(id).map(|&index| &self.nodes[index])
    }

    #[cfg(test)]
    pub fn find_mut(&mut self, id: &str) -> Option<&mut NodeRecord> {
        self.index.get(id).map(|&index| &mut self.nodes[index])
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn for_each_visible(&self, mut f: impl FnMut(&NodeRecord)) {
        self.nodes.iter().filter(|node| node.visible).for_each(|node| f(node));
    }

    pub fn nodes(&self) -> &[NodeRecord] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [NodeRecord] {
        &mut self.nodes
    }

    pub fn edges(&self) -> &[EdgeRecord] {
        &self.edges
    }

    /// Ids linked to `id`, in link order
    pub fn neighbors(&self, id: &str) -> Vec<&NodeId> {
        let Some(index) = self.index_of(id) else {
            return Vec::new();
        };

        self.edges
            .iter()
            .filter(|edge| edge.touches(index))
            .map(|edge| {
                let other = if edge.source == index {
                    edge.target
                } else {
                    edge.source
                };
                &self.nodes[other].id
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

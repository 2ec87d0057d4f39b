// host/session.rs

use std::collections::HashSet;

use bevy::prelude::Resource;

use crate::graph::{Concept, ConceptStatus, GraphSnapshot, Link, NodeId};
use crate::visual::Activation;

/// The surrounding application's view of the knowledge graph: the data, the
/// category filter and the current selection.
///
/// Every change to the node/link data bumps `revision`, which tells the
/// graph view to rebuild.
#[derive(Debug, Clone, Resource)]
pub struct KnowledgeBase {
    snapshot: GraphSnapshot,
    hidden: HashSet<String>,
    selected: Option<NodeId>,
    revision: u64,
}

impl KnowledgeBase {
    pub fn new(snapshot: GraphSnapshot) -> Self {
        KnowledgeBase {
            snapshot,
            hidden: HashSet::new(),
            selected: None,
            revision: 0,
        }
    }

    // === Queries ===

    pub fn snapshot(&self) -> &GraphSnapshot {
        &self.snapshot
    }

    /// Sorted, unique categories (the filter list)
    pub fn categories(&self) -> Vec<String> {
        self.snapshot.categories()
    }

    pub fn hidden_categories(&self) -> &HashSet<String> {
        &self.hidden
    }

    pub fn selected(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    pub fn selected_concept(&self) -> Option<&Concept> {
        self.selected
            .as_ref()
            .and_then(|id| self.snapshot.find(id.as_str()))
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    // === Mutations ===

    /// Flip a category's visibility. Returns whether it is now hidden.
    pub fn toggle_category(&mut self, category: &str) -> bool {
        if self.hidden.remove(category) {
            false
        } else {
            self.hidden.insert(category.to_string());
            true
        }
    }

    /// Select a node, or clear the selection. Unknown ids clear it.
    pub fn select(&mut self, id: Option<NodeId>) {
        self.selected = id.filter(|id| self.snapshot.find(id.as_str()).is_some());
    }

    /// Apply a click reported by the graph view
    pub fn apply_activation(&mut self, activation: &Activation) {
        self.select(activation.node_id().cloned());
    }

    /// Re-rate a concept. The whole snapshot is replaced, so the view rebuilds.
    pub fn update_node_status(&mut self, id: &str, status: ConceptStatus) -> bool {
        match self.snapshot.find_mut(id) {
            Some(concept) if concept.status != status => {
                concept.status = status;
                self.revision += 1;
                true
            }
            _ => false,
        }
    }

    /// Append newly extracted concepts and links
    pub fn add_concepts(&mut self, nodes: Vec<Concept>, links: Vec<Link>) {
        if nodes.is_empty() && links.is_empty() {
            return;
        }
        self.snapshot.nodes.extend(nodes);
        self.snapshot.links.extend(links);
        self.revision += 1;
    }
}

// host/library.rs

use bevy::prelude::*;

use crate::graph::{GraphSnapshot, SnapshotError};
use crate::host::session::KnowledgeBase;

const DEMO_GRAPH_JSON: &str = include_str!("../../assets/demo_graph.json");

/// Parse the embedded demo knowledge graph
pub fn demo_snapshot() -> Result<GraphSnapshot, SnapshotError> {
    GraphSnapshot::from_json(DEMO_GRAPH_JSON)
}

/// System: load the demo graph into a fresh knowledge base
pub fn setup_knowledge_base(mut commands: Commands) {
    let snapshot = match demo_snapshot() {
        Ok(snapshot) => {
            info!(
                "✓ Demo graph loaded: {} concepts, {} links",
                snapshot.nodes.len(),
                snapshot.links.len()
            );
            snapshot
        }
        Err(err) => {
            error!("Failed to load demo graph: {}", err);
            GraphSnapshot::default()
        }
    };

    commands.insert_resource(KnowledgeBase::new(snapshot));
}

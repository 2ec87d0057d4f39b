//! Demo stand-in for the note-taking application that embeds the graph:
//! it owns the knowledge base, maps keys to its operations and reacts to
//! node activations.

pub mod controls;
pub mod library;
pub mod session;

use bevy::prelude::*;

use crate::visual::{GraphSystems, GraphView};
use controls::{
    LoadedRevision, handle_activations, keyboard_controls, log_hover, sync_view, toggle_mount,
};
use library::setup_knowledge_base;

pub use session::KnowledgeBase;

pub struct HostPlugin;

impl Plugin for HostPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LoadedRevision>()
            .add_systems(Startup, setup_knowledge_base)
            .add_systems(
                Update,
                (keyboard_controls, toggle_mount, sync_view)
                    .chain()
                    .in_set(GraphSystems::Sync),
            )
            .add_systems(
                Update,
                (
                    handle_activations,
                    log_hover.run_if(resource_exists::<GraphView>),
                )
                    .in_set(GraphSystems::React),
            );
    }
}

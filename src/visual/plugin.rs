use bevy::prelude::*;

use crate::input::InputSet;
use crate::visual::interactions::{Activation, Viewport, forward_pointer_input};
use crate::visual::render::SceneRenderer;
use crate::visual::render::scene::{SceneHandles, despawn_star_field, spawn_star_field};
use crate::visual::view::GraphView;

pub struct GraphPlugin;

/// Order of the per-frame graph work
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GraphSystems {
    /// Host state and window size pushed into the view
    Sync,
    /// Input forwarding and the view tick
    Tick,
    /// Reactions to the tick's output
    React,
}

/// Emitted when a click resolves to a node or to empty space
#[derive(Message, Debug, Clone)]
pub struct NodeActivated(pub Activation);

impl Plugin for GraphPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SceneHandles>()
            .add_message::<NodeActivated>()
            .configure_sets(
                Update,
                (
                    InputSet,
                    GraphSystems::Sync,
                    GraphSystems::Tick,
                    GraphSystems::React,
                )
                    .chain(),
            )
            .add_systems(Startup, mount_graph_view)
            .add_systems(
                Update,
                (
                    spawn_star_field.run_if(resource_added::<GraphView>),
                    despawn_star_field.run_if(resource_removed::<GraphView>),
                )
                    .in_set(GraphSystems::Sync),
            )
            .add_systems(
                Update,
                (forward_pointer_input, tick_graph_view)
                    .chain()
                    .in_set(GraphSystems::Tick)
                    .run_if(resource_exists::<GraphView>),
            );
    }
}

/// Size of the primary window, or a placeholder until one exists
pub fn primary_viewport(windows: &Query<&Window>) -> Viewport {
    windows
        .single()
        .map(|window| Viewport::new(window.width(), window.height()))
        .unwrap_or(Viewport::new(1280.0, 720.0))
}

fn mount_graph_view(mut commands: Commands, windows: Query<&Window>) {
    commands.insert_resource(GraphView::mount(primary_viewport(&windows), rand::random()));
}

/// System: run one frame of the graph (physics, picking, camera, present)
fn tick_graph_view(
    time: Res<Time>,
    mut view: ResMut<GraphView>,
    mut renderer: SceneRenderer,
    mut activations: MessageWriter<NodeActivated>,
) {
    if let Some(activation) = view.tick(time.elapsed_secs(), &mut renderer) {
        info!("Node activated: {:?}", activation.as_event_str());
        activations.write(NodeActivated(activation));
    }
}

// host/controls.rs

use bevy::prelude::*;

use crate::graph::{Concept, ConceptStatus, Link, NodeId};
use crate::host::session::KnowledgeBase;
use crate::visual::plugin::primary_viewport;
use crate::visual::render::SceneRenderer;
use crate::visual::{GraphView, NodeActivated};

/// Revision of the knowledge base the mounted view was last built from
#[derive(Resource, Default, Debug)]
pub struct LoadedRevision(pub Option<u64>);

const CATEGORY_KEYS: [KeyCode; 9] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

/// System: keyboard stand-ins for the host application's UI
pub fn keyboard_controls(keys: Res<ButtonInput<KeyCode>>, mut kb: ResMut<KnowledgeBase>) {
    let categories = kb.categories();
    for (key, category) in CATEGORY_KEYS.iter().zip(&categories) {
        if keys.just_pressed(*key) {
            let hidden = kb.toggle_category(category);
            info!("Category {} {}", category, if hidden { "hidden" } else { "shown" });
        }
    }

    if keys.just_pressed(KeyCode::Escape) && kb.selected().is_some() {
        kb.select(None);
        info!("Selection cleared");
    }

    let rating = if keys.just_pressed(KeyCode::KeyK) {
        Some(ConceptStatus::Known)
    } else if keys.just_pressed(KeyCode::KeyF) {
        Some(ConceptStatus::Fuzzy)
    } else if keys.just_pressed(KeyCode::KeyU) {
        Some(ConceptStatus::Unknown)
    } else {
        None
    };
    if let (Some(status), Some(id)) = (rating, kb.selected().cloned()) {
        if kb.update_node_status(id.as_str(), status) {
            info!("Rated {} as {:?}", id, status);
        }
    }

    if keys.just_pressed(KeyCode::KeyN) {
        let concept = next_concept(&kb);
        let links = kb
            .selected()
            .map(|selected| vec![Link::new(selected.as_str(), concept.id.as_str())])
            .unwrap_or_default();
        info!("Added concept {} ({} links)", concept.id, links.len());
        kb.add_concepts(vec![concept], links);
    }
}

/// A fresh concept in the selected node's category (or "Inbox")
fn next_concept(kb: &KnowledgeBase) -> Concept {
    let mut n = kb.snapshot().nodes.len() + 1;
    while kb.snapshot().find(&format!("note-{n}")).is_some() {
        n += 1;
    }
    let category = kb
        .selected_concept()
        .map(|concept| concept.category.clone())
        .unwrap_or_else(|| "Inbox".to_string());
    Concept::new(format!("note-{n}"), format!("Note {n}"), ConceptStatus::New, category)
}

/// System: push the knowledge base into the mounted view.
///
/// Data changes rebuild the view; filter and selection changes are plain
/// latest-value writes. A render failure unmounts the view.
pub fn sync_view(
    mut commands: Commands,
    kb: Res<KnowledgeBase>,
    view: Option<ResMut<GraphView>>,
    mut loaded: ResMut<LoadedRevision>,
    mut renderer: SceneRenderer,
) {
    let Some(mut view) = view.filter(|view| view.is_mounted()) else {
        return;
    };

    if loaded.0 != Some(kb.revision()) {
        loaded.0 = Some(kb.revision());
        match view.load(kb.snapshot(), &mut renderer) {
            Ok(warnings) if !warnings.is_empty() => {
                warn!("Graph loaded with {} dropped inputs", warnings.len());
            }
            Ok(_) => {}
            Err(err) => {
                error!("Graph view failed to start: {}", err);
                view.unmount(&mut renderer);
                commands.remove_resource::<GraphView>();
                return;
            }
        }
    }

    if kb.is_changed() || view.is_added() {
        view.set_hidden_categories(kb.hidden_categories().clone());
        view.set_selection(kb.selected().cloned());
    }
}

/// System: apply clicks reported by the view and describe the selection
pub fn handle_activations(
    mut activations: MessageReader<NodeActivated>,
    mut kb: ResMut<KnowledgeBase>,
    view: Option<Res<GraphView>>,
) {
    let Some(NodeActivated(activation)) = activations.read().last() else {
        return;
    };
    kb.apply_activation(activation);

    let Some(concept) = kb.selected_concept() else {
        return;
    };
    let connections: Vec<&NodeId> = view
        .as_ref()
        .map(|view| view.connections_of(concept.id.as_str()))
        .unwrap_or_default();
    info!(
        "Selected {} [{:?}, {}] with {} connections: {}",
        concept.label,
        concept.status,
        concept.category,
        connections.len(),
        concept.description.as_deref().unwrap_or("no description")
    );
}

/// System: report the node under the pointer whenever it changes
pub fn log_hover(view: Res<GraphView>, mut last: Local<Option<NodeId>>) {
    let hovered = view.selection().hovered();
    if hovered == (*last).as_ref() {
        return;
    }
    if let Some(node) = hovered.and_then(|id| view.registry().find(id.as_str())) {
        debug!("Hovering {} ({})", node.label, node.category);
    }
    *last = hovered.cloned();
}

/// System: M mounts or unmounts the graph view
pub fn toggle_mount(
    keys: Res<ButtonInput<KeyCode>>,
    mut commands: Commands,
    windows: Query<&Window>,
    view: Option<ResMut<GraphView>>,
    mut loaded: ResMut<LoadedRevision>,
    mut renderer: SceneRenderer,
) {
    if !keys.just_pressed(KeyCode::KeyM) {
        return;
    }

    match view {
        Some(mut view) => {
            view.unmount(&mut renderer);
            commands.remove_resource::<GraphView>();
        }
        None => {
            loaded.0 = None;
            commands.insert_resource(GraphView::mount(primary_viewport(&windows), rand::random()));
        }
    }
}

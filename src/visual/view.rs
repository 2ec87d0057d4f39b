use std::collections::HashSet;

use bevy::log::{debug, error, info, warn};
use bevy::math::{Quat, Vec2};
use bevy::prelude::Resource;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::camera::CameraRig;
use crate::graph::{CategoryLayout, GraphSnapshot, NodeId, Registry, RegistryWarning};
use crate::visual::interactions::picking::{Activation, SelectionController};
use crate::visual::interactions::pointer::{PointerState, Viewport};
use crate::visual::nodes::{
    LinkVisual, NodeVisual, animate_link, animate_node, pulse_phase, status_color,
};
use crate::visual::physics::{self, PhysicsPreset, PhysicsScratch, presets};
use crate::visual::render::{
    ACTIVE_LABEL_ORDER, Frame, LinkFrame, NodeFrame, RenderAdapter, RenderError,
};

/// One mounted graph view: the simulation, its camera and the inputs the
/// host writes between ticks.
///
/// Host input (pointer, wheel, hidden categories, selection) is stored as
/// latest values and only read inside [`GraphView::tick`], which is the sole
/// writer of simulation state.
#[derive(Resource)]
pub struct GraphView {
    layout: CategoryLayout,
    registry: Registry,
    physics: PhysicsPreset,
    scratch: PhysicsScratch,
    selection: SelectionController,
    pointer: PointerState,
    /// Created by the first successful load
    camera: Option<CameraRig>,
    node_visuals: Vec<NodeVisual>,
    link_visuals: Vec<LinkVisual>,
    hidden: HashSet<String>,
    viewport: Viewport,
    frame: Frame,
    rng: StdRng,
    mounted: bool,
    /// Adapter resources are live and owed a release
    allocated: bool,
}

impl GraphView {
    pub fn mount(viewport: Viewport, seed: u64) -> Self {
        info!("Graph view mounted ({}x{})", viewport.width, viewport.height);
        GraphView {
            layout: CategoryLayout::default(),
            registry: Registry::default(),
            physics: presets::LIVING,
            scratch: PhysicsScratch::default(),
            selection: SelectionController::default(),
            pointer: PointerState::default(),
            camera: None,
            node_visuals: Vec::new(),
            link_visuals: Vec::new(),
            hidden: HashSet::new(),
            viewport,
            frame: Frame::default(),
            rng: StdRng::seed_from_u64(seed),
            mounted: true,
            allocated: false,
        }
    }

    #[cfg(test)]
    pub fn with_physics(mut self, preset: PhysicsPreset) -> Self {
        self.physics = preset;
        self
    }

    /// Replace the whole graph with `snapshot`.
    ///
    /// Previous adapter resources are released first, then the registry is
    /// rebuilt from scratch and the adapter allocates for the new node set.
    /// Dropped links and duplicate ids come back as warnings; an adapter
    /// failure is fatal for the view.
    pub fn load(
        &mut self,
        snapshot: &GraphSnapshot,
        adapter: &mut impl RenderAdapter,
    ) -> Result<Vec<RegistryWarning>, RenderError> {
        if !self.mounted {
            warn!("Ignoring snapshot for an unmounted graph view");
            return Ok(Vec::new());
        }

        if self.allocated {
            adapter.release();
            self.allocated = false;
        }

        self.layout.plan(&snapshot.categories());
        let warnings = self.registry.rebuild(snapshot, &self.layout, &mut self.rng);
        self.registry.refresh_visibility(&self.hidden);
        let mut visible = 0;
        self.registry.for_each_visible(|_| visible += 1);
        debug!("{} of {} nodes visible after load", visible, self.registry.len());

        self.node_visuals = self
            .registry
            .nodes()
            .iter()
            .map(|node| NodeVisual::new(pulse_phase(node.id.as_str()), node.base_glow_size()))
            .collect();
        self.link_visuals = vec![LinkVisual::default(); self.registry.edges().len()];

        if self.camera.is_none() {
            self.camera = Some(CameraRig::new(
                self.registry.len(),
                self.viewport.aspect_ratio(),
            ));
        }

        if let Err(err) = adapter.allocate(&self.registry) {
            error!("Graph view could not allocate render resources: {}", err);
            return Err(err);
        }
        self.allocated = true;

        Ok(warnings)
    }

    /// Advance one frame: physics, picking, camera, then present.
    ///
    /// Returns the activation produced by a click since the previous tick.
    /// Before the first successful load this is a no-op and pointer input
    /// stays buffered.
    pub fn tick(&mut self, elapsed: f32, adapter: &mut impl RenderAdapter) -> Option<Activation> {
        if !self.mounted || !self.allocated {
            return None;
        }
        let rig = self.camera.as_mut()?;

        self.registry.refresh_visibility(&self.hidden);
        physics::step(&mut self.registry, &self.layout, &self.physics, &mut self.scratch);

        let rotation = rig.scene_rotation();
        self.selection
            .update_hover(&self.registry, rig, rotation, self.pointer.ndc());
        let activation = self
            .pointer
            .take_click()
            .map(|ndc| self.selection.resolve_click(&self.registry, rig, rotation, ndc));

        rig.add_drag(self.pointer.take_drag());
        rig.zoom(self.pointer.take_wheel());
        rig.advance_rotation();
        let rotation = rig.scene_rotation();
        let focus = self
            .selection
            .selected()
            .and_then(|id| self.registry.find(id.as_str()))
            .filter(|node| node.visible)
            .map(|node| rotation * node.position);
        rig.follow(focus);

        self.build_frame(elapsed, rotation);
        adapter.present(&self.frame);

        if let Some(activation) = &activation {
            debug!("Click resolved to {:?}", activation);
        }
        activation
    }

    fn build_frame(&mut self, elapsed: f32, rotation: Quat) {
        let active = self
            .selection
            .active_id()
            .and_then(|id| self.registry.index_of(id.as_str()));
        let any_selected = self.selection.selected().is_some();

        self.frame.clear();
        for (index, node) in self.registry.nodes().iter().enumerate() {
            let is_active = active == Some(index);
            let visual = &mut self.node_visuals[index];
            animate_node(visual, node.base_glow_size(), elapsed, is_active, any_selected);

            self.frame.nodes.push(NodeFrame {
                index,
                position: rotation * node.position,
                color: status_color(node.status),
                glow_size: visual.glow_size,
                label_opacity: visual.label_opacity,
                label_scale: visual.label_scale,
                is_active,
                visible: node.visible,
                draw_order: if is_active { ACTIVE_LABEL_ORDER } else { 0 },
            });
        }

        for (edge, visual) in self.registry.edges().iter().zip(&mut self.link_visuals) {
            let connected = active.is_some_and(|index| edge.touches(index));
            animate_link(visual, connected);

            self.frame.links.push(LinkFrame {
                from: self.frame.nodes[edge.source].position,
                to: self.frame.nodes[edge.target].position,
                visible: edge.visible,
                opacity: visual.opacity,
                connected_to_active: connected,
            });
        }
    }

    /// Tear the view down. Adapter resources are released exactly once no
    /// matter how often this is called.
    pub fn unmount(&mut self, adapter: &mut impl RenderAdapter) {
        if self.allocated {
            adapter.release();
            self.allocated = false;
        }
        if self.mounted {
            self.mounted = false;
            self.registry.clear();
            self.node_visuals.clear();
            self.link_visuals.clear();
            self.frame.clear();
            info!("Graph view unmounted");
        }
    }

    pub fn set_hidden_categories(&mut self, hidden: HashSet<String>) {
        self.hidden = hidden;
    }

    pub fn set_selection(&mut self, selected: Option<NodeId>) {
        self.selection.set_selected(selected);
    }

    pub fn pointer_pressed(&mut self, device: Vec2) {
        self.pointer.press(device, &self.viewport);
    }

    pub fn pointer_moved(&mut self, device: Vec2) {
        self.pointer.move_to(device, &self.viewport);
    }

    pub fn pointer_released(&mut self, device: Vec2) {
        self.pointer.release(device, &self.viewport);
    }

    pub fn pointer_left(&mut self) {
        self.pointer.leave();
    }

    pub fn wheel(&mut self, delta: f32) {
        self.pointer.wheel(delta);
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if let Some(rig) = self.camera.as_mut() {
            rig.aspect = viewport.aspect_ratio();
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn camera(&self) -> Option<&CameraRig> {
        self.camera.as_ref()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn connections_of(&self, id: &str) -> Vec<&NodeId> {
        self.registry.neighbors(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec3;

    use crate::graph::{Concept, ConceptStatus, Link};
    use crate::visual::render::RecordingAdapter;

    /// Nothing moves unless the test moves it
    const STILL: PhysicsPreset = PhysicsPreset {
        repulsion: 0.0,
        softening: 0.05,
        cluster_strength: 0.0,
        center_gravity: 0.0,
        damping: 0.9,
    };

    const SQUARE: Viewport = Viewport {
        width: 800.0,
        height: 800.0,
    };

    fn concept(id: &str, category: &str) -> Concept {
        Concept::new(id, id.to_uppercase(), ConceptStatus::New, category)
    }

    fn three_in_a_row() -> GraphSnapshot {
        GraphSnapshot::new(
            vec![
                concept("A", "Left"),
                concept("B", "Middle"),
                concept("C", "Right"),
            ],
            vec![Link::new("A", "B"), Link::new("B", "C")],
        )
    }

    /// Loaded view with A, B, C on the x axis and the camera looking at B
    fn staged_view(adapter: &mut RecordingAdapter) -> GraphView {
        let mut view = GraphView::mount(SQUARE, 7).with_physics(STILL);
        view.load(&three_in_a_row(), adapter).unwrap();
        place(&mut view);
        view
    }

    fn place(view: &mut GraphView) {
        view.registry.find_mut("A").unwrap().position = Vec3::new(-20.0, 0.0, 0.0);
        view.registry.find_mut("B").unwrap().position = Vec3::ZERO;
        view.registry.find_mut("C").unwrap().position = Vec3::new(20.0, 0.0, 0.0);

        let rig = view.camera.as_mut().unwrap();
        rig.position = Vec3::new(0.0, 0.0, 50.0);
        rig.look_target = Vec3::ZERO;
    }

    fn click(view: &mut GraphView, at: Vec2) {
        view.pointer_pressed(at);
        view.pointer_moved(at + Vec2::new(2.0, 1.0));
        view.pointer_released(at + Vec2::new(2.0, 1.0));
    }

    #[test]
    fn test_center_click_activates_target() {
        let mut adapter = RecordingAdapter::default();
        let mut view = staged_view(&mut adapter);

        click(&mut view, Vec2::new(400.0, 400.0));
        let activation = view.tick(0.0, &mut adapter);

        assert_eq!(activation, Some(Activation::Node(NodeId::from("B"))));
        assert_eq!(activation.unwrap().as_event_str(), "B");
        // Reported, not applied
        assert_eq!(view.selection().selected(), None);
    }

    #[test]
    fn test_empty_space_click_emits_deselect() {
        let mut adapter = RecordingAdapter::default();
        let mut view = staged_view(&mut adapter);
        view.set_selection(Some(NodeId::from("B")));

        click(&mut view, Vec2::new(400.0, 20.0));
        let activation = view.tick(0.0, &mut adapter).unwrap();

        assert_eq!(activation, Activation::Deselect);
        assert_eq!(activation.as_event_str(), "");
    }

    #[test]
    fn test_drag_rotates_without_activation() {
        let mut adapter = RecordingAdapter::default();
        let mut view = staged_view(&mut adapter);

        view.pointer_pressed(Vec2::new(400.0, 400.0));
        view.pointer_moved(Vec2::new(460.0, 400.0));
        view.pointer_released(Vec2::new(460.0, 400.0));

        assert_eq!(view.tick(0.0, &mut adapter), None);
        assert!(view.camera().unwrap().spin().x > 0.0);
    }

    #[test]
    fn test_no_click_no_activation() {
        let mut adapter = RecordingAdapter::default();
        let mut view = staged_view(&mut adapter);
        view.pointer_moved(Vec2::new(400.0, 400.0));

        assert_eq!(view.tick(0.0, &mut adapter), None);
        // Hover alone still emphasises the node
        assert_eq!(view.selection().active_id(), Some(&NodeId::from("B")));
        let frame = adapter.last_frame.unwrap();
        assert_eq!(frame.active().map(|node| node.index), view.registry().index_of("B"));
    }

    #[test]
    fn test_hover_ends_when_pointer_leaves() {
        let mut adapter = RecordingAdapter::default();
        let mut view = staged_view(&mut adapter);
        view.pointer_moved(Vec2::new(400.0, 400.0));
        view.tick(0.0, &mut adapter);
        assert_eq!(view.selection().hovered(), Some(&NodeId::from("B")));

        view.pointer_left();
        view.tick(0.0, &mut adapter);
        assert_eq!(view.selection().hovered(), None);
        assert!(adapter.last_frame.unwrap().active().is_none());
    }

    #[test]
    fn test_drag_back_to_start_keeps_selection() {
        let mut adapter = RecordingAdapter::default();
        let mut view = staged_view(&mut adapter);
        view.set_selection(Some(NodeId::from("B")));

        view.pointer_pressed(Vec2::new(400.0, 20.0));
        view.pointer_moved(Vec2::new(600.0, 20.0));
        view.pointer_moved(Vec2::new(600.0, 170.0));
        view.pointer_moved(Vec2::new(401.0, 21.0));
        view.pointer_released(Vec2::new(401.0, 21.0));

        // A rotation only: no deselect is reported
        assert_eq!(view.tick(0.0, &mut adapter), None);
        assert_eq!(view.selection().selected(), Some(&NodeId::from("B")));
    }

    #[test]
    fn test_rebuild_preserves_ids_and_releases_once() {
        let mut adapter = RecordingAdapter::default();
        let mut view = GraphView::mount(SQUARE, 1);

        let first = GraphSnapshot::new(vec![concept("A", "X"), concept("B", "Y")], vec![]);
        view.load(&first, &mut adapter).unwrap();
        view.tick(0.0, &mut adapter);

        let mut second = first.clone();
        second.nodes.push(concept("C", "Y"));
        view.load(&second, &mut adapter).unwrap();

        for id in ["A", "B", "C"] {
            let node = view.registry().find(id).unwrap();
            assert_eq!(node.id.as_str(), id);
            assert_eq!(node.label, id.to_uppercase());
        }
        assert_eq!(adapter.allocations, 2);
        assert_eq!(adapter.releases, 1);
        assert_eq!(adapter.allocated_nodes, vec![2, 3]);

        view.unmount(&mut adapter);
        view.unmount(&mut adapter);
        assert_eq!(adapter.releases, 2);
        assert!(!adapter.live());
    }

    #[test]
    fn test_camera_distance_set_on_first_load() {
        let mut adapter = RecordingAdapter::default();
        let mut view = GraphView::mount(SQUARE, 1);
        let nodes = (0..40).map(|i| concept(&format!("n{i}"), "X")).collect();
        view.load(&GraphSnapshot::new(nodes, vec![]), &mut adapter)
            .unwrap();

        let rig = view.camera().unwrap();
        assert_eq!(rig.position.z, 110.0);
        assert_eq!(rig.aspect, 1.0);
    }

    #[test]
    fn test_link_visibility_follows_hidden_categories() {
        let mut adapter = RecordingAdapter::default();
        let mut view = staged_view(&mut adapter);

        view.set_hidden_categories(["Right".to_string()].into());
        view.tick(0.0, &mut adapter);

        let registry = view.registry();
        for edge in registry.edges() {
            let nodes = registry.nodes();
            assert_eq!(edge.visible, nodes[edge.source].visible && nodes[edge.target].visible);
        }
        let frame = adapter.last_frame.as_ref().unwrap();
        assert_eq!(
            frame.links.iter().map(|link| link.visible).collect::<Vec<_>>(),
            vec![true, false]
        );
        assert!(!frame.nodes[registry.index_of("C").unwrap()].visible);

        view.set_hidden_categories(HashSet::new());
        view.tick(0.0, &mut adapter);
        assert!(view.registry().edges().iter().all(|edge| edge.visible));
    }

    #[test]
    fn test_hidden_selection_returns_camera_home() {
        let mut adapter = RecordingAdapter::default();
        let mut view = staged_view(&mut adapter);
        view.registry.find_mut("C").unwrap().position = Vec3::new(20.0, 10.0, 0.0);
        view.set_selection(Some(NodeId::from("C")));

        for _ in 0..100 {
            view.tick(0.0, &mut adapter);
        }
        assert!(view.camera().unwrap().look_target.length() > 10.0);

        view.set_hidden_categories(["Right".to_string()].into());
        for _ in 0..300 {
            view.tick(0.0, &mut adapter);
        }
        assert!(view.camera().unwrap().look_target.length() < 0.01);
    }

    #[test]
    fn test_selected_links_highlight() {
        let mut adapter = RecordingAdapter::default();
        let mut view = staged_view(&mut adapter);
        view.set_selection(Some(NodeId::from("A")));

        for _ in 0..100 {
            view.tick(0.0, &mut adapter);
        }
        let frame = adapter.last_frame.unwrap();
        assert!(frame.links[0].connected_to_active);
        assert!((frame.links[0].opacity - 0.6).abs() < 1e-3);
        assert!(!frame.links[1].connected_to_active);
        assert!((frame.links[1].opacity - 0.05).abs() < 1e-3);

        let active = frame.active().unwrap();
        assert_eq!(active.draw_order, ACTIVE_LABEL_ORDER);
        assert!((active.label_opacity - 1.0).abs() < 1e-3);
        let other = &frame.nodes[view.registry().index_of("B").unwrap()];
        assert!((other.label_opacity - 0.2).abs() < 1e-3);
    }

    #[test]
    fn test_input_before_first_load_is_buffered() {
        let mut adapter = RecordingAdapter::default();
        let mut view = GraphView::mount(SQUARE, 3).with_physics(STILL);

        click(&mut view, Vec2::new(400.0, 400.0));
        assert_eq!(view.tick(0.0, &mut adapter), None);
        assert_eq!(adapter.presents, 0);

        view.load(&three_in_a_row(), &mut adapter).unwrap();
        place(&mut view);
        assert_eq!(
            view.tick(0.0, &mut adapter),
            Some(Activation::Node(NodeId::from("B")))
        );
    }

    #[test]
    fn test_backend_failure_is_fatal() {
        let mut adapter = RecordingAdapter::failing("no gpu");
        let mut view = GraphView::mount(SQUARE, 3);

        let result = view.load(&three_in_a_row(), &mut adapter);
        assert_eq!(
            result,
            Err(RenderError::BackendUnavailable("no gpu".to_string()))
        );
        assert_eq!(view.tick(0.0, &mut adapter), None);
        assert_eq!(adapter.presents, 0);

        view.unmount(&mut adapter);
        assert_eq!(adapter.releases, 0);
    }

    #[test]
    fn test_empty_graph_degrades_gracefully() {
        let mut adapter = RecordingAdapter::default();
        let mut view = GraphView::mount(SQUARE, 3);
        view.load(&GraphSnapshot::default(), &mut adapter).unwrap();

        click(&mut view, Vec2::new(400.0, 400.0));
        assert_eq!(view.tick(0.0, &mut adapter), Some(Activation::Deselect));
        assert!(adapter.last_frame.unwrap().nodes.is_empty());
    }

    #[test]
    fn test_dropped_links_are_reported() {
        let mut adapter = RecordingAdapter::default();
        let mut view = GraphView::mount(SQUARE, 3);
        let mut snapshot = three_in_a_row();
        snapshot.links.push(Link::new("A", "ghost"));

        let warnings = view.load(&snapshot, &mut adapter).unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(view.registry().edges().len(), 2);
        assert_eq!(view.connections_of("B"), vec![&NodeId::from("A"), &NodeId::from("C")]);
    }

    #[test]
    fn test_unmounted_view_ignores_everything() {
        let mut adapter = RecordingAdapter::default();
        let mut view = staged_view(&mut adapter);
        view.unmount(&mut adapter);

        click(&mut view, Vec2::new(400.0, 400.0));
        assert_eq!(view.tick(0.0, &mut adapter), None);
        assert!(view.load(&three_in_a_row(), &mut adapter).unwrap().is_empty());
        assert_eq!(adapter.allocations, 1);
        assert!(!view.is_mounted());
    }
}

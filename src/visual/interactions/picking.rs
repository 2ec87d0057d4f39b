use bevy::math::{Quat, Ray3d, Vec2, Vec3};

use crate::camera::CameraRig;
use crate::graph::{NodeId, NodeRecord, Registry};
use crate::visual::nodes::animations::glow_radius;

/// Selection intent reported to the host after a click (never applied here)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    Node(NodeId),
    /// Click on empty space
    Deselect,
}

impl Activation {
    /// Event payload as the host sees it; deselection is the empty string
    pub fn as_event_str(&self) -> &str {
        match self {
            Activation::Node(id) => id.as_str(),
            Activation::Deselect => "",
        }
    }

    pub fn node_id(&self) -> Option<&NodeId> {
        match self {
            Activation::Node(id) => Some(id),
            Activation::Deselect => None,
        }
    }
}

/// Radius of the sphere a node is picked by: its resting glow as drawn
pub fn pick_radius(node: &NodeRecord) -> f32 {
    glow_radius(node.base_glow_size())
}

/// Distance along `ray` to the first hit with a sphere, if any
pub fn intersect_sphere(ray: &Ray3d, center: Vec3, radius: f32) -> Option<f32> {
    let direction: Vec3 = *ray.direction;
    let offset = ray.origin - center;
    let b = offset.dot(direction);
    let c = offset.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    let near = -b - root;
    if near >= 0.0 {
        return Some(near);
    }
    // Ray starts inside the sphere
    let far = -b + root;
    (far >= 0.0).then_some(far)
}

/// Nearest visible node hit by `ray`. Node positions are in scene-group space
/// and are rotated into world space by `rotation` first.
pub fn pick(registry: &Registry, ray: &Ray3d, rotation: Quat) -> Option<usize> {
    registry
        .nodes()
        .iter()
        .enumerate()
        .filter(|(_, node)| node.visible)
        .filter_map(|(index, node)| {
            intersect_sphere(ray, rotation * node.position, pick_radius(node))
                .map(|distance| (index, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}

/// Owns hover and explicit selection.
///
/// Selection is written by the host; hover is recomputed every tick from the
/// pointer. Selection always wins when deciding the active node.
#[derive(Debug, Default)]
pub struct SelectionController {
    selected: Option<NodeId>,
    hovered: Option<NodeId>,
}

impl SelectionController {
    pub fn set_selected(&mut self, selected: Option<NodeId>) {
        self.selected = selected;
    }

    pub fn selected(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    pub fn hovered(&self) -> Option<&NodeId> {
        self.hovered.as_ref()
    }

    /// The node currently emphasised: explicit selection, else hover
    pub fn active_id(&self) -> Option<&NodeId> {
        self.selected.as_ref().or(self.hovered.as_ref())
    }

    /// Recompute hover from the latest pointer position
    pub fn update_hover(
        &mut self,
        registry: &Registry,
        rig: &CameraRig,
        rotation: Quat,
        pointer: Option<Vec2>,
    ) {
        self.hovered = pointer
            .and_then(|ndc| rig.ray_through(ndc))
            .and_then(|ray| pick(registry, &ray, rotation))
            .map(|index| registry.nodes()[index].id.clone());
    }

    /// Turn a click at `ndc` into an activation. Missing everything is an
    /// explicit deselect.
    pub fn resolve_click(
        &self,
        registry: &Registry,
        rig: &CameraRig,
        rotation: Quat,
        ndc: Vec2,
    ) -> Activation {
        rig.ray_through(ndc)
            .and_then(|ray| pick(registry, &ray, rotation))
            .map(|index| Activation::Node(registry.nodes()[index].id.clone()))
            .unwrap_or(Activation::Deselect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{CategoryLayout, Concept, ConceptStatus, GraphSnapshot};
    use bevy::math::Dir3;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    /// A, B, C in a row along x, camera on the z axis looking at B
    fn scene() -> (Registry, CameraRig) {
        let snapshot = GraphSnapshot::new(
            vec![
                Concept::new("A", "Alpha", ConceptStatus::Known, "Left"),
                Concept::new("B", "Beta", ConceptStatus::Fuzzy, "Middle"),
                Concept::new("C", "Gamma", ConceptStatus::Unknown, "Right"),
            ],
            vec![],
        );
        let mut layout = CategoryLayout::default();
        layout.plan(&snapshot.categories());
        let mut registry = Registry::default();
        registry.rebuild(&snapshot, &layout, &mut StdRng::seed_from_u64(0));

        registry.find_mut("A").unwrap().position = Vec3::new(-20.0, 0.0, 0.0);
        registry.find_mut("B").unwrap().position = Vec3::ZERO;
        registry.find_mut("C").unwrap().position = Vec3::new(20.0, 0.0, 0.0);

        let mut rig = CameraRig::new(3, 1.0);
        rig.position = Vec3::new(0.0, 0.0, 50.0);
        rig.look_target = Vec3::ZERO;
        (registry, rig)
    }

    #[test]
    fn test_sphere_intersection() {
        let ray = Ray3d::new(Vec3::new(0.0, 0.0, 10.0), Dir3::NEG_Z);
        assert_eq!(intersect_sphere(&ray, Vec3::ZERO, 1.0), Some(9.0));
        assert_eq!(intersect_sphere(&ray, Vec3::new(5.0, 0.0, 0.0), 1.0), None);
        // Behind the origin
        assert_eq!(intersect_sphere(&ray, Vec3::new(0.0, 0.0, 20.0), 1.0), None);
        // From inside
        let inside = Ray3d::new(Vec3::ZERO, Dir3::X);
        assert_eq!(intersect_sphere(&inside, Vec3::ZERO, 2.0), Some(2.0));
    }

    #[test]
    fn test_pick_sphere_matches_drawn_glow() {
        let (registry, rig) = scene();
        let node = registry.find("B").unwrap();
        let radius = pick_radius(node);
        assert_eq!(radius, glow_radius(node.base_glow_size()));

        // Rays just inside and just outside the drawn rim of B
        let inside = Ray3d::new(rig.position + Vec3::X * (radius * 0.95), Dir3::NEG_Z);
        let outside = Ray3d::new(rig.position + Vec3::X * (radius * 1.05), Dir3::NEG_Z);
        assert!(intersect_sphere(&inside, node.position, radius).is_some());
        assert!(intersect_sphere(&outside, node.position, radius).is_none());
        assert_eq!(pick(&registry, &outside, Quat::IDENTITY), None);
    }

    #[test]
    fn test_center_ray_picks_target_only() {
        let (registry, rig) = scene();
        let selection = SelectionController::default();

        let activation = selection.resolve_click(&registry, &rig, Quat::IDENTITY, Vec2::ZERO);
        assert_eq!(activation, Activation::Node(NodeId::from("B")));
        assert_eq!(activation.as_event_str(), "B");
    }

    #[test]
    fn test_empty_space_deselects() {
        let (registry, rig) = scene();
        let mut selection = SelectionController::default();
        selection.set_selected(Some(NodeId::from("B")));

        let activation =
            selection.resolve_click(&registry, &rig, Quat::IDENTITY, Vec2::new(0.0, 0.9));
        assert_eq!(activation, Activation::Deselect);
        assert_eq!(activation.as_event_str(), "");
        // Reporting never changes the selection itself
        assert_eq!(selection.selected(), Some(&NodeId::from("B")));
    }

    #[test]
    fn test_hidden_nodes_cannot_be_picked() {
        let (mut registry, rig) = scene();
        let hidden: HashSet<String> = ["Middle".to_string()].into();
        registry.refresh_visibility(&hidden);

        let ray = rig.ray_through(Vec2::ZERO).unwrap();
        assert_eq!(pick(&registry, &ray, Quat::IDENTITY), None);
    }

    #[test]
    fn test_nearest_hit_wins() {
        let (mut registry, rig) = scene();
        registry.find_mut("A").unwrap().position = Vec3::new(0.0, 0.0, 10.0);

        let ray = rig.ray_through(Vec2::ZERO).unwrap();
        assert_eq!(pick(&registry, &ray, Quat::IDENTITY), registry.index_of("A"));
    }

    #[test]
    fn test_picking_respects_scene_rotation() {
        let (registry, rig) = scene();
        // Half a turn around y swaps A and C on screen
        let rotation = Quat::from_rotation_y(std::f32::consts::PI);
        let ray = rig.ray_through(Vec2::ZERO).unwrap();
        assert_eq!(pick(&registry, &ray, rotation), registry.index_of("B"));

        let left = rig.ray_through(Vec2::new(-0.69, 0.0)).unwrap();
        assert_eq!(pick(&registry, &left, Quat::IDENTITY), registry.index_of("A"));
        assert_eq!(pick(&registry, &left, rotation), registry.index_of("C"));
    }

    #[test]
    fn test_selection_beats_hover() {
        let (registry, rig) = scene();
        let mut selection = SelectionController::default();

        selection.update_hover(&registry, &rig, Quat::IDENTITY, Some(Vec2::ZERO));
        assert_eq!(selection.active_id(), Some(&NodeId::from("B")));

        selection.set_selected(Some(NodeId::from("C")));
        assert_eq!(selection.hovered(), Some(&NodeId::from("B")));
        assert_eq!(selection.active_id(), Some(&NodeId::from("C")));

        // Unmoved pointer never hovers anything
        selection.update_hover(&registry, &rig, Quat::IDENTITY, None);
        assert_eq!(selection.hovered(), None);
    }
}

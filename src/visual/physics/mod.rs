pub mod forces;

use bevy::math::Vec3;

use crate::graph::{CategoryLayout, Registry};
use forces::{accumulate_centering, accumulate_clustering, accumulate_repulsion};

pub mod presets {
    /// Continuously running layout used by the graph view
    /// Tweak damping (0.85-0.95): higher = slower settle, more drift
    pub const LIVING: PhysicsPreset = PhysicsPreset {
        repulsion: 80.0,
        softening: 0.05,
        cluster_strength: 0.03,
        center_gravity: 0.01,
        damping: 0.90,
    };

    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct PhysicsPreset {
        /// Pairwise inverse-square push between visible nodes
        pub repulsion: f32,
        /// Added to squared distance so coincident nodes don't blow up
        pub softening: f32,
        /// Pull toward the node's category anchor
        pub cluster_strength: f32,
        /// Pull of the whole layout toward the origin
        pub center_gravity: f32,
        /// Velocity multiplier applied after every position update
        pub damping: f32,
    }
}

pub use presets::PhysicsPreset;

/// Scratch buffers reused between ticks
#[derive(Debug, Default)]
pub struct PhysicsScratch {
    visible: Vec<usize>,
    positions: Vec<Vec3>,
    forces: Vec<Vec3>,
}

/// Advance the layout by one frame.
///
/// Only visible nodes take part: hidden nodes keep their position and
/// velocity and exert no force. Forces are summed for every node before any
/// node moves, then `pos += v` and `v *= damping`. The timestep is one frame.
pub fn step(
    registry: &mut Registry,
    layout: &CategoryLayout,
    preset: &PhysicsPreset,
    scratch: &mut PhysicsScratch,
) {
    scratch.visible.clear();
    scratch.positions.clear();
    for (index, node) in registry.nodes().iter().enumerate() {
        if node.visible {
            scratch.visible.push(index);
            scratch.positions.push(node.position);
        }
    }

    if scratch.visible.is_empty() {
        return;
    }

    scratch.forces.clear();
    scratch.forces.resize(scratch.visible.len(), Vec3::ZERO);

    accumulate_repulsion(&scratch.positions, preset, &mut scratch.forces);

    let nodes = registry.nodes_mut();
    for (slot, &index) in scratch.visible.iter().enumerate() {
        let node = &nodes[index];
        let anchor = layout.anchor(&node.category);
        accumulate_clustering(node.position, anchor, preset, &mut scratch.forces[slot]);
        accumulate_centering(node.position, preset, &mut scratch.forces[slot]);
    }

    for (slot, &index) in scratch.visible.iter().enumerate() {
        let node = &mut nodes[index];
        node.velocity += scratch.forces[slot];
        node.position += node.velocity;
        node.velocity *= preset.damping;
    }
}

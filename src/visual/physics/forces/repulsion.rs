use bevy::math::Vec3;

use crate::visual::physics::PhysicsPreset;

/// Push felt by a node at `a` from a node at `b`.
///
/// Magnitude is `repulsion / (|a - b|^2 + softening)` along the unit
/// direction from `b` to `a`. Coincident points produce no push.
pub fn repulsion_between(a: Vec3, b: Vec3, preset: &PhysicsPreset) -> Vec3 {
    let delta = a - b;
    let distance_sq = delta.length_squared() + preset.softening;
    let magnitude = preset.repulsion / distance_sq;
    delta * (magnitude / distance_sq.sqrt())
}

/// Sum pairwise repulsion over every unordered pair.
///
/// O(n^2) per call; fine for a few hundred visible nodes. Each pair is
/// visited once and both ends get equal and opposite pushes.
pub fn accumulate_repulsion(positions: &[Vec3], preset: &PhysicsPreset, forces: &mut [Vec3]) {
    for a in 0..positions.len() {
        for b in (a + 1)..positions.len() {
            let push = repulsion_between(positions[a], positions[b], preset);
            forces[a] += push;
            forces[b] -= push;
        }
    }
}

use bevy::math::Vec3;

use crate::visual::physics::PhysicsPreset;

/// Spring-like pull toward the category anchor
pub fn accumulate_clustering(
    position: Vec3,
    anchor: Vec3,
    preset: &PhysicsPreset,
    force: &mut Vec3,
) {
    *force += (anchor - position) * preset.cluster_strength;
}

/// Global gravity toward the origin so the layout never drifts away
pub fn accumulate_centering(position: Vec3, preset: &PhysicsPreset, force: &mut Vec3) {
    *force -= position * preset.center_gravity;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visual::physics::presets::LIVING;

    #[test]
    fn test_clustering_points_at_anchor() {
        let mut force = Vec3::ZERO;
        accumulate_clustering(Vec3::new(10.0, 0.0, 0.0), Vec3::ZERO, &LIVING, &mut force);
        assert!((force.x + 0.3).abs() < 1e-6);

        let mut at_anchor = Vec3::ZERO;
        accumulate_clustering(Vec3::ONE, Vec3::ONE, &LIVING, &mut at_anchor);
        assert_eq!(at_anchor, Vec3::ZERO);
    }

    #[test]
    fn test_centering_points_at_origin() {
        let mut force = Vec3::ZERO;
        accumulate_centering(Vec3::new(0.0, -20.0, 5.0), &LIVING, &mut force);
        assert!((force.y - 0.2).abs() < 1e-6);
        assert!((force.z + 0.05).abs() < 1e-6);
    }
}

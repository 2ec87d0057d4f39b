use std::f32::consts::TAU;

use crate::visual::nodes::components::{LinkVisual, NodeVisual};

/// Per-tick easing factor for label and link opacity/scale
pub const EASE: f32 = 0.1;

/// Size of a text label before scaling, world units
pub const LABEL_SIZE: (f32, f32) = (20.0, 5.0);

const ACTIVE_GLOW: f32 = 1.8;
const PULSE_AMPLITUDE: f32 = 0.1;
const PULSE_SPEED: f32 = 2.0;

/// Stable pulse phase for a node id (FNV-1a folded into `[0, 2π)`)
pub fn pulse_phase(id: &str) -> f32 {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in id.bytes() {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(0x0100_0193);
    }
    (hash % 10_000) as f32 / 10_000.0 * TAU
}

pub fn label_opacity_target(is_active: bool, any_selected: bool) -> f32 {
    match (is_active, any_selected) {
        (true, _) => 1.0,
        (false, true) => 0.2,
        (false, false) => 0.5,
    }
}

pub fn label_scale_target(is_active: bool) -> f32 {
    if is_active { 1.5 } else { 0.8 }
}

pub fn glow_size(base: f32, elapsed: f32, phase: f32, is_active: bool) -> f32 {
    let pulse = 1.0 + PULSE_AMPLITUDE * (PULSE_SPEED * elapsed + phase).sin();
    let emphasis = if is_active { ACTIVE_GLOW } else { 1.0 };
    base * pulse * emphasis
}

/// World radius of the drawn glow for a given glow size (sprite-like, so
/// the size is its diameter)
pub fn glow_radius(glow_size: f32) -> f32 {
    glow_size * 0.5
}

pub fn link_opacity_target(connected_to_active: bool) -> f32 {
    if connected_to_active { 0.6 } else { 0.05 }
}

/// Ease a node's label toward its targets and recompute its glow
pub fn animate_node(
    visual: &mut NodeVisual,
    base_glow: f32,
    elapsed: f32,
    is_active: bool,
    any_selected: bool,
) {
    let opacity = label_opacity_target(is_active, any_selected);
    visual.label_opacity += (opacity - visual.label_opacity) * EASE;

    let scale = label_scale_target(is_active);
    visual.label_scale += (scale - visual.label_scale) * EASE;

    visual.glow_size = glow_size(base_glow, elapsed, visual.phase, is_active);
}

pub fn animate_link(visual: &mut LinkVisual, connected_to_active: bool) {
    let target = link_opacity_target(connected_to_active);
    visual.opacity += (target - visual.opacity) * EASE;
}

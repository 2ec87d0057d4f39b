pub mod animations;
pub mod components;

use bevy::color::Srgba;

use crate::graph::ConceptStatus;

pub use animations::{animate_link, animate_node, pulse_phase};
pub use components::{LinkVisual, NodeVisual};

pub const KNOWN: Srgba = Srgba::rgb(0.063, 0.725, 0.506); // #10B981
pub const FUZZY: Srgba = Srgba::rgb(0.961, 0.620, 0.043); // #F59E0B
pub const UNKNOWN: Srgba = Srgba::rgb(0.957, 0.247, 0.369); // #F43F5E
pub const NEW: Srgba = Srgba::rgb(0.231, 0.510, 0.965); // #3B82F6
pub const UNRATED: Srgba = Srgba::rgb(0.580, 0.639, 0.722); // #94A3B8

pub fn status_color(status: ConceptStatus) -> Srgba {
    match status {
        ConceptStatus::Known => KNOWN,
        ConceptStatus::Fuzzy => FUZZY,
        ConceptStatus::Unknown => UNKNOWN,
        ConceptStatus::New => NEW,
        ConceptStatus::Unrated => UNRATED,
    }
}

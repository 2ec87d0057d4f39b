//! Boundary between the headless graph core and whatever draws it.
//!
//! The view hands a [`RenderAdapter`] one [`Frame`] per tick. Everything in
//! a frame is already in world space with animation applied, so an adapter
//! only maps it onto its own primitives.

pub mod scene;

use std::fmt;

use bevy::color::Srgba;
use bevy::math::Vec3;

use crate::graph::Registry;

pub use scene::SceneRenderer;

/// Draw order of the active node's label, above every other label
pub const ACTIVE_LABEL_ORDER: i32 = 999;

#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// The backend could not provide the resources a view needs
    BackendUnavailable(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::BackendUnavailable(reason) => {
                write!(f, "render backend unavailable: {}", reason)
            }
        }
    }
}

impl std::error::Error for RenderError {}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeFrame {
    /// Index into [`Registry::nodes`]
    pub index: usize,
    /// World-space position (scene rotation applied)
    pub position: Vec3,
    pub color: Srgba,
    pub glow_size: f32,
    pub label_opacity: f32,
    pub label_scale: f32,
    pub is_active: bool,
    pub visible: bool,
    pub draw_order: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkFrame {
    pub from: Vec3,
    pub to: Vec3,
    /// Both endpoints visible
    pub visible: bool,
    pub opacity: f32,
    pub connected_to_active: bool,
}

/// Everything an adapter needs to draw one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub nodes: Vec<NodeFrame>,
    pub links: Vec<LinkFrame>,
}

impl Frame {
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.links.clear();
    }

    #[cfg(test)]
    pub fn active(&self) -> Option<&NodeFrame> {
        self.nodes.iter().find(|node| node.is_active)
    }
}

/// Swappable drawing backend.
///
/// `allocate` is called once per registry build and may fail, which aborts
/// the load. `release` is called exactly once for every successful
/// `allocate`, before the next one or when the view is unmounted.
pub trait RenderAdapter {
    fn allocate(&mut self, registry: &Registry) -> Result<(), RenderError>;
    fn present(&mut self, frame: &Frame);
    fn release(&mut self);
}

/// Test double that records the adapter lifecycle
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingAdapter {
    pub allocations: usize,
    pub releases: usize,
    pub presents: usize,
    /// Node count seen by each allocation
    pub allocated_nodes: Vec<usize>,
    pub last_frame: Option<Frame>,
    pub fail_with: Option<String>,
}

#[cfg(test)]
impl RecordingAdapter {
    pub fn failing(reason: &str) -> Self {
        RecordingAdapter {
            fail_with: Some(reason.to_string()),
            ..Default::default()
        }
    }

    pub fn live(&self) -> bool {
        self.allocations > self.releases
    }
}

#[cfg(test)]
impl RenderAdapter for RecordingAdapter {
    fn allocate(&mut self, registry: &Registry) -> Result<(), RenderError> {
        if let Some(reason) = &self.fail_with {
            return Err(RenderError::BackendUnavailable(reason.clone()));
        }
        self.allocations += 1;
        self.allocated_nodes.push(registry.len());
        Ok(())
    }

    fn present(&mut self, frame: &Frame) {
        self.presents += 1;
        self.last_frame = Some(frame.clone());
    }

    fn release(&mut self) {
        self.releases += 1;
    }
}

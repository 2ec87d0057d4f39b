mod layout;
mod registry;
mod snapshot;

pub use layout::{CategoryLayout, DEFAULT_ANCHOR, LAYOUT, LayoutPreset, plan_anchors};
pub use registry::{EdgeRecord, NodeRecord, Registry, RegistryWarning};
pub use snapshot::{Concept, ConceptStatus, GraphSnapshot, Link, NodeId, SnapshotError};

pub mod interactions;
pub mod nodes;
pub mod physics;
pub mod plugin;
pub mod render;
pub mod view;

pub use interactions::Activation;
pub use plugin::{GraphPlugin, GraphSystems, NodeActivated};
pub use view::GraphView;

pub mod clustering;
pub mod repulsion;

pub use clustering::{accumulate_centering, accumulate_clustering};
pub use repulsion::{accumulate_repulsion, repulsion_between};

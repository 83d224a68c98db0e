#![forbid(unsafe_code)]

pub mod brute_force;
pub mod kdtree;
pub mod neighbor;

pub use brute_force::BruteForce;
pub use kdtree::KdTree;
pub use neighbor::{Neighbor, NearestNeighbor, SpatialError};

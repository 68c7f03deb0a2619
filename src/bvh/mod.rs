//! This module builds a BVH: nodes are grown breadth first into an arena, split with a binned
//! SAH or at the median, tightened bottom-up and finally flattened into a [`FlatBvh`].
//!
//! [`FlatBvh`]: ../flat_bvh/struct.FlatBvh.html

pub(crate) mod build_node;
mod builder;
mod config;
mod split;

pub use self::builder::*;
pub use self::config::*;

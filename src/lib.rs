#![cfg_attr(feature = "bench", feature(test))]
//! A crate which builds binary bounding volume hierarchies over triangle primitives
//! and emits them as a flat, index-addressable array ready to be uploaded to a GPU.
//!
//! ## About
//!
//! Ray tracers spend most of their time asking which primitives a ray might hit.
//! A BVH (Bounding Volume Hierarchy) reduces that question from O(n) to roughly
//! O(log2(n)), at the cost of building the tree once in advance. This crate builds
//! the tree on the CPU using a binned Surface Area Heuristic (SAH) with a median
//! split fallback, tightens every node's bounds bottom-up and flattens the result
//! into [`FlatNode`] records. Traversal is left to the consumer, usually a compute
//! kernel which reads the node array directly.
//!
//! ## Example
//!
//! ```
//! use sahbvh::bvh::BvhConfig;
//! use sahbvh::flat_bvh::FlatBvh;
//! use sahbvh::primitive::Primitive;
//! use sahbvh::Point3;
//!
//! let mut primitives = Vec::new();
//! for i in 0..100 {
//!     let x = i as f32;
//!     primitives.push(Primitive::flat(
//!         Point3::new(x, 0.0, 0.0),
//!         Point3::new(x + 1.0, 0.0, 0.0),
//!         Point3::new(x, 1.0, 0.0),
//!         0,
//!     ));
//! }
//!
//! let root_bounds = Primitive::enclosing_bounds(&primitives);
//! let bvh = FlatBvh::build_with_config(root_bounds, &primitives, BvhConfig::default()).unwrap();
//!
//! assert_eq!(bvh.stats().primitive_references, 100);
//! let bytes: &[u8] = bvh.as_bytes();
//! assert_eq!(bytes.len(), bvh.size_in_bytes());
//! ```
//!
//! ## Features
//!
//! - `serde` (default **disabled**) - adds `Serialize` and `Deserialize` implementations for some types
//!
//! [`FlatNode`]: flat_bvh::FlatNode

#[cfg(all(feature = "bench", test))]
extern crate test;

/// Float type used by this crate.
pub type Real = f32;

/// Point math type used by this crate. Type alias for [`nalgebra::Point3`].
pub type Point3 = nalgebra::Point3<Real>;

/// Vector math type used by this crate. Type alias for [`nalgebra::Vector3`].
pub type Vector3 = nalgebra::Vector3<Real>;

/// A minimal floating value used as a lower bound.
pub const EPSILON: Real = 0.00001;

pub mod aabb;
pub mod axis;
pub mod bounding_hierarchy;
pub mod bvh;
pub mod error;
pub mod flat_bvh;
pub mod primitive;
mod utils;

#[cfg(test)]
mod testbase;

pub use crate::error::BuildError;

#[cfg(doctest)]
doc_comment::doctest!("../README.md");

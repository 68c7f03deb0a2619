//! Error types for BVH construction.

use thiserror::Error;

/// Errors reported before a BVH build starts.
///
/// Construction itself has no failure modes: once the configuration and the input size have
/// been accepted, a build always runs to completion and yields a complete tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    /// The leaf threshold is zero or larger than the fixed leaf capacity of a flat node.
    #[error("Invalid leaf threshold {threshold}: must be between 1 and the leaf capacity {capacity}")]
    InvalidLeafThreshold { threshold: usize, capacity: usize },

    /// A cost factor of the surface area heuristic is negative or not finite.
    #[error("Invalid {name} cost: {value}")]
    InvalidCost { name: &'static str, value: f32 },

    /// The primitive indices would not fit into the flat node's index type.
    #[error("Too many primitives: {count} (at most {max} are supported)")]
    TooManyPrimitives { count: usize, max: usize },
}

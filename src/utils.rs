//! Utilities module.

use crate::aabb::{Aabb, Bounded};

/// Returns the joint [`Aabb`] of the shapes referenced by `indices`.
/// An empty `indices` slice yields [`Aabb::empty`].
pub fn joint_aabb_of_shapes<Shape: Bounded>(indices: &[usize], shapes: &[Shape]) -> Aabb {
    let mut aabb = Aabb::empty();
    for index in indices {
        let shape = &shapes[*index];
        aabb.join_mut(&shape.aabb());
    }
    aabb
}

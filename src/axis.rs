//! The three coordinate axes, usable as an index into points, vectors and slices.

use crate::{Point3, Real, Vector3};
use std::fmt;
use std::ops::{Index, IndexMut};

/// A coordinate axis. Splits and bin planes are chosen along one of these.
///
/// # Examples
/// ```
/// use sahbvh::axis::Axis;
/// use sahbvh::Point3;
///
/// let mut p = Point3::new(1.0, 2.0, 3.0);
/// p[Axis::Z] = 10.0;
/// assert_eq!(p[Axis::Y], 2.0);
/// assert_eq!(p, Point3::new(1.0, 2.0, 10.0));
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    /// All axes in index order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        })
    }
}

impl Index<Axis> for [Real] {
    type Output = Real;

    fn index(&self, axis: Axis) -> &Real {
        &self[axis as usize]
    }
}

impl IndexMut<Axis> for [Real] {
    fn index_mut(&mut self, axis: Axis) -> &mut Real {
        &mut self[axis as usize]
    }
}

impl Index<Axis> for Point3 {
    type Output = Real;

    fn index(&self, axis: Axis) -> &Real {
        &self[axis as usize]
    }
}

impl IndexMut<Axis> for Point3 {
    fn index_mut(&mut self, axis: Axis) -> &mut Real {
        &mut self[axis as usize]
    }
}

impl Index<Axis> for Vector3 {
    type Output = Real;

    fn index(&self, axis: Axis) -> &Real {
        &self[axis as usize]
    }
}

impl IndexMut<Axis> for Vector3 {
    fn index_mut(&mut self, axis: Axis) -> &mut Real {
        &mut self[axis as usize]
    }
}

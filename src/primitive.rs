//! This module defines [`Primitive`], the triangle the BVH is built over, and [`GpuTriangle`],
//! its device-side representation.

use crate::aabb::{Aabb, Bounded};
use crate::axis::Axis;
use crate::bounding_hierarchy::BHShape;
use crate::{Point3, Real, Vector3};
use bytemuck::{Pod, Zeroable};

/// Minimum padding added to the upper bound of every axis on which a triangle's [`Aabb`]
/// would otherwise have zero thickness.
pub const DEGENERATE_AABB_PADDING: Real = 0.2;

/// A triangle with per-vertex normals and a material reference.
///
/// The centroid and the bounding box are derived once on creation. Primitives are
/// immutable afterwards, the tree refers to them by their index in the input slice.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Primitive {
    v0: Point3,
    v1: Point3,
    v2: Point3,
    n0: Vector3,
    n1: Vector3,
    n2: Vector3,
    material_id: i32,
    centroid: Point3,
    bounds: Aabb,
}

impl Primitive {
    /// Creates a new triangle from its vertices, vertex normals and material index.
    ///
    /// # Examples
    /// ```
    /// use sahbvh::aabb::Bounded;
    /// use sahbvh::bounding_hierarchy::BHShape;
    /// use sahbvh::primitive::Primitive;
    /// use sahbvh::{Point3, Vector3};
    ///
    /// let n = Vector3::new(0.0, 0.0, 1.0);
    /// let triangle = Primitive::new(
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(3.0, 0.0, 0.0),
    ///     Point3::new(0.0, 3.0, 0.0),
    ///     n, n, n,
    ///     7,
    /// );
    ///
    /// assert_eq!(triangle.centroid(), Point3::new(1.0, 1.0, 0.0));
    /// assert_eq!(triangle.material_id(), 7);
    /// // The triangle is flat in z, so its box gets padded there.
    /// assert!(triangle.aabb().max.z > triangle.aabb().min.z);
    /// ```
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        v0: Point3,
        v1: Point3,
        v2: Point3,
        n0: Vector3,
        n1: Vector3,
        n2: Vector3,
        material_id: i32,
    ) -> Primitive {
        let bounds = padded_bounds(&v0, &v1, &v2);
        // Rounding of the vertex average must not push the centroid out of the box.
        let centroid = Point3::from((v0.coords + v1.coords + v2.coords) / 3.0)
            .sup(&bounds.min)
            .inf(&bounds.max);
        Primitive {
            v0,
            v1,
            v2,
            n0,
            n1,
            n2,
            material_id,
            centroid,
            bounds,
        }
    }

    /// Creates a new triangle whose vertex normals all equal its geometric face normal.
    /// Degenerate triangles get a zero normal.
    pub fn flat(v0: Point3, v1: Point3, v2: Point3, material_id: i32) -> Primitive {
        let normal = (v1 - v0)
            .cross(&(v2 - v0))
            .try_normalize(Real::EPSILON)
            .unwrap_or_else(Vector3::zeros);
        Primitive::new(v0, v1, v2, normal, normal, normal, material_id)
    }

    /// Returns the three vertices.
    pub fn vertices(&self) -> [Point3; 3] {
        [self.v0, self.v1, self.v2]
    }

    /// Returns the three vertex normals.
    pub fn normals(&self) -> [Vector3; 3] {
        [self.n0, self.n1, self.n2]
    }

    /// Returns the material index.
    pub fn material_id(&self) -> i32 {
        self.material_id
    }

    /// Computes the joint [`Aabb`] of all `primitives`, the root bounds a scene loader
    /// hands to the builder. An empty slice yields [`Aabb::empty`].
    pub fn enclosing_bounds(primitives: &[Primitive]) -> Aabb {
        primitives
            .iter()
            .fold(Aabb::empty(), |aabb, primitive| aabb.join(&primitive.bounds))
    }

    /// Converts this triangle to its device-side layout.
    pub fn to_gpu(&self) -> GpuTriangle {
        GpuTriangle {
            v0: point4(&self.v0),
            v1: point4(&self.v1),
            v2: point4(&self.v2),
            n0: vector4(&self.n0),
            n1: vector4(&self.n1),
            n2: vector4(&self.n2),
            material_id: self.material_id,
            _pad: [0; 3],
        }
    }
}

/// Pads every zero-thickness axis of the vertices' box. Far from the origin the fixed padding
/// is smaller than the float spacing and would be rounded away, so it grows with the magnitude
/// of the coordinate.
fn padded_bounds(v0: &Point3, v1: &Point3, v2: &Point3) -> Aabb {
    let mut aabb = Aabb::empty().grow(v0).grow(v1).grow(v2);
    for axis in Axis::ALL {
        if aabb.extent(axis) == 0.0 {
            let max = aabb.max[axis];
            aabb.max[axis] = max + DEGENERATE_AABB_PADDING.max(max.abs() * Real::EPSILON);
        }
    }
    aabb
}

fn point4(p: &Point3) -> [f32; 4] {
    [p.x, p.y, p.z, 1.0]
}

fn vector4(v: &Vector3) -> [f32; 4] {
    [v.x, v.y, v.z, 0.0]
}

impl Bounded for Primitive {
    fn aabb(&self) -> Aabb {
        self.bounds
    }
}

impl BHShape for Primitive {
    fn centroid(&self) -> Point3 {
        self.centroid
    }
}

/// Device-side triangle record. Vectors are padded to four components and the whole record
/// to a multiple of 16 bytes, matching the alignment rules of OpenCL and WGSL storage buffers.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuTriangle {
    pub v0: [f32; 4],
    pub v1: [f32; 4],
    pub v2: [f32; 4],
    pub n0: [f32; 4],
    pub n1: [f32; 4],
    pub n2: [f32; 4],
    pub material_id: i32,
    _pad: [i32; 3],
}

//! This module defines the [`BHShape`] trait.

use crate::aabb::Bounded;
use crate::Point3;

/// Describes a shape which can be stored in a bounding hierarchy.
///
/// Besides its [`Aabb`], the builder needs a representative point per shape to decide on which
/// side of a splitting plane the shape belongs. By default this is the center of the shape's
/// [`Aabb`]; shapes which know a better centroid (such as a triangle's vertex average) should
/// override [`BHShape::centroid`].
///
/// # Examples
/// ```
/// use sahbvh::aabb::{Aabb, Bounded};
/// use sahbvh::bounding_hierarchy::BHShape;
/// use sahbvh::{Point3, Vector3};
///
/// struct Sphere {
///     position: Point3,
///     radius: f32,
/// }
///
/// impl Bounded for Sphere {
///     fn aabb(&self) -> Aabb {
///         let half_size = Vector3::new(self.radius, self.radius, self.radius);
///         Aabb::with_bounds(self.position - half_size, self.position + half_size)
///     }
/// }
///
/// impl BHShape for Sphere {}
///
/// let sphere = Sphere { position: Point3::new(1.0, 2.0, 3.0), radius: 0.5 };
/// assert_eq!(sphere.centroid(), Point3::new(1.0, 2.0, 3.0));
/// ```
///
/// [`Aabb`]: ../aabb/struct.Aabb.html
pub trait BHShape: Bounded {
    /// Returns the point used to classify this shape against splitting planes.
    fn centroid(&self) -> Point3 {
        self.aabb().center()
    }
}

impl<T: BHShape> BHShape for &T {
    fn centroid(&self) -> Point3 {
        T::centroid(self)
    }
}

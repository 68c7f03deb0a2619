//! Axis Aligned Bounding Boxes.

use crate::axis::Axis;
use crate::{Point3, Real, Vector3};
use std::fmt;

/// Aabb struct.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    /// Minimum coordinates
    pub min: Point3,

    /// Maximum coordinates
    pub max: Point3,
}

impl fmt::Display for Aabb {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Min bound: {}; Max bound: {}", self.min, self.max)
    }
}

/// A trait implemented by things which can be bounded by an [`Aabb`].
pub trait Bounded {
    /// Returns the geometric bounds of this object in the form of an [`Aabb`].
    ///
    /// # Examples
    /// ```
    /// use sahbvh::aabb::{Aabb, Bounded};
    /// use sahbvh::Point3;
    ///
    /// struct Something;
    ///
    /// impl Bounded for Something {
    ///     fn aabb(&self) -> Aabb {
    ///         let point1 = Point3::new(0.0,0.0,0.0);
    ///         let point2 = Point3::new(1.0,1.0,1.0);
    ///         Aabb::with_bounds(point1, point2)
    ///     }
    /// }
    ///
    /// let something = Something;
    /// let aabb = something.aabb();
    ///
    /// assert!(aabb.contains(&Point3::new(0.0,0.0,0.0)));
    /// assert!(aabb.contains(&Point3::new(1.0,1.0,1.0)));
    /// ```
    fn aabb(&self) -> Aabb;
}

impl<T: Bounded> Bounded for &T {
    fn aabb(&self) -> Aabb {
        T::aabb(self)
    }
}

impl Aabb {
    /// Creates a new [`Aabb`] with the given bounds.
    ///
    /// # Examples
    /// ```
    /// use sahbvh::aabb::Aabb;
    /// use sahbvh::Point3;
    ///
    /// let aabb = Aabb::with_bounds(Point3::new(-1.0,-1.0,-1.0), Point3::new(1.0,1.0,1.0));
    /// assert_eq!(aabb.min.x, -1.0);
    /// assert_eq!(aabb.max.z, 1.0);
    /// ```
    pub fn with_bounds(min: Point3, max: Point3) -> Aabb {
        Aabb { min, max }
    }

    /// Creates a new empty [`Aabb`]. Joining it with any other box yields that box.
    ///
    /// # Examples
    /// ```
    /// use sahbvh::aabb::Aabb;
    ///
    /// let aabb = Aabb::empty();
    /// assert!(aabb.is_empty());
    /// assert!(aabb.min.x > aabb.max.x);
    /// ```
    pub fn empty() -> Aabb {
        Aabb {
            min: Point3::new(Real::INFINITY, Real::INFINITY, Real::INFINITY),
            max: Point3::new(Real::NEG_INFINITY, Real::NEG_INFINITY, Real::NEG_INFINITY),
        }
    }

    /// Returns true if the [`Point3`] is inside the [`Aabb`]. Points on the boundary count
    /// as inside.
    ///
    /// # Examples
    /// ```
    /// use sahbvh::aabb::Aabb;
    /// use sahbvh::Point3;
    ///
    /// let aabb = Aabb::with_bounds(Point3::new(-1.0,-1.0,-1.0), Point3::new(1.0,1.0,1.0));
    /// assert!(aabb.contains(&Point3::new(0.0,0.0,0.0)));
    /// assert!(aabb.contains(&Point3::new(1.0,-1.0,0.5)));
    /// assert!(!aabb.contains(&Point3::new(2.0,0.0,0.0)));
    /// ```
    pub fn contains(&self, p: &Point3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Returns true if the [`Point3`] is approximately inside the [`Aabb`]
    /// with respect to some `epsilon`.
    pub fn approx_contains_eps(&self, p: &Point3, epsilon: Real) -> bool {
        (p.x - self.min.x) > -epsilon
            && (p.x - self.max.x) < epsilon
            && (p.y - self.min.y) > -epsilon
            && (p.y - self.max.y) < epsilon
            && (p.z - self.min.z) > -epsilon
            && (p.z - self.max.z) < epsilon
    }

    /// Returns true if the `other` [`Aabb`] is approximately inside this [`Aabb`]
    /// with respect to some `epsilon`.
    pub fn approx_contains_aabb_eps(&self, other: &Aabb, epsilon: Real) -> bool {
        self.approx_contains_eps(&other.min, epsilon) && self.approx_contains_eps(&other.max, epsilon)
    }

    /// Returns true if the `other` [`Aabb`] is approximately equal to this [`Aabb`]
    /// with respect to some `epsilon`.
    pub fn relative_eq(&self, other: &Aabb, epsilon: Real) -> bool {
        (0..3usize).all(|i| {
            (self.min[i] - other.min[i]).abs() < epsilon
                && (self.max[i] - other.max[i]).abs() < epsilon
        })
    }

    /// Returns a new minimal [`Aabb`] which contains both this [`Aabb`] and `other`.
    /// The result is the union of the two boxes and never smaller than either of them.
    ///
    /// # Examples
    /// ```
    /// use sahbvh::aabb::Aabb;
    /// use sahbvh::Point3;
    ///
    /// let aabb1 = Aabb::with_bounds(Point3::new(-101.0,0.0,0.0), Point3::new(-100.0,1.0,1.0));
    /// let aabb2 = Aabb::with_bounds(Point3::new(100.0,0.0,0.0), Point3::new(101.0,1.0,1.0));
    /// let joint = aabb1.join(&aabb2);
    ///
    /// assert_eq!(joint.min, Point3::new(-101.0,0.0,0.0));
    /// assert_eq!(joint.max, Point3::new(101.0,1.0,1.0));
    /// ```
    pub fn join(&self, other: &Aabb) -> Aabb {
        Aabb::with_bounds(self.min.inf(&other.min), self.max.sup(&other.max))
    }

    /// Mutable version of [`Aabb::join`].
    pub fn join_mut(&mut self, other: &Aabb) {
        *self = self.join(other);
    }

    /// Returns a new minimal [`Aabb`] which contains both this [`Aabb`] and the
    /// [`Point3`] `other`.
    ///
    /// # Examples
    /// ```
    /// use sahbvh::aabb::Aabb;
    /// use sahbvh::Point3;
    ///
    /// let point1 = Point3::new(0.0,0.0,0.0);
    /// let point2 = Point3::new(1.0,1.0,1.0);
    /// let point3 = Point3::new(2.0,2.0,2.0);
    ///
    /// let aabb = Aabb::empty().grow(&point1).grow(&point2);
    /// assert!(aabb.contains(&point1));
    /// assert!(aabb.contains(&point2));
    /// assert!(!aabb.contains(&point3));
    /// ```
    pub fn grow(&self, other: &Point3) -> Aabb {
        Aabb::with_bounds(self.min.inf(other), self.max.sup(other))
    }

    /// Returns the size of this [`Aabb`] in all three dimensions.
    pub fn size(&self) -> Vector3 {
        self.max - self.min
    }

    /// Returns the center [`Point3`] of the [`Aabb`].
    ///
    /// # Examples
    /// ```
    /// use sahbvh::aabb::Aabb;
    /// use sahbvh::Point3;
    ///
    /// let aabb = Aabb::with_bounds(Point3::new(-1.0,-1.0,-1.0), Point3::new(3.0,1.0,1.0));
    /// assert_eq!(aabb.center(), Point3::new(1.0,0.0,0.0));
    /// ```
    pub fn center(&self) -> Point3 {
        self.min + (self.size() / 2.0)
    }

    /// An empty [`Aabb`] is an [`Aabb`] where the lower bound is greater than
    /// the upper bound in at least one component.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Returns the total surface area of this [`Aabb`], `2 * (dx*dy + dx*dz + dy*dz)`.
    ///
    /// # Examples
    /// ```
    /// use sahbvh::aabb::Aabb;
    /// use sahbvh::Point3;
    ///
    /// let aabb = Aabb::with_bounds(Point3::new(0.0,0.0,0.0), Point3::new(1.0,2.0,3.0));
    /// assert_eq!(aabb.surface_area(), 22.0);
    /// ```
    pub fn surface_area(&self) -> Real {
        let size = self.size();
        2.0 * (size.x * size.y + size.x * size.z + size.y * size.z)
    }

    /// Returns the axis along which the [`Aabb`] is stretched the most.
    /// Ties are resolved in favour of the lower axis.
    ///
    /// # Examples
    /// ```
    /// use sahbvh::aabb::Aabb;
    /// use sahbvh::axis::Axis;
    /// use sahbvh::Point3;
    ///
    /// let aabb = Aabb::with_bounds(Point3::new(-100.0,0.0,0.0), Point3::new(100.0,0.0,0.0));
    /// assert_eq!(aabb.largest_axis(), Axis::X);
    /// ```
    pub fn largest_axis(&self) -> Axis {
        let size = self.size();
        Axis::ALL
            .into_iter()
            .fold(Axis::X, |axis, candidate| {
                if size[candidate] > size[axis] {
                    candidate
                } else {
                    axis
                }
            })
    }

    /// Returns the extent of the [`Aabb`] along `axis`.
    pub fn extent(&self, axis: Axis) -> Real {
        self.max[axis] - self.min[axis]
    }

    /// Clips this [`Aabb`] at the plane `axis = plane` and returns the low and the high part.
    /// The low part keeps `min` and gets `plane` as its upper bound on `axis`, the high part
    /// keeps `max` and gets `plane` as its lower bound.
    ///
    /// # Examples
    /// ```
    /// use sahbvh::aabb::Aabb;
    /// use sahbvh::axis::Axis;
    /// use sahbvh::Point3;
    ///
    /// let aabb = Aabb::with_bounds(Point3::new(0.0,0.0,0.0), Point3::new(4.0,1.0,1.0));
    /// let (low, high) = aabb.split_at(Axis::X, 1.0);
    /// assert_eq!(low.max.x, 1.0);
    /// assert_eq!(high.min.x, 1.0);
    /// assert_eq!(high.max, aabb.max);
    /// ```
    pub fn split_at(&self, axis: Axis, plane: Real) -> (Aabb, Aabb) {
        let mut low = *self;
        let mut high = *self;
        low.max[axis] = plane;
        high.min[axis] = plane;
        (low, high)
    }
}

impl Default for Aabb {
    fn default() -> Aabb {
        Aabb::empty()
    }
}

/// Implementation of [`Bounded`] for [`Aabb`].
impl Bounded for Aabb {
    fn aabb(&self) -> Aabb {
        *self
    }
}

/// Implementation of [`Bounded`] for [`Point3`].
impl Bounded for Point3 {
    fn aabb(&self) -> Aabb {
        Aabb::with_bounds(*self, *self)
    }
}

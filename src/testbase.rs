//! Common utilities shared by unit tests.
#![cfg(test)]

use crate::aabb::{Aabb, Bounded};
use crate::bounding_hierarchy::BHShape;
use crate::primitive::Primitive;
use crate::{Point3, Vector3};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A vector represented as a tuple
pub type TupleVec = (f32, f32, f32);

/// Generate a `TupleVec` for [`proptest::strategy::Strategy`] from -10e10 to 10e10
/// A small enough range to prevent most fp32 errors from breaking certain tests
/// Tests which rely on this strategy should probably be rewritten
pub fn tuplevec_small_strategy() -> impl Strategy<Value = TupleVec> {
    (
        -10e10_f32..10e10_f32,
        -10e10_f32..10e10_f32,
        -10e10_f32..10e10_f32,
    )
}

/// Generate a `TupleVec` inside the unit cube scaled by 100, used for random scenes.
pub fn tuplevec_scene_strategy() -> impl Strategy<Value = TupleVec> {
    (0.0_f32..100.0_f32, 0.0_f32..100.0_f32, 0.0_f32..100.0_f32)
}

/// Convert a `TupleVec` to a [`Point3`].
pub fn tuple_to_point(tpl: &TupleVec) -> Point3 {
    Point3::new(tpl.0, tpl.1, tpl.2)
}

/// Define some `Bounded` structure.
#[derive(Debug)]
pub struct UnitBox {
    pub id: i32,
    pub pos: Point3,
}

impl UnitBox {
    pub fn new(id: i32, pos: Point3) -> UnitBox {
        UnitBox { id, pos }
    }
}

/// `UnitBox`'s `Aabb`s are unit `Aabb`s centered on the box's position.
impl Bounded for UnitBox {
    fn aabb(&self) -> Aabb {
        let min = self.pos + Vector3::new(-0.5, -0.5, -0.5);
        let max = self.pos + Vector3::new(0.5, 0.5, 0.5);
        Aabb::with_bounds(min, max)
    }
}

impl BHShape for UnitBox {}

/// Generate `n` `UnitBox`s along the X axis centered on whole numbers (0,1,..,n-1).
/// The id is set to the x-coordinate of the box center.
pub fn generate_aligned_boxes(n: i32) -> Vec<UnitBox> {
    (0..n)
        .map(|x| UnitBox::new(x, Point3::new(x as f32, 0.0, 0.0)))
        .collect()
}

/// Creates a unit size cube centered at `pos` and pushes the triangles to `shapes`.
fn push_cube(pos: Point3, shapes: &mut Vec<Primitive>) {
    let top_front_right = pos + Vector3::new(0.5, 0.5, -0.5);
    let top_back_right = pos + Vector3::new(0.5, 0.5, 0.5);
    let top_back_left = pos + Vector3::new(-0.5, 0.5, 0.5);
    let top_front_left = pos + Vector3::new(-0.5, 0.5, -0.5);
    let bottom_front_right = pos + Vector3::new(0.5, -0.5, -0.5);
    let bottom_back_right = pos + Vector3::new(0.5, -0.5, 0.5);
    let bottom_back_left = pos + Vector3::new(-0.5, -0.5, 0.5);
    let bottom_front_left = pos + Vector3::new(-0.5, -0.5, -0.5);

    let faces = [
        (top_back_right, top_front_right, top_front_left),
        (top_front_left, top_back_left, top_back_right),
        (bottom_front_left, bottom_front_right, bottom_back_right),
        (bottom_back_right, bottom_back_left, bottom_front_left),
        (top_back_left, top_front_left, bottom_front_left),
        (bottom_front_left, bottom_back_left, top_back_left),
        (bottom_front_right, top_front_right, top_back_right),
        (top_back_right, bottom_back_right, bottom_front_right),
        (top_front_left, top_front_right, bottom_front_right),
        (bottom_front_right, bottom_front_left, top_front_left),
        (bottom_back_right, top_back_right, top_back_left),
        (top_back_left, bottom_back_left, bottom_back_right),
    ];
    for (material_id, (a, b, c)) in faces.into_iter().enumerate() {
        shapes.push(Primitive::flat(a, b, c, material_id as i32));
    }
}

/// Generates a new `Point3`, which will lie inside the given `aabb`.
pub fn next_point3(rng: &mut StdRng, aabb: &Aabb) -> Point3 {
    let size = aabb.size();
    let offset = Vector3::new(
        rng.random_range(0.0..=1.0) * size.x,
        rng.random_range(0.0..=1.0) * size.y,
        rng.random_range(0.0..=1.0) * size.z,
    );
    aabb.min + offset
}

/// Returns an `Aabb` which defines the default testing space bounds.
pub fn default_bounds() -> Aabb {
    Aabb::with_bounds(
        Point3::new(-100_000.0, -100_000.0, -100_000.0),
        Point3::new(100_000.0, 100_000.0, 100_000.0),
    )
}

/// Returns the unit cube.
pub fn unit_cube() -> Aabb {
    Aabb::with_bounds(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0))
}

/// Creates `n` deterministic random cubes. Returns the `Vec` of surface triangles.
pub fn create_n_cubes(n: usize, bounds: &Aabb) -> Vec<Primitive> {
    let mut rng = StdRng::seed_from_u64(0);
    let mut vec = Vec::new();
    for _ in 0..n {
        push_cube(next_point3(&mut rng, bounds), &mut vec);
    }
    vec
}

/// Creates `n` deterministic random small triangles inside `bounds`. Each triangle spans at
/// most `max_edge` along every axis.
pub fn create_n_triangles(n: usize, bounds: &Aabb, max_edge: f32, seed: u64) -> Vec<Primitive> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let a = next_point3(&mut rng, bounds);
            let mut corner = || {
                a + Vector3::new(
                    rng.random_range(-max_edge..=max_edge),
                    rng.random_range(-max_edge..=max_edge),
                    rng.random_range(-max_edge..=max_edge),
                )
            };
            let b = corner();
            let c = corner();
            Primitive::flat(a, b, c, (i % 4) as i32)
        })
        .collect()
}

/// Creates `n` identical triangles, all sharing the same centroid.
pub fn create_n_stacked_triangles(n: usize) -> Vec<Primitive> {
    (0..n)
        .map(|i| {
            Primitive::flat(
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                i as i32,
            )
        })
        .collect()
}

#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use ordered_float::NotNan;
use sahbvh::bvh::{BvhBuilder, BvhConfig, MAX_BINS};
use sahbvh::flat_bvh::LEAF_CAPACITY;
use sahbvh::primitive::Primitive;
use sahbvh::Point3;

type Float = f32;
const LIMIT: Float = 1_000_000.0;

fuzz_target!(|workload: Workload| {
    workload.fuzz();
});

#[derive(Arbitrary, Debug)]
struct ArbitraryPoint {
    coordinates: [NotNan<Float>; 3],
}

impl ArbitraryPoint {
    fn point(&self) -> Point3 {
        let [x, y, z] = self.coordinates.map(|f| f.into_inner().clamp(-LIMIT, LIMIT));
        Point3::new(x, y, z)
    }
}

#[derive(Arbitrary, Debug)]
struct ArbitraryTriangle {
    a: ArbitraryPoint,
    b: ArbitraryPoint,
    c: ArbitraryPoint,
    material_id: i32,
}

/// A set of triangles and the configuration to build them with. Identical triangles are
/// likely, which exercises the fallback splits.
#[derive(Arbitrary, Debug)]
struct Workload {
    triangles: Vec<ArbitraryTriangle>,
    bins: u16,
    leaf_threshold: u8,
}

impl Workload {
    fn fuzz(&self) {
        let triangles: Vec<Primitive> = self
            .triangles
            .iter()
            .map(|t| Primitive::flat(t.a.point(), t.b.point(), t.c.point(), t.material_id))
            .collect();

        let config = BvhConfig::default()
            .with_bins(self.bins as usize % (MAX_BINS + 8))
            .with_leaf_threshold(1 + self.leaf_threshold as usize % LEAF_CAPACITY);
        let bvh = BvhBuilder::new(config)
            .unwrap()
            .build(Primitive::enclosing_bounds(&triangles), &triangles)
            .unwrap();

        bvh.assert_consistent(&triangles);
        bvh.assert_tight(&triangles);
        assert!(bvh.len() <= (2 * triangles.len()).max(2) - 1);
        assert_eq!(bvh.stats().primitive_references, triangles.len());
    }
}

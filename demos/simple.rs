use sahbvh::bvh::{BvhBuilder, BvhConfig};
use sahbvh::primitive::Primitive;
use sahbvh::Point3;

/// Builds a terrain-like grid of `size * size` quads, two triangles each.
fn grid(size: usize) -> Vec<Primitive> {
    let height = |x: usize, z: usize| ((x as f32 * 0.3).sin() + (z as f32 * 0.2).cos()) * 2.0;
    let point = |x: usize, z: usize| Point3::new(x as f32, height(x, z), z as f32);

    let mut triangles = Vec::with_capacity(size * size * 2);
    for x in 0..size {
        for z in 0..size {
            let material_id = ((x + z) % 3) as i32;
            triangles.push(Primitive::flat(
                point(x, z),
                point(x + 1, z),
                point(x, z + 1),
                material_id,
            ));
            triangles.push(Primitive::flat(
                point(x + 1, z),
                point(x + 1, z + 1),
                point(x, z + 1),
                material_id,
            ));
        }
    }
    triangles
}

pub fn main() {
    env_logger::init();

    let triangles = grid(300);
    let gpu_triangles: Vec<_> = triangles.iter().map(Primitive::to_gpu).collect();

    let builder = match BvhBuilder::new(BvhConfig::default().with_bins(32)) {
        Ok(builder) => builder,
        Err(err) => {
            eprintln!("{}", err);
            return;
        }
    };
    let bvh = match builder.build(Primitive::enclosing_bounds(&triangles), &triangles) {
        Ok(bvh) => bvh,
        Err(err) => {
            eprintln!("{}", err);
            return;
        }
    };

    let stats = bvh.stats();
    println!("triangles:      {}", triangles.len());
    println!("nodes:          {}", stats.node_count);
    println!("leaves:         {}", stats.leaf_count);
    println!("depth:          {}", stats.max_depth);
    println!("leaf occupancy: {:.2}", stats.average_leaf_occupancy);
    println!("node buffer:    {:.2} MB", bvh.size_mb());
    println!(
        "triangle buffer: {:.2} MB",
        bytemuck::cast_slice::<_, u8>(&gpu_triangles).len() as f64 / (1024.0 * 1024.0)
    );
}

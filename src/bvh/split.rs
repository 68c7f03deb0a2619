//! Split selection: the binned SAH search and the median fallback.

use crate::aabb::Aabb;
use crate::axis::Axis;
use crate::bounding_hierarchy::BHShape;
use crate::bvh::BvhConfig;
use crate::utils::joint_aabb_of_shapes;
use crate::Real;

/// How the primitives of a node are distributed between a pair of candidate child boxes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum PartitionKind {
    /// The low box has no surface area, every primitive goes to the high box.
    DegenerateLeft,

    /// The high box has no surface area, every primitive goes to the low box.
    DegenerateRight,

    /// Primitives whose centroid lies in the low box go low, all others go high.
    Normal,
}

impl PartitionKind {
    pub fn classify(left: &Aabb, right: &Aabb) -> PartitionKind {
        if left.surface_area() == 0.0 {
            PartitionKind::DegenerateLeft
        } else if right.surface_area() == 0.0 {
            PartitionKind::DegenerateRight
        } else {
            PartitionKind::Normal
        }
    }
}

/// One side of a split: the box assigned during construction and the primitives it owns.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SplitChild {
    pub aabb: Aabb,
    pub indices: Vec<usize>,
}

/// The two children a node is split into.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Split {
    pub left: SplitChild,
    pub right: SplitChild,
}

impl Split {
    /// A split makes progress only if neither side ends up with every primitive.
    fn is_progressing(&self) -> bool {
        !self.left.indices.is_empty() && !self.right.indices.is_empty()
    }
}

/// Distributes `indices` between the candidate boxes `left` and `right`, keeping their order.
pub(crate) fn partition<S: BHShape>(
    shapes: &[S],
    indices: &[usize],
    left: &Aabb,
    right: &Aabb,
) -> (Vec<usize>, Vec<usize>) {
    match PartitionKind::classify(left, right) {
        PartitionKind::DegenerateLeft => (Vec::new(), indices.to_vec()),
        PartitionKind::DegenerateRight => (indices.to_vec(), Vec::new()),
        PartitionKind::Normal => indices
            .iter()
            .copied()
            .partition(|&index| left.contains(&shapes[index].centroid())),
    }
}

fn split_with_planes<S: BHShape>(
    shapes: &[S],
    indices: &[usize],
    parent_aabb: &Aabb,
    axis: Axis,
    plane: Real,
) -> Split {
    let (left_aabb, right_aabb) = parent_aabb.split_at(axis, plane);
    let (left_indices, right_indices) = partition(shapes, indices, &left_aabb, &right_aabb);
    Split {
        left: SplitChild {
            aabb: left_aabb,
            indices: left_indices,
        },
        right: SplitChild {
            aabb: right_aabb,
            indices: right_indices,
        },
    }
}

/// Returns the axis along which the shapes referenced by `indices` are stretched the most.
/// The node's own box plays no role, only the extent of its primitives does.
pub(crate) fn split_axis<S: BHShape>(shapes: &[S], indices: &[usize]) -> Axis {
    joint_aabb_of_shapes(indices, shapes).largest_axis()
}

/// Searches `bins - 1` equidistant planes along `axis` for the split with the lowest SAH cost.
///
/// The cost of not splitting, `SA(parent) * cost_intersect * n`, is the baseline; a candidate
/// replaces the current best only if it is strictly cheaper. Candidates that leave one side
/// without primitives are never selected. Returns `None` if no candidate beats the baseline.
pub(crate) fn sah_split<S: BHShape>(
    shapes: &[S],
    indices: &[usize],
    parent_aabb: &Aabb,
    axis: Axis,
    config: &BvhConfig,
) -> Option<Split> {
    let parent_area = parent_aabb.surface_area();
    let no_split_cost = parent_area * config.cost_intersect * indices.len() as Real;
    let increment = parent_aabb.extent(axis) / config.bins as Real;

    let mut best_cost = no_split_cost;
    let mut best_split = None;
    for i in 1..config.bins {
        let plane = parent_aabb.min[axis] + i as Real * increment;
        let split = split_with_planes(shapes, indices, parent_aabb, axis, plane);
        if !split.is_progressing() {
            continue;
        }

        let cost = config.cost_traverse
            + (split.left.aabb.surface_area() / parent_area)
                * config.cost_intersect
                * split.left.indices.len() as Real
            + (split.right.aabb.surface_area() / parent_area)
                * config.cost_intersect
                * split.right.indices.len() as Real;
        if cost < best_cost {
            best_cost = cost;
            best_split = Some(split);
        }
    }
    best_split
}

/// Splits the parent box at the midpoint of `axis`.
///
/// If every centroid falls on the same side of the midpoint, the primitive list is halved by
/// position instead and each half gets the joint box of its primitives. Both children of the
/// result are therefore non-empty as long as `indices` holds at least two primitives.
pub(crate) fn median_split<S: BHShape>(
    shapes: &[S],
    indices: &[usize],
    parent_aabb: &Aabb,
    axis: Axis,
) -> Split {
    let plane = (parent_aabb.min[axis] + parent_aabb.max[axis]) / 2.0;
    let split = split_with_planes(shapes, indices, parent_aabb, axis, plane);
    if split.is_progressing() || indices.len() < 2 {
        return split;
    }

    log::trace!(
        "Median split of {} primitives along {} left a side empty, halving the list",
        indices.len(),
        axis
    );
    let (left_indices, right_indices) = indices.split_at(indices.len() / 2);
    Split {
        left: SplitChild {
            aabb: joint_aabb_of_shapes(left_indices, shapes),
            indices: left_indices.to_vec(),
        },
        right: SplitChild {
            aabb: joint_aabb_of_shapes(right_indices, shapes),
            indices: right_indices.to_vec(),
        },
    }
}

#[cfg(test)]
mod tests {
    use crate::aabb::Aabb;
    use crate::axis::Axis;
    use crate::bvh::split::{
        median_split, partition, sah_split, split_axis, PartitionKind, Split,
    };
    use crate::bvh::BvhConfig;
    use crate::testbase::{create_n_stacked_triangles, generate_aligned_boxes, UnitBox};
    use crate::Point3;

    fn sorted(mut indices: Vec<usize>) -> Vec<usize> {
        indices.sort_unstable();
        indices
    }

    fn assert_partition_of(split: &Split, n: usize) {
        let mut all = split.left.indices.clone();
        all.extend_from_slice(&split.right.indices);
        assert_eq!(sorted(all), (0..n).collect::<Vec<_>>());
    }

    /// Two clusters of 30 boxes, one near the origin and one near x = 100.
    fn two_clusters() -> (Vec<UnitBox>, Aabb) {
        let mut boxes = Vec::new();
        for i in 0..30 {
            let offset = (i % 5) as f32 * 0.1;
            boxes.push(UnitBox::new(i, Point3::new(1.0 + offset, 50.0, 50.0)));
            boxes.push(UnitBox::new(
                100 + i,
                Point3::new(99.0 - offset, 50.0, 50.0),
            ));
        }
        let bounds = Aabb::with_bounds(Point3::new(0.0, 0.0, 0.0), Point3::new(100.0, 100.0, 100.0));
        (boxes, bounds)
    }

    #[test]
    fn test_classify() {
        let flat = Aabb::with_bounds(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0));
        let solid = Aabb::with_bounds(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));

        assert_eq!(PartitionKind::classify(&flat, &solid), PartitionKind::DegenerateLeft);
        assert_eq!(PartitionKind::classify(&solid, &flat), PartitionKind::DegenerateRight);
        assert_eq!(PartitionKind::classify(&flat, &flat), PartitionKind::DegenerateLeft);
        assert_eq!(PartitionKind::classify(&solid, &solid), PartitionKind::Normal);
    }

    #[test]
    fn test_degenerate_partitions_move_everything() {
        let boxes = generate_aligned_boxes(5);
        let indices = vec![0, 1, 2, 3, 4];
        let flat = Aabb::with_bounds(Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 1.0));
        let solid = Aabb::with_bounds(Point3::new(-1.0, -1.0, -1.0), Point3::new(5.0, 1.0, 1.0));

        assert_eq!(partition(&boxes, &indices, &flat, &solid), (vec![], indices.clone()));
        assert_eq!(partition(&boxes, &indices, &solid, &flat), (indices.clone(), vec![]));
    }

    #[test]
    fn test_normal_partition_uses_centroids() {
        let boxes = generate_aligned_boxes(5);
        let indices = vec![4, 3, 2, 1, 0];
        let parent = Aabb::with_bounds(Point3::new(-0.5, -0.5, -0.5), Point3::new(4.5, 0.5, 0.5));
        let (left, right) = parent.split_at(Axis::X, 2.0);

        // Centroids on the plane count as contained in the low box.
        let (l, r) = partition(&boxes, &indices, &left, &right);
        assert_eq!(l, vec![2, 1, 0]);
        assert_eq!(r, vec![4, 3]);
    }

    #[test]
    fn test_split_axis_ignores_node_box() {
        // The boxes are spread along x, even though a node box could be larger along y.
        let boxes = generate_aligned_boxes(10);
        let indices = (0..10).collect::<Vec<_>>();
        assert_eq!(split_axis(&boxes, &indices), Axis::X);
    }

    #[test]
    fn test_sah_separates_clusters() {
        let (boxes, bounds) = two_clusters();
        let indices = (0..boxes.len()).collect::<Vec<_>>();
        let axis = split_axis(&boxes, &indices);
        assert_eq!(axis, Axis::X);

        let split = sah_split(&boxes, &indices, &bounds, axis, &BvhConfig::default())
            .expect("two far apart clusters must be worth splitting");
        assert_partition_of(&split, boxes.len());
        assert_eq!(split.left.indices.len(), 30);
        assert!(split.left.indices.iter().all(|&i| boxes[i].id < 100));
        assert!(split.right.indices.iter().all(|&i| boxes[i].id >= 100));
        assert!(split.left.aabb.max.x < 98.0);
    }

    /// `count` unit boxes centered on each of the given x coordinates, in the plane z = 0.
    fn boxes_at(xs: &[f32], count: usize) -> Vec<UnitBox> {
        xs.iter()
            .flat_map(|&x| (0..count).map(move |_| x))
            .enumerate()
            .map(|(i, x)| UnitBox::new(i as i32, Point3::new(x, 0.5, 0.0)))
            .collect()
    }

    #[test]
    fn test_sah_keeps_lowest_of_equal_cost_planes() {
        // The node box is a 4 x 1 rectangle, a child of length l has a relative area of l / 4.
        // Planes at x = 1, 2 and 3 all split 10 / 10, so every candidate costs
        // 0.125 + 10 * l / 4 + 10 * (4 - l) / 4 = 10.125.
        let boxes = boxes_at(&[0.5, 3.5], 10);
        let indices = (0..20).collect::<Vec<_>>();
        let bounds = Aabb::with_bounds(Point3::new(0.0, 0.0, 0.0), Point3::new(4.0, 1.0, 0.0));
        let config = BvhConfig::default().with_bins(4);

        let split = sah_split(&boxes, &indices, &bounds, Axis::X, &config).unwrap();
        assert_eq!(split.left.aabb.max.x, 1.0);
        assert_eq!(split.right.aabb.min.x, 1.0);
        assert_eq!(split.left.indices, (0..10).collect::<Vec<_>>());
        assert_eq!(split.right.indices, (10..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_sah_picks_cheapest_plane() {
        // Planes at x = 11, 12 and 13 over a 4 x 1 rectangle starting at x = 10:
        //   11: 0.125 + 10 * 0.25 + 20 * 0.75 = 17.625
        //   12: 0.125 + 10 * 0.5 + 20 * 0.5 = 15.125
        //   13: 0.125 + 20 * 0.75 + 10 * 0.25 = 17.625
        let boxes = boxes_at(&[10.5, 12.5, 13.5], 10);
        let indices = (0..30).collect::<Vec<_>>();
        let bounds = Aabb::with_bounds(Point3::new(10.0, 0.0, 0.0), Point3::new(14.0, 1.0, 0.0));
        let config = BvhConfig::default().with_bins(4);

        let split = sah_split(&boxes, &indices, &bounds, Axis::X, &config).unwrap();
        assert_eq!(split.left.aabb.max.x, 12.0);
        assert_eq!(split.left.aabb.min, bounds.min);
        assert_eq!(split.right.aabb.min.x, 12.0);
        assert_eq!(split.right.aabb.max, bounds.max);
        assert_eq!(split.left.indices, (0..10).collect::<Vec<_>>());
        assert_eq!(split.right.indices, (10..30).collect::<Vec<_>>());
    }

    #[test]
    fn test_sah_without_improvement_returns_none() {
        // Every candidate plane puts all stacked triangles on one side.
        let triangles = create_n_stacked_triangles(25);
        let indices = (0..25).collect::<Vec<_>>();
        let bounds = Aabb::with_bounds(Point3::new(-1.0, -1.0, -1.0), Point3::new(2.0, 2.0, 2.0));
        let config = BvhConfig::default().with_bins(8);

        assert!(sah_split(&triangles, &indices, &bounds, Axis::X, &config).is_none());
    }

    #[test]
    fn test_sah_baseline_blocks_tiny_boxes() {
        // In a box with a surface area far below one, not splitting is cheaper than the
        // traversal cost of any split.
        let boxes: Vec<UnitBox> = (0..25)
            .map(|i| UnitBox::new(i, Point3::new(i as f32 * 0.001, 0.0, 0.0)))
            .collect();
        let indices = (0..25).collect::<Vec<_>>();
        let bounds = Aabb::with_bounds(Point3::new(0.0, -0.001, -0.001), Point3::new(0.024, 0.001, 0.001));

        assert!(sah_split(&boxes, &indices, &bounds, Axis::X, &BvhConfig::default()).is_none());
    }

    #[test]
    fn test_median_split_at_midpoint() {
        let boxes = generate_aligned_boxes(10);
        let indices = (0..10).collect::<Vec<_>>();
        let bounds = Aabb::with_bounds(Point3::new(-0.5, -0.5, -0.5), Point3::new(9.5, 0.5, 0.5));

        let split = median_split(&boxes, &indices, &bounds, Axis::X);
        assert_eq!(split.left.indices, vec![0, 1, 2, 3, 4]);
        assert_eq!(split.right.indices, vec![5, 6, 7, 8, 9]);
        assert_eq!(split.left.aabb.max.x, 4.5);
        assert_eq!(split.right.aabb.min.x, 4.5);
    }

    #[test]
    fn test_median_split_of_stacked_triangles_halves_the_list() {
        let triangles = create_n_stacked_triangles(25);
        let indices = (0..25).collect::<Vec<_>>();
        let bounds = Aabb::with_bounds(Point3::new(-1.0, -1.0, -1.0), Point3::new(2.0, 2.0, 2.0));

        let split = median_split(&triangles, &indices, &bounds, Axis::X);
        assert_partition_of(&split, 25);
        assert_eq!(split.left.indices.len(), 12);
        assert_eq!(split.right.indices.len(), 13);
        assert!(!split.left.aabb.is_empty());
        assert!(!split.right.aabb.is_empty());
    }
}

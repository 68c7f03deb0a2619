//! This module defines [`BvhBuilder`], which grows, tightens and flattens a BVH.

use crate::aabb::{Aabb, Bounded};
use crate::bounding_hierarchy::BHShape;
use crate::bvh::build_node::{BuildNode, NodeState};
use crate::bvh::split::{median_split, sah_split, split_axis, Split};
use crate::bvh::BvhConfig;
use crate::error::BuildError;
use crate::flat_bvh::FlatBvh;
use crate::utils::joint_aabb_of_shapes;

/// Builds [`FlatBvh`]es with a fixed, validated [`BvhConfig`].
///
/// # Examples
/// ```
/// use sahbvh::bvh::{BvhBuilder, BvhConfig};
/// use sahbvh::primitive::Primitive;
/// use sahbvh::Point3;
///
/// let triangles: Vec<Primitive> = (0..50)
///     .map(|i| {
///         let x = i as f32 * 2.0;
///         Primitive::flat(
///             Point3::new(x, 0.0, 0.0),
///             Point3::new(x + 1.0, 0.0, 0.0),
///             Point3::new(x, 1.0, 1.0),
///             0,
///         )
///     })
///     .collect();
///
/// let builder = BvhBuilder::new(BvhConfig::default().with_bins(16)).unwrap();
/// let bvh = builder.build(Primitive::enclosing_bounds(&triangles), &triangles).unwrap();
///
/// let root = bvh.root();
/// assert!(!root.is_leaf());
/// bvh.assert_consistent(&triangles);
/// ```
#[derive(Debug, Clone)]
pub struct BvhBuilder {
    config: BvhConfig,
}

impl BvhBuilder {
    /// Creates a new builder. Rejects configurations that could produce leaves which do not
    /// fit into a [`FlatNode`]; clamps the number of bins to [`MAX_BINS`].
    ///
    /// [`FlatNode`]: ../flat_bvh/struct.FlatNode.html
    /// [`MAX_BINS`]: constant.MAX_BINS.html
    pub fn new(config: BvhConfig) -> Result<BvhBuilder, BuildError> {
        config.validate()?;
        Ok(BvhBuilder {
            config: config.clamped(),
        })
    }

    /// Returns the configuration used by this builder.
    pub fn config(&self) -> &BvhConfig {
        &self.config
    }

    /// Builds a BVH over `shapes`. `root_bounds` becomes the box of the root node during
    /// construction and should enclose all shapes.
    ///
    /// An empty `shapes` slice yields a single empty leaf.
    pub fn build<S: BHShape>(&self, root_bounds: Aabb, shapes: &[S]) -> Result<FlatBvh, BuildError> {
        if shapes.len() > i32::MAX as usize {
            return Err(BuildError::TooManyPrimitives {
                count: shapes.len(),
                max: i32::MAX as usize,
            });
        }
        log::debug!(
            "Building BVH over {} primitives with {:?}",
            shapes.len(),
            self.config
        );

        let mut nodes = self.grow(root_bounds, shapes);
        tighten(&mut nodes, shapes);
        let bvh = FlatBvh::from_build_nodes(&nodes);

        let stats = bvh.stats();
        log::debug!(
            "Built BVH with {} nodes ({} leaves, depth {}, {:.2} KB)",
            stats.node_count,
            stats.leaf_count,
            stats.max_depth,
            bvh.size_kb()
        );
        Ok(bvh)
    }

    /// Grows the node arena breadth first. The arena doubles as the work queue: nodes are
    /// visited in index order while splits append their children at the end.
    fn grow<S: BHShape>(&self, root_bounds: Aabb, shapes: &[S]) -> Vec<BuildNode> {
        let mut nodes = vec![BuildNode::new(root_bounds, (0..shapes.len()).collect())];

        let mut index = 0;
        while index < nodes.len() {
            if let Some(split) = self.split_node(&mut nodes[index], shapes) {
                let first_child = nodes.len();
                nodes[index].finalize_interior(first_child);
                nodes.push(BuildNode::new(split.left.aabb, split.left.indices));
                nodes.push(BuildNode::new(split.right.aabb, split.right.indices));
            }
            index += 1;
        }
        nodes
    }

    /// Either finalizes `node` as a leaf and returns `None`, or returns the split to apply.
    fn split_node<S: BHShape>(&self, node: &mut BuildNode, shapes: &[S]) -> Option<Split> {
        let count = node.primitive_indices.len();

        // Also covers empty nodes, which become leaves without primitives.
        if count <= self.config.leaf_threshold {
            node.finalize_leaf();
            return None;
        }

        let indices = &node.primitive_indices;
        let axis = split_axis(shapes, indices);
        let sah = if self.config.sah_enabled(count) {
            sah_split(shapes, indices, &node.aabb, axis, &self.config)
        } else {
            None
        };

        // A node above the leaf threshold must be split even if the SAH sees no benefit.
        Some(sah.unwrap_or_else(|| {
            log::trace!("Median split of {} primitives along {}", count, axis);
            median_split(shapes, indices, &node.aabb, axis)
        }))
    }
}

/// Replaces every node's box by the tight box of its contents. Nodes are visited from the
/// last to the first, children always have a larger index than their parent and are
/// therefore final when their parent is visited.
///
/// Leaves without primitives keep the box they were created with.
fn tighten<S: Bounded>(nodes: &mut [BuildNode], shapes: &[S]) {
    for index in (0..nodes.len()).rev() {
        let aabb = match nodes[index].state {
            NodeState::Interior { first_child } => {
                debug_assert!(first_child > index);
                nodes[first_child].aabb.join(&nodes[first_child + 1].aabb)
            }
            NodeState::Leaf if !nodes[index].primitive_indices.is_empty() => {
                joint_aabb_of_shapes(&nodes[index].primitive_indices, shapes)
            }
            NodeState::Leaf | NodeState::Pending => continue,
        };
        nodes[index].aabb = aabb;
    }
}

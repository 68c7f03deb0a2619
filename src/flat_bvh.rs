//! This module defines the flat output of a build: an array of fixed-size [`FlatNode`]
//! records which can be uploaded to a GPU as is.

use crate::aabb::{Aabb, Bounded};
use crate::bounding_hierarchy::BHShape;
use crate::bvh::build_node::BuildNode;
use crate::bvh::{BvhBuilder, BvhConfig};
use crate::error::BuildError;
use crate::utils::joint_aabb_of_shapes;
use crate::{Point3, Real, EPSILON};
use bytemuck::{Pod, Zeroable};
use std::iter::repeat;

/// Maximum number of primitives a leaf can reference.
pub const LEAF_CAPACITY: usize = 10;

/// A node of a [`FlatBvh`], laid out the way the traversal kernel reads it.
///
/// Leaves have a `child_index` of `-1` and reference `primitive_count` primitives through the
/// first entries of `primitive_indices`. Interior nodes have a `primitive_count` of `-1`, their
/// children are stored at `child_index` and `child_index + 1`. Unused index slots hold `-1`.
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct FlatNode {
    /// Lower corner of the node's bounds, `w` is always `1.0`.
    pub bounds_min: [f32; 4],

    /// Upper corner of the node's bounds, `w` is always `1.0`.
    pub bounds_max: [f32; 4],

    pub primitive_indices: [i32; LEAF_CAPACITY],

    pub child_index: i32,

    pub primitive_count: i32,
}

impl FlatNode {
    fn from_build_node(node: &BuildNode) -> FlatNode {
        let mut primitive_indices = [-1; LEAF_CAPACITY];
        if node.child_index() == -1 {
            for (slot, &index) in primitive_indices.iter_mut().zip(&node.primitive_indices) {
                *slot = index as i32;
            }
        }
        let Aabb { min, max } = node.aabb;
        FlatNode {
            bounds_min: [min.x, min.y, min.z, 1.0],
            bounds_max: [max.x, max.y, max.z, 1.0],
            primitive_indices,
            child_index: node.child_index(),
            primitive_count: node.primitive_count(),
        }
    }

    /// Returns the bounds of this node.
    pub fn aabb(&self) -> Aabb {
        let [min_x, min_y, min_z, _] = self.bounds_min;
        let [max_x, max_y, max_z, _] = self.bounds_max;
        Aabb::with_bounds(
            Point3::new(min_x, min_y, min_z),
            Point3::new(max_x, max_y, max_z),
        )
    }

    pub fn is_leaf(&self) -> bool {
        self.child_index < 0
    }

    /// Returns the indices of both children, or `None` for a leaf.
    pub fn children(&self) -> Option<(usize, usize)> {
        if self.is_leaf() {
            None
        } else {
            let first = self.child_index as usize;
            Some((first, first + 1))
        }
    }

    /// Returns the primitive indices referenced by this node. Empty for interior nodes.
    pub fn primitives(&self) -> &[i32] {
        let count = self.primitive_count.clamp(0, LEAF_CAPACITY as i32) as usize;
        &self.primitive_indices[..count]
    }
}

/// Summary of the shape of a [`FlatBvh`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BvhStats {
    pub node_count: usize,
    pub leaf_count: usize,

    /// Leaves which reference no primitive. Only produced for empty inputs.
    pub empty_leaf_count: usize,

    /// Depth of the deepest leaf, the root has depth `0`.
    pub max_depth: usize,

    /// Sum of the primitive counts of all leaves.
    pub primitive_references: usize,

    /// Average number of primitives per non-empty leaf.
    pub average_leaf_occupancy: Real,
}

/// A bounding volume hierarchy stored as an array of [`FlatNode`]s. The root is at index `0`,
/// nodes are ordered by depth and every node's children follow it in the array.
///
/// # Examples
/// ```
/// use sahbvh::flat_bvh::FlatBvh;
/// use sahbvh::primitive::Primitive;
/// use sahbvh::Point3;
///
/// let triangles: Vec<Primitive> = (0..30)
///     .map(|i| {
///         let z = i as f32;
///         Primitive::flat(
///             Point3::new(0.0, 0.0, z),
///             Point3::new(1.0, 0.0, z),
///             Point3::new(0.0, 1.0, z),
///             i,
///         )
///     })
///     .collect();
///
/// let bvh = FlatBvh::build(Primitive::enclosing_bounds(&triangles), &triangles).unwrap();
/// for (_, leaf) in bvh.leaves() {
///     assert!(leaf.primitive_count <= 10);
/// }
/// assert_eq!(bvh.size_in_bytes(), bvh.len() * 80);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlatBvh {
    nodes: Vec<FlatNode>,
}

impl FlatBvh {
    /// Builds a BVH over `shapes` with the default [`BvhConfig`].
    pub fn build<S: BHShape>(root_bounds: Aabb, shapes: &[S]) -> Result<FlatBvh, BuildError> {
        FlatBvh::build_with_config(root_bounds, shapes, BvhConfig::default())
    }

    /// Builds a BVH over `shapes` with the given configuration.
    pub fn build_with_config<S: BHShape>(
        root_bounds: Aabb,
        shapes: &[S],
        config: BvhConfig,
    ) -> Result<FlatBvh, BuildError> {
        BvhBuilder::new(config)?.build(root_bounds, shapes)
    }

    /// Copies the finished build nodes into flat records. Array positions are kept, so child
    /// indices stay valid.
    pub(crate) fn from_build_nodes(nodes: &[BuildNode]) -> FlatBvh {
        FlatBvh {
            nodes: nodes.iter().map(FlatNode::from_build_node).collect(),
        }
    }

    pub fn nodes(&self) -> &[FlatNode] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<FlatNode> {
        self.nodes
    }

    /// Returns the root node.
    ///
    /// # Panics
    /// Panics if the node array is empty, which only happens for a deserialized empty array.
    /// Every build yields at least the root.
    pub fn root(&self) -> &FlatNode {
        &self.nodes[0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A built hierarchy always has a root, so this is never true after a build.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the node array as raw bytes, ready to be copied into a storage buffer.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.nodes)
    }

    pub fn size_in_bytes(&self) -> usize {
        self.nodes.len() * std::mem::size_of::<FlatNode>()
    }

    pub fn size_kb(&self) -> f64 {
        self.size_in_bytes() as f64 / 1024.0
    }

    pub fn size_mb(&self) -> f64 {
        self.size_kb() / 1024.0
    }

    /// Iterates over all leaves together with their index.
    pub fn leaves(&self) -> impl Iterator<Item = (usize, &FlatNode)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_leaf())
    }

    /// Returns the depth of every node. Relies on children being stored after their parent.
    pub fn node_depths(&self) -> Vec<usize> {
        let mut depths = vec![0; self.nodes.len()];
        for (index, node) in self.nodes.iter().enumerate() {
            if let Some((left, right)) = node.children() {
                if right < depths.len() {
                    depths[left] = depths[index] + 1;
                    depths[right] = depths[index] + 1;
                }
            }
        }
        depths
    }

    /// Returns the depth of the deepest node.
    pub fn depth(&self) -> usize {
        self.node_depths().into_iter().max().unwrap_or(0)
    }

    pub fn stats(&self) -> BvhStats {
        let mut leaf_count = 0;
        let mut empty_leaf_count = 0;
        let mut primitive_references = 0;
        for (_, leaf) in self.leaves() {
            leaf_count += 1;
            let count = leaf.primitives().len();
            if count == 0 {
                empty_leaf_count += 1;
            }
            primitive_references += count;
        }
        let filled_leaves = leaf_count - empty_leaf_count;
        let average_leaf_occupancy = if filled_leaves == 0 {
            0.0
        } else {
            primitive_references as Real / filled_leaves as Real
        };

        BvhStats {
            node_count: self.nodes.len(),
            leaf_count,
            empty_leaf_count,
            max_depth: self.depth(),
            primitive_references,
            average_leaf_occupancy,
        }
    }

    /// Prints the hierarchy, one node per line, indented by depth.
    pub fn pretty_print(&self) {
        if !self.is_empty() {
            self.print_node(0, 0);
        }
    }

    fn print_node(&self, node_index: usize, depth: usize) {
        let node = &self.nodes[node_index];
        let padding: String = repeat(" ").take(depth).collect();
        match node.children() {
            Some((left, right)) => {
                println!("{}node={} {}", padding, node_index, node.aabb());
                self.print_node(left, depth + 1);
                self.print_node(right, depth + 1);
            }
            None => {
                println!(
                    "{}leaf={} primitives={:?}",
                    padding,
                    node_index,
                    node.primitives()
                );
            }
        }
    }

    /// Checks the structure of the hierarchy. Returns a description of the first violation.
    ///
    /// Verifies that every node is reachable from the root exactly once, that children are
    /// stored after their parent and lie inside it, that leaves respect the capacity and that
    /// every shape is referenced by exactly one leaf whose bounds contain it.
    fn check_consistency<S: Bounded>(&self, shapes: &[S]) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("The hierarchy has no root".to_string());
        }

        let mut visited = vec![false; self.nodes.len()];
        let mut referenced = vec![false; shapes.len()];
        let mut stack = vec![0];
        while let Some(index) = stack.pop() {
            if std::mem::replace(&mut visited[index], true) {
                return Err(format!("Node {} is reachable more than once", index));
            }
            let node = &self.nodes[index];
            let aabb = node.aabb();

            match node.children() {
                Some((left, right)) => {
                    if left <= index || right >= self.nodes.len() {
                        return Err(format!(
                            "Node {} has invalid child index {}",
                            index, node.child_index
                        ));
                    }
                    if node.primitive_count != -1 || node.primitive_indices.iter().any(|&i| i != -1)
                    {
                        return Err(format!("Interior node {} references primitives", index));
                    }
                    for child in [left, right] {
                        let child_aabb = self.nodes[child].aabb();
                        if !aabb.approx_contains_aabb_eps(&child_aabb, EPSILON) {
                            return Err(format!(
                                "Child {} ({}) lies outside its parent {} ({})",
                                child, child_aabb, index, aabb
                            ));
                        }
                        stack.push(child);
                    }
                }
                None => {
                    if node.child_index != -1 {
                        return Err(format!(
                            "Leaf {} has child index {}",
                            index, node.child_index
                        ));
                    }
                    let count = node.primitive_count;
                    if count < 0 || count as usize > LEAF_CAPACITY {
                        return Err(format!("Leaf {} holds {} primitives", index, count));
                    }
                    if node.primitive_indices[count as usize..].iter().any(|&i| i != -1) {
                        return Err(format!("Leaf {} has used slots past its count", index));
                    }
                    for &primitive in node.primitives() {
                        if primitive < 0 || primitive as usize >= shapes.len() {
                            return Err(format!(
                                "Leaf {} references unknown primitive {}",
                                index, primitive
                            ));
                        }
                        let primitive = primitive as usize;
                        if std::mem::replace(&mut referenced[primitive], true) {
                            return Err(format!(
                                "Primitive {} is referenced more than once",
                                primitive
                            ));
                        }
                        let shape_aabb = shapes[primitive].aabb();
                        if !aabb.approx_contains_aabb_eps(&shape_aabb, EPSILON) {
                            return Err(format!(
                                "Primitive {} ({}) lies outside leaf {} ({})",
                                primitive, shape_aabb, index, aabb
                            ));
                        }
                    }
                }
            }
        }

        if let Some(index) = visited.iter().position(|&v| !v) {
            return Err(format!("Node {} is detached from the root", index));
        }
        if let Some(primitive) = referenced.iter().position(|&r| !r) {
            return Err(format!("Primitive {} is not referenced by any leaf", primitive));
        }
        Ok(())
    }

    /// Returns true if the hierarchy is structurally valid for `shapes`.
    pub fn is_consistent<S: Bounded>(&self, shapes: &[S]) -> bool {
        self.check_consistency(shapes).is_ok()
    }

    /// Assert version of [`FlatBvh::is_consistent`]. Prints the hierarchy before panicking.
    pub fn assert_consistent<S: Bounded>(&self, shapes: &[S]) {
        if let Err(message) = self.check_consistency(shapes) {
            self.pretty_print();
            panic!("{}", message);
        }
    }

    /// Checks that every interior node's bounds equal the union of its children and every
    /// non-empty leaf's bounds equal the union of its primitives.
    pub fn assert_tight<S: Bounded>(&self, shapes: &[S]) {
        for (index, node) in self.nodes.iter().enumerate() {
            let expected = match node.children() {
                Some((left, right)) => self.nodes[left].aabb().join(&self.nodes[right].aabb()),
                None if node.primitive_count > 0 => {
                    let indices: Vec<usize> =
                        node.primitives().iter().map(|&i| i as usize).collect();
                    joint_aabb_of_shapes(&indices, shapes)
                }
                None => continue,
            };
            let stored = node.aabb();
            assert!(
                stored.relative_eq(&expected, EPSILON),
                "Node {} is not tight. Stored: {}; Expected: {}",
                index,
                stored,
                expected
            );
        }
    }
}

use crate::aabb::Aabb;

/// Where a [`BuildNode`] stands in the construction process.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum NodeState {
    /// Not yet visited by the growth loop.
    Pending,

    /// Final leaf, owning its primitive indices.
    Leaf,

    /// Final interior node. Its children live at `first_child` and `first_child + 1`.
    Interior { first_child: usize },
}

/// A node of the tree while it is being built. Nodes live in an append-only arena and refer
/// to each other by index.
#[derive(Debug, Clone)]
pub(crate) struct BuildNode {
    /// Bounds assigned on creation, replaced by the tight bounds once the shape of the tree
    /// is fixed.
    pub aabb: Aabb,

    /// Indices into the shape slice. Emptied when the node becomes interior.
    pub primitive_indices: Vec<usize>,

    pub state: NodeState,
}

impl BuildNode {
    pub fn new(aabb: Aabb, primitive_indices: Vec<usize>) -> BuildNode {
        BuildNode {
            aabb,
            primitive_indices,
            state: NodeState::Pending,
        }
    }

    /// Turns this node into a leaf holding its current primitives.
    pub fn finalize_leaf(&mut self) {
        debug_assert_eq!(self.state, NodeState::Pending);
        self.state = NodeState::Leaf;
    }

    /// Turns this node into an interior node whose children start at `first_child`.
    /// The primitives now belong to the children.
    pub fn finalize_interior(&mut self, first_child: usize) {
        debug_assert_eq!(self.state, NodeState::Pending);
        self.primitive_indices = Vec::new();
        self.state = NodeState::Interior { first_child };
    }

    /// Index of the first child, `-1` for leaves and pending nodes.
    pub fn child_index(&self) -> i32 {
        match self.state {
            NodeState::Interior { first_child } => first_child as i32,
            NodeState::Leaf | NodeState::Pending => -1,
        }
    }

    /// Number of primitives of a leaf, `-1` for interior and pending nodes.
    pub fn primitive_count(&self) -> i32 {
        match self.state {
            NodeState::Leaf => self.primitive_indices.len() as i32,
            NodeState::Interior { .. } | NodeState::Pending => -1,
        }
    }
}

//! Build parameters of the surface area heuristic.

use crate::error::BuildError;
use crate::flat_bvh::LEAF_CAPACITY;
use crate::Real;

/// Upper bound for the number of SAH bins. Larger requests are clamped.
pub const MAX_BINS: usize = 256;

/// Nodes with at most this many primitives skip the SAH search and split at the median.
pub const SAH_MIN_PRIMITIVES: usize = 20;

/// Parameters of a BVH build.
///
/// # Examples
/// ```
/// use sahbvh::bvh::BvhConfig;
///
/// let config = BvhConfig::default().with_bins(8).with_leaf_threshold(4);
/// assert_eq!(config.bins, 8);
/// assert!(config.validate().is_ok());
///
/// // A leaf can never hold more primitives than a flat node has room for.
/// assert!(BvhConfig::default().with_leaf_threshold(11).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BvhConfig {
    /// Number of bins evaluated by the SAH search. Values of 2 or less disable the SAH and
    /// force median splits.
    pub bins: usize,

    /// Nodes with at most this many primitives become leaves.
    pub leaf_threshold: usize,

    /// Cost of intersecting a single primitive.
    pub cost_intersect: Real,

    /// Cost of traversing an interior node.
    pub cost_traverse: Real,
}

impl Default for BvhConfig {
    fn default() -> BvhConfig {
        BvhConfig {
            bins: 25,
            leaf_threshold: LEAF_CAPACITY,
            cost_intersect: 1.0,
            cost_traverse: 0.125,
        }
    }
}

impl BvhConfig {
    /// Sets the number of SAH bins.
    pub fn with_bins(mut self, bins: usize) -> BvhConfig {
        self.bins = bins;
        self
    }

    /// Sets the leaf threshold.
    pub fn with_leaf_threshold(mut self, leaf_threshold: usize) -> BvhConfig {
        self.leaf_threshold = leaf_threshold;
        self
    }

    /// Sets the intersection and traversal costs.
    pub fn with_costs(mut self, cost_intersect: Real, cost_traverse: Real) -> BvhConfig {
        self.cost_intersect = cost_intersect;
        self.cost_traverse = cost_traverse;
        self
    }

    /// Checks that a build with this configuration can only produce leaves which fit into a
    /// [`FlatNode`] and that the cost model is well defined.
    ///
    /// [`FlatNode`]: ../flat_bvh/struct.FlatNode.html
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.leaf_threshold == 0 || self.leaf_threshold > LEAF_CAPACITY {
            return Err(BuildError::InvalidLeafThreshold {
                threshold: self.leaf_threshold,
                capacity: LEAF_CAPACITY,
            });
        }
        for (name, value) in [
            ("intersection", self.cost_intersect),
            ("traversal", self.cost_traverse),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(BuildError::InvalidCost { name, value });
            }
        }
        Ok(())
    }

    /// Returns whether a node holding `primitive_count` primitives is searched with the SAH.
    pub fn sah_enabled(&self, primitive_count: usize) -> bool {
        self.bins > 2 && primitive_count > SAH_MIN_PRIMITIVES
    }

    /// Returns a copy with `bins` clamped to [`MAX_BINS`].
    pub(crate) fn clamped(mut self) -> BvhConfig {
        if self.bins > MAX_BINS {
            log::warn!("Clamping {} SAH bins to {}", self.bins, MAX_BINS);
            self.bins = MAX_BINS;
        }
        self
    }
}

use std::fmt::Display;

use itertools::Itertools as _;

use super::{Bvh, NodeIdx, NodeKind};

/// Shape of a built hierarchy, for logging and tuning the leaf threshold.
#[derive(Clone, Debug, PartialEq)]
pub struct BvhStatistics {
    pub node_count: usize,
    pub triangle_count: usize,
    /// Depth of each leaf, the root alone has depth 1
    pub depth: Distribution,
    /// Number of triangles in each leaf
    pub leaf_size: Distribution,
}

/// Min, max and mean of a per-leaf quantity.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Distribution {
    /// Number of leaves sampled
    pub count: usize,
    pub min: usize,
    pub max: usize,
    pub mean: f32,
}

impl Distribution {
    pub fn from_samples(samples: &[usize]) -> Distribution {
        let Some((min, max)) = samples.iter().copied().minmax().into_option() else {
            return Distribution::default();
        };
        let sum: usize = samples.iter().sum();

        Distribution {
            count: samples.len(),
            min,
            max,
            mean: sum as f32 / samples.len() as f32,
        }
    }
}

impl Bvh {
    pub fn statistics(&self) -> BvhStatistics {
        let mut leaves = Vec::new();
        if let Some(root) = self.root() {
            self.collect_leaves(root, 1, &mut leaves);
        }

        let (depths, sizes): (Vec<_>, Vec<_>) = leaves.into_iter().unzip();
        BvhStatistics {
            node_count: self.nodes.len(),
            triangle_count: self.triangles.len(),
            depth: Distribution::from_samples(&depths),
            leaf_size: Distribution::from_samples(&sizes),
        }
    }

    /// Pushes (depth, triangle count) of every leaf under node, in pre-order.
    fn collect_leaves(&self, node: NodeIdx, depth: usize, leaves: &mut Vec<(usize, usize)>) {
        match self.nodes[node].kind {
            NodeKind::Leaf { triangles } => leaves.push((depth, triangles.len())),
            NodeKind::Inner { children } => {
                for child in children {
                    self.collect_leaves(child, depth + 1, leaves);
                }
            }
        }
    }
}

impl Display for Distribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {}; avg {:.1}; {} leaves",
            self.min, self.max, self.mean, self.count
        )
    }
}

impl Display for BvhStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} nodes, {} triangles",
            self.node_count, self.triangle_count
        )?;
        writeln!(f, "Depth: {}", self.depth)?;
        write!(f, "Leaf size: {}", self.leaf_size)
    }
}

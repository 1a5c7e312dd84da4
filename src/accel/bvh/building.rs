use index_vec::{IndexSlice, IndexVec};

use super::{Node, NodeIdx, NodeKind, TriangleIdx, TriangleIdxRange};
use crate::geometry::WorldBox;

/// Builds the node arena over triangles with the given bounds.
/// Root is the first node, an empty input produces a single empty leaf.
pub fn build_hierarchy(
    bounds: &IndexSlice<TriangleIdx, [WorldBox]>,
    leaf_threshold: usize,
) -> IndexVec<NodeIdx, Node> {
    let mut builder = HierarchyBuilder {
        bounds,
        leaf_threshold,
        nodes: IndexVec::new(),
    };
    builder.build_recursive(TriangleIdxRange::new(
        TriangleIdx::from_raw(0),
        bounds.len_idx(),
    ));
    builder.nodes
}

struct HierarchyBuilder<'a> {
    bounds: &'a IndexSlice<TriangleIdx, [WorldBox]>,
    leaf_threshold: usize,
    nodes: IndexVec<NodeIdx, Node>,
}

impl HierarchyBuilder<'_> {
    fn build_recursive(&mut self, triangles: TriangleIdxRange) -> NodeIdx {
        let bound = self.bounds[triangles.into_range()]
            .iter()
            .fold(WorldBox::empty(), |acc, b| acc.union(b));

        // Nodes are numbered in pre-order, the node is created as a leaf and
        // turned into an inner node once the children exist.
        let node_index = self.nodes.push(Node {
            bound,
            kind: NodeKind::Leaf { triangles },
        });

        if triangles.len() < self.leaf_threshold {
            return node_index;
        }

        // Split by index, not by position. Spatial coherence of the children
        // depends on the input order.
        let (first, second) = triangles.split_at_midpoint();
        let children = [self.build_recursive(first), self.build_recursive(second)];
        self.nodes[node_index].kind = NodeKind::Inner { children };

        node_index
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::{WorldPoint, test::triangle_soup};

    use assert2::{assert, let_assert};
    use test_strategy::proptest;

    fn bounds_of(soup: &[[WorldPoint; 3]]) -> IndexVec<TriangleIdx, WorldBox> {
        soup.iter().map(|t| WorldBox::from_points(t)).collect()
    }

    fn point_bounds(count: usize) -> IndexVec<TriangleIdx, WorldBox> {
        (0..count)
            .map(|i| {
                let p = WorldPoint::new(i as f32, 0.0, 0.0);
                WorldBox::new(p, p)
            })
            .collect()
    }

    /// Returns (node bound, covered range) for every leaf under node
    fn collect_leaves(
        nodes: &IndexVec<NodeIdx, Node>,
        node: NodeIdx,
        out: &mut Vec<(WorldBox, TriangleIdxRange)>,
    ) {
        match &nodes[node].kind {
            NodeKind::Leaf { triangles } => out.push((nodes[node].bound, *triangles)),
            NodeKind::Inner { children } => {
                for child in children {
                    collect_leaves(nodes, *child, out);
                }
            }
        }
    }

    #[test]
    fn empty_input_gives_single_empty_leaf() {
        let nodes = build_hierarchy(&IndexVec::<TriangleIdx, WorldBox>::new(), 10);
        assert!(nodes.len() == 1);
        let root = &nodes[NodeIdx::from_raw(0)];
        assert!(root.bound.is_empty());
        let_assert!(NodeKind::Leaf { triangles } = root.kind);
        assert!(triangles.len() == 0);
    }

    #[test]
    fn small_input_is_root_leaf() {
        let nodes = build_hierarchy(&point_bounds(9), 10);
        assert!(nodes.len() == 1);
        let_assert!(NodeKind::Leaf { triangles } = nodes[NodeIdx::from_raw(0)].kind);
        assert!(triangles.len() == 9);
    }

    #[test]
    fn splits_at_index_midpoint() {
        let nodes = build_hierarchy(&point_bounds(10), 10);
        assert!(nodes.len() == 3);

        let root = &nodes[NodeIdx::from_raw(0)];
        let_assert!(NodeKind::Inner { children: [a, b] } = root.kind);
        assert!(a.index() == 1);
        assert!(b.index() == 2);
        assert!(root.bound.min == WorldPoint::new(0.0, 0.0, 0.0));
        assert!(root.bound.max == WorldPoint::new(9.0, 0.0, 0.0));

        let_assert!(NodeKind::Leaf { triangles: first } = nodes[a].kind);
        let_assert!(NodeKind::Leaf { triangles: second } = nodes[b].kind);
        assert!((first.begin.index(), first.end.index()) == (0, 5));
        assert!((second.begin.index(), second.end.index()) == (5, 10));
        assert!(nodes[b].bound.min == WorldPoint::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn depth_is_logarithmic() {
        fn depth(nodes: &IndexVec<NodeIdx, Node>, node: NodeIdx) -> usize {
            match &nodes[node].kind {
                NodeKind::Leaf { .. } => 1,
                NodeKind::Inner { children } => {
                    1 + children.iter().map(|c| depth(nodes, *c)).max().unwrap_or(0)
                }
            }
        }

        // 1000 triangles -> largest ranges 500, 250, 125, 63, 32, 16, 8
        let nodes = build_hierarchy(&point_bounds(1000), 10);
        assert!(depth(&nodes, NodeIdx::from_raw(0)) == 8);
    }

    #[proptest]
    fn bounds_contain_subtrees(#[strategy(triangle_soup(200))] soup: Vec<[WorldPoint; 3]>) {
        let bounds = bounds_of(&soup);
        let nodes = build_hierarchy(&bounds, 10);

        for node_index in (0..nodes.len()).map(NodeIdx::from_usize) {
            let mut leaves = Vec::new();
            collect_leaves(&nodes, node_index, &mut leaves);
            for (leaf_bound, range) in leaves {
                assert!(nodes[node_index].bound.contains_box(&leaf_bound));
                for i in range.iter() {
                    assert!(nodes[node_index].bound.contains_box(&bounds[i]));
                }
            }
        }
    }

    #[proptest]
    fn leaves_partition_the_input(
        #[strategy(0usize..500)] count: usize,
        #[strategy(2usize..20)] leaf_threshold: usize,
    ) {
        let nodes = build_hierarchy(&point_bounds(count), leaf_threshold);

        let mut leaves = Vec::new();
        collect_leaves(&nodes, NodeIdx::from_raw(0), &mut leaves);

        let mut seen = vec![0usize; count];
        for (_, range) in &leaves {
            assert!(range.len() < leaf_threshold);
            for i in range.iter() {
                seen[i.index()] += 1;
            }
        }
        assert!(seen.iter().all(|&n| n == 1));

        // Leaves are visited left to right in index order
        let ends: Vec<_> = leaves.iter().map(|(_, r)| (r.begin, r.end)).collect();
        assert!(ends.windows(2).all(|w| w[0].1 == w[1].0));
    }

    #[proptest]
    fn build_is_deterministic(#[strategy(triangle_soup(100))] soup: Vec<[WorldPoint; 3]>) {
        let bounds = bounds_of(&soup);
        assert!(build_hierarchy(&bounds, 10) == build_hierarchy(&bounds, 10));
    }
}

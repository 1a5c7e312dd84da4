//! Binary bounding volume hierarchy over world space triangles.
//!
//! Triangles are stored in a flat array in scene order (primitives, then faces)
//! and every leaf references a contiguous range of it. Nodes live in an arena
//! addressed by index, the root is always the first node.

mod building;
mod extraction;
mod ray_bvh_intersection;
mod statistics;
mod triangle_record;

use index_vec::IndexVec;

use crate::{
    accel::{Accel, AccelConfig, AccelError},
    geometry::{FloatType, Ray, WorldBox},
    scene::{Intersection, Scene},
};

pub use statistics::{BvhStatistics, Distribution};
use triangle_record::TriangleRecord;

#[derive(Clone, Debug, Default)]
pub struct Bvh {
    config: AccelConfig,
    nodes: IndexVec<NodeIdx, Node>,
    triangles: IndexVec<TriangleIdx, TriangleRecord>,
}

#[derive(Clone, Debug, PartialEq)]
struct Node {
    /// Union of bounds of all triangles in the subtree
    bound: WorldBox,
    kind: NodeKind,
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum NodeKind {
    Leaf { triangles: TriangleIdxRange },
    Inner { children: [NodeIdx; 2] },
}

index_vec::define_index_type! {
    struct NodeIdx = u32;
}

index_vec::define_index_type! {
    struct TriangleIdx = u32;
    IMPL_RAW_CONVERSIONS = true;
}

/// Half open range of triangle indices.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct TriangleIdxRange {
    pub begin: TriangleIdx,
    pub end: TriangleIdx,
}

impl TriangleIdxRange {
    pub fn new(begin: TriangleIdx, end: TriangleIdx) -> TriangleIdxRange {
        assert2::debug_assert!(begin <= end);
        TriangleIdxRange { begin, end }
    }

    pub fn len(&self) -> usize {
        self.end.index() - self.begin.index()
    }

    pub fn into_range(self) -> std::ops::Range<TriangleIdx> {
        self.begin..self.end
    }

    pub fn iter(&self) -> impl Iterator<Item = TriangleIdx> {
        (self.begin.raw()..self.end.raw()).map(TriangleIdx::from_raw)
    }

    /// Splits the range in the middle of the index range.
    /// With odd length the second half gets the extra triangle.
    pub fn split_at_midpoint(&self) -> (TriangleIdxRange, TriangleIdxRange) {
        let mid = self.begin + self.len() / 2;
        (
            TriangleIdxRange::new(self.begin, mid),
            TriangleIdxRange::new(mid, self.end),
        )
    }
}

impl Bvh {
    pub const NAME: &'static str = "accel::bvh";

    /// Empty structure with the given configuration, nothing will be hit until it is built.
    pub fn new(config: AccelConfig) -> Result<Bvh, AccelError> {
        config.validate()?;
        Ok(Bvh {
            config,
            ..Bvh::default()
        })
    }

    /// Builds the structure for a scene in one go.
    pub fn with_scene(scene: &dyn Scene, config: AccelConfig) -> Result<Bvh, AccelError> {
        let mut bvh = Bvh::new(config)?;
        bvh.build(scene)?;
        Ok(bvh)
    }

    pub fn config(&self) -> &AccelConfig {
        &self.config
    }

    /// Bounding box of the whole scene geometry, empty if nothing was built.
    pub fn bounding_box(&self) -> WorldBox {
        self.root()
            .map(|root| self.nodes[root].bound)
            .unwrap_or_default()
    }

    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    fn root(&self) -> Option<NodeIdx> {
        (!self.nodes.is_empty()).then(|| NodeIdx::from_raw(0))
    }
}

impl Accel for Bvh {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn initialize(&mut self, config: &AccelConfig) -> Result<(), AccelError> {
        config.validate()?;
        self.config = config.clone();
        Ok(())
    }

    fn build(&mut self, scene: &dyn Scene) -> Result<(), AccelError> {
        let start = std::time::Instant::now();

        let (triangles, bounds) = extraction::extract_triangles(scene, self.config.bound_epsilon)?;
        let nodes = building::build_hierarchy(&bounds, self.config.leaf_threshold);

        // Only replace the old tree once both parts of the new one are complete
        self.triangles = triangles;
        self.nodes = nodes;

        log::debug!(
            "Built BVH over {} triangles from {} primitives: {} nodes in {:?}",
            self.triangles.len(),
            scene.num_primitives(),
            self.nodes.len(),
            start.elapsed()
        );
        log::trace!("{}", self.statistics());

        Ok(())
    }

    fn intersect(
        &self,
        scene: &dyn Scene,
        ray: &Ray,
        min_t: FloatType,
        max_t: FloatType,
    ) -> Option<Intersection> {
        let hit = self.closest_hit(ray, min_t, max_t)?;
        Intersection::resolve(scene, hit)
    }
}

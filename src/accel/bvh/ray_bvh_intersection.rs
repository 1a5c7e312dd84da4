use super::{Bvh, NodeIdx, NodeKind, TriangleIdx, TriangleIdxRange};
use crate::{
    geometry::{BarycentricCoordinates, FloatType, Ray, RayIntersectionExt as _},
    scene::TriangleHit,
};

impl Bvh {
    /// Finds the closest triangle hit along the ray with t in the open interval (min_t, max_t),
    /// without touching the scene.
    pub fn closest_hit(
        &self,
        ray: &Ray,
        min_t: FloatType,
        max_t: FloatType,
    ) -> Option<TriangleHit> {
        let root = self.root()?;

        let mut best = ClosestHit {
            max_t,
            triangle_index: None,
            uv: BarycentricCoordinates::default(),
        };

        if !self.intersect_recursive(root, ray, min_t, &mut best) {
            return None;
        }

        let triangle_index = best.triangle_index?;
        let triangle = &self.triangles[triangle_index];
        Some(TriangleHit {
            t: best.max_t,
            point: ray.point_at(best.max_t),
            uv: best.uv,
            primitive_index: triangle.primitive_index,
            face_index: triangle.face_index,
        })
    }

    /// Returns true if the best hit was improved anywhere in this subtree.
    fn intersect_recursive(
        &self,
        node_index: NodeIdx,
        ray: &Ray,
        min_t: FloatType,
        best: &mut ClosestHit,
    ) -> bool {
        let node = &self.nodes[node_index];
        if !node.bound.overlaps(ray, min_t, best.max_t) {
            return false;
        }

        match node.kind {
            NodeKind::Leaf { triangles } => self.intersect_triangles(triangles, ray, min_t, best),
            NodeKind::Inner {
                children: [first, second],
            } => {
                // No ordering of the children, a hit in the first one shrinks
                // best.max_t and with it the box test of the second one.
                let first_hit = self.intersect_recursive(first, ray, min_t, best);
                let second_hit = self.intersect_recursive(second, ray, min_t, best);
                first_hit || second_hit
            }
        }
    }

    fn intersect_triangles(
        &self,
        triangle_indices: TriangleIdxRange,
        ray: &Ray,
        min_t: FloatType,
        best: &mut ClosestHit,
    ) -> bool {
        let mut hit = false;
        for (i, triangle) in triangle_indices
            .iter()
            .zip(self.triangles[triangle_indices.into_range()].iter())
        {
            if let Some((t, uv)) = triangle.intersect(ray, min_t, best.max_t) {
                hit |= best.update(t, i, uv);
            }
        }
        hit
    }
}

/// Best hit found so far in a single query, owned by the call.
#[derive(Clone, Debug)]
struct ClosestHit {
    /// Upper end of the live parametric interval, distance of the best hit once there is one
    max_t: FloatType,
    triangle_index: Option<TriangleIdx>,
    uv: BarycentricCoordinates<FloatType>,
}

impl ClosestHit {
    /// Only strictly closer hits replace the current one, so that on exact
    /// ties the first triangle in scan order wins.
    fn update(
        &mut self,
        t: FloatType,
        triangle_index: TriangleIdx,
        uv: BarycentricCoordinates<FloatType>,
    ) -> bool {
        if t < self.max_t {
            self.max_t = t;
            self.triangle_index = Some(triangle_index);
            self.uv = uv;
            true
        } else {
            false
        }
    }
}

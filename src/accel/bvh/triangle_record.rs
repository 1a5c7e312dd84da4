use crate::geometry::{BarycentricCoordinates, FloatType, Ray, Triangle, WorldPoint, WorldVector};

/// World space triangle prepared for intersection tests, so that traversal
/// never has to go back to the mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct TriangleRecord {
    origin: WorldPoint,
    edge1: WorldVector,
    edge2: WorldVector,

    /// Index of the face in the owning mesh
    pub face_index: usize,
    /// Index of the owning primitive in the scene
    pub primitive_index: usize,
}

impl TriangleRecord {
    pub fn new(triangle: &Triangle<WorldPoint>, primitive_index: usize, face_index: usize) -> Self {
        let [edge1, edge2] = triangle.edges();
        TriangleRecord {
            origin: triangle[0],
            edge1,
            edge2,
            face_index,
            primitive_index,
        }
    }

    /// Calculates ray intersection with the (two sided) triangle.
    /// Only hits with distance strictly inside (min_t, max_t) are reported.
    /// Returns distance along ray and barycentric uv coordinates.
    /// Adapted from https://en.wikipedia.org/wiki/M%C3%B6ller%E2%80%93Trumbore_intersection_algorithm#Rust_implementation
    pub fn intersect(
        &self,
        ray: &Ray,
        min_t: FloatType,
        max_t: FloatType,
    ) -> Option<(FloatType, BarycentricCoordinates<FloatType>)> {
        let ray_cross_e2 = ray.direction.cross(&self.edge2);
        let det = self.edge1.dot(&ray_cross_e2);

        // Ray parallel to the triangle plane, or a degenerate triangle
        if det == 0.0 || !det.is_finite() {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = ray.origin - self.origin;
        let u = inv_det * s.dot(&ray_cross_e2);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let s_cross_e1 = s.cross(&self.edge1);
        let v = inv_det * ray.direction.dot(&s_cross_e1);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = inv_det * self.edge2.dot(&s_cross_e1);
        if min_t < t && t < max_t {
            Some((t, BarycentricCoordinates { u, v }))
        } else {
            None
        }
    }
}

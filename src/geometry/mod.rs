mod aabb;
mod ray_box_intersection;
mod triangle;

pub use aabb::AABB;
pub use ray_box_intersection::RayIntersectionExt;
pub use triangle::{BarycentricCoordinates, Triangle};

pub type FloatType = f32;

/// Default padding of triangle bounds, keeps axis aligned (zero thickness)
/// triangles from slipping between the slabs of their own box.
pub const EPSILON: FloatType = 1e-4;

pub type WorldPoint = nalgebra::Point3<FloatType>;
pub type WorldVector = nalgebra::Vector3<FloatType>;
pub type WorldBox = AABB<WorldPoint>;
pub type WorldTransform = nalgebra::Matrix4<FloatType>;
pub type TexturePoint = nalgebra::Point2<FloatType>;

#[derive(Copy, Clone, Debug)]
pub struct Ray {
    pub origin: WorldPoint,
    /// Normalized direction of the ray
    pub direction: WorldVector,

    /// Componentwise inverse of the ray direction
    /// Zeros in direction get turned into positive infinity regardless of the sign of the zero
    pub inv_direction: WorldVector,
}

impl Ray {
    pub fn new(origin: WorldPoint, direction: WorldVector) -> Ray {
        let direction = direction.normalize();
        let inv_direction = direction.map(|x| if x == 0.0 { FloatType::INFINITY } else { 1.0 / x });

        Ray {
            origin,
            direction,
            inv_direction,
        }
    }

    pub fn point_at(&self, distance: FloatType) -> WorldPoint {
        self.origin + self.direction * distance
    }
}

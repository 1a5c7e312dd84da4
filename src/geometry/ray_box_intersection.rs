use super::{FloatType, Ray, WorldBox};

pub trait RayIntersectionExt {
    /// Calculate first and last ray intersection with the box
    fn intersect(&self, ray: &Ray) -> (FloatType, FloatType);

    /// Checks whether the ray passes through the box anywhere in the closed
    /// parametric interval `[min_t, max_t]`.
    fn overlaps(&self, ray: &Ray, min_t: FloatType, max_t: FloatType) -> bool {
        let (t1, t2) = self.intersect(ray);
        t1.max(min_t) <= t2.min(max_t)
    }
}

impl RayIntersectionExt for WorldBox {
    /// Calculates ray intersection with the box using the slab test.
    /// Returns minimum and maximum distance along the ray, ray intersects if min <= max.
    /// Empty box never intersects.
    fn intersect(&self, ray: &Ray) -> (FloatType, FloatType) {
        if self.is_empty() {
            return (FloatType::INFINITY, FloatType::NEG_INFINITY);
        }

        // Componentwise distances along the ray to the box's min and max corners
        // The multiplication is NAN if the ray is starting inside the slab bounding plane
        // and is parallel to it. In this case we replace it with +-infinity, so that
        // the range becomes infinite
        let to_box_min = (self.min - ray.origin)
            .component_mul(&ray.inv_direction)
            .map(|x| if x.is_nan() { FloatType::NEG_INFINITY } else { x });
        let to_box_max = (self.max - ray.origin)
            .component_mul(&ray.inv_direction)
            .map(|x| if x.is_nan() { FloatType::INFINITY } else { x });

        // Correctly ordered (min_t <= max_t)
        let componentwise_min_t = to_box_min.zip_map(&to_box_max, |a, b| a.min(b));
        let componentwise_max_t = to_box_min.zip_map(&to_box_max, |a, b| a.max(b));

        (componentwise_min_t.max(), componentwise_max_t.min())
    }
}

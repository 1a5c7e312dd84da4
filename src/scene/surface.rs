use nalgebra::{Matrix3, Unit, Vector2};

use crate::geometry::{
    BarycentricCoordinates, FloatType, TexturePoint, Triangle, WorldPoint, WorldVector,
};

use super::{Mesh, Primitive, Scene};

/// Closest ray-triangle hit as found by an acceleration structure,
/// before the surface is looked up in the scene.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TriangleHit {
    /// Distance along the ray
    pub t: FloatType,
    pub point: WorldPoint,
    pub uv: BarycentricCoordinates<FloatType>,
    pub primitive_index: usize,
    pub face_index: usize,
}

/// Local surface description at a hit point.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceGeometry {
    pub point: WorldPoint,
    pub geometric_normal: Unit<WorldVector>,
    /// Interpolated vertex normal, same as geometric_normal for flat shaded meshes.
    pub shading_normal: Unit<WorldVector>,
    pub texture_coords: TexturePoint,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Intersection {
    pub hit: TriangleHit,
    pub geometry: SurfaceGeometry,
}

impl Intersection {
    /// Looks up the hit triangle in the scene and calculates its surface geometry.
    /// Returns None if the hit primitive, its mesh or the face doesn't exist in the scene,
    /// which can only happen when the scene is not the one the acceleration structure
    /// was built from.
    pub fn resolve(scene: &dyn Scene, hit: TriangleHit) -> Option<Intersection> {
        if hit.primitive_index >= scene.num_primitives() {
            return None;
        }
        let primitive = scene.primitive_at(hit.primitive_index);
        let world_triangle = primitive.world_triangle(hit.face_index)?;
        let mesh = primitive.mesh.as_deref()?;

        let geometry = SurfaceGeometry::new(primitive, mesh, &world_triangle, &hit);
        Some(Intersection { hit, geometry })
    }

    pub fn t(&self) -> FloatType {
        self.hit.t
    }
}

impl SurfaceGeometry {
    fn new(
        primitive: &Primitive,
        mesh: &Mesh,
        world_triangle: &Triangle<WorldPoint>,
        hit: &TriangleHit,
    ) -> SurfaceGeometry {
        let face = mesh.face(hit.face_index);

        // A triangle with zero area can't be hit, the fallback only guards rounding.
        let geometric_normal =
            Unit::try_new(world_triangle.normal(), 0.0).unwrap_or_else(WorldVector::z_axis);

        let linear = primitive.transform.fixed_view::<3, 3>(0, 0).into_owned();
        let shading_normal = vertex_normals(mesh, &face)
            .and_then(|normals| {
                let interpolated = hit.uv.interpolate_triangle(&normals);
                Unit::try_new(normal_transform(&linear)? * interpolated, 0.0)
            })
            .unwrap_or(geometric_normal);

        let texture_coords = vertex_texcoords(mesh, &face)
            .map(|texcoords| TexturePoint::from(hit.uv.interpolate_triangle(&texcoords)))
            .unwrap_or_else(TexturePoint::origin);

        SurfaceGeometry {
            point: hit.point,
            geometric_normal,
            shading_normal,
            texture_coords,
        }
    }
}

/// Inverse transpose of the linear part of the transform, None if it is singular.
fn normal_transform(linear: &Matrix3<FloatType>) -> Option<Matrix3<FloatType>> {
    linear.try_inverse().map(|m| m.transpose())
}

fn vertex_normals(mesh: &Mesh, face: &Triangle<usize>) -> Option<Triangle<WorldVector>> {
    Some(Triangle::new(
        mesh.normal(face[0])?,
        mesh.normal(face[1])?,
        mesh.normal(face[2])?,
    ))
}

fn vertex_texcoords(mesh: &Mesh, face: &Triangle<usize>) -> Option<Triangle<Vector2<FloatType>>> {
    Some(Triangle::new(
        mesh.texcoord(face[0])?.coords,
        mesh.texcoord(face[1])?.coords,
        mesh.texcoord(face[2])?.coords,
    ))
}

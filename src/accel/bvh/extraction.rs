use index_vec::IndexVec;
use itertools::Itertools as _;

use super::{TriangleIdx, triangle_record::TriangleRecord};
use crate::{
    accel::AccelError,
    geometry::{FloatType, Triangle, WorldBox, WorldPoint},
    scene::Scene,
};

/// Flattens all meshes of the scene into world space triangle records and their
/// padded bounds. Output order is primitives, then faces of each primitive.
pub fn extract_triangles(
    scene: &dyn Scene,
    bound_epsilon: FloatType,
) -> Result<
    (
        IndexVec<TriangleIdx, TriangleRecord>,
        IndexVec<TriangleIdx, WorldBox>,
    ),
    AccelError,
> {
    let mut triangles = IndexVec::new();
    let mut bounds = IndexVec::new();

    for primitive_index in 0..scene.num_primitives() {
        let primitive = scene.primitive_at(primitive_index);
        let Some(mesh) = primitive.mesh.as_deref() else {
            log::trace!("Primitive {primitive_index} has no mesh, skipping");
            continue;
        };

        mesh.validate().map_err(|reason| {
            log::warn!("Rejecting primitive {primitive_index}: {reason}");
            AccelError::InvalidGeometry {
                primitive: primitive_index,
                reason,
            }
        })?;

        let world_positions: Vec<WorldPoint> = mesh
            .positions()
            .iter()
            .tuples()
            .map(|(x, y, z)| {
                primitive
                    .transform
                    .transform_point(&WorldPoint::new(*x, *y, *z))
            })
            .collect();

        for (face_index, (a, b, c)) in mesh.faces().iter().tuples().enumerate() {
            let triangle = Triangle::new(
                world_positions[*a as usize],
                world_positions[*b as usize],
                world_positions[*c as usize],
            );

            bounds.push(WorldBox::from_points(triangle.iter()).padded(bound_epsilon));
            triangles.push(TriangleRecord::new(&triangle, primitive_index, face_index));
        }
    }

    Ok((triangles, bounds))
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use super::*;
    use crate::{
        accel::GeometryError,
        geometry::{EPSILON, WorldTransform, WorldVector},
        scene::{Mesh, Primitive, StaticScene},
    };

    use assert2::{assert, let_assert};

    fn two_triangle_mesh() -> Arc<Mesh> {
        Arc::new(
            Mesh::builder()
                .positions(vec![
                    0.0, 0.0, 0.0, //
                    1.0, 0.0, 0.0, //
                    1.0, 1.0, 0.0, //
                    0.0, 1.0, 0.0, //
                ])
                .faces(vec![0, 1, 2, 0, 2, 3])
                .build(),
        )
    }

    #[test]
    fn emits_primitives_then_faces() {
        let mesh = two_triangle_mesh();
        let scene = StaticScene::new(vec![
            Primitive::new(mesh.clone(), WorldTransform::identity()),
            Primitive::without_mesh(WorldTransform::identity()),
            Primitive::new(mesh, WorldTransform::new_translation(&WorldVector::new(0.0, 0.0, 2.0))),
        ]);

        let_assert!(Ok((triangles, bounds)) = extract_triangles(&scene, EPSILON));
        assert!(triangles.len() == 4);
        assert!(bounds.len() == 4);

        let order: Vec<_> = triangles
            .iter()
            .map(|t| (t.primitive_index, t.face_index))
            .collect();
        assert!(order == vec![(0, 0), (0, 1), (2, 0), (2, 1)]);
    }

    #[test]
    fn bounds_are_transformed_and_padded() {
        let scene = StaticScene::new(vec![Primitive::new(
            two_triangle_mesh(),
            WorldTransform::new_translation(&WorldVector::new(0.0, 0.0, 2.0)),
        )]);

        let_assert!(Ok((_, bounds)) = extract_triangles(&scene, 0.5));
        let first = bounds[TriangleIdx::from_raw(0)];
        assert!(first.min == WorldPoint::new(-0.5, -0.5, 1.5));
        assert!(first.max == WorldPoint::new(1.5, 1.5, 2.5));
    }

    #[test]
    fn empty_scene_yields_empty_arrays() {
        let scene = StaticScene::default();
        let_assert!(Ok((triangles, bounds)) = extract_triangles(&scene, EPSILON));
        assert!(triangles.is_empty());
        assert!(bounds.is_empty());
    }

    #[test]
    fn out_of_range_face_is_reported() {
        let broken = Arc::new(
            Mesh::builder()
                .positions(vec![0.0; 9])
                .faces(vec![0, 1, 2, 0, 1, 9])
                .build(),
        );
        let scene = StaticScene::new(vec![
            Primitive::new(two_triangle_mesh(), WorldTransform::identity()),
            Primitive::new(broken, WorldTransform::identity()),
        ]);

        let result = extract_triangles(&scene, EPSILON);
        let_assert!(Err(AccelError::InvalidGeometry { primitive, reason }) = result);
        assert!(primitive == 1);
        assert!(
            reason
                == GeometryError::VertexOutOfRange {
                    face: 1,
                    vertex: 9,
                    vertex_count: 3
                }
        );
    }
}
